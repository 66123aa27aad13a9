// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Inspecting kube-proxy: which mode it runs in and the rules it programmed

use crate::error::{KubekitError, Result};
use crate::kubernetes::{configmaps, pods, KubeClient};
use crate::tools::apt;
use crate::tools::firewall::{self, FirewallMode};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::ResourceExt;
use std::path::PathBuf;
use tracing::{debug, info, instrument};

/// Where to find kube-proxy in the cluster
#[derive(Debug, Clone)]
pub struct KubeProxyLocation {
    pub namespace: String,
    pub configmap: String,
    /// Any kube-proxy pod name contains this
    pub pod_name_substring: String,
}

impl Default for KubeProxyLocation {
    fn default() -> Self {
        use crate::constants::kube_proxy::{CONFIGMAP, NAMESPACE, POD_NAME_SUBSTRING};
        Self {
            namespace: NAMESPACE.to_string(),
            configmap: CONFIGMAP.to_string(),
            pod_name_substring: POD_NAME_SUBSTRING.to_string(),
        }
    }
}

/// Name of one kube-proxy pod
pub async fn find_pod(kc: &KubeClient, location: &KubeProxyLocation) -> Result<String> {
    let pod = pods::find_by_name_contains(kc, &location.namespace, &location.pod_name_substring).await?;
    Ok(pod.name_any())
}

/// Read the `mode:` setting out of the kube-proxy configuration.
///
/// An empty mode selects kube-proxy's default, iptables.
pub fn mode_from_configmap(configmap: &ConfigMap) -> Result<FirewallMode> {
    let unknown = || KubekitError::UnknownProxyMode(configmap.name_any());

    let mode = configmap
        .data
        .iter()
        .flatten()
        .flat_map(|(_, value)| value.lines())
        .filter_map(|line| line.trim().strip_prefix("mode:"))
        .map(|value| value.trim().trim_matches(|c| c == '"' || c == '\''))
        .next()
        .ok_or_else(unknown)?;

    if mode.is_empty() {
        return Ok(FirewallMode::Iptables);
    }
    mode.parse().map_err(|_| unknown())
}

#[instrument(skip(kc))]
pub async fn detect_mode(kc: &KubeClient, location: &KubeProxyLocation) -> Result<FirewallMode> {
    let configmap = configmaps::get(kc, &location.namespace, &location.configmap).await?;
    let mode = mode_from_configmap(&configmap)?;
    debug!("kube-proxy runs in {} mode", mode);
    Ok(mode)
}

/// Dump the rules kube-proxy programmed into a local file.
///
/// In ipvs mode `ipvsadm` is installed into the pod first.
#[instrument(skip(kc))]
pub async fn save_firewall_state(kc: &KubeClient, location: &KubeProxyLocation) -> Result<PathBuf> {
    let mode = detect_mode(kc, location).await?;
    let pod = find_pod(kc, location).await?;

    if mode == FirewallMode::Ipvs {
        info!("Installing ipvsadm in pod {}", pod);
        apt::update(kc, &location.namespace, &pod).await?;
        apt::install(kc, &location.namespace, &pod, "ipvsadm").await?;
    }

    firewall::save(kc, mode, &location.namespace, &pod).await
}
