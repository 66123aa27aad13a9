// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! MetalLB load-balancer deployment and configuration.
//!
//! Releases up to 0.12 are configured through the `config` ConfigMap
//! ([`create_config`]); 0.13 and later use the `IPAddressPool` and
//! `L2Advertisement` custom resources.

use crate::constants::metallb::{
    MANIFEST_BASE_URL, MEMBERLIST_KEY, MEMBERLIST_KEY_BYTES, MEMBERLIST_SECRET, NAMESPACE,
};
use crate::error::{KubekitError, Result};
use crate::kubernetes::configmaps::{self, ConfigMapConfig};
use crate::kubernetes::secrets::{self, SecretConfig};
use crate::kubernetes::{apply, ops, KubeClient};
use crate::types::{
    IPAddressPool, IPAddressPoolSpec, L2Advertisement, L2AdvertisementSpec, SecretType,
};
use crate::util;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::Api;
use tracing::{info, instrument};
use url::Url;

const MANIFESTS: [&str; 2] = ["manifests/namespace.yaml", "manifests/metallb.yaml"];

/// Address pool for the legacy ConfigMap configuration
#[derive(Debug, Clone)]
pub struct LegacyConfig {
    /// ConfigMap name; MetalLB watches `config`
    pub name: String,
    /// Key inside the ConfigMap; MetalLB reads `config`
    pub key: String,
    pub pool_name: String,
    /// `layer2` or `bgp`
    pub protocol: String,
    pub addresses: Vec<String>,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            name: "config".to_string(),
            key: "config".to_string(),
            pool_name: "default".to_string(),
            protocol: "layer2".to_string(),
            addresses: Vec::new(),
        }
    }
}

impl LegacyConfig {
    /// The `address-pools` document MetalLB expects
    pub fn render(&self) -> String {
        let mut out = format!(
            "address-pools:\n- name: {}\n  protocol: {}\n  addresses:\n",
            self.pool_name, self.protocol
        );
        for address in &self.addresses {
            out.push_str(&format!("  - {}\n", address));
        }
        out
    }
}

/// URLs of the manifests making up a MetalLB release, in apply order
pub fn manifest_urls(version: &str) -> Result<Vec<Url>> {
    let version = version.trim();
    if version.is_empty() {
        return Err(KubekitError::MissingField("version"));
    }
    if version.contains('/') {
        return Err(KubekitError::InvalidValue {
            field: "version",
            value: version.to_string(),
        });
    }

    let base = Url::parse(MANIFEST_BASE_URL)?.join(&format!("{}/", version))?;
    MANIFESTS
        .iter()
        .map(|path| base.join(path).map_err(KubekitError::from))
        .collect()
}

/// Download the release manifests and apply them.
///
/// Returns the outcome lines of every applied document.
#[instrument(skip(kc))]
pub async fn deploy(kc: &KubeClient, version: &str) -> Result<Vec<String>> {
    let mut outcome = Vec::new();

    for url in manifest_urls(version)? {
        info!("Applying {}", url);
        let manifest = util::download(&url).await?;
        outcome.extend(apply::apply_yaml(kc, &manifest).await?);
    }

    info!("MetalLB {} deployed", version);
    Ok(outcome)
}

/// Memberlist secret with a random key, needed by the speakers
#[instrument(skip(kc))]
pub async fn create_secret(kc: &KubeClient) -> Result<Secret> {
    secrets::create(
        kc,
        &SecretConfig {
            name: MEMBERLIST_SECRET.to_string(),
            namespace: NAMESPACE.to_string(),
            secret_type: SecretType::Opaque,
            key: MEMBERLIST_KEY.to_string(),
            value: util::random_base64(MEMBERLIST_KEY_BYTES),
        },
    )
    .await
}

#[instrument(skip(kc, config), fields(configmap = %config.name))]
pub async fn create_config(kc: &KubeClient, config: &LegacyConfig) -> Result<ConfigMap> {
    if config.addresses.is_empty() {
        return Err(KubekitError::MissingField("addresses"));
    }
    configmaps::create(
        kc,
        &ConfigMapConfig {
            name: config.name.clone(),
            namespace: NAMESPACE.to_string(),
            key: config.key.clone(),
            value: config.render(),
        },
    )
    .await
}

#[instrument(skip(kc, addresses))]
pub async fn create_address_pool(
    kc: &KubeClient,
    name: &str,
    addresses: &[String],
    auto_assign: bool,
) -> Result<IPAddressPool> {
    if addresses.is_empty() {
        return Err(KubekitError::MissingField("addresses"));
    }
    let pool = IPAddressPool::new(
        name,
        IPAddressPoolSpec {
            addresses: addresses.to_vec(),
            auto_assign: Some(auto_assign),
            avoid_buggy_ips: None,
        },
    );
    ops::create(&Api::namespaced(kc.client().clone(), NAMESPACE), &pool).await
}

/// Announce the given pools over layer 2; every pool when `pools` is empty
#[instrument(skip(kc, pools))]
pub async fn create_l2_advertisement(
    kc: &KubeClient,
    name: &str,
    pools: &[String],
) -> Result<L2Advertisement> {
    let advertisement = L2Advertisement::new(
        name,
        L2AdvertisementSpec {
            ip_address_pools: (!pools.is_empty()).then(|| pools.to_vec()),
            interfaces: None,
        },
    );
    ops::create(&Api::namespaced(kc.client().clone(), NAMESPACE), &advertisement).await
}
