// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::Result;
use crate::kubernetes::workloads::WorkloadConfig;
use crate::kubernetes::{ops, KubeClient};
use k8s_openapi::api::apps::v1::{DaemonSet, DaemonSetSpec};
use kube::Api;
use tracing::instrument;

fn api(kc: &KubeClient, namespace: &str) -> Api<DaemonSet> {
    Api::namespaced(kc.client().clone(), kc.namespace_or_default(Some(namespace)))
}

pub fn build(config: &WorkloadConfig) -> DaemonSet {
    DaemonSet {
        metadata: config.metadata(),
        spec: Some(DaemonSetSpec {
            selector: config.selector(),
            template: config.pod_template(),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[instrument(skip(kc, config), fields(daemonset = %config.name))]
pub async fn create(kc: &KubeClient, config: &WorkloadConfig) -> Result<DaemonSet> {
    config.validate()?;
    ops::create(&api(kc, &config.namespace), &build(config)).await
}

/// Delete a daemonset and wait until it is gone
#[instrument(skip(kc))]
pub async fn delete(kc: &KubeClient, namespace: &str, name: &str) -> Result<()> {
    ops::delete_and_confirm(kc, &api(kc, namespace), name).await
}

pub async fn exists(kc: &KubeClient, namespace: &str, name: &str) -> Result<bool> {
    ops::exists(&api(kc, namespace), name).await
}

pub async fn list(kc: &KubeClient, namespace: &str) -> Result<Vec<DaemonSet>> {
    ops::list(&api(kc, namespace)).await
}
