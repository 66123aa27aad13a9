// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::Result;
use crate::kubernetes::{ops, KubeClient};
use k8s_openapi::api::core::v1::ServiceAccount;
use kube::api::{DeleteParams, ObjectMeta};
use kube::Api;
use tracing::instrument;

#[derive(Debug, Clone, Default)]
pub struct ServiceAccountConfig {
    pub name: String,
    /// Empty means the client's default namespace
    pub namespace: String,
    /// Mount the API token into pods; `true` when unset
    pub automount_token: Option<bool>,
}

fn api(kc: &KubeClient, namespace: &str) -> Api<ServiceAccount> {
    Api::namespaced(kc.client().clone(), kc.namespace_or_default(Some(namespace)))
}

pub fn build(config: &ServiceAccountConfig) -> ServiceAccount {
    ServiceAccount {
        metadata: ObjectMeta {
            name: Some(config.name.clone()),
            ..Default::default()
        },
        automount_service_account_token: Some(config.automount_token.unwrap_or(true)),
        ..Default::default()
    }
}

#[instrument(skip(kc, config), fields(serviceaccount = %config.name))]
pub async fn create(kc: &KubeClient, config: &ServiceAccountConfig) -> Result<ServiceAccount> {
    ops::create(&api(kc, &config.namespace), &build(config)).await
}

pub async fn exists(kc: &KubeClient, namespace: &str, name: &str) -> Result<bool> {
    ops::exists(&api(kc, namespace), name).await
}

#[instrument(skip(kc))]
pub async fn delete(kc: &KubeClient, namespace: &str, name: &str) -> Result<()> {
    ops::delete(&api(kc, namespace), name, &DeleteParams::default()).await
}
