// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{KubekitError, Result};
use crate::kubernetes::{ops, KubeClient};
use k8s_openapi::api::rbac::v1::{ClusterRoleBinding, RoleRef, Subject};
use kube::api::{DeleteParams, ObjectMeta};
use kube::Api;
use std::collections::BTreeMap;
use tracing::instrument;

const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";

#[derive(Debug, Clone, Default)]
pub struct SubjectConfig {
    /// `User`, `Group` or `ServiceAccount`
    pub kind: String,
    pub name: String,
    /// Required for ServiceAccount subjects
    pub namespace: String,
    pub api_group: String,
}

/// Binds a single subject to a ClusterRole
#[derive(Debug, Clone, Default)]
pub struct ClusterRoleBindingConfig {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub subject: SubjectConfig,
    pub role_name: String,
    /// `ClusterRole` when empty
    pub role_kind: String,
    /// `rbac.authorization.k8s.io` when empty
    pub role_api_group: String,
}

fn api(kc: &KubeClient) -> Api<ClusterRoleBinding> {
    Api::all(kc.client().clone())
}

fn or_default(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

pub fn build(config: &ClusterRoleBindingConfig) -> Result<ClusterRoleBinding> {
    if config.role_name.is_empty() {
        return Err(KubekitError::MissingField("role_name"));
    }
    let s = &config.subject;

    Ok(ClusterRoleBinding {
        metadata: ObjectMeta {
            name: Some(config.name.clone()),
            labels: (!config.labels.is_empty()).then(|| config.labels.clone()),
            annotations: (!config.annotations.is_empty()).then(|| config.annotations.clone()),
            ..Default::default()
        },
        subjects: Some(vec![Subject {
            kind: s.kind.clone(),
            name: s.name.clone(),
            namespace: (!s.namespace.is_empty()).then(|| s.namespace.clone()),
            api_group: (!s.api_group.is_empty()).then(|| s.api_group.clone()),
        }]),
        role_ref: RoleRef {
            name: config.role_name.clone(),
            kind: or_default(&config.role_kind, "ClusterRole"),
            api_group: or_default(&config.role_api_group, RBAC_API_GROUP),
        },
    })
}

#[instrument(skip(kc, config), fields(clusterrolebinding = %config.name))]
pub async fn create(kc: &KubeClient, config: &ClusterRoleBindingConfig) -> Result<ClusterRoleBinding> {
    ops::create(&api(kc), &build(config)?).await
}

#[instrument(skip(kc))]
pub async fn delete(kc: &KubeClient, name: &str) -> Result<()> {
    ops::delete(&api(kc), name, &DeleteParams::default()).await
}

pub async fn list(kc: &KubeClient) -> Result<Vec<ClusterRoleBinding>> {
    ops::list(&api(kc)).await
}

pub async fn exists(kc: &KubeClient, name: &str) -> Result<bool> {
    ops::exists(&api(kc), name).await
}
