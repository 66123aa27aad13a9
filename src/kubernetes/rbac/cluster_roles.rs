// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{KubekitError, Result};
use crate::kubernetes::{ops, KubeClient};
use k8s_openapi::api::rbac::v1::{ClusterRole, PolicyRule};
use kube::api::{DeleteParams, ObjectMeta};
use kube::Api;
use std::collections::BTreeMap;
use tracing::instrument;

/// ClusterRole with a single policy rule
#[derive(Debug, Clone, Default)]
pub struct ClusterRoleConfig {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub api_groups: Vec<String>,
    pub resources: Vec<String>,
    pub resource_names: Vec<String>,
    pub verbs: Vec<String>,
}

fn api(kc: &KubeClient) -> Api<ClusterRole> {
    Api::all(kc.client().clone())
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}

pub fn build(config: &ClusterRoleConfig) -> Result<ClusterRole> {
    if config.verbs.is_empty() {
        return Err(KubekitError::MissingField("verbs"));
    }

    Ok(ClusterRole {
        metadata: ObjectMeta {
            name: Some(config.name.clone()),
            labels: (!config.labels.is_empty()).then(|| config.labels.clone()),
            ..Default::default()
        },
        rules: Some(vec![PolicyRule {
            api_groups: non_empty(&config.api_groups),
            resources: non_empty(&config.resources),
            resource_names: non_empty(&config.resource_names),
            verbs: config.verbs.clone(),
            ..Default::default()
        }]),
        ..Default::default()
    })
}

#[instrument(skip(kc, config), fields(clusterrole = %config.name))]
pub async fn create(kc: &KubeClient, config: &ClusterRoleConfig) -> Result<ClusterRole> {
    ops::create(&api(kc), &build(config)?).await
}

#[instrument(skip(kc))]
pub async fn delete(kc: &KubeClient, name: &str) -> Result<()> {
    ops::delete(&api(kc), name, &DeleteParams::default()).await
}

pub async fn list(kc: &KubeClient) -> Result<Vec<ClusterRole>> {
    ops::list(&api(kc)).await
}

pub async fn exists(kc: &KubeClient, name: &str) -> Result<bool> {
    ops::exists(&api(kc), name).await
}
