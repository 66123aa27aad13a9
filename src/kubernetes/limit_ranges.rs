// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::Result;
use crate::kubernetes::{ops, KubeClient};
use crate::types::{resource_list, LimitType};
use k8s_openapi::api::core::v1::{LimitRange, LimitRangeItem, LimitRangeSpec};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::api::{DeleteParams, ObjectMeta};
use kube::Api;
use std::collections::BTreeMap;
use tracing::instrument;

/// Quantities for cpu, memory and ephemeral storage; empty strings are left out
#[derive(Debug, Clone, Default)]
pub struct Resources {
    pub cpu: String,
    pub memory: String,
    pub ephemeral_storage: String,
}

impl Resources {
    fn to_list(&self) -> Option<BTreeMap<String, Quantity>> {
        let list = resource_list(&self.cpu, &self.memory, &self.ephemeral_storage);
        (!list.is_empty()).then_some(list)
    }
}

#[derive(Debug, Clone)]
pub struct LimitRangeConfig {
    pub name: String,
    /// Empty means the client's default namespace
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub limit_type: LimitType,
    pub min: Resources,
    pub max: Resources,
    pub default: Resources,
    pub default_request: Resources,
    pub max_limit_request_ratio: Resources,
}

fn api(kc: &KubeClient, namespace: &str) -> Api<LimitRange> {
    Api::namespaced(kc.client().clone(), kc.namespace_or_default(Some(namespace)))
}

pub fn build(config: &LimitRangeConfig) -> LimitRange {
    LimitRange {
        metadata: ObjectMeta {
            name: Some(config.name.clone()),
            labels: (!config.labels.is_empty()).then(|| config.labels.clone()),
            ..Default::default()
        },
        spec: Some(LimitRangeSpec {
            limits: vec![LimitRangeItem {
                type_: config.limit_type.as_str().to_string(),
                min: config.min.to_list(),
                max: config.max.to_list(),
                default: config.default.to_list(),
                default_request: config.default_request.to_list(),
                max_limit_request_ratio: config.max_limit_request_ratio.to_list(),
            }],
        }),
    }
}

#[instrument(skip(kc, config), fields(limitrange = %config.name))]
pub async fn create(kc: &KubeClient, config: &LimitRangeConfig) -> Result<LimitRange> {
    ops::create(&api(kc, &config.namespace), &build(config)).await
}

#[instrument(skip(kc))]
pub async fn delete(kc: &KubeClient, namespace: &str, name: &str) -> Result<()> {
    ops::delete(&api(kc, namespace), name, &DeleteParams::default()).await
}

pub async fn list(kc: &KubeClient, namespace: &str) -> Result<Vec<LimitRange>> {
    ops::list(&api(kc, namespace)).await
}

pub async fn exists(kc: &KubeClient, namespace: &str, name: &str) -> Result<bool> {
    ops::exists(&api(kc, namespace), name).await
}
