// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{KubekitError, Result};
use crate::kubernetes::{ops, KubeClient};
use crate::types::{AccessMode, VolumeMode};
use k8s_openapi::api::core::v1::{
    PersistentVolumeClaim, PersistentVolumeClaimSpec, VolumeResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::api::{DeleteParams, ObjectMeta};
use kube::Api;
use std::collections::BTreeMap;
use tracing::instrument;

const DEFAULT_NAME_PREFIX: &str = "pvc-";

#[derive(Debug, Clone, Default)]
pub struct PvcConfig {
    /// Leave empty to let the server generate a name from `name_prefix`
    pub name: String,
    /// `pvc-` when empty
    pub name_prefix: String,
    /// Empty means the client's default namespace
    pub namespace: String,
    /// Requested storage, e.g. `1Gi`
    pub size: String,
    pub access_mode: Option<AccessMode>,
    pub annotations: BTreeMap<String, String>,
    pub selector: Option<LabelSelector>,
    pub storage_class: Option<String>,
    pub volume_mode: Option<VolumeMode>,
}

fn api(kc: &KubeClient, namespace: &str) -> Api<PersistentVolumeClaim> {
    Api::namespaced(kc.client().clone(), kc.namespace_or_default(Some(namespace)))
}

pub fn build(config: &PvcConfig) -> Result<PersistentVolumeClaim> {
    if config.size.trim().is_empty() {
        return Err(KubekitError::MissingField("size"));
    }
    let access_mode = config
        .access_mode
        .ok_or(KubekitError::MissingField("access_mode"))?;

    let (name, generate_name) = if config.name.is_empty() {
        let prefix = if config.name_prefix.is_empty() {
            DEFAULT_NAME_PREFIX
        } else {
            config.name_prefix.as_str()
        };
        (None, Some(prefix.to_string()))
    } else {
        (Some(config.name.clone()), None)
    };

    Ok(PersistentVolumeClaim {
        metadata: ObjectMeta {
            name,
            generate_name,
            annotations: (!config.annotations.is_empty()).then(|| config.annotations.clone()),
            ..Default::default()
        },
        spec: Some(PersistentVolumeClaimSpec {
            access_modes: Some(vec![access_mode.as_str().to_string()]),
            resources: Some(VolumeResourceRequirements {
                requests: Some(BTreeMap::from([(
                    "storage".to_string(),
                    Quantity(config.size.trim().to_string()),
                )])),
                ..Default::default()
            }),
            selector: config.selector.clone(),
            storage_class_name: config.storage_class.clone(),
            volume_mode: config.volume_mode.map(|m| m.as_str().to_string()),
            ..Default::default()
        }),
        ..Default::default()
    })
}

#[instrument(skip(kc, config))]
pub async fn create(kc: &KubeClient, config: &PvcConfig) -> Result<PersistentVolumeClaim> {
    ops::create(&api(kc, &config.namespace), &build(config)?).await
}

#[instrument(skip(kc))]
pub async fn delete(kc: &KubeClient, namespace: &str, name: &str) -> Result<()> {
    ops::delete(&api(kc, namespace), name, &DeleteParams::default()).await
}

pub async fn list(kc: &KubeClient, namespace: &str) -> Result<Vec<PersistentVolumeClaim>> {
    ops::list(&api(kc, namespace)).await
}

/// Claims across every namespace
pub async fn list_all(kc: &KubeClient) -> Result<Vec<PersistentVolumeClaim>> {
    ops::list(&Api::<PersistentVolumeClaim>::all(kc.client().clone())).await
}

pub async fn exists(kc: &KubeClient, namespace: &str, name: &str) -> Result<bool> {
    ops::exists(&api(kc, namespace), name).await
}
