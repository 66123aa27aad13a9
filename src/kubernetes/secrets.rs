// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{KubekitError, Result};
use crate::kubernetes::{ops, KubeClient};
use crate::types::SecretType;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::api::{DeleteParams, ObjectMeta};
use kube::Api;
use std::collections::BTreeMap;
use tracing::instrument;

/// Secret holding a single key
#[derive(Debug, Clone)]
pub struct SecretConfig {
    pub name: String,
    /// Empty means the client's default namespace
    pub namespace: String,
    pub secret_type: SecretType,
    pub key: String,
    pub value: String,
}

fn api(kc: &KubeClient, namespace: &str) -> Api<Secret> {
    Api::namespaced(kc.client().clone(), kc.namespace_or_default(Some(namespace)))
}

pub fn build(config: &SecretConfig) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(config.name.clone()),
            ..Default::default()
        },
        type_: Some(config.secret_type.as_str().to_string()),
        data: Some(BTreeMap::from([(
            config.key.clone(),
            ByteString(config.value.as_bytes().to_vec()),
        )])),
        ..Default::default()
    }
}

#[instrument(skip(kc, config), fields(secret = %config.name))]
pub async fn create(kc: &KubeClient, config: &SecretConfig) -> Result<Secret> {
    if config.key.is_empty() {
        return Err(KubekitError::MissingField("key"));
    }
    ops::create(&api(kc, &config.namespace), &build(config)).await
}

pub async fn get(kc: &KubeClient, namespace: &str, name: &str) -> Result<Secret> {
    ops::get(&api(kc, namespace), name).await
}

pub async fn exists(kc: &KubeClient, namespace: &str, name: &str) -> Result<bool> {
    ops::exists(&api(kc, namespace), name).await
}

#[instrument(skip(kc))]
pub async fn delete(kc: &KubeClient, namespace: &str, name: &str) -> Result<()> {
    ops::delete(&api(kc, namespace), name, &DeleteParams::default()).await
}
