// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{KubekitError, Result};
use crate::kubernetes::{ops, KubeClient};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::ObjectMeta;
use kube::Api;
use std::collections::BTreeMap;
use tracing::instrument;

/// ConfigMap holding a single key
#[derive(Debug, Clone, Default)]
pub struct ConfigMapConfig {
    pub name: String,
    /// Empty means the client's default namespace
    pub namespace: String,
    pub key: String,
    pub value: String,
}

fn api(kc: &KubeClient, namespace: &str) -> Api<ConfigMap> {
    Api::namespaced(kc.client().clone(), kc.namespace_or_default(Some(namespace)))
}

pub fn build(config: &ConfigMapConfig) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(config.name.clone()),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(config.key.clone(), config.value.clone())])),
        ..Default::default()
    }
}

#[instrument(skip(kc, config), fields(configmap = %config.name))]
pub async fn create(kc: &KubeClient, config: &ConfigMapConfig) -> Result<ConfigMap> {
    if config.key.is_empty() {
        return Err(KubekitError::MissingField("key"));
    }
    ops::create(&api(kc, &config.namespace), &build(config)).await
}

pub async fn get(kc: &KubeClient, namespace: &str, name: &str) -> Result<ConfigMap> {
    ops::get(&api(kc, namespace), name).await
}

/// ConfigMaps across every namespace
pub async fn list_all(kc: &KubeClient) -> Result<Vec<ConfigMap>> {
    ops::list(&Api::<ConfigMap>::all(kc.client().clone())).await
}

pub async fn list(kc: &KubeClient, namespace: &str) -> Result<Vec<ConfigMap>> {
    ops::list(&api(kc, namespace)).await
}

/// Delete a configmap and wait until it is gone
#[instrument(skip(kc))]
pub async fn delete(kc: &KubeClient, namespace: &str, name: &str) -> Result<()> {
    ops::delete_and_confirm(kc, &api(kc, namespace), name).await
}

pub async fn exists(kc: &KubeClient, namespace: &str, name: &str) -> Result<bool> {
    ops::exists(&api(kc, namespace), name).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{list_json, object_json, MockService};

    #[tokio::test]
    async fn test_create_single_key() {
        let mock = MockService::new().on_post(
            "/api/v1/namespaces/apps/configmaps",
            201,
            &object_json("v1", "ConfigMap", "settings", Some("apps")),
        );
        let kc = mock.clone().into_kube_client();

        create(
            &kc,
            &ConfigMapConfig {
                name: "settings".to_string(),
                namespace: "apps".to_string(),
                key: "log_level".to_string(),
                value: "debug".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(mock.requests_for("POST")[0].json()["data"]["log_level"], "debug");
    }

    #[tokio::test]
    async fn test_list_all_uses_cluster_scope() {
        let mock = MockService::new().on_get(
            "/api/v1/configmaps",
            200,
            &list_json(
                "v1",
                "ConfigMapList",
                &[
                    object_json("v1", "ConfigMap", "a", Some("default")),
                    object_json("v1", "ConfigMap", "b", Some("kube-system")),
                ],
            ),
        );
        let kc = mock.clone().into_kube_client();

        assert_eq!(list_all(&kc).await.unwrap().len(), 2);
        assert_eq!(mock.requests()[0].path, "/api/v1/configmaps");
    }
}
