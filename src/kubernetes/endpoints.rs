// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Manually managed Endpoints, typically backing a selector-less service

use crate::error::{KubekitError, Result};
use crate::kubernetes::{ops, KubeClient};
use crate::types::Protocol;
use k8s_openapi::api::core::v1::{EndpointAddress, EndpointPort, EndpointSubset, Endpoints};
use kube::api::{ObjectMeta, Patch, PatchParams};
use kube::{Api, ResourceExt};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{info, instrument};

#[derive(Debug, Clone, Default)]
pub struct EndpointPortConfig {
    pub name: String,
    pub port: i32,
    pub protocol: Option<Protocol>,
}

/// Endpoints object with a single address and port
#[derive(Debug, Clone, Default)]
pub struct EndpointConfig {
    pub name: String,
    /// Empty means the client's default namespace
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub ip: String,
    pub port: EndpointPortConfig,
}

impl EndpointConfig {
    fn subset(&self) -> EndpointSubset {
        EndpointSubset {
            addresses: Some(vec![EndpointAddress {
                ip: self.ip.clone(),
                ..Default::default()
            }]),
            ports: Some(vec![EndpointPort {
                name: (!self.port.name.is_empty()).then(|| self.port.name.clone()),
                port: self.port.port,
                protocol: self.port.protocol.map(|p| p.as_str().to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        }
    }
}

fn api(kc: &KubeClient, namespace: &str) -> Api<Endpoints> {
    Api::namespaced(kc.client().clone(), kc.namespace_or_default(Some(namespace)))
}

pub fn build(config: &EndpointConfig) -> Endpoints {
    Endpoints {
        metadata: ObjectMeta {
            name: Some(config.name.clone()),
            labels: (!config.labels.is_empty()).then(|| config.labels.clone()),
            ..Default::default()
        },
        subsets: Some(vec![config.subset()]),
    }
}

#[instrument(skip(kc, config), fields(endpoint = %config.name))]
pub async fn create(kc: &KubeClient, config: &EndpointConfig) -> Result<Endpoints> {
    if config.ip.is_empty() {
        return Err(KubekitError::MissingField("ip"));
    }
    ops::create(&api(kc, &config.namespace), &build(config)).await
}

/// Strategic-merge the labels and replace the subsets of an existing endpoint
#[instrument(skip(kc, config), fields(endpoint = %config.name))]
pub async fn patch(kc: &KubeClient, config: &EndpointConfig) -> Result<Endpoints> {
    let api = api(kc, &config.namespace);
    ops::get(&api, &config.name).await?;

    let patch = json!({
        "metadata": { "labels": config.labels },
        "subsets": [config.subset()],
    });

    info!("Patching endpoint {}", config.name);
    let patched = api
        .patch(&config.name, &PatchParams::default(), &Patch::Strategic(&patch))
        .await?;
    info!("Patched endpoint {}", config.name);
    Ok(patched)
}

/// Names of the endpoints in a namespace
pub async fn list(kc: &KubeClient, namespace: &str) -> Result<Vec<String>> {
    Ok(ops::list(&api(kc, namespace))
        .await?
        .iter()
        .map(|ep| ep.name_any())
        .collect())
}

pub async fn show(kc: &KubeClient, namespace: &str, name: &str) -> Result<Endpoints> {
    ops::get(&api(kc, namespace), name).await
}

/// `ip:port` pairs of the first subset, for display
pub fn addresses(endpoints: &Endpoints) -> Vec<String> {
    let Some(subset) = endpoints.subsets.as_ref().and_then(|s| s.first()) else {
        return Vec::new();
    };
    let port = subset
        .ports
        .as_ref()
        .and_then(|p| p.first())
        .map(|p| p.port);

    subset
        .addresses
        .iter()
        .flatten()
        .map(|a| match port {
            Some(port) => format!("{}:{}", a.ip, port),
            None => a.ip.clone(),
        })
        .collect()
}

/// Delete an endpoint and wait until it is gone
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
    use crate::test_utils::{object_json, MockService};

    const PATH: &str = "/api/v1/namespaces/default/endpoints/external-db";

    fn external_db() -> EndpointConfig {
        EndpointConfig {
            name: "external-db".to_string(),
            labels: BTreeMap::from([("app".to_string(), "db".to_string())]),
            ip: "172.16.0.10".to_string(),
            port: EndpointPortConfig {
                name: "pg".to_string(),
                port: 5432,
                protocol: Some(Protocol::Tcp),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_addresses() {
        let ep = build(&external_db());
        assert_eq!(addresses(&ep), vec!["172.16.0.10:5432"]);
        assert!(addresses(&Endpoints::default()).is_empty());
    }

    #[tokio::test]
    async fn test_patch_is_strategic_merge() {
        let mock = MockService::new()
            .on_get(PATH, 200, &object_json("v1", "Endpoints", "external-db", Some("default")))
            .on_patch(PATH, 200, &object_json("v1", "Endpoints", "external-db", Some("default")));
        let kc = mock.clone().into_kube_client();

        patch(&kc, &external_db()).await.unwrap();

        let body = mock.requests_for("PATCH")[0].json();
        assert_eq!(body["metadata"]["labels"]["app"], "db");
        assert_eq!(body["subsets"][0]["addresses"][0]["ip"], "172.16.0.10");
        assert_eq!(body["subsets"][0]["ports"][0]["port"], 5432);
    }

    #[tokio::test]
    async fn test_patch_missing_endpoint() {
        let mock = MockService::new();
        let kc = mock.clone().into_kube_client();

        assert!(patch(&kc, &external_db()).await.unwrap_err().is_not_found());
        assert!(mock.requests_for("PATCH").is_empty());
    }
}
