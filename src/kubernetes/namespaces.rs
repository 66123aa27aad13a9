// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace management utilities

use crate::constants::labels;
use crate::error::Result;
use crate::kubernetes::{ops, KubeClient};
use k8s_openapi::api::core::v1::Namespace;
use kube::api::{DeleteParams, ObjectMeta};
use kube::{Api, ResourceExt};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

fn api(kc: &KubeClient) -> Api<Namespace> {
    Api::all(kc.client().clone())
}

/// Namespace object labelled with its own name
pub fn build(name: &str) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(BTreeMap::from([(
                labels::NAME.to_string(),
                name.to_string(),
            )])),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[instrument(skip(kc))]
pub async fn create(kc: &KubeClient, name: &str) -> Result<Namespace> {
    ops::create(&api(kc), &build(name)).await
}

/// Delete a namespace and wait until it is gone
#[instrument(skip(kc))]
pub async fn delete(kc: &KubeClient, name: &str) -> Result<()> {
    ops::delete_and_confirm(kc, &api(kc), name).await
}

/// Delete a namespace without waiting for it to finish terminating
#[instrument(skip(kc))]
pub async fn delete_no_wait(kc: &KubeClient, name: &str) -> Result<()> {
    ops::delete(&api(kc), name, &DeleteParams::background()).await
}

pub async fn exists(kc: &KubeClient, name: &str) -> Result<bool> {
    ops::exists(&api(kc), name).await
}

/// Names of all namespaces
pub async fn list(kc: &KubeClient) -> Result<Vec<String>> {
    Ok(ops::list(&api(kc))
        .await?
        .iter()
        .map(|ns| ns.name_any())
        .collect())
}

/// Ensure a namespace exists in the cluster, create if it doesn't
#[instrument(skip(kc))]
pub async fn ensure(kc: &KubeClient, name: &str) -> Result<()> {
    if exists(kc, name).await? {
        debug!("Namespace {} already exists", name);
        return Ok(());
    }

    info!("Creating namespace {}", name);
    create(kc, name).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{list_json, namespace_json, MockService};

    #[test]
    fn test_build_labels_namespace_with_its_name() {
        let ns = build("team-a");
        assert_eq!(ns.name_any(), "team-a");
        assert_eq!(ns.labels().get("name").unwrap(), "team-a");
    }

    #[tokio::test]
    async fn test_ensure_skips_existing_namespace() {
        let mock = MockService::new().on_get("/api/v1/namespaces/team-a", 200, &namespace_json("team-a"));
        let kc = mock.clone().into_kube_client();

        ensure(&kc, "team-a").await.unwrap();
        assert!(mock.requests_for("POST").is_empty());
    }

    #[tokio::test]
    async fn test_ensure_creates_missing_namespace() {
        let mock = MockService::new().on_post("/api/v1/namespaces", 201, &namespace_json("team-b"));
        let kc = mock.clone().into_kube_client();

        ensure(&kc, "team-b").await.unwrap();

        let posts = mock.requests_for("POST");
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].json()["metadata"]["name"], "team-b");
        assert_eq!(posts[0].json()["metadata"]["labels"]["name"], "team-b");
    }

    #[tokio::test]
    async fn test_list_returns_names() {
        let mock = MockService::new().on_get(
            "/api/v1/namespaces",
            200,
            &list_json("v1", "NamespaceList", &[namespace_json("a"), namespace_json("b")]),
        );
        let kc = mock.into_kube_client();

        assert_eq!(list(&kc).await.unwrap(), vec!["a", "b"]);
    }
}
