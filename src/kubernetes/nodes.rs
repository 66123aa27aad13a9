// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::Result;
use crate::kubernetes::{ops, KubeClient};
use k8s_openapi::api::core::v1::Node;
use kube::{Api, ResourceExt};
use tracing::debug;

/// The first address each node reports; nodes without any address are skipped
pub async fn ip_addresses(kc: &KubeClient) -> Result<Vec<String>> {
    let nodes = ops::list(&Api::<Node>::all(kc.client().clone())).await?;

    Ok(nodes
        .iter()
        .filter_map(|node| {
            let address = node
                .status
                .as_ref()
                .and_then(|s| s.addresses.as_ref())
                .and_then(|a| a.first())
                .map(|a| a.address.clone());
            if address.is_none() {
                debug!("Node {} reports no address", node.name_any());
            }
            address
        })
        .collect())
}
