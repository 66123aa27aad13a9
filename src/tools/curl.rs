// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::Result;
use crate::kubernetes::{pods, KubeClient};
use tracing::instrument;

fn command(url: &str) -> [&str; 3] {
    ["curl", "-sS", url]
}

/// Issue an HTTP GET from inside a pod and return the response body
#[instrument(skip(kc))]
pub async fn http_request(kc: &KubeClient, namespace: &str, pod: &str, url: &str) -> Result<String> {
    let output = pods::exec(kc, namespace, pod, None, &command(url)).await?;
    Ok(output.stdout)
}
