// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Debian package management inside a running container

use crate::error::{KubekitError, Result};
use crate::kubernetes::{pods, KubeClient};
use tracing::{info, instrument};

const UPDATE: [&str; 3] = ["apt-get", "update", "-q"];

fn install_command(package: &str) -> [&str; 4] {
    ["apt-get", "install", "-y", package]
}

/// Refresh the package index; returns the command output
#[instrument(skip(kc))]
pub async fn update(kc: &KubeClient, namespace: &str, pod: &str) -> Result<String> {
    Ok(pods::exec(kc, namespace, pod, None, &UPDATE).await?.stdout)
}

/// Install a package non-interactively; returns the command output
#[instrument(skip(kc))]
pub async fn install(kc: &KubeClient, namespace: &str, pod: &str, package: &str) -> Result<String> {
    if package.trim().is_empty() {
        return Err(KubekitError::MissingField("package"));
    }
    let output = pods::exec(kc, namespace, pod, None, &install_command(package)).await?;
    info!("Installed {} in pod {}", package, pod);
    Ok(output.stdout)
}
