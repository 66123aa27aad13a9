// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Capturing the packet-filtering rules programmed on a node

use crate::error::{KubekitError, Result};
use crate::kubernetes::{pods, KubeClient};
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, instrument};

/// Read-only iptables invocations
pub mod iptables {
    pub const READ_NAT_TABLE: &[&str] = &["iptables", "-w", "-t", "nat", "-L", "-n", "-v"];
    pub const READ_FILTER_TABLE: &[&str] = &["iptables", "-w", "-t", "filter", "-L", "-n", "-v"];
    pub const READ_KUBE_SERVICES: &[&str] =
        &["iptables", "-w", "-L", "-n", "-v", "KUBE-SERVICES", "-t", "nat"];
    pub const SAVE: &[&str] = &["iptables-save"];
}

/// Which rule set kube-proxy programs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirewallMode {
    Iptables,
    Ipvs,
}

impl FirewallMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FirewallMode::Iptables => "iptables",
            FirewallMode::Ipvs => "ipvs",
        }
    }

    /// Command dumping the current rules in restorable form
    pub fn save_command(&self) -> &'static [&'static str] {
        match self {
            FirewallMode::Iptables => iptables::SAVE,
            FirewallMode::Ipvs => &["ipvsadm", "--save"],
        }
    }
}

impl FromStr for FirewallMode {
    type Err = KubekitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "iptables" => Ok(FirewallMode::Iptables),
            "ipvs" => Ok(FirewallMode::Ipvs),
            _ => Err(KubekitError::InvalidValue {
                field: "firewall mode",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for FirewallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write `contents` to a new temp file that outlives the process
pub(crate) fn persist(prefix: &str, contents: &[u8]) -> Result<PathBuf> {
    let mut file = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(".rules")
        .tempfile()?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;

    let (_, path) = file.keep().map_err(|e| KubekitError::IoError(e.error))?;
    Ok(path)
}

/// Run the save command for `mode` in a pod and store the output.
///
/// Returns the path of the file holding the rules.
#[instrument(skip(kc))]
pub async fn save(kc: &KubeClient, mode: FirewallMode, namespace: &str, pod: &str) -> Result<PathBuf> {
    let output = pods::exec(kc, namespace, pod, None, mode.save_command()).await?;
    let path = persist(&format!("{}-", mode), output.stdout.as_bytes())?;
    info!("Saved {} rules from pod {} to {}", mode, pod, path.display());
    Ok(path)
}

/// Run one of the predefined read commands and return its output
pub async fn read(kc: &KubeClient, namespace: &str, pod: &str, command: &[&str]) -> Result<String> {
    Ok(pods::exec(kc, namespace, pod, None, command).await?.stdout)
}
