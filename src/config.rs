// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::defaults;
use crate::retry::RetryPolicy;

/// Client configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Explicit kubeconfig path; inferred when unset
    pub kubeconfig: Option<PathBuf>,
    /// Namespace used when a command does not name one
    pub default_namespace: String,
    /// Attempts per polled task (delete confirmation, pod running, ...)
    pub max_attempts: u32,
    pub retry_interval: Duration,
    pub max_retry_interval: Duration,
    /// Add up to 50% random extra delay to each poll
    pub retry_jitter: bool,
    /// Total deadline for a single polled task
    pub task_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            kubeconfig: None,
            default_namespace: defaults::NAMESPACE.to_string(),
            max_attempts: defaults::MAX_ATTEMPTS,
            retry_interval: Duration::from_secs(defaults::RETRY_INTERVAL_SECS),
            max_retry_interval: Duration::from_secs(defaults::MAX_RETRY_INTERVAL_SECS),
            retry_jitter: true,
            task_timeout: Duration::from_secs(defaults::TASK_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let base = Config::default();

        Ok(Config {
            kubeconfig: env::var_os("KUBECONFIG")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            default_namespace: env::var("KUBEKIT_NAMESPACE").unwrap_or(base.default_namespace),
            max_attempts: parse_env("KUBEKIT_MAX_ATTEMPTS")?.unwrap_or(base.max_attempts),
            retry_interval: parse_env("KUBEKIT_RETRY_INTERVAL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(base.retry_interval),
            max_retry_interval: parse_env("KUBEKIT_MAX_RETRY_INTERVAL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(base.max_retry_interval),
            retry_jitter: parse_env("KUBEKIT_RETRY_JITTER")?.unwrap_or(base.retry_jitter),
            task_timeout: parse_env("KUBEKIT_TASK_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(base.task_timeout),
        })
    }

    /// Retry policy shared by every polled task
    pub fn retry_policy(&self) -> RetryPolicy {
        let policy =
            RetryPolicy::exponential(self.max_attempts, self.retry_interval, self.max_retry_interval)
                .with_deadline(self.task_timeout);
        if self.retry_jitter {
            policy.with_jitter()
        } else {
            policy
        }
    }
}

fn parse_env<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        Err(_) => Ok(None),
    }
}
