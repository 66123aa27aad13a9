// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KubekitError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to parse kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("{kind} \"{name}\" not found")]
    NotFound { kind: String, name: String },

    #[error("Invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("{operation} did not complete after {attempts} attempts")]
    RetriesExhausted { operation: String, attempts: u32 },

    #[error("{operation} timed out after {elapsed:?}")]
    Timeout { operation: String, elapsed: Duration },

    #[error("{0} was cancelled")]
    Cancelled(String),

    #[error("Pod {name} is not running (phase: {phase})")]
    PodNotRunning { name: String, phase: String },

    #[error("Command execution failed: {0}")]
    ExecError(String),

    #[error("Manifest error: {0}")]
    ManifestError(String),

    #[error("Unable to detect the kube-proxy mode from configmap {0}")]
    UnknownProxyMode(String),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),
}

impl KubekitError {
    /// Whether retrying the failed call may succeed.
    ///
    /// Throttling, server-side failures and transport errors are transient.
    /// Everything else (validation, forbidden, not found, local errors) is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            KubekitError::KubeError(kube::Error::Api(resp)) => {
                resp.code == 429 || resp.code >= 500
            }
            KubekitError::KubeError(kube::Error::HyperError(_))
            | KubekitError::KubeError(kube::Error::Service(_)) => true,
            KubekitError::HttpError(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Whether this error is an API 404.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            KubekitError::KubeError(kube::Error::Api(resp)) if resp.code == 404
        ) || matches!(self, KubekitError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, KubekitError>;
