// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster connection and the shared client handle

use crate::config::Config;
use crate::error::{KubekitError, Result};
use crate::retry::RetryPolicy;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config as KConfig};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Handle passed to every resource operation.
///
/// Wraps the `kube` client together with the polling policy and a
/// cancellation token shared by all in-flight waits. Cloning is cheap and
/// clones share the token.
#[derive(Clone)]
pub struct KubeClient {
    client: Client,
    namespace: String,
    retry: RetryPolicy,
    cancel: CancellationToken,
}

impl KubeClient {
    /// Connect using the kubeconfig named in `config`, or the inferred one
    /// (`$KUBECONFIG`, `~/.kube/config`, in-cluster service account).
    #[instrument(skip(config))]
    pub async fn connect(config: &Config) -> Result<Self> {
        let kube_config = match &config.kubeconfig {
            Some(path) => config_from_path(path).await?,
            None => KConfig::infer().await.map_err(|e| {
                KubekitError::KubeconfigError(format!("Failed to infer config: {}", e))
            })?,
        };

        info!("Connecting to cluster at {}", kube_config.cluster_url);

        let client = Client::try_from(kube_config)
            .map_err(|e| KubekitError::KubeconfigError(format!("Failed to create client: {}", e)))?;

        Ok(Self::from_parts(client, config))
    }

    /// Wrap an existing client
    pub fn from_parts(client: Client, config: &Config) -> Self {
        Self {
            client,
            namespace: config.default_namespace.clone(),
            retry: config.retry_policy(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn default_namespace(&self) -> &str {
        &self.namespace
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Policy for waits bounded only by the deadline (pod start-up can
    /// legitimately take many more polls than a delete confirmation)
    pub fn wait_policy(&self) -> RetryPolicy {
        self.retry.clone().with_max_attempts(u32::MAX)
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancel every poll running on this client or its clones
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Resolve an optional namespace against the default one
    pub fn namespace_or_default<'a>(&'a self, namespace: Option<&'a str>) -> &'a str {
        namespace.filter(|ns| !ns.is_empty()).unwrap_or(&self.namespace)
    }
}

/// Build a client config from a kubeconfig file on disk
async fn config_from_path(path: &Path) -> Result<KConfig> {
    let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
        KubekitError::KubeconfigError(format!("Failed to read {}: {}", path.display(), e))
    })?;

    KConfig::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| KubekitError::KubeconfigError(format!("Failed to create config: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockService;
    use std::time::Duration;

    #[tokio::test]
    async fn test_from_parts_uses_config() {
        let config = Config {
            default_namespace: "apps".to_string(),
            max_attempts: 3,
            retry_interval: Duration::from_millis(10),
            ..Default::default()
        };
        let kc = KubeClient::from_parts(MockService::new().into_client(), &config);

        assert_eq!(kc.default_namespace(), "apps");
        assert_eq!(kc.retry().max_attempts, 3);
        assert_eq!(kc.wait_policy().max_attempts, u32::MAX);
    }

    #[tokio::test]
    async fn test_namespace_or_default() {
        let kc = KubeClient::from_parts(MockService::new().into_client(), &Config::default());
        assert_eq!(kc.namespace_or_default(Some("kube-system")), "kube-system");
        assert_eq!(kc.namespace_or_default(Some("")), "default");
        assert_eq!(kc.namespace_or_default(None), "default");
    }

    #[tokio::test]
    async fn test_cancel_is_shared_between_clones() {
        let kc = KubeClient::from_parts(MockService::new().into_client(), &Config::default());
        let clone = kc.clone();
        clone.cancel();
        assert!(kc.cancellation().is_cancelled());
    }

    #[tokio::test]
    async fn test_connect_with_missing_kubeconfig_fails() {
        let config = Config {
            kubeconfig: Some("/nonexistent/kubekit/config".into()),
            ..Default::default()
        };
        let result = KubeClient::connect(&config).await;
        assert!(matches!(result, Err(KubekitError::KubeconfigError(_))));
    }
}
