// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Configuration shared by Deployments and DaemonSets

use crate::error::{KubekitError, Result};
use crate::types::Protocol;
use k8s_openapi::api::core::v1::{Container, ContainerPort, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::api::ObjectMeta;
use std::collections::BTreeMap;

/// The single container a workload runs
#[derive(Debug, Clone, Default)]
pub struct ContainerConfig {
    pub name: String,
    pub image: String,
    pub port_name: String,
    pub port_protocol: Option<Protocol>,
    /// Omitted from the pod spec when 0
    pub port: i32,
}

#[derive(Debug, Clone, Default)]
pub struct WorkloadConfig {
    pub name: String,
    /// Empty means the client's default namespace
    pub namespace: String,
    /// Ignored for DaemonSets
    pub replicas: Option<i32>,
    /// Used for the selector and the pod template alike
    pub labels: BTreeMap<String, String>,
    pub container: ContainerConfig,
}

impl WorkloadConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.labels.is_empty() {
            return Err(KubekitError::MissingField("labels"));
        }
        if self.container.image.is_empty() {
            return Err(KubekitError::MissingField("container.image"));
        }
        Ok(())
    }

    pub(crate) fn metadata(&self) -> ObjectMeta {
        ObjectMeta {
            name: Some(self.name.clone()),
            labels: Some(self.labels.clone()),
            ..Default::default()
        }
    }

    pub(crate) fn selector(&self) -> LabelSelector {
        LabelSelector {
            match_labels: Some(self.labels.clone()),
            ..Default::default()
        }
    }

    pub(crate) fn pod_template(&self) -> PodTemplateSpec {
        let c = &self.container;
        let ports = (c.port > 0).then(|| {
            vec![ContainerPort {
                name: (!c.port_name.is_empty()).then(|| c.port_name.clone()),
                protocol: c.port_protocol.map(|p| p.as_str().to_string()),
                container_port: c.port,
                ..Default::default()
            }]
        });

        PodTemplateSpec {
            metadata: Some(ObjectMeta {
                labels: Some(self.labels.clone()),
                ..Default::default()
            }),
            spec: Some(PodSpec {
                containers: vec![Container {
                    name: if c.name.is_empty() { self.name.clone() } else { c.name.clone() },
                    image: Some(c.image.clone()),
                    ports,
                    ..Default::default()
                }],
                ..Default::default()
            }),
        }
    }
}

#[cfg(test)]
pub(crate) fn nginx() -> WorkloadConfig {
    WorkloadConfig {
        name: "nginx".to_string(),
        replicas: Some(3),
        labels: BTreeMap::from([("app".to_string(), "nginx".to_string())]),
        container: ContainerConfig {
            name: "web".to_string(),
            image: "nginx:1.27".to_string(),
            port_name: "http".to_string(),
            port_protocol: Some(Protocol::Tcp),
            port: 80,
        },
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pod_template_carries_labels_and_port() {
        let template = nginx().pod_template();
        assert_eq!(template.metadata.unwrap().labels.unwrap()["app"], "nginx");

        let spec = template.spec.unwrap();
        let container = &spec.containers[0];
        let port = &container.ports.as_ref().unwrap()[0];
        assert_eq!(container.name, "web");
        assert_eq!(port.container_port, 80);
        assert_eq!(port.protocol.as_deref(), Some("TCP"));
        assert_eq!(port.name.as_deref(), Some("http"));
    }

    #[test]
    fn test_container_name_defaults_to_workload_name() {
        let mut config = nginx();
        config.container.name.clear();
        config.container.port = 0;

        let spec = config.pod_template().spec.unwrap();
        assert_eq!(spec.containers[0].name, "nginx");
        assert!(spec.containers[0].ports.is_none());
    }

    #[test]
    fn test_validate_requires_labels() {
        let mut config = nginx();
        config.labels.clear();
        assert!(matches!(config.validate(), Err(KubekitError::MissingField("labels"))));
    }
}
