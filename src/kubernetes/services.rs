// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Services of every type: ClusterIP, NodePort, LoadBalancer and ExternalName

use crate::error::{KubekitError, Result};
use crate::kubernetes::{ops, KubeClient};
use crate::types::{Protocol, ServiceType};
use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::api::ObjectMeta;
use kube::Api;
use std::collections::BTreeMap;
use tracing::instrument;

const REQUIRE_DUAL_STACK: &str = "RequireDualStack";

#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub name: String,
    /// Empty means the client's default namespace
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub port: i32,
    pub port_name: String,
    pub port_protocol: Option<Protocol>,
    pub selector: BTreeMap<String, String>,
    /// Request both IPv4 and IPv6 cluster IPs
    pub dual_stack: bool,
    pub target_port: Option<i32>,
    pub node_port: Option<i32>,
    pub load_balancer_ip: String,
    pub external_name: String,
    /// Explicit cluster IP, or `None` for a headless ClusterIP service
    pub cluster_ip: String,
}

fn api(kc: &KubeClient, namespace: &str) -> Api<Service> {
    Api::namespaced(kc.client().clone(), kc.namespace_or_default(Some(namespace)))
}

fn optional(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn optional_map(map: &BTreeMap<String, String>) -> Option<BTreeMap<String, String>> {
    (!map.is_empty()).then(|| map.clone())
}

/// Build a service of the given type.
///
/// ExternalName services carry neither ports nor a selector.
pub fn build(config: &ServiceConfig, service_type: ServiceType) -> Service {
    let mut spec = ServiceSpec {
        type_: Some(service_type.as_str().to_string()),
        ..Default::default()
    };

    match service_type {
        ServiceType::ExternalName => {
            spec.external_name = optional(&config.external_name);
        }
        _ => {
            let mut port = ServicePort {
                port: config.port,
                name: optional(&config.port_name),
                protocol: config.port_protocol.map(|p| p.as_str().to_string()),
                target_port: config.target_port.map(IntOrString::Int),
                ..Default::default()
            };
            if service_type == ServiceType::NodePort {
                port.node_port = config.node_port;
            }

            spec.ports = Some(vec![port]);
            spec.selector = optional_map(&config.selector);
            if config.dual_stack {
                spec.ip_family_policy = Some(REQUIRE_DUAL_STACK.to_string());
            }
        }
    }

    match service_type {
        ServiceType::ClusterIp => spec.cluster_ip = optional(&config.cluster_ip),
        ServiceType::LoadBalancer => spec.load_balancer_ip = optional(&config.load_balancer_ip),
        _ => {}
    }

    Service {
        metadata: ObjectMeta {
            name: Some(config.name.clone()),
            labels: optional_map(&config.labels),
            ..Default::default()
        },
        spec: Some(spec),
        ..Default::default()
    }
}

async fn create(kc: &KubeClient, config: &ServiceConfig, service_type: ServiceType) -> Result<Service> {
    if service_type != ServiceType::ExternalName && config.port == 0 {
        return Err(KubekitError::MissingField("port"));
    }
    if service_type == ServiceType::ExternalName && config.external_name.is_empty() {
        return Err(KubekitError::MissingField("external_name"));
    }
    ops::create(&api(kc, &config.namespace), &build(config, service_type)).await
}

#[instrument(skip(kc, config), fields(service = %config.name))]
pub async fn create_cluster_ip(kc: &KubeClient, config: &ServiceConfig) -> Result<Service> {
    create(kc, config, ServiceType::ClusterIp).await
}

#[instrument(skip(kc, config), fields(service = %config.name))]
pub async fn create_node_port(kc: &KubeClient, config: &ServiceConfig) -> Result<Service> {
    create(kc, config, ServiceType::NodePort).await
}

#[instrument(skip(kc, config), fields(service = %config.name))]
pub async fn create_load_balancer(kc: &KubeClient, config: &ServiceConfig) -> Result<Service> {
    create(kc, config, ServiceType::LoadBalancer).await
}

#[instrument(skip(kc, config), fields(service = %config.name))]
pub async fn create_external_name(kc: &KubeClient, config: &ServiceConfig) -> Result<Service> {
    create(kc, config, ServiceType::ExternalName).await
}

/// Delete a service and wait until it is gone
#[instrument(skip(kc))]
pub async fn delete(kc: &KubeClient, namespace: &str, name: &str) -> Result<()> {
    ops::delete_and_confirm(kc, &api(kc, namespace), name).await
}

pub async fn exists(kc: &KubeClient, namespace: &str, name: &str) -> Result<bool> {
    ops::exists(&api(kc, namespace), name).await
}

pub async fn list(kc: &KubeClient, namespace: &str) -> Result<Vec<Service>> {
    ops::list(&api(kc, namespace)).await
}

pub async fn get_cluster_ip(kc: &KubeClient, namespace: &str, name: &str) -> Result<String> {
    ops::get(&api(kc, namespace), name)
        .await?
        .spec
        .and_then(|s| s.cluster_ip)
        .filter(|ip| !ip.is_empty())
        .ok_or(KubekitError::MissingField("spec.clusterIP"))
}

/// First load-balancer ingress address, IP preferred over hostname
pub async fn get_external_ip(kc: &KubeClient, namespace: &str, name: &str) -> Result<String> {
    ops::get(&api(kc, namespace), name)
        .await?
        .status
        .and_then(|s| s.load_balancer)
        .and_then(|lb| lb.ingress)
        .and_then(|ingress| ingress.into_iter().next())
        .and_then(|i| i.ip.or(i.hostname))
        .ok_or(KubekitError::MissingField("status.loadBalancer.ingress"))
}
