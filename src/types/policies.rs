// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Friendly spellings for the string enums of the Kubernetes object model.
//!
//! Users write `tcp`, `ifnotpresent` or `rwo`; the API wants `TCP`,
//! `IfNotPresent` and `ReadWriteOnce`. Parsing is case-insensitive.

use crate::error::KubekitError;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

fn invalid(field: &'static str, value: &str) -> KubekitError {
    KubekitError::InvalidValue {
        field,
        value: value.to_string(),
    }
}

macro_rules! api_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident => $api:literal [$($alias:literal),+]),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// The value the API server expects
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $api),+
                }
            }
        }

        impl FromStr for $name {
            type Err = KubekitError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($($alias)|+ => Ok($name::$variant),)+
                    _ => Err(invalid($field, s)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

api_enum! {
    /// Container, service and endpoint port protocol
    Protocol, "protocol" {
        Tcp => "TCP" ["tcp"],
        Udp => "UDP" ["udp"],
        Sctp => "SCTP" ["sctp"],
    }
}

api_enum! {
    ImagePullPolicy, "image pull policy" {
        Always => "Always" ["always"],
        Never => "Never" ["never"],
        IfNotPresent => "IfNotPresent" ["ifnotpresent"],
    }
}

api_enum! {
    /// Pod restart policy
    RestartPolicy, "restart policy" {
        Always => "Always" ["always"],
        OnFailure => "OnFailure" ["onfailure"],
        Never => "Never" ["never"],
    }
}

api_enum! {
    /// CronJob concurrency policy
    ConcurrencyPolicy, "concurrency policy" {
        Allow => "Allow" ["allow"],
        Forbid => "Forbid" ["forbid"],
        Replace => "Replace" ["replace"],
    }
}

api_enum! {
    /// What a LimitRange item constrains
    LimitType, "limit type" {
        Pod => "Pod" ["pod"],
        Container => "Container" ["container"],
        PersistentVolumeClaim => "PersistentVolumeClaim" ["persistentvolumeclaim", "pvc"],
    }
}

api_enum! {
    /// Volume access mode.
    ///
    /// RWO mounts read/write on exactly one node, ROX read-only on many,
    /// RWX read/write on many.
    AccessMode, "access mode" {
        ReadWriteOnce => "ReadWriteOnce" ["readwriteonce", "rwo"],
        ReadOnlyMany => "ReadOnlyMany" ["readonlymany", "rox"],
        ReadWriteMany => "ReadWriteMany" ["readwritemany", "rwx"],
    }
}

api_enum! {
    VolumeMode, "volume mode" {
        Block => "Block" ["block", "persistentvolumeblock"],
        Filesystem => "Filesystem" ["filesystem", "persistentvolumefilesystem"],
    }
}

api_enum! {
    ReclaimPolicy, "reclaim policy" {
        Retain => "Retain" ["retain"],
        Delete => "Delete" ["delete"],
        Recycle => "Recycle" ["recycle"],
    }
}

api_enum! {
    SecretType, "secret type" {
        Opaque => "Opaque" ["opaque"],
        BasicAuth => "kubernetes.io/basic-auth" ["kubernetes.io/basic-auth"],
        Tls => "kubernetes.io/tls" ["kubernetes.io/tls"],
        SshAuth => "kubernetes.io/ssh-auth" ["kubernetes.io/ssh-auth"],
        ServiceAccountToken => "kubernetes.io/service-account-token" ["kubernetes.io/service-account-token"],
        Dockercfg => "kubernetes.io/dockercfg" ["kubernetes.io/dockercfg"],
        DockerConfigJson => "kubernetes.io/dockerconfigjson" ["kubernetes.io/dockerconfigjson"],
    }
}

api_enum! {
    /// Pod condition types
    PodConditionKind, "pod condition" {
        ContainersReady => "ContainersReady" ["containersready"],
        Initialized => "Initialized" ["initialized"],
        Ready => "Ready" ["ready"],
        PodScheduled => "PodScheduled" ["podscheduled"],
    }
}

api_enum! {
    /// Service type
    ServiceType, "service type" {
        ClusterIp => "ClusterIP" ["clusterip"],
        NodePort => "NodePort" ["nodeport"],
        LoadBalancer => "LoadBalancer" ["loadbalancer"],
        ExternalName => "ExternalName" ["externalname"],
    }
}

/// Parse an optional friendly value, treating an empty string as unset
pub fn parse_optional<T: FromStr<Err = KubekitError>>(value: &str) -> Result<Option<T>, KubekitError> {
    if value.trim().is_empty() {
        Ok(None)
    } else {
        value.parse().map(Some)
    }
}

/// Compute resources for cpu, memory and ephemeral storage; empty entries are skipped
pub fn resource_list(cpu: &str, memory: &str, ephemeral_storage: &str) -> BTreeMap<String, Quantity> {
    [
        ("cpu", cpu),
        ("memory", memory),
        ("ephemeral-storage", ephemeral_storage),
    ]
    .into_iter()
    .filter(|(_, v)| !v.trim().is_empty())
    .map(|(k, v)| (k.to_string(), Quantity(v.trim().to_string())))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_is_case_insensitive() {
        assert_eq!("tcp".parse::<Protocol>().unwrap(), Protocol::Tcp);
        assert_eq!("UDP".parse::<Protocol>().unwrap(), Protocol::Udp);
        assert_eq!(Protocol::Tcp.as_str(), "TCP");
    }

    #[test]
    fn test_unknown_value_reports_field() {
        let err = "http".parse::<Protocol>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid protocol: http");
    }

    #[test]
    fn test_access_mode_aliases() {
        assert_eq!("rwo".parse::<AccessMode>().unwrap(), AccessMode::ReadWriteOnce);
        assert_eq!("ReadOnlyMany".parse::<AccessMode>().unwrap(), AccessMode::ReadOnlyMany);
        assert_eq!("RWX".parse::<AccessMode>().unwrap().as_str(), "ReadWriteMany");
    }

    #[test]
    fn test_volume_mode_aliases() {
        assert_eq!("persistentvolumeblock".parse::<VolumeMode>().unwrap(), VolumeMode::Block);
        assert_eq!("filesystem".parse::<VolumeMode>().unwrap().as_str(), "Filesystem");
    }

    #[test]
    fn test_secret_type_keeps_api_spelling() {
        let t: SecretType = "kubernetes.io/TLS".parse().unwrap();
        assert_eq!(t, SecretType::Tls);
        assert_eq!(t.to_string(), "kubernetes.io/tls");
    }

    #[test]
    fn test_policies() {
        assert_eq!("onfailure".parse::<RestartPolicy>().unwrap().as_str(), "OnFailure");
        assert_eq!("ifnotpresent".parse::<ImagePullPolicy>().unwrap().as_str(), "IfNotPresent");
        assert_eq!("forbid".parse::<ConcurrencyPolicy>().unwrap().as_str(), "Forbid");
        assert_eq!("recycle".parse::<ReclaimPolicy>().unwrap().as_str(), "Recycle");
        assert_eq!("pvc".parse::<LimitType>().unwrap().as_str(), "PersistentVolumeClaim");
        assert!("sometimes".parse::<RestartPolicy>().is_err());
    }

    #[test]
    fn test_parse_optional() {
        assert_eq!(parse_optional::<Protocol>("").unwrap(), None);
        assert_eq!(parse_optional::<Protocol>("tcp").unwrap(), Some(Protocol::Tcp));
        assert!(parse_optional::<Protocol>("icmp").is_err());
    }

    #[test]
    fn test_resource_list_skips_empty() {
        let list = resource_list("500m", "", "1Gi");
        assert_eq!(list.len(), 2);
        assert_eq!(list["cpu"], Quantity("500m".to_string()));
        assert_eq!(list["ephemeral-storage"], Quantity("1Gi".to_string()));
        assert!(!list.contains_key("memory"));
    }
}
