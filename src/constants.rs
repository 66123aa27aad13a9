// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// The field manager name used for server-side apply
pub const FIELD_MANAGER: &str = "kubekit";

/// Defaults for values the environment does not override
pub mod defaults {
    pub const NAMESPACE: &str = "default";
    pub const MAX_ATTEMPTS: u32 = 10;
    pub const RETRY_INTERVAL_SECS: u64 = 2;
    /// Exponential backoff cap
    pub const MAX_RETRY_INTERVAL_SECS: u64 = 30;
    pub const TASK_TIMEOUT_SECS: u64 = 3600;
}

/// Label keys set on objects created by kubekit
pub mod labels {
    /// Namespaces carry their own name under this key
    pub const NAME: &str = "name";
}

/// MetalLB add-on locations and defaults
pub mod metallb {
    pub const MANIFEST_BASE_URL: &str = "https://raw.githubusercontent.com/metallb/metallb/";
    pub const NAMESPACE: &str = "metallb-system";
    pub const MEMBERLIST_SECRET: &str = "memberlist";
    pub const MEMBERLIST_KEY: &str = "secretkey";
    /// Random bytes in the memberlist key
    pub const MEMBERLIST_KEY_BYTES: usize = 128;
}

/// kube-proxy defaults
pub mod kube_proxy {
    pub const NAMESPACE: &str = "kube-system";
    pub const CONFIGMAP: &str = "kube-proxy";
    pub const POD_NAME_SUBSTRING: &str = "kube-proxy";
}
