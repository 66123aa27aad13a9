// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed wrappers around the Kubernetes API, one module per object kind.

pub mod apply;
pub mod client;
pub mod configmaps;
pub mod cronjobs;
pub mod daemonsets;
pub mod deployments;
pub mod endpoints;
pub mod jobs;
pub mod limit_ranges;
pub mod namespaces;
pub mod nodes;
pub mod ops;
pub mod pods;
pub mod pvcs;
pub mod rbac;
pub mod secrets;
pub mod service_accounts;
pub mod services;
pub mod workloads;

pub use client::KubeClient;
