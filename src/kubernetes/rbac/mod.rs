// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster-scoped RBAC objects

pub mod cluster_role_bindings;
pub mod cluster_roles;
