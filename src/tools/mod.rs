// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Helpers that run commands inside existing pods

pub mod apt;
pub mod curl;
pub mod firewall;
pub mod kube_proxy;
