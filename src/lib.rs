// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod addons;
pub mod bulk;
pub mod config;
pub mod constants;
pub mod error;
pub mod kubernetes;
pub mod retry;
pub mod tools;
pub mod types;
pub mod util;

#[cfg(test)]
pub(crate) mod test_utils;
