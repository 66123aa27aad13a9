// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod metallb;
pub mod policies;

pub use metallb::{IPAddressPool, IPAddressPoolSpec, L2Advertisement, L2AdvertisementSpec};
pub use policies::*;
