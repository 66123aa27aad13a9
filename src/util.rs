// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::Result;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use rand::distributions::{Alphanumeric, Uniform};
use rand::Rng;
use std::path::Path;
use tracing::debug;
use url::Url;

/// Random lowercase letters, valid as a Kubernetes object name
pub fn random_lowercase(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(Uniform::new_inclusive(b'a', b'z'))
        .take(len)
        .map(char::from)
        .collect()
}

/// Random mixed-case letters and digits
pub fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// `len` random bytes, URL-safe base64 encoded
pub fn random_base64(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill(bytes.as_mut_slice());
    URL_SAFE.encode(bytes)
}

/// Whether two files have identical contents
pub async fn compare_files(a: &Path, b: &Path) -> Result<bool> {
    let (left, right) = tokio::try_join!(tokio::fs::read(a), tokio::fs::read(b))?;
    Ok(left == right)
}

/// Fetch a text document over HTTP(S), failing on non-success status codes
pub async fn download(url: &Url) -> Result<String> {
    debug!("Downloading {}", url);
    let body = reqwest::get(url.clone())
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(body)
}
