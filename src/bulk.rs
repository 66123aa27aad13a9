// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Load generation: many pods across many throw-away namespaces.
//!
//! Creation is fanned out with a fixed concurrency limit so the API server
//! sees bounded pressure. Each pod is timed from the create call until its
//! `Ready` condition, as reported by the kubelet.

use crate::error::{KubekitError, Result};
use crate::kubernetes::pods::{self, PodConfig};
use crate::kubernetes::{namespaces, KubeClient};
use crate::types::{ImagePullPolicy, PodConditionKind};
use crate::util;
use futures::stream::{self, StreamExt};
use k8s_openapi::chrono::Utc;
use std::collections::BTreeMap;
use std::pin::pin;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

const NAMESPACE_NAME_LEN: usize = 6;

#[derive(Debug, Clone)]
pub struct BulkPodsConfig {
    pub namespaces: usize,
    pub pods_per_namespace: usize,
    pub image: String,
    /// Pods being created and awaited at the same time
    pub concurrency: usize,
}

impl Default for BulkPodsConfig {
    fn default() -> Self {
        Self {
            namespaces: 10,
            pods_per_namespace: 100,
            image: "docker.io/nginx".to_string(),
            concurrency: 20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PodTiming {
    pub namespace: String,
    pub pod: String,
    /// From the create call until the pod reported Ready
    pub ready_after: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct BulkReport {
    pub namespaces: Vec<String>,
    pub timings: Vec<PodTiming>,
    /// (pod, error) for pods that never became ready
    pub failures: Vec<(String, String)>,
    pub elapsed: Duration,
}

impl BulkReport {
    /// Sum of the per-pod readiness times
    pub fn total_ready_time(&self) -> Duration {
        self.timings.iter().map(|t| t.ready_after).sum()
    }

    pub fn mean_ready_time(&self) -> Option<Duration> {
        let count = u32::try_from(self.timings.len()).ok().filter(|n| *n > 0)?;
        Some(self.total_ready_time() / count)
    }

    pub fn slowest(&self) -> Option<&PodTiming> {
        self.timings.iter().max_by_key(|t| t.ready_after)
    }
}

fn pod_config(namespace: &str, index: usize, image: &str) -> PodConfig {
    PodConfig {
        name: format!("pod{}", index),
        namespace: namespace.to_string(),
        image: image.to_string(),
        labels: BTreeMap::from([("app".to_string(), "bulk".to_string())]),
        image_pull_policy: Some(ImagePullPolicy::IfNotPresent),
        ..Default::default()
    }
}

async fn create_and_time(kc: &KubeClient, config: PodConfig) -> Result<PodTiming> {
    let started_at = Utc::now();
    let started = Instant::now();

    pods::create(kc, &config).await?;

    // The Ready transition is recorded by the kubelet with second precision;
    // fall back to the local clock when it is missing.
    let ready_after = pods::last_condition_time(kc, &config.namespace, &config.name, PodConditionKind::Ready)
        .await?
        .and_then(|ready| (ready - started_at).to_std().ok())
        .unwrap_or_else(|| started.elapsed());

    info!(
        "Pod {}/{} ready after {:.1}s",
        config.namespace,
        config.name,
        ready_after.as_secs_f64()
    );

    Ok(PodTiming {
        namespace: config.namespace,
        pod: config.name,
        ready_after,
    })
}

/// Create the namespaces, then all pods with bounded concurrency.
///
/// Pod failures are collected in the report. If a namespace cannot be
/// created, the ones created before it are deleted and the error is
/// returned. Cancelling the client stops creating namespaces and scheduling
/// pods; the namespaces created so far stay in the report for `cleanup`.
#[instrument(skip(kc))]
pub async fn create_pods(kc: &KubeClient, config: &BulkPodsConfig) -> Result<BulkReport> {
    if config.concurrency == 0 {
        return Err(KubekitError::InvalidValue {
            field: "concurrency",
            value: "0".to_string(),
        });
    }
    let started = Instant::now();
    let mut report = BulkReport::default();

    for _ in 0..config.namespaces {
        if kc.cancellation().is_cancelled() {
            warn!("Cancelled after creating {} namespaces", report.namespaces.len());
            break;
        }
        let name = util::random_lowercase(NAMESPACE_NAME_LEN);
        if let Err(e) = namespaces::create(kc, &name).await {
            warn!(
                "Creating namespace {} failed, removing {:?}",
                name, report.namespaces
            );
            if let Err(cleanup_err) = cleanup(kc, &report.namespaces).await {
                warn!("Namespace cleanup failed: {}", cleanup_err);
            }
            return Err(e);
        }
        report.namespaces.push(name);
    }
    info!("Created namespaces {:?}", report.namespaces);

    let work: Vec<PodConfig> = report
        .namespaces
        .iter()
        .flat_map(|ns| (1..=config.pods_per_namespace).map(move |i| pod_config(ns, i, &config.image)))
        .collect();

    let cancel = kc.cancellation();
    let mut results = pin!(stream::iter(work)
        .take_until(cancel.cancelled())
        .map(|pod| async move {
            let label = format!("{}/{}", pod.namespace, pod.name);
            (label, create_and_time(kc, pod).await)
        })
        .buffer_unordered(config.concurrency));

    while let Some((label, result)) = results.next().await {
        match result {
            Ok(timing) => report.timings.push(timing),
            Err(e) => {
                warn!("Pod {} failed: {}", label, e);
                report.failures.push((label, e.to_string()));
            }
        }
    }

    report.elapsed = started.elapsed();
    info!(
        "{} pods ready, {} failed, in {:.1}s",
        report.timings.len(),
        report.failures.len(),
        report.elapsed.as_secs_f64()
    );
    Ok(report)
}

/// Delete the namespaces a bulk run created, without waiting for termination
#[instrument(skip(kc))]
pub async fn cleanup(kc: &KubeClient, namespaces: &[String]) -> Result<()> {
    for ns in namespaces {
        namespaces::delete_no_wait(kc, ns).await?;
    }
    Ok(())
}
