// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{KubekitError, Result};
use crate::kubernetes::jobs::JobContainer;
use crate::kubernetes::{ops, KubeClient};
use crate::types::{ConcurrencyPolicy, RestartPolicy};
use k8s_openapi::api::batch::v1::{CronJob, CronJobSpec, JobSpec, JobTemplateSpec};
use kube::api::{DeleteParams, ObjectMeta};
use kube::Api;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct CronJobConfig {
    pub name: String,
    /// Empty means the client's default namespace
    pub namespace: String,
    /// Cron expression, e.g. `*/5 * * * *`
    pub schedule: String,
    pub concurrency_policy: ConcurrencyPolicy,
    pub restart_policy: RestartPolicy,
    pub parallelism: Option<i32>,
    pub completions: Option<i32>,
    pub backoff_limit: Option<i32>,
    pub successful_jobs_history_limit: Option<i32>,
    pub failed_jobs_history_limit: Option<i32>,
    pub container: JobContainer,
}

fn api(kc: &KubeClient, namespace: &str) -> Api<CronJob> {
    Api::namespaced(kc.client().clone(), kc.namespace_or_default(Some(namespace)))
}

pub fn build(config: &CronJobConfig) -> Result<CronJob> {
    if config.schedule.trim().is_empty() {
        return Err(KubekitError::MissingField("schedule"));
    }

    Ok(CronJob {
        metadata: ObjectMeta {
            name: Some(config.name.clone()),
            ..Default::default()
        },
        spec: Some(CronJobSpec {
            schedule: config.schedule.clone(),
            concurrency_policy: Some(config.concurrency_policy.as_str().to_string()),
            successful_jobs_history_limit: config.successful_jobs_history_limit,
            failed_jobs_history_limit: config.failed_jobs_history_limit,
            job_template: JobTemplateSpec {
                metadata: None,
                spec: Some(JobSpec {
                    parallelism: config.parallelism,
                    completions: config.completions,
                    backoff_limit: config.backoff_limit,
                    template: config.container.template(config.restart_policy)?,
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    })
}

#[instrument(skip(kc, config), fields(cronjob = %config.name))]
pub async fn create(kc: &KubeClient, config: &CronJobConfig) -> Result<CronJob> {
    ops::create(&api(kc, &config.namespace), &build(config)?).await
}

pub async fn exists(kc: &KubeClient, namespace: &str, name: &str) -> Result<bool> {
    ops::exists(&api(kc, namespace), name).await
}

/// Delete a cronjob together with the jobs it spawned
#[instrument(skip(kc))]
pub async fn delete(kc: &KubeClient, namespace: &str, name: &str) -> Result<()> {
    ops::delete(&api(kc, namespace), name, &DeleteParams::background()).await
}
