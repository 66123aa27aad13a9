// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{KubekitError, Result};
use crate::kubernetes::{ops, KubeClient};
use crate::types::RestartPolicy;
use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{Container, PodSpec, PodTemplateSpec};
use kube::api::{DeleteParams, ObjectMeta};
use kube::Api;
use tracing::instrument;

/// Container run by a Job or by the Jobs a CronJob spawns
#[derive(Debug, Clone, Default)]
pub struct JobContainer {
    pub name: String,
    pub image: String,
    pub command: Vec<String>,
}

impl JobContainer {
    pub(crate) fn template(&self, restart_policy: RestartPolicy) -> Result<PodTemplateSpec> {
        if self.image.is_empty() {
            return Err(KubekitError::MissingField("container.image"));
        }
        // Jobs reject Always
        if restart_policy == RestartPolicy::Always {
            return Err(KubekitError::InvalidValue {
                field: "restart policy",
                value: restart_policy.to_string(),
            });
        }

        Ok(PodTemplateSpec {
            metadata: None,
            spec: Some(PodSpec {
                restart_policy: Some(restart_policy.as_str().to_string()),
                containers: vec![Container {
                    name: self.name.clone(),
                    image: Some(self.image.clone()),
                    command: (!self.command.is_empty()).then(|| self.command.clone()),
                    ..Default::default()
                }],
                ..Default::default()
            }),
        })
    }
}

#[derive(Debug, Clone)]
pub struct JobConfig {
    pub name: String,
    /// Empty means the client's default namespace
    pub namespace: String,
    pub restart_policy: RestartPolicy,
    /// Retries before the job is marked failed; the server defaults to 6
    pub backoff_limit: Option<i32>,
    pub container: JobContainer,
}

fn api(kc: &KubeClient, namespace: &str) -> Api<Job> {
    Api::namespaced(kc.client().clone(), kc.namespace_or_default(Some(namespace)))
}

pub fn build(config: &JobConfig) -> Result<Job> {
    Ok(Job {
        metadata: ObjectMeta {
            name: Some(config.name.clone()),
            ..Default::default()
        },
        spec: Some(JobSpec {
            backoff_limit: config.backoff_limit,
            template: config.container.template(config.restart_policy)?,
            ..Default::default()
        }),
        ..Default::default()
    })
}

#[instrument(skip(kc, config), fields(job = %config.name))]
pub async fn create(kc: &KubeClient, config: &JobConfig) -> Result<Job> {
    ops::create(&api(kc, &config.namespace), &build(config)?).await
}

pub async fn exists(kc: &KubeClient, namespace: &str, name: &str) -> Result<bool> {
    ops::exists(&api(kc, namespace), name).await
}

/// Delete a job together with its pods
#[instrument(skip(kc))]
pub async fn delete(kc: &KubeClient, namespace: &str, name: &str) -> Result<()> {
    ops::delete(&api(kc, namespace), name, &DeleteParams::background()).await
}
