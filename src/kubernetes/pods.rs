// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod creation, lookup, readiness waits and command execution

use crate::error::{KubekitError, Result};
use crate::kubernetes::{ops, KubeClient};
use crate::types::{ImagePullPolicy, PodConditionKind};
use k8s_openapi::api::core::v1::{Container, Pod, PodSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Status;
use k8s_openapi::chrono::{DateTime, Utc};
use kube::api::{AttachParams, ObjectMeta};
use kube::{Api, ResourceExt};
use kube_runtime::wait::{conditions, Condition};
use std::collections::BTreeMap;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info, instrument};

/// Single-container pod
#[derive(Debug, Clone, Default)]
pub struct PodConfig {
    pub name: String,
    /// Empty means the client's default namespace
    pub namespace: String,
    pub image: String,
    pub command: Vec<String>,
    pub args: Vec<String>,
    pub labels: BTreeMap<String, String>,
    pub image_pull_policy: Option<ImagePullPolicy>,
}

/// Output of a command run inside a container
#[derive(Debug, Clone, Default)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn lines(&self) -> Vec<&str> {
        self.stdout.lines().collect()
    }
}

fn api(kc: &KubeClient, namespace: &str) -> Api<Pod> {
    Api::namespaced(kc.client().clone(), kc.namespace_or_default(Some(namespace)))
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}

pub fn build(config: &PodConfig) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: Some(config.name.clone()),
            labels: (!config.labels.is_empty()).then(|| config.labels.clone()),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![Container {
                name: config.name.clone(),
                image: Some(config.image.clone()),
                command: non_empty(&config.command),
                args: non_empty(&config.args),
                image_pull_policy: config.image_pull_policy.map(|p| p.as_str().to_string()),
                ..Default::default()
            }],
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Create a pod and wait until it is Running
#[instrument(skip(kc, config), fields(pod = %config.name))]
pub async fn create(kc: &KubeClient, config: &PodConfig) -> Result<Pod> {
    create_no_wait(kc, config).await?;
    wait_running(kc, &config.namespace, &config.name).await
}

/// Create a pod and return as soon as the API accepted it
pub async fn create_no_wait(kc: &KubeClient, config: &PodConfig) -> Result<Pod> {
    if config.image.is_empty() {
        return Err(KubekitError::MissingField("image"));
    }
    ops::create(&api(kc, &config.namespace), &build(config)).await
}

/// Delete a pod and wait until it is gone
#[instrument(skip(kc))]
pub async fn delete(kc: &KubeClient, namespace: &str, name: &str) -> Result<()> {
    ops::delete_and_confirm(kc, &api(kc, namespace), name).await
}

pub async fn exists(kc: &KubeClient, namespace: &str, name: &str) -> Result<bool> {
    ops::exists(&api(kc, namespace), name).await
}

pub async fn get(kc: &KubeClient, namespace: &str, name: &str) -> Result<Pod> {
    ops::get(&api(kc, namespace), name).await
}

pub async fn list(kc: &KubeClient, namespace: &str) -> Result<Vec<Pod>> {
    ops::list(&api(kc, namespace)).await
}

/// The pod IP reported in the pod status
pub async fn get_ip(kc: &KubeClient, namespace: &str, name: &str) -> Result<String> {
    get(kc, namespace, name)
        .await?
        .status
        .and_then(|s| s.pod_ip)
        .filter(|ip| !ip.is_empty())
        .ok_or(KubekitError::MissingField("status.podIP"))
}

/// First pod in the namespace whose name contains `substring`
pub async fn find_by_name_contains(kc: &KubeClient, namespace: &str, substring: &str) -> Result<Pod> {
    list(kc, namespace)
        .await?
        .into_iter()
        .find(|pod| pod.name_any().contains(substring))
        .ok_or_else(|| KubekitError::NotFound {
            kind: "Pod".to_string(),
            name: format!("*{}*", substring),
        })
}

/// When the given condition last transitioned, if the pod reports it
pub async fn last_condition_time(
    kc: &KubeClient,
    namespace: &str,
    name: &str,
    kind: PodConditionKind,
) -> Result<Option<DateTime<Utc>>> {
    let pod = get(kc, namespace, name).await?;
    Ok(condition_time(&pod, kind))
}

fn condition_time(pod: &Pod, kind: PodConditionKind) -> Option<DateTime<Utc>> {
    pod.status
        .as_ref()?
        .conditions
        .as_ref()?
        .iter()
        .find(|c| c.type_ == kind.as_str())
        .and_then(|c| c.last_transition_time.as_ref())
        .map(|t| t.0)
}

fn phase(pod: &Pod) -> &str {
    pod.status
        .as_ref()
        .and_then(|s| s.phase.as_deref())
        .unwrap_or("Unknown")
}

/// Poll until the pod is Running.
///
/// A pod that ends up Failed or Succeeded will never run again, so those
/// phases abort the wait with `PodNotRunning`.
#[instrument(skip(kc))]
pub async fn wait_running(kc: &KubeClient, namespace: &str, name: &str) -> Result<Pod> {
    let api = &api(kc, namespace);
    let running = &conditions::is_pod_running();
    let operation = format!("waiting for pod {} to run", name);

    let pod = kc
        .wait_policy()
        .poll(&operation, kc.cancellation(), move || async move {
            let Some(pod) = api.get_opt(name).await? else {
                return Ok(None);
            };
            if running.matches_object(Some(&pod)) {
                return Ok(Some(pod));
            }
            match phase(&pod) {
                "Failed" | "Succeeded" => Err(KubekitError::PodNotRunning {
                    name: name.to_string(),
                    phase: phase(&pod).to_string(),
                }),
                other => {
                    debug!("Pod {} is {}", name, other);
                    Ok(None)
                }
            }
        })
        .await?;

    info!("Pod {} is running", name);
    Ok(pod)
}

/// Run a command in a pod and collect its output.
///
/// Uses the first container unless `container` names another one. A
/// non-success exit status becomes `ExecError` carrying the status message.
#[instrument(skip(kc))]
pub async fn exec(
    kc: &KubeClient,
    namespace: &str,
    name: &str,
    container: Option<&str>,
    command: &[&str],
) -> Result<ExecOutput> {
    if command.is_empty() {
        return Err(KubekitError::MissingField("command"));
    }

    let mut params = AttachParams::default().stdin(false).stdout(true).stderr(true);
    if let Some(container) = container {
        params = params.container(container);
    }

    let mut attached = api(kc, namespace)
        .exec(name, command.iter().copied(), &params)
        .await?;

    let stdout = attached.stdout();
    let stderr = attached.stderr();
    let status = attached.take_status();

    let (stdout, stderr) = tokio::try_join!(read_all(stdout), read_all(stderr))?;
    let status = match status {
        Some(status) => status.await,
        None => None,
    };

    attached
        .join()
        .await
        .map_err(|e| KubekitError::ExecError(e.to_string()))?;

    check_status(status)?;
    debug!("Command {:?} in pod {} finished", command, name);
    Ok(ExecOutput { stdout, stderr })
}

async fn read_all<R: AsyncRead + Unpin>(reader: Option<R>) -> Result<String> {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        reader.read_to_end(&mut buf).await?;
    }
    Ok(String::from_utf8_lossy(&buf).to_string())
}

fn check_status(status: Option<Status>) -> Result<()> {
    match status {
        Some(s) if s.status.as_deref() != Some("Success") => Err(KubekitError::ExecError(
            s.message.unwrap_or_else(|| "command failed".to_string()),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{list_json, MockService};

    const POD_PATH: &str = "/api/v1/namespaces/default/pods/web";

    fn pod_json(name: &str, phase: &str) -> String {
        serde_json::json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": { "name": name, "namespace": "default" },
            "status": {
                "phase": phase,
                "podIP": "10.42.0.7",
                "conditions": [
                    { "type": "PodScheduled", "status": "True", "lastTransitionTime": "2024-05-01T10:00:00Z" },
                    { "type": "Ready", "status": "True", "lastTransitionTime": "2024-05-01T10:00:05Z" }
                ]
            }
        })
        .to_string()
    }

    fn web() -> PodConfig {
        PodConfig {
            name: "web".to_string(),
            image: "nginx:1.27".to_string(),
            command: vec!["nginx".to_string()],
            image_pull_policy: Some(ImagePullPolicy::IfNotPresent),
            labels: BTreeMap::from([("app".to_string(), "web".to_string())]),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_single_container() {
        let pod = build(&web());
        let spec = pod.spec.clone().unwrap();
        let container = &spec.containers[0];
        assert_eq!(container.name, "web");
        assert_eq!(container.image.as_deref(), Some("nginx:1.27"));
        assert_eq!(container.image_pull_policy.as_deref(), Some("IfNotPresent"));
        assert!(container.args.is_none());
        assert_eq!(pod.metadata.labels.unwrap()["app"], "web");
    }

    #[tokio::test]
    async fn test_create_waits_until_running() {
        let mock = MockService::new()
            .on_post("/api/v1/namespaces/default/pods", 201, &pod_json("web", "Pending"))
            .on_get(POD_PATH, 200, &pod_json("web", "Pending"))
            .on_get(POD_PATH, 200, &pod_json("web", "Running"));
        let kc = mock.clone().into_kube_client();

        let pod = create(&kc, &web()).await.unwrap();
        assert_eq!(phase(&pod), "Running");
        assert_eq!(mock.requests_for("GET").len(), 2);
    }

    #[tokio::test]
    async fn test_wait_running_aborts_on_failed_pod() {
        let mock = MockService::new().on_get(POD_PATH, 200, &pod_json("web", "Failed"));
        let kc = mock.clone().into_kube_client();

        let err = wait_running(&kc, "", "web").await.unwrap_err();
        assert!(matches!(err, KubekitError::PodNotRunning { ref phase, .. } if phase == "Failed"));
        assert_eq!(mock.requests_for("GET").len(), 1);
    }

    #[tokio::test]
    async fn test_create_without_image_is_rejected() {
        let kc = MockService::new().into_kube_client();
        let config = PodConfig {
            name: "web".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            create_no_wait(&kc, &config).await,
            Err(KubekitError::MissingField("image"))
        ));
    }

    #[tokio::test]
    async fn test_get_ip() {
        let kc = MockService::new()
            .on_get(POD_PATH, 200, &pod_json("web", "Running"))
            .into_kube_client();
        assert_eq!(get_ip(&kc, "default", "web").await.unwrap(), "10.42.0.7");
    }

    #[tokio::test]
    async fn test_find_by_name_contains() {
        let kc = MockService::new()
            .on_get(
                "/api/v1/namespaces/kube-system/pods",
                200,
                &list_json(
                    "v1",
                    "PodList",
                    &[pod_json("coredns-abc", "Running"), pod_json("kube-proxy-x7k2p", "Running")],
                ),
            )
            .into_kube_client();

        let pod = find_by_name_contains(&kc, "kube-system", "kube-proxy").await.unwrap();
        assert_eq!(pod.name_any(), "kube-proxy-x7k2p");

        let err = find_by_name_contains(&kc, "kube-system", "etcd").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_last_condition_time() {
        let kc = MockService::new()
            .on_get(POD_PATH, 200, &pod_json("web", "Running"))
            .into_kube_client();

        let ready = last_condition_time(&kc, "default", "web", PodConditionKind::Ready)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ready.to_rfc3339(), "2024-05-01T10:00:05+00:00");

        let initialized = last_condition_time(&kc, "default", "web", PodConditionKind::Initialized)
            .await
            .unwrap();
        assert!(initialized.is_none());
    }

    #[test]
    fn test_check_status() {
        assert!(check_status(None).is_ok());
        assert!(check_status(Some(Status {
            status: Some("Success".to_string()),
            ..Default::default()
        }))
        .is_ok());

        let err = check_status(Some(Status {
            status: Some("Failure".to_string()),
            message: Some("command terminated with non-zero exit code".to_string()),
            ..Default::default()
        }))
        .unwrap_err();
        assert!(err.to_string().contains("non-zero exit code"));
    }
}
