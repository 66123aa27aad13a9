// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses.

use crate::config::Config;
use crate::kubernetes::KubeClient;
use http::{Request, Response};
use http_body_util::BodyExt;
use kube::client::Body;
use kube::Client;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;

type Key = (String, String);

/// A request the mock received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

/// A mock HTTP service that returns predefined responses based on request paths.
///
/// Paths may contain `*` segments, e.g. `/api/v1/namespaces/*/pods`, to
/// answer for objects whose namespace or name is generated.
///
/// Each (method, path) owns a queue of responses. Responses are consumed in
/// order and the last one keeps being returned, so an object can be made to
/// "disappear" by queueing a 200 followed by a 404.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<Key, VecDeque<(u16, String)>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back((status, body.to_string()));
        self
    }

    /// Add a response for GET requests matching the path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for POST requests matching the path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    /// Build a KubeClient with millisecond retry delays
    pub fn into_kube_client(self) -> KubeClient {
        let config = Config {
            max_attempts: 5,
            retry_interval: Duration::from_millis(1),
            max_retry_interval: Duration::from_millis(2),
            task_timeout: Duration::from_secs(5),
            ..Default::default()
        };
        KubeClient::from_parts(self.into_client(), &config)
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests received for the given method
    pub fn requests_for(&self, method: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let mut responses = self.responses.lock().unwrap();

        // Exact match first, then `*` segment patterns (fewest wildcards
        // wins), then the longest registered prefix
        let exact = (method.to_string(), path.to_string());
        let key = if responses.contains_key(&exact) {
            Some(exact)
        } else {
            responses
                .keys()
                .filter(|(m, p)| m == method && p.contains('*') && matches_pattern(p, path))
                .min_by_key(|(_, p)| p.matches('*').count())
                .or_else(|| {
                    responses
                        .keys()
                        .filter(|(m, p)| m == method && !p.contains('*') && path.starts_with(p.as_str()))
                        .max_by_key(|(_, p)| p.len())
                })
                .cloned()
        }?;

        let queue = responses.get_mut(&key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

/// Whether `path` matches `pattern` segment by segment, `*` matching any one segment
fn matches_pattern(pattern: &str, path: &str) -> bool {
    let pattern: Vec<&str> = pattern.split('/').collect();
    let path: Vec<&str> = path.split('/').collect();
    pattern.len() == path.len()
        && pattern
            .iter()
            .zip(&path)
            .all(|(expected, actual)| *expected == "*" || expected == actual)
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let query = req.uri().query().map(str::to_string);

        let response = self.find_response(&method, &path);
        let requests = self.requests.clone();

        Box::pin(async move {
            let body = req.into_body().collect().await?.to_bytes();
            requests.lock().unwrap().push(RecordedRequest {
                method,
                path,
                query,
                body: String::from_utf8_lossy(&body).to_string(),
            });

            let (status, body) = response.unwrap_or_else(|| {
                // Default 404 for unmatched requests
                (404, not_found_json("object", "unknown"))
            });

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Build a JSON object of the given kind with a name and optional namespace
pub fn object_json(api_version: &str, kind: &str, name: &str, namespace: Option<&str>) -> String {
    let mut metadata = serde_json::json!({ "name": name, "uid": format!("{}-uid", name) });
    if let Some(ns) = namespace {
        metadata["namespace"] = serde_json::Value::String(ns.to_string());
    }
    serde_json::json!({
        "apiVersion": api_version,
        "kind": kind,
        "metadata": metadata
    })
    .to_string()
}

/// Create a mock namespace JSON response
pub fn namespace_json(name: &str) -> String {
    object_json("v1", "Namespace", name, None)
}

/// Build a list response of the given kind from item JSON strings
pub fn list_json(api_version: &str, kind: &str, items: &[String]) -> String {
    let items: Vec<serde_json::Value> = items
        .iter()
        .map(|i| serde_json::from_str(i).unwrap())
        .collect();
    serde_json::json!({
        "apiVersion": api_version,
        "kind": kind,
        "metadata": { "resourceVersion": "1" },
        "items": items
    })
    .to_string()
}

/// Successful Status response, as returned by some deletes
pub fn status_success_json() -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Success",
        "metadata": {}
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_pattern() {
        assert!(matches_pattern("/api/v1/namespaces/*/pods", "/api/v1/namespaces/qwerty/pods"));
        assert!(matches_pattern("/api/v1/namespaces/*/pods/*", "/api/v1/namespaces/qwerty/pods/pod1"));
        assert!(!matches_pattern("/api/v1/namespaces/*/pods", "/api/v1/namespaces/qwerty/pods/pod1"));
        assert!(!matches_pattern("/api/v1/namespaces/*/pods", "/api/v1/namespaces/qwerty/services"));
    }

    #[test]
    fn test_pattern_beats_prefix_and_fewer_wildcards_win() {
        let mock = MockService::new()
            .on_get("/api/v1/namespaces", 200, "namespaces")
            .on_get("/api/v1/namespaces/*/pods/*", 200, "any pod")
            .on_get("/api/v1/namespaces/*/pods/pod2", 200, "pod2");

        let body = |path: &str| mock.find_response("GET", path).map(|(_, b)| b);
        assert_eq!(body("/api/v1/namespaces/abc/pods/pod1").as_deref(), Some("any pod"));
        assert_eq!(body("/api/v1/namespaces/abc/pods/pod2").as_deref(), Some("pod2"));
        assert_eq!(body("/api/v1/namespaces/abc").as_deref(), Some("namespaces"));
    }
}
