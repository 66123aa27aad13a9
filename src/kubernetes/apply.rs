// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Applying and deleting multi-document YAML manifests.
//!
//! Every document is resolved through API discovery, so any kind the server
//! serves (CRDs included) can be applied. Documents are processed in order and
//! each one produces a single outcome line; a failing document does not stop
//! the ones after it.

use crate::constants::FIELD_MANAGER;
use crate::error::{KubekitError, Result};
use crate::kubernetes::KubeClient;
use kube::api::{DeleteParams, DynamicObject, Patch, PatchParams};
use kube::core::GroupVersionKind;
use kube::discovery::{pinned_kind, ApiCapabilities, ApiResource, Scope};
use kube::{Api, ResourceExt};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// One object out of a manifest
#[derive(Debug, Clone)]
pub struct Document {
    pub gvk: GroupVersionKind,
    pub name: String,
    pub namespace: Option<String>,
    pub object: DynamicObject,
}

impl Document {
    fn label(&self) -> String {
        format!("{} {}", self.gvk.kind.to_lowercase(), self.name)
    }
}

/// Split a manifest into documents, skipping empty ones.
///
/// A document that is not a valid Kubernetes object is returned as an error
/// in its slot, while a manifest that is not valid YAML at all fails as a whole.
pub fn parse_documents(manifest: &str) -> Result<Vec<Result<Document>>> {
    let mut documents = Vec::new();

    for de in serde_yaml::Deserializer::from_str(manifest) {
        let value = serde_yaml::Value::deserialize(de)?;
        if value.is_null() {
            continue;
        }
        documents.push(parse_document(value));
    }

    Ok(documents)
}

fn parse_document(value: serde_yaml::Value) -> Result<Document> {
    let object: DynamicObject = serde_yaml::from_value(value)?;

    let types = object
        .types
        .as_ref()
        .ok_or_else(|| KubekitError::ManifestError("document has no apiVersion/kind".to_string()))?;
    if types.api_version.is_empty() || types.kind.is_empty() {
        return Err(KubekitError::ManifestError(
            "document has no apiVersion/kind".to_string(),
        ));
    }

    let (group, version) = match types.api_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", types.api_version.as_str()),
    };
    let gvk = GroupVersionKind::gvk(group, version, &types.kind);

    let name = object
        .metadata
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            KubekitError::ManifestError(format!("{} without metadata.name", types.kind))
        })?;

    Ok(Document {
        gvk,
        name,
        namespace: object.namespace(),
        object,
    })
}

/// Discovery results cached for the duration of one manifest
struct Resolver<'a> {
    kc: &'a KubeClient,
    cache: HashMap<GroupVersionKind, (ApiResource, ApiCapabilities)>,
}

impl<'a> Resolver<'a> {
    fn new(kc: &'a KubeClient) -> Self {
        Self {
            kc,
            cache: HashMap::new(),
        }
    }

    async fn api_for(&mut self, doc: &Document) -> Result<Api<DynamicObject>> {
        if !self.cache.contains_key(&doc.gvk) {
            debug!("Discovering {:?}", doc.gvk);
            let resolved = pinned_kind(self.kc.client(), &doc.gvk).await?;
            self.cache.insert(doc.gvk.clone(), resolved);
        }
        let (resource, caps) = &self.cache[&doc.gvk];

        let client = self.kc.client().clone();
        Ok(match caps.scope {
            Scope::Namespaced => {
                let namespace = self.kc.namespace_or_default(doc.namespace.as_deref());
                Api::namespaced_with(client, namespace, resource)
            }
            Scope::Cluster => Api::all_with(client, resource),
        })
    }
}

/// Server-side apply every document in the manifest.
///
/// Returns one line per document: `"<kind> <name> applied"` or the error.
#[instrument(skip(kc, manifest))]
pub async fn apply_yaml(kc: &KubeClient, manifest: &str) -> Result<Vec<String>> {
    let params = PatchParams::apply(FIELD_MANAGER).force();
    let mut resolver = Resolver::new(kc);
    let mut outcome = Vec::new();

    for doc in parse_documents(manifest)? {
        let line = match doc {
            Ok(doc) => match apply_document(&mut resolver, &doc, &params).await {
                Ok(()) => format!("{} applied", doc.label()),
                Err(e) => format!("{}: {}", doc.label(), e),
            },
            Err(e) => e.to_string(),
        };
        info!("{}", line);
        outcome.push(line);
    }

    Ok(outcome)
}

async fn apply_document(resolver: &mut Resolver<'_>, doc: &Document, params: &PatchParams) -> Result<()> {
    let api = resolver.api_for(doc).await?;
    api.patch(&doc.name, params, &Patch::Apply(&doc.object)).await?;
    Ok(())
}

/// Delete every object named in the manifest, in document order.
///
/// Returns one line per document: `"<kind> <name> deleted"` or the error.
#[instrument(skip(kc, manifest))]
pub async fn delete_yaml(kc: &KubeClient, manifest: &str) -> Result<Vec<String>> {
    let mut resolver = Resolver::new(kc);
    let mut outcome = Vec::new();

    for doc in parse_documents(manifest)? {
        let line = match doc {
            Ok(doc) => match delete_document(&mut resolver, &doc).await {
                Ok(()) => format!("{} deleted", doc.label()),
                Err(e) => {
                    warn!("Failed to delete {}: {}", doc.label(), e);
                    format!("{}: {}", doc.label(), e)
                }
            },
            Err(e) => e.to_string(),
        };
        info!("{}", line);
        outcome.push(line);
    }

    Ok(outcome)
}

async fn delete_document(resolver: &mut Resolver<'_>, doc: &Document) -> Result<()> {
    let api = resolver.api_for(doc).await?;
    api.delete(&doc.name, &DeleteParams::background()).await?;
    Ok(())
}
