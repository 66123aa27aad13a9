// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Operations shared by every resource kind

use crate::error::{KubekitError, Result};
use crate::kubernetes::KubeClient;
use kube::api::{DeleteParams, ListParams, PostParams};
use kube::{Api, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

fn kind_of<K: Resource<DynamicType = ()>>() -> String {
    K::kind(&()).to_string()
}

/// Whether an object with this name exists
pub async fn exists<K>(api: &Api<K>, name: &str) -> Result<bool>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug,
{
    let found = api.get_opt(name).await?.is_some();
    debug!("{} {} exists: {}", kind_of::<K>(), name, found);
    Ok(found)
}

/// Get an object, turning a 404 into `KubekitError::NotFound`
pub async fn get<K>(api: &Api<K>, name: &str) -> Result<K>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug,
{
    api.get_opt(name).await?.ok_or_else(|| KubekitError::NotFound {
        kind: kind_of::<K>(),
        name: name.to_string(),
    })
}

/// Create an object and log the outcome
pub async fn create<K>(api: &Api<K>, object: &K) -> Result<K>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Serialize + Debug,
{
    let kind = kind_of::<K>();
    let name = object.name_any();
    info!("Creating {} {}", kind, name);

    let created = api.create(&PostParams::default(), object).await?;

    info!(
        "Created {} {} namespace: {}",
        kind,
        created.name_any(),
        created.namespace().unwrap_or_default()
    );
    Ok(created)
}

/// List every object visible through `api`
pub async fn list<K>(api: &Api<K>) -> Result<Vec<K>>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug,
{
    Ok(api.list(&ListParams::default()).await?.items)
}

/// Issue a delete without waiting for the object to go away
pub async fn delete<K>(api: &Api<K>, name: &str, params: &DeleteParams) -> Result<()>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug,
{
    info!("Deleting {} {}", kind_of::<K>(), name);
    api.delete(name, params).await?;
    Ok(())
}

/// Delete an object and poll until the API no longer returns it.
///
/// Both the initial lookup and the confirmation go through the client's
/// retry policy, so transient API errors are retried. Fails with `NotFound`
/// when the object is absent to begin with, and with
/// `RetriesExhausted`/`Timeout` when it is still present once the policy
/// runs out.
pub async fn delete_and_confirm<K>(kc: &KubeClient, api: &Api<K>, name: &str) -> Result<()>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug,
{
    let kind = kind_of::<K>();
    kc.retry()
        .poll(&format!("looking up {} {}", kind, name), kc.cancellation(), move || async move {
            get(api, name).await.map(Some)
        })
        .await?;

    delete(api, name, &DeleteParams::background()).await?;

    let operation = format!("deleting {} {}", kind, name);
    kc.retry()
        .poll(&operation, kc.cancellation(), move || async move {
            Ok(api.get_opt(name).await?.map_or(Some(()), |_| None))
        })
        .await?;

    info!("Deleted {} {}", kind, name);
    Ok(())
}
