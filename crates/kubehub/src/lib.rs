//! Deintensify kubehub: the resource store backed by a Kubernetes API server.
//!
//! Resources are handled dynamically (`DynamicObject`) since Cluster API
//! infrastructure kinds are CRDs with no compiled-in types.

#![forbid(unsafe_code)]

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use deintensify_core::{ManagedResource, ResourceRecord, ResourceStore, StoreError, StoreErrorKind};
use kube::{
    api::{Api, DeleteParams, ListParams, PostParams},
    config::KubeConfigOptions,
    core::{ApiResource, DynamicObject},
    Client, Config,
};
use tracing::debug;

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Build a client from kubeconfig (optionally a named context) or the
/// in-cluster environment.
pub async fn get_kube_client(context: Option<&str>) -> Result<Client> {
    let config = match context {
        Some(ctx) => {
            let opts = KubeConfigOptions { context: Some(ctx.to_string()), ..Default::default() };
            Config::from_kubeconfig(&opts).await.with_context(|| format!("loading kubeconfig context {}", ctx))?
        }
        None => Config::infer().await.context("inferring kube config")?,
    };
    Client::try_from(config).context("building kube client")
}

fn api_resource(resource: &ManagedResource) -> ApiResource {
    let rt = &resource.resource_type;
    ApiResource {
        group: rt.group.clone(),
        version: rt.version.clone(),
        api_version: rt.api_version(),
        kind: resource.kind.clone(),
        plural: rt.resource.clone(),
    }
}

fn store_error(e: kube::Error) -> StoreError {
    match e {
        kube::Error::Api(resp) => StoreError::new(
            StoreErrorKind::from_status(resp.code),
            format!("{} ({})", resp.message, resp.reason),
        ),
        other => StoreError::new(StoreErrorKind::Transport, other.to_string()),
    }
}

fn encode_error(e: serde_json::Error) -> StoreError {
    StoreError::new(StoreErrorKind::Transport, format!("encoding object: {}", e))
}

/// `ResourceStore` over kube's dynamic API. Each call is bounded by `call_timeout`.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
    call_timeout: Duration,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client, call_timeout: DEFAULT_CALL_TIMEOUT }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    fn api(&self, resource: &ManagedResource, namespace: &str) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), namespace, &api_resource(resource))
    }

    async fn bounded<T, F>(&self, what: &str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, kube::Error>>,
    {
        with_deadline(self.call_timeout, what, fut).await
    }
}

/// Await one store call; exceeding `deadline` is a transport failure.
async fn with_deadline<T, F>(deadline: Duration, what: &str, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, kube::Error>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(res) => res.map_err(store_error),
        Err(_) => Err(StoreError::new(
            StoreErrorKind::Transport,
            format!("{} timed out after {}s", what, deadline.as_secs_f64()),
        )),
    }
}

#[async_trait::async_trait]
impl ResourceStore for KubeStore {
    async fn list(&self, resource: &ManagedResource, namespace: &str) -> Result<Vec<ResourceRecord>, StoreError> {
        let api = self.api(resource, namespace);
        let list = self.bounded("list", api.list(&ListParams::default())).await?;
        debug!(resource = %resource.resource_type, ns = %namespace, count = list.items.len(), "listed");
        list.items
            .into_iter()
            .map(|o| serde_json::to_value(o).map(ResourceRecord::new).map_err(encode_error))
            .collect()
    }

    async fn create(
        &self,
        resource: &ManagedResource,
        namespace: &str,
        desired: &ResourceRecord,
    ) -> Result<ResourceRecord, StoreError> {
        let api = self.api(resource, namespace);
        let obj: DynamicObject = serde_json::from_value(desired.as_json().clone()).map_err(encode_error)?;
        let created = self.bounded("create", api.create(&PostParams::default(), &obj)).await?;
        serde_json::to_value(created).map(ResourceRecord::new).map_err(encode_error)
    }

    async fn delete(&self, resource: &ManagedResource, namespace: &str, name: &str) -> Result<(), StoreError> {
        let api = self.api(resource, namespace);
        let _ = self.bounded("delete", api.delete(name, &DeleteParams::default())).await?;
        Ok(())
    }
}
