//! Resource type descriptors and the store seam used by the lister and mutator.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::record::ResourceRecord;

/// Group/version/resource descriptor, e.g. `infrastructure.cluster.x-k8s.io/v1beta1/gcpclusters`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ResourceType {
    pub group: String,
    pub version: String,
    /// Plural resource name.
    pub resource: String,
}

impl ResourceType {
    pub fn new(group: impl Into<String>, version: impl Into<String>, resource: impl Into<String>) -> Self {
        Self { group: group.into(), version: version.into(), resource: resource.into() }
    }

    /// Parse `group/version/resource`, or `version/resource` for the core group.
    pub fn parse(key: &str) -> Result<Self, String> {
        let parts: Vec<_> = key.split('/').collect();
        match parts.as_slice() {
            [version, resource] if !version.is_empty() && !resource.is_empty() => {
                Ok(Self::new("", *version, *resource))
            }
            [group, version, resource] if !group.is_empty() && !version.is_empty() && !resource.is_empty() => {
                Ok(Self::new(*group, *version, *resource))
            }
            _ => Err(format!("invalid resource key: {} (expect v1/resource or group/v1/resource)", key)),
        }
    }

    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    pub fn key(&self) -> String {
        format!("{}/{}", self.api_version(), self.resource)
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}

/// The resource type being reconciled plus the kind written into created records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManagedResource {
    pub resource_type: ResourceType,
    pub kind: String,
}

impl ManagedResource {
    pub fn new(resource_type: ResourceType, kind: impl Into<String>) -> Self {
        Self { resource_type, kind: kind.into() }
    }

    /// Cluster API `GCPCluster` in `infrastructure.cluster.x-k8s.io/v1beta1`.
    pub fn gcp_clusters() -> Self {
        Self::new(
            ResourceType::new("infrastructure.cluster.x-k8s.io", "v1beta1", "gcpclusters"),
            "GCPCluster",
        )
    }
}

/// Request/response access to the resource store. Every call is independent:
/// no caching, no retries.
#[async_trait::async_trait]
pub trait ResourceStore: Send + Sync {
    async fn list(&self, resource: &ManagedResource, namespace: &str) -> Result<Vec<ResourceRecord>, StoreError>;

    /// Create `desired`; the returned record carries the store-assigned name.
    async fn create(
        &self,
        resource: &ManagedResource,
        namespace: &str,
        desired: &ResourceRecord,
    ) -> Result<ResourceRecord, StoreError>;

    async fn delete(&self, resource: &ManagedResource, namespace: &str, name: &str) -> Result<(), StoreError>;
}
