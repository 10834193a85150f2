use std::sync::Arc;

use deintensify_core::{ManagedResource, MutationError, MutationOp, ResourceRecord, ResourceStore};

/// Write path: create and delete requests, surfaced as [`MutationError`].
#[derive(Clone)]
pub struct ResourceMutator {
    store: Arc<dyn ResourceStore>,
}

impl ResourceMutator {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    /// Returns the created record, whose `metadata.name` is store-assigned.
    pub async fn create(
        &self,
        resource: &ManagedResource,
        namespace: &str,
        desired: &ResourceRecord,
    ) -> Result<ResourceRecord, MutationError> {
        self.store.create(resource, namespace, desired).await.map_err(|source| MutationError {
            op: MutationOp::Create,
            name: desired.field(&["metadata", "generateName"]).or_empty().to_string(),
            source,
        })
    }

    pub async fn delete(&self, resource: &ManagedResource, namespace: &str, name: &str) -> Result<(), MutationError> {
        self.store.delete(resource, namespace, name).await.map_err(|source| MutationError {
            op: MutationOp::Delete,
            name: name.to_string(),
            source,
        })
    }
}
