use std::sync::Arc;

use deintensify_core::{ListError, ManagedResource, ResourceRecord, ResourceStore};
use metrics::counter;
use tracing::debug;

/// Read path: every record of one resource type in a namespace, in store order.
#[derive(Clone)]
pub struct ResourceLister {
    store: Arc<dyn ResourceStore>,
}

impl ResourceLister {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, resource: &ManagedResource, namespace: &str) -> Result<Vec<ResourceRecord>, ListError> {
        let items = self.store.list(resource, namespace).await.map_err(|source| ListError {
            resource: resource.resource_type.key(),
            namespace: namespace.to_string(),
            source,
        })?;
        counter!("deintensify_resources_listed_total", items.len() as u64);
        debug!(resource = %resource.resource_type, ns = %namespace, count = items.len(), "resources listed");
        Ok(items)
    }
}
