#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use deintensify_catalog::IntensityCatalog;
use deintensify_core::{
    CarbonRegion, CatalogError, ManagedResource, ResourceRecord, ResourceStore, StoreError, StoreErrorKind,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Create(String),
    Delete(String),
}

type ListHook = Box<dyn FnOnce(&mut Vec<ResourceRecord>) + Send>;

#[derive(Default)]
struct Inner {
    items: Vec<ResourceRecord>,
    seq: u32,
    fail_list: Option<StoreErrorKind>,
    fail_create: HashMap<String, StoreErrorKind>,
    fail_delete: HashMap<String, StoreErrorKind>,
    after_list: Option<ListHook>,
    calls: Vec<Call>,
}

/// In-memory store with call recording and failure injection.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn with_items(items: Vec<ResourceRecord>) -> Self {
        let store = Self::default();
        store.inner.lock().unwrap().items = items;
        store
    }

    /// Fail creates whose `generateName` equals `prefix`.
    pub fn fail_create(&self, prefix: &str, kind: StoreErrorKind) {
        self.inner.lock().unwrap().fail_create.insert(prefix.to_string(), kind);
    }

    pub fn fail_delete(&self, name: &str, kind: StoreErrorKind) {
        self.inner.lock().unwrap().fail_delete.insert(name.to_string(), kind);
    }

    pub fn fail_list(&self, kind: StoreErrorKind) {
        self.inner.lock().unwrap().fail_list = Some(kind);
    }

    /// Mutate the store right after the next list snapshot is taken, as a
    /// concurrent writer would.
    pub fn after_list(&self, hook: impl FnOnce(&mut Vec<ResourceRecord>) + Send + 'static) {
        self.inner.lock().unwrap().after_list = Some(Box::new(hook));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn items(&self) -> Vec<ResourceRecord> {
        self.inner.lock().unwrap().items.clone()
    }

    pub fn get(&self, name: &str) -> Option<ResourceRecord> {
        self.items().into_iter().find(|r| r.name().or_empty() == name)
    }

    pub fn names(&self) -> HashSet<String> {
        self.items().iter().map(|r| r.name().or_empty().to_string()).collect()
    }
}

#[async_trait::async_trait]
impl ResourceStore for MemoryStore {
    async fn list(&self, _resource: &ManagedResource, namespace: &str) -> Result<Vec<ResourceRecord>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::List);
        if let Some(kind) = inner.fail_list {
            return Err(StoreError::new(kind, "list rejected"));
        }
        let snapshot: Vec<_> = inner
            .items
            .iter()
            .filter(|r| r.field(&["metadata", "namespace"]).or_empty() == namespace)
            .cloned()
            .collect();
        if let Some(hook) = inner.after_list.take() {
            hook(&mut inner.items);
        }
        Ok(snapshot)
    }

    async fn create(
        &self,
        _resource: &ManagedResource,
        _namespace: &str,
        desired: &ResourceRecord,
    ) -> Result<ResourceRecord, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let prefix = desired.field(&["metadata", "generateName"]).or_empty().to_string();
        inner.calls.push(Call::Create(prefix.clone()));
        if let Some(kind) = inner.fail_create.get(&prefix) {
            return Err(StoreError::new(*kind, "create rejected"));
        }
        if prefix.is_empty() {
            return Err(StoreError::new(StoreErrorKind::Transport, "name or generateName is required"));
        }
        inner.seq += 1;
        let mut created = desired.clone();
        created.set(&["metadata", "name"], format!("{}{:05}", prefix, inner.seq));
        inner.items.push(created.clone());
        Ok(created)
    }

    async fn delete(&self, _resource: &ManagedResource, _namespace: &str, name: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Delete(name.to_string()));
        if let Some(kind) = inner.fail_delete.get(name) {
            return Err(StoreError::new(*kind, "delete rejected"));
        }
        let before = inner.items.len();
        inner.items.retain(|r| r.name().or_empty() != name);
        if inner.items.len() == before {
            return Err(StoreError::new(StoreErrorKind::NotFound, format!("{} not found", name)));
        }
        Ok(())
    }
}

pub struct FixedCatalog(pub Vec<CarbonRegion>);

impl FixedCatalog {
    pub fn of(entries: &[(&str, f64)]) -> Self {
        Self(entries.iter().map(|(n, i)| CarbonRegion::new(*n, *i)).collect())
    }
}

#[async_trait::async_trait]
impl IntensityCatalog for FixedCatalog {
    async fn fetch(&self) -> Result<Vec<CarbonRegion>, CatalogError> {
        Ok(self.0.clone())
    }
}

pub struct FailingCatalog(pub CatalogError);

#[async_trait::async_trait]
impl IntensityCatalog for FailingCatalog {
    async fn fetch(&self) -> Result<Vec<CarbonRegion>, CatalogError> {
        Err(self.0.clone())
    }
}

pub fn cluster(name: &str, region: &str) -> ResourceRecord {
    ResourceRecord::new(serde_json::json!({
        "apiVersion": "infrastructure.cluster.x-k8s.io/v1beta1",
        "kind": "GCPCluster",
        "metadata": { "name": name, "generateName": format!("{}-", name), "namespace": "default" },
        "spec": { "region": region, "network": { "name": format!("{}-net", name) }, "project": "proj1" }
    }))
}
