//! Per-record migration decision.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::PlanError;
use crate::record::{Field, ResourceRecord};
use crate::store::ManagedResource;

const GENERATE_NAME: &[&str] = &["metadata", "generateName"];
const NETWORK_NAME: &[&str] = &["spec", "network", "name"];
const PROJECT: &[&str] = &["spec", "project"];
const REGION: &[&str] = &["spec", "region"];

/// How absent carried-forward fields are treated.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldPolicy {
    /// Absent `generateName`, `network.name` and `project` are forwarded as "".
    #[default]
    Compat,
    /// Absent fields (including `spec.region`) fail planning; empty values pass through.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MigrationAction {
    NoOp,
    Migrate { desired: ResourceRecord, obsolete_name: String },
}

/// Builds the desired replacement for records outside the target region.
#[derive(Debug, Clone)]
pub struct MigrationPlanner {
    resource: ManagedResource,
    namespace: String,
    policy: FieldPolicy,
}

impl MigrationPlanner {
    pub fn new(resource: ManagedResource, namespace: impl Into<String>) -> Self {
        Self { resource, namespace: namespace.into(), policy: FieldPolicy::default() }
    }

    pub fn with_policy(mut self, policy: FieldPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn plan(&self, record: &ResourceRecord, target: &str) -> Result<MigrationAction, PlanError> {
        let region = self.carried(record, REGION)?;
        if region == target {
            return Ok(MigrationAction::NoOp);
        }
        let obsolete_name = match record.name() {
            Field::Present(n) => n.to_string(),
            _ => return Err(self.missing(record, "metadata.name")),
        };
        let generate_name = self.carried(record, GENERATE_NAME)?;
        let network = self.carried(record, NETWORK_NAME)?;
        let project = self.carried(record, PROJECT)?;

        let desired = ResourceRecord::new(json!({
            "apiVersion": self.resource.resource_type.api_version(),
            "kind": self.resource.kind,
            "metadata": {
                "namespace": self.namespace,
                "generateName": generate_name,
            },
            "spec": {
                "network": { "name": network },
                "project": project,
                "region": target,
            }
        }));
        Ok(MigrationAction::Migrate { desired, obsolete_name })
    }

    fn carried<'r>(&self, record: &'r ResourceRecord, path: &[&str]) -> Result<&'r str, PlanError> {
        match (record.field(path), self.policy) {
            (Field::Absent, FieldPolicy::Strict) => Err(self.missing(record, &path.join("."))),
            (f, _) => Ok(f.or_empty()),
        }
    }

    fn missing(&self, record: &ResourceRecord, path: &str) -> PlanError {
        PlanError::MissingField { record: record.key(), path: path.to_string() }
    }
}
