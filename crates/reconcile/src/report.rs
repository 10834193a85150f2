//! Outcome of one reconciliation pass, including partial completion.

use deintensify_core::{MutationError, PlanError, ResourceRecord};
use serde::Serialize;

/// Terminal state reached by one listed resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ResourceOutcome {
    /// Already in the target region.
    Stable { name: String, region: String },
    /// Would migrate; produced by dry runs only.
    Planned { name: String, from: String, to: String, desired: ResourceRecord },
    /// Replacement created and old record deleted.
    Migrated { name: String, from: String, to: String, created: String },
}

impl ResourceOutcome {
    pub fn name(&self) -> &str {
        match self {
            Self::Stable { name, .. } | Self::Planned { name, .. } | Self::Migrated { name, .. } => name,
        }
    }
}

/// Where in the per-resource state machine the run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Planning,
    Creating,
    Deleting,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "error", rename_all = "snake_case")]
pub enum AbortCause {
    Plan(PlanError),
    Mutation(MutationError),
}

impl std::fmt::Display for AbortCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plan(e) => write!(f, "{}", e),
            Self::Mutation(e) => write!(f, "{}", e),
        }
    }
}

/// The resource that stopped the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Abort {
    pub resource: String,
    pub region: String,
    pub stage: Stage,
    /// Name of the replacement if create succeeded before the failure.
    /// When set, the store now holds both the old and the new record.
    pub created: Option<String>,
    pub cause: AbortCause,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub started_at: String,
    pub dry_run: bool,
    pub namespace: String,
    pub target: String,
    /// Resources that reached a terminal state, in listed order.
    pub outcomes: Vec<ResourceOutcome>,
    /// Resources never examined because the run aborted first.
    pub untouched: Vec<String>,
    pub abort: Option<Abort>,
}

impl RunReport {
    pub(crate) fn new(namespace: &str, target: &str, dry_run: bool) -> Self {
        Self {
            started_at: chrono::Utc::now().to_rfc3339(),
            dry_run,
            namespace: namespace.to_string(),
            target: target.to_string(),
            outcomes: Vec::new(),
            untouched: Vec::new(),
            abort: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.abort.is_none()
    }

    pub fn migrated(&self) -> impl Iterator<Item = &ResourceOutcome> {
        self.outcomes.iter().filter(|o| matches!(o, ResourceOutcome::Migrated { .. }))
    }

    pub fn stable(&self) -> impl Iterator<Item = &ResourceOutcome> {
        self.outcomes.iter().filter(|o| matches!(o, ResourceOutcome::Stable { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deintensify_core::{MutationOp, StoreError, StoreErrorKind};

    #[test]
    fn report_serializes_tagged_outcomes() {
        let mut r = RunReport::new("default", "y", false);
        r.outcomes.push(ResourceOutcome::Stable { name: "a".into(), region: "y".into() });
        r.outcomes.push(ResourceOutcome::Migrated {
            name: "b".into(),
            from: "x".into(),
            to: "y".into(),
            created: "b-abcde".into(),
        });
        r.abort = Some(Abort {
            resource: "c".into(),
            region: "x".into(),
            stage: Stage::Deleting,
            created: Some("c-xyz".into()),
            cause: AbortCause::Mutation(MutationError {
                op: MutationOp::Delete,
                name: "c".into(),
                source: StoreError::new(StoreErrorKind::Forbidden, "rbac"),
            }),
        });
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["outcomes"][0]["state"], "stable");
        assert_eq!(v["outcomes"][1]["state"], "migrated");
        assert_eq!(v["outcomes"][1]["created"], "b-abcde");
        assert_eq!(v["abort"]["stage"], "deleting");
        assert_eq!(v["abort"]["cause"]["kind"], "mutation");
        assert_eq!(v["abort"]["cause"]["error"]["source"]["kind"], "forbidden");
        assert!(!r.is_complete());
        assert_eq!(r.migrated().count(), 1);
        assert_eq!(r.stable().count(), 1);
    }
}
