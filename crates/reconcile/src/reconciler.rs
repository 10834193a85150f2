use std::sync::Arc;
use std::time::Instant;

use deintensify_catalog::IntensityCatalog;
use deintensify_core::{
    select, select_for_provider, sort_by_intensity, CarbonRegion, FieldPolicy, ManagedResource, MigrationAction,
    MigrationPlanner, ResourceRecord, ResourceStore,
};
use metrics::{counter, histogram};
use tracing::{info, warn};

use crate::lister::ResourceLister;
use crate::mutator::ResourceMutator;
use crate::report::{Abort, AbortCause, ResourceOutcome, RunReport, Stage};
use crate::RunError;

/// How the target is picked from the ordered catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Entries to step past after ordering.
    pub skip: usize,
    /// Keep only entries tagged with this provider before ordering.
    pub provider: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetSelection {
    /// Full catalog, ascending by intensity.
    pub ordered: Vec<CarbonRegion>,
    pub target: String,
}

/// Fetch the catalog once and pick the target region.
pub async fn select_target(catalog: &dyn IntensityCatalog, selection: &Selection) -> Result<TargetSelection, RunError> {
    let regions = catalog.fetch().await?;
    let target = match selection.provider.as_deref() {
        Some(p) => select_for_provider(&regions, p, selection.skip)?,
        None => select(&regions, selection.skip)?,
    };
    let mut ordered = regions;
    sort_by_intensity(&mut ordered);
    info!(target = %target, candidates = ordered.len(), skip = selection.skip, provider = ?selection.provider, "target region selected");
    Ok(TargetSelection { ordered, target })
}

/// Drives catalog → selection → list → plan → mutate for one resource type
/// in one namespace. Resources are handled strictly one after another.
pub struct Reconciler {
    catalog: Arc<dyn IntensityCatalog>,
    lister: ResourceLister,
    mutator: ResourceMutator,
    planner: MigrationPlanner,
    resource: ManagedResource,
    namespace: String,
    selection: Selection,
}

impl Reconciler {
    pub fn new(
        catalog: Arc<dyn IntensityCatalog>,
        store: Arc<dyn ResourceStore>,
        resource: ManagedResource,
        namespace: impl Into<String>,
    ) -> Self {
        let namespace = namespace.into();
        Self {
            catalog,
            lister: ResourceLister::new(store.clone()),
            mutator: ResourceMutator::new(store),
            planner: MigrationPlanner::new(resource.clone(), namespace.clone()),
            resource,
            namespace,
            selection: Selection::default(),
        }
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_field_policy(mut self, policy: FieldPolicy) -> Self {
        self.planner = self.planner.with_policy(policy);
        self
    }

    pub async fn select_target(&self) -> Result<TargetSelection, RunError> {
        select_target(self.catalog.as_ref(), &self.selection).await
    }

    /// Full pass. A store failure mid-run stops processing and is reported in
    /// [`RunReport::abort`]; migrations already completed are kept.
    pub async fn run(&self) -> Result<RunReport, RunError> {
        self.execute(false).await
    }

    /// Same pass without any store writes; migrations are reported as `Planned`.
    pub async fn plan_only(&self) -> Result<RunReport, RunError> {
        self.execute(true).await
    }

    async fn execute(&self, dry_run: bool) -> Result<RunReport, RunError> {
        let t0 = Instant::now();
        let target = self.select_target().await?.target;
        let records = self.lister.list(&self.resource, &self.namespace).await?;
        let mut report = RunReport::new(&self.namespace, &target, dry_run);

        for (idx, record) in records.iter().enumerate() {
            let name = record.name().or_empty().to_string();
            let region = record.region().or_empty().to_string();
            info!(name = %name, region = %region, "resource listed");

            let step = match self.planner.plan(record, &target) {
                Ok(MigrationAction::NoOp) => Ok(ResourceOutcome::Stable { name, region }),
                Ok(MigrationAction::Migrate { desired, obsolete_name }) if dry_run => {
                    info!(name = %obsolete_name, from = %region, to = %target, "would migrate");
                    Ok(ResourceOutcome::Planned { name: obsolete_name, from: region, to: target.clone(), desired })
                }
                Ok(MigrationAction::Migrate { desired, obsolete_name }) => {
                    self.migrate(&desired, obsolete_name, region, &target).await
                }
                Err(e) => Err(Abort { resource: name, region, stage: Stage::Planning, created: None, cause: AbortCause::Plan(e) }),
            };

            match step {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(abort) => {
                    counter!("deintensify_migration_failures_total", 1u64);
                    warn!(resource = %abort.resource, stage = ?abort.stage, created = ?abort.created, error = %abort.cause, "run aborted");
                    report.untouched = records[idx + 1..].iter().map(|r| r.name().or_empty().to_string()).collect();
                    report.abort = Some(abort);
                    break;
                }
            }
        }

        histogram!("deintensify_run_latency_ms", t0.elapsed().as_secs_f64() * 1000.0);
        Ok(report)
    }

    /// Create the replacement, then delete the obsolete record. Delete is only
    /// attempted once create has succeeded.
    async fn migrate(
        &self,
        desired: &ResourceRecord,
        obsolete_name: String,
        from: String,
        target: &str,
    ) -> Result<ResourceOutcome, Abort> {
        info!(name = %obsolete_name, from = %from, to = %target, "migrating: creating replacement");
        let created = match self.mutator.create(&self.resource, &self.namespace, desired).await {
            Ok(rec) => rec.name().or_empty().to_string(),
            Err(e) => {
                return Err(Abort {
                    resource: obsolete_name,
                    region: from,
                    stage: Stage::Creating,
                    created: None,
                    cause: AbortCause::Mutation(e),
                })
            }
        };
        info!(created = %created, "replacement created");

        if let Err(e) = self.mutator.delete(&self.resource, &self.namespace, &obsolete_name).await {
            return Err(Abort {
                resource: obsolete_name,
                region: from,
                stage: Stage::Deleting,
                created: Some(created),
                cause: AbortCause::Mutation(e),
            });
        }
        info!(name = %obsolete_name, "obsolete resource deleted");
        counter!("deintensify_migrations_total", 1u64);
        Ok(ResourceOutcome::Migrated { name: obsolete_name, from, to: target.to_string(), created })
    }
}
