//! Deintensify reconcile: one batch pass that moves every resource of a type
//! into the lowest-carbon region.
//!
//! The pass is not transactional. Records created, deleted or changed in the
//! store after the initial list are not observed until the next pass.

#![forbid(unsafe_code)]

mod lister;
mod mutator;
mod reconciler;
mod report;

pub use lister::ResourceLister;
pub use mutator::ResourceMutator;
pub use reconciler::{select_target, Reconciler, Selection, TargetSelection};
pub use report::{Abort, AbortCause, ResourceOutcome, RunReport, Stage};

use deintensify_core::{CatalogError, EmptyCatalogError, ListError};

/// Failures that stop a run before any resource is mutated.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("intensity catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    EmptyCatalog(#[from] EmptyCatalogError),
    #[error(transparent)]
    List(#[from] ListError),
}
