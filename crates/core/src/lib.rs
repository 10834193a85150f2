//! Deintensify core types: carbon regions, unstructured resource records and
//! the pure migration planner.

#![forbid(unsafe_code)]

pub mod error;
pub mod planner;
pub mod record;
pub mod region;
pub mod store;

pub use error::{
    CatalogError, EmptyCatalogError, ListError, MutationError, MutationOp, PlanError, StoreError,
    StoreErrorKind,
};
pub use planner::{FieldPolicy, MigrationAction, MigrationPlanner};
pub use record::{Field, ResourceRecord};
pub use region::{select, select_for_provider, sort_by_intensity, CarbonRegion};
pub use store::{ManagedResource, ResourceStore, ResourceType};
