//! Error taxonomy shared by the catalog, the store adapters and the reconciler.

use serde::{Deserialize, Serialize};

/// Failure while fetching the intensity catalog.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum CatalogError {
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("decode: {0}")]
    Decode(String),
}

/// No region could be selected from the catalog.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("no target region: catalog has {len} candidate(s), skip={skip}")]
pub struct EmptyCatalogError {
    pub len: usize,
    pub skip: usize,
}

/// Classification of a resource store failure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreErrorKind {
    Conflict,
    NotFound,
    Forbidden,
    Transport,
}

impl StoreErrorKind {
    /// Classify an HTTP status code returned by the store API.
    pub fn from_status(code: u16) -> Self {
        match code {
            409 => Self::Conflict,
            404 => Self::NotFound,
            401 | 403 => Self::Forbidden,
            _ => Self::Transport,
        }
    }
}

impl std::fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::Transport => "transport",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }
}

/// Listing resources failed; nothing has been mutated yet.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("list {resource} in namespace {namespace}: {source}")]
pub struct ListError {
    pub resource: String,
    pub namespace: String,
    #[source]
    pub source: StoreError,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MutationOp {
    Create,
    Delete,
}

impl std::fmt::Display for MutationOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => f.write_str("create"),
            Self::Delete => f.write_str("delete"),
        }
    }
}

/// A create or delete request was rejected by the store.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("{op} {name}: {source}")]
pub struct MutationError {
    pub op: MutationOp,
    /// Obsolete record name for deletes, `generateName` prefix for creates.
    pub name: String,
    #[source]
    pub source: StoreError,
}

impl MutationError {
    pub fn kind(&self) -> StoreErrorKind {
        self.source.kind
    }
}

/// The planner could not build a desired record.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum PlanError {
    #[error("record {record} is missing required field {path}")]
    MissingField { record: String, path: String },
}
