//! Deintensify catalogs: where (region, intensity) pairs come from.
//!
//! Two sources are provided: a literal table of GCP regions, and the Cloud
//! Carbon Footprint style HTTP feed. Region selection does not care which one
//! produced the list.

#![forbid(unsafe_code)]

mod static_table;

use std::collections::HashSet;
use std::time::Duration;

use deintensify_core::{CarbonRegion, CatalogError};
use tracing::{debug, info};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:4000/emissions";
pub const USER_AGENT: &str = "deintensify-sample";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

#[async_trait::async_trait]
pub trait IntensityCatalog: Send + Sync {
    async fn fetch(&self) -> Result<Vec<CarbonRegion>, CatalogError>;
}

/// Hard-coded GCP intensities; never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCatalog;

impl StaticCatalog {
    pub fn new() -> Self {
        Self
    }

    pub fn regions(&self) -> Vec<CarbonRegion> {
        static_table::regions()
    }

    pub fn lookup(&self, region: &str) -> Option<f64> {
        static_table::GCP_REGIONS.iter().find(|(name, _)| *name == region).map(|(_, i)| *i)
    }
}

#[async_trait::async_trait]
impl IntensityCatalog for StaticCatalog {
    async fn fetch(&self) -> Result<Vec<CarbonRegion>, CatalogError> {
        Ok(self.regions())
    }
}

/// Emissions feed fetched with a single bounded GET.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    url: String,
    timeout: Duration,
}

impl HttpCatalog {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), timeout: DEFAULT_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for HttpCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[async_trait::async_trait]
impl IntensityCatalog for HttpCatalog {
    async fn fetch(&self) -> Result<Vec<CarbonRegion>, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CatalogError::Transport(format!("building http client: {}", e)))?;
        info!(url = %self.url, timeout_ms = self.timeout.as_millis() as u64, "fetching intensity catalog");
        let res = client.get(&self.url).send().await.map_err(classify)?;
        let res = res.error_for_status().map_err(classify)?;
        let body = res.bytes().await.map_err(classify)?;
        let regions: Vec<CarbonRegion> =
            serde_json::from_slice(&body).map_err(|e| CatalogError::Decode(e.to_string()))?;
        debug!(count = regions.len(), "intensity catalog decoded");
        validate(regions)
    }
}

fn classify(e: reqwest::Error) -> CatalogError {
    if e.is_timeout() {
        CatalogError::Timeout(e.to_string())
    } else if e.is_decode() {
        CatalogError::Decode(e.to_string())
    } else {
        CatalogError::Transport(e.to_string())
    }
}

/// Reject entries that break catalog invariants: negative or non-finite
/// intensities and repeated region names.
pub fn validate(regions: Vec<CarbonRegion>) -> Result<Vec<CarbonRegion>, CatalogError> {
    let mut seen = HashSet::with_capacity(regions.len());
    for r in &regions {
        if !r.intensity.is_finite() || r.intensity < 0.0 {
            return Err(CatalogError::Decode(format!("region {} has invalid intensity {}", r.name, r.intensity)));
        }
        if !seen.insert(r.name.as_str()) {
            return Err(CatalogError::Decode(format!("duplicate region {}", r.name)));
        }
    }
    Ok(regions)
}
