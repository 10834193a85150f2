//! Carbon regions and target selection.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::EmptyCatalogError;

/// Grid carbon intensity of one region.
///
/// Wire shape matches the Cloud Carbon Footprint emissions feed:
/// `{"region": "...", "mtPerKwHour": 0.0, "cloudProvider": "GCP"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CarbonRegion {
    #[serde(rename = "region")]
    pub name: String,
    #[serde(rename = "mtPerKwHour")]
    pub intensity: f64,
    /// Provider tag, when the feed mixes several clouds.
    #[serde(rename = "cloudProvider", default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl CarbonRegion {
    pub fn new(name: impl Into<String>, intensity: f64) -> Self {
        Self { name: name.into(), intensity, provider: None }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }
}

/// Stable ascending sort by intensity; ties keep catalog order.
/// `-0.0` and `0.0` compare equal.
pub fn sort_by_intensity(regions: &mut [CarbonRegion]) {
    regions.sort_by(|a, b| a.intensity.partial_cmp(&b.intensity).unwrap_or(Ordering::Equal));
}

/// Return the region at position `skip` once the catalog is ordered by intensity.
pub fn select(catalog: &[CarbonRegion], skip: usize) -> Result<String, EmptyCatalogError> {
    let mut ordered = catalog.to_vec();
    sort_by_intensity(&mut ordered);
    ordered
        .get(skip)
        .map(|r| r.name.clone())
        .ok_or(EmptyCatalogError { len: catalog.len(), skip })
}

/// Like [`select`], but only entries tagged with `provider` are candidates.
/// Provider tags compare case-insensitively; untagged entries never match.
pub fn select_for_provider(
    catalog: &[CarbonRegion],
    provider: &str,
    skip: usize,
) -> Result<String, EmptyCatalogError> {
    let candidates: Vec<CarbonRegion> = catalog
        .iter()
        .filter(|r| r.provider.as_deref().is_some_and(|p| p.eq_ignore_ascii_case(provider)))
        .cloned()
        .collect();
    select(&candidates, skip)
}
