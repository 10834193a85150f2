use deintensify_core::CarbonRegion;

/// Google's published grid carbon intensity (gCO2eq/kWh) per GCP region.
pub(crate) const GCP_REGIONS: &[(&str, f64)] = &[
    ("asia-east1", 456.0),
    ("asia-east2", 360.0),
    ("asia-northeast1", 464.0),
    ("asia-northeast2", 384.0),
    ("asia-northeast3", 425.0),
    ("asia-south1", 670.0),
    ("asia-south2", 671.0),
    ("asia-southeast1", 372.0),
    ("asia-southeast2", 580.0),
    ("australia-southeast1", 598.0),
    ("australia-southeast2", 521.0),
    ("europe-central2", 576.0),
    ("europe-north1", 127.0),
    ("europe-southwest1", 121.0),
    ("europe-west1", 110.0),
    ("europe-west2", 172.0),
    ("europe-west3", 269.0),
    ("europe-west4", 283.0),
    ("europe-west6", 86.0),
    ("europe-west8", 298.0),
    ("europe-west9", 59.0),
    ("northamerica-northeast1", 0.0),
    ("northamerica-northeast2", 29.0),
    ("southamerica-east1", 129.0),
    ("southamerica-west1", 190.0),
    ("us-central1", 394.0),
    ("us-east1", 434.0),
    ("us-east4", 309.0),
    ("us-east5", 309.0),
    ("us-south1", 296.0),
    ("us-west1", 60.0),
    ("us-west2", 190.0),
    ("us-west3", 448.0),
    ("us-west4", 365.0),
];

pub(crate) const PROVIDER: &str = "GCP";

pub(crate) fn regions() -> Vec<CarbonRegion> {
    GCP_REGIONS
        .iter()
        .map(|(name, intensity)| CarbonRegion::new(*name, *intensity).with_provider(PROVIDER))
        .collect()
}
