//! Administrative regions, nationwide expansion and GeoJSON boundaries.

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::JobAd;

/// Region value marking an ad that is advertised in every region.
pub const NATIONWIDE: &str = "bundesweit";

/// Country whose regions are offered as region options.
pub const HOME_COUNTRY: &str = "Deutschland";

/// The 16 German federal states, as spelled in the snapshot and the GeoJSON.
pub const ADMINISTRATIVE_REGIONS: [&str; 16] = [
    "Baden-Württemberg",
    "Bayern",
    "Berlin",
    "Brandenburg",
    "Bremen",
    "Hamburg",
    "Hessen",
    "Mecklenburg-Vorpommern",
    "Niedersachsen",
    "Nordrhein-Westfalen",
    "Rheinland-Pfalz",
    "Saarland",
    "Sachsen",
    "Sachsen-Anhalt",
    "Schleswig-Holstein",
    "Thüringen",
];

pub fn is_nationwide(ad: &JobAd) -> bool {
    ad.region.as_deref() == Some(NATIONWIDE)
}

/// Replaces every nationwide ad with one copy per administrative region.
///
/// All other rows pass through unchanged and in order; the synthetic copies
/// are appended after them. Every regional count goes through this function.
///
/// # Examples
///
/// ```
/// use jobscope_core::geo::{expand_nationwide, NATIONWIDE};
/// use jobscope_core::JobAd;
///
/// let ad = JobAd {
///     id: "X".to_string(),
///     region: Some(NATIONWIDE.to_string()),
///     ..Default::default()
/// };
/// let expanded = expand_nationwide(&[ad]);
/// assert_eq!(expanded.len(), 16);
/// assert!(expanded.iter().all(|row| row.id == "X"));
/// ```
pub fn expand_nationwide(ads: &[JobAd]) -> Vec<JobAd> {
    let (nationwide, regional): (Vec<&JobAd>, Vec<&JobAd>) =
        ads.iter().partition(|ad| is_nationwide(ad));
    let mut rows: Vec<JobAd> = regional.into_iter().cloned().collect();

    rows.reserve(nationwide.len() * ADMINISTRATIVE_REGIONS.len());
    for ad in nationwide {
        for region in ADMINISTRATIVE_REGIONS {
            let mut copy = ad.clone();
            copy.region = Some(region.to_string());
            rows.push(copy);
        }
    }

    rows
}

/// Region geometries keyed by `properties.name`.
#[derive(Debug, Clone, Default)]
pub struct RegionBoundaries {
    regions: BTreeMap<String, Value>,
}

impl RegionBoundaries {
    /// Parses a GeoJSON `FeatureCollection`.
    ///
    /// Features without a string `properties.name` are skipped with a warning.
    pub fn from_geojson(text: &str) -> Result<Self, AppError> {
        let doc: Value = serde_json::from_str(text)?;

        let features = doc
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| AppError::InvalidGeoJson("no 'features' array".into()))?;

        let mut regions = BTreeMap::new();
        for (index, feature) in features.iter().enumerate() {
            let name = feature
                .get("properties")
                .and_then(|p| p.get("name"))
                .and_then(Value::as_str);
            match name {
                Some(name) => {
                    let geometry = feature.get("geometry").cloned().unwrap_or(Value::Null);
                    regions.insert(name.to_string(), geometry);
                }
                None => warn!("GeoJSON feature {} has no properties.name, skipping", index),
            }
        }

        Ok(Self { regions })
    }

    /// Reads and parses a GeoJSON file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path)?;
        let boundaries = Self::from_geojson(&text)?;
        info!(
            "Loaded {} region boundaries from {}",
            boundaries.len(),
            path.display()
        );
        Ok(boundaries)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.regions.contains_key(name)
    }

    pub fn geometry(&self, name: &str) -> Option<&Value> {
        self.regions.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }
}
