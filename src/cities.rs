//! Ground-station metadata: city id to display name and coordinates.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::error::VizError;

/// One row of the city detail file:
/// `id,name,latitude_deg,longitude_deg,elevation_m`, no header.
#[derive(Debug, Clone, Deserialize)]
pub struct CityDetail {
    pub id: u32,
    pub name: String,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub elevation_m: f64,
}

/// Lookup table keyed by ground-station id.
#[derive(Debug, Default)]
pub struct CityDetails {
    cities: HashMap<u32, CityDetail>,
}

impl CityDetails {
    /// Loads the city detail file.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .with_context(|| format!("opening city detail file {}", path.display()))?;

        let mut cities = HashMap::new();
        for record in reader.deserialize() {
            let city: CityDetail =
                record.with_context(|| format!("malformed city row in {}", path.display()))?;
            cities.insert(city.id, city);
        }

        debug!(cities = cities.len(), "City details loaded");
        Ok(Self { cities })
    }

    pub fn from_rows(rows: Vec<CityDetail>) -> Self {
        Self {
            cities: rows.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Resolves a ground-station id to its city record.
    pub fn get(&self, gs_id: u32) -> Result<&CityDetail, VizError> {
        self.cities
            .get(&gs_id)
            .ok_or(VizError::UnknownGroundStation { gs_id })
    }
}
