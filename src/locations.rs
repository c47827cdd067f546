//! Region → commune lookup dataset.
//!
//! Loaded once at startup and kept as process-wide read-only state.

use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;

use crate::error::{Result, UsersError};
use crate::types::Region;

const EMBEDDED: &str = include_str!("../data/chilean-locations.json");

static INSTALLED: OnceLock<Locations> = OnceLock::new();

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Locations {
    #[serde(rename = "regiones")]
    regions: Vec<Region>,
}

impl Locations {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(UsersError::LocationsParse)
    }

    /// The Chilean dataset compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| UsersError::LocationsRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&contents)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Exact-match lookup by region name.
    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.name == name)
    }

    pub fn communes(&self, region: &str) -> &[String] {
        self.region(region)
            .map(|r| r.communes.as_slice())
            .unwrap_or(&[])
    }
}

/// Load the dataset (from `path` if given, otherwise the embedded one) and
/// install it for the rest of the process. Later calls return the first
/// installed dataset.
pub fn install(path: Option<&Path>) -> Result<&'static Locations> {
    if let Some(installed) = INSTALLED.get() {
        return Ok(installed);
    }

    let locations = match path {
        Some(path) => Locations::from_file(path)?,
        None => Locations::embedded()?,
    };
    tracing::debug!(
        regions = locations.regions.len(),
        source = %path.map(|p| p.display().to_string()).unwrap_or_else(|| "embedded".to_string()),
        "loaded locations"
    );

    Ok(INSTALLED.get_or_init(|| locations))
}
