//! Turning raw station records and config text into the globe's inputs

use anyhow::{Context, Result};
use stationglobe_core::{GlobeConfig, StationCatalog};

/// Parse the station list and optional observer list
pub fn catalog_from_json(stations: &str, observers: Option<&str>) -> Result<StationCatalog> {
    let catalog = StationCatalog::from_json(stations, observers).context("Failed to parse station records")?;
    tracing::info!(count = catalog.len(), "Loaded station records");
    Ok(catalog)
}

/// Parse a TOML configuration document
pub fn config_from_toml(content: &str) -> Result<GlobeConfig> {
    GlobeConfig::from_toml_str(content).context("Failed to parse globe configuration")
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::*;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::Path;

    use anyhow::{Context, Result};
    use stationglobe_core::StationCatalog;

    use super::catalog_from_json;

    /// Read station and observer files from disk; no station file gives an
    /// empty globe
    pub fn read_catalog(stations: Option<&Path>, observers: Option<&Path>) -> Result<StationCatalog> {
        let Some(stations) = stations else {
            tracing::warn!("No station file given, the globe will be empty");
            return Ok(StationCatalog::default());
        };

        let station_json = std::fs::read_to_string(stations)
            .with_context(|| format!("Failed to read stations from {}", stations.display()))?;
        let observer_json = observers
            .map(|path| {
                std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read observers from {}", path.display()))
            })
            .transpose()?;

        catalog_from_json(&station_json, observer_json.as_deref())
    }
}
