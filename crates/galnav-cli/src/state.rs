//! Traveller state snapshot files.
//!
//! The CLI has no live game feed; the commander's position, ship, carrier and
//! missions come from a JSON file instead:
//!
//! ```json
//! {
//!   "current_system": "Sol",
//!   "ship": {"name": "Anaconda", "jump_range_ly": 30.0, "landing_pad": "large"},
//!   "carrier": {"name": "Jenner", "current_system": "Maia", "used_capacity": 1200},
//!   "missions": [{"id": 1, "origin_system": "Sol", "destination_systems": ["Lave"]}]
//! }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use galnav_lib::{FleetCarrier, Mission, Ship, StarCatalog, TravellerSnapshot};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateFile {
    #[serde(default)]
    pub current_system: Option<String>,
    #[serde(default)]
    pub ship: Option<Ship>,
    #[serde(default)]
    pub carrier: Option<FleetCarrier>,
    #[serde(default)]
    pub missions: Vec<Mission>,
}

impl StateFile {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes =
            fs::read(path).with_context(|| format!("failed to read state file {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse state file {}", path.display()))
    }

    /// Resolve the current system against the catalogue.
    ///
    /// A misspelt system is an error with suggestions rather than an unknown
    /// position.
    pub fn into_snapshot(self, catalog: &StarCatalog) -> Result<TravellerSnapshot> {
        let current_system = self
            .current_system
            .as_deref()
            .map(|name| catalog.require_system(name))
            .transpose()
            .context("current system in state file")?;

        Ok(TravellerSnapshot {
            current_system,
            ship: self.ship,
            carrier: self.carrier,
            missions: self.missions,
        })
    }
}
