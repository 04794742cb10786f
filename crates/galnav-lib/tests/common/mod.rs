#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use galnav_lib::{
    load_catalog, FleetCarrier, LandingPadSize, Mission, Ship, StarCatalog, StarSystemProvider,
    TravellerSnapshot,
};

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

pub fn catalog() -> StarCatalog {
    load_catalog(&fixtures_dir().join("catalog.json")).expect("fixture catalogue loads")
}

/// Missions from the fixture state file.
pub fn fixture_missions() -> Vec<Mission> {
    let bytes = fs::read(fixtures_dir().join("state.json")).expect("read state fixture");
    let value: serde_json::Value = serde_json::from_slice(&bytes).expect("state fixture is JSON");
    serde_json::from_value(value["missions"].clone()).expect("fixture missions parse")
}

/// Commander in `system` flying a large-pad ship with a 30 ly range.
pub fn snapshot_at(catalog: &StarCatalog, system: &str) -> TravellerSnapshot {
    TravellerSnapshot {
        current_system: catalog.system_by_name(system),
        ship: Some(Ship {
            name: "Anaconda".to_string(),
            jump_range_ly: 30.0,
            landing_pad: LandingPadSize::Large,
        }),
        carrier: Some(FleetCarrier {
            name: "Jenner".to_string(),
            current_system: Some("Maia".to_string()),
            used_capacity: 1200,
        }),
        missions: fixture_missions(),
    }
}
