//! Read-only mission records consumed by the mission resolvers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a mission.
pub type MissionId = i64;

/// Lifecycle state of a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    #[default]
    Active,
    Complete,
    Failed,
    Claim,
}

/// A mission as reported by the external state store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: MissionId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: MissionStatus,
    pub origin_system: String,
    /// Completion requires travelling back to the origin system.
    #[serde(default)]
    pub return_to_origin: bool,
    /// Destination alternatives; any one of them satisfies the mission.
    #[serde(default)]
    pub destination_systems: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
    /// Whether the mission takes part in multi-stop route planning.
    #[serde(default = "default_route_eligible")]
    pub route_eligible: bool,
}

fn default_route_eligible() -> bool {
    true
}

impl Mission {
    pub fn is_active(&self) -> bool {
        self.status == MissionStatus::Active
    }

    /// Whether `system` is one of this mission's destinations.
    pub fn has_destination(&self, system: &str) -> bool {
        self.destination_systems
            .iter()
            .any(|d| d.eq_ignore_ascii_case(system))
    }

    pub fn has_origin(&self, system: &str) -> bool {
        self.origin_system.eq_ignore_ascii_case(system)
    }
}

/// Active missions, in list order.
pub fn active_missions(missions: &[Mission]) -> impl Iterator<Item = &Mission> {
    missions.iter().filter(|m| m.is_active())
}

/// Ids of active missions served by stopping in `system`, either as a
/// destination or, for return-to-origin missions, as the origin.
pub fn mission_ids_for_system(missions: &[Mission], system: &str) -> Vec<MissionId> {
    active_missions(missions)
        .filter(|m| m.has_destination(system) || (m.return_to_origin && m.has_origin(system)))
        .map(|m| m.id)
        .collect()
}
