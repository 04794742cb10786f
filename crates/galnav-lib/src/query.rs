//! Query descriptors handed to resolvers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::provider::StationService;

/// User-facing families of queries. Route-management queries have none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryGroup {
    Galaxy,
    Missions,
    Services,
    Carrier,
}

/// Every query the navigation engine can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    // galaxy
    Scoop,
    Neutron,
    Set,
    // missions
    Expiring,
    Farthest,
    Most,
    Nearest,
    Route,
    Source,
    // services
    Encoded,
    Manufactured,
    Raw,
    Guardian,
    Human,
    Interstellar,
    Facilitator,
    BlackMarket,
    // carrier
    Carrier,
    // route management
    Cancel,
    Update,
}

impl QueryType {
    pub const ALL: [QueryType; 20] = [
        QueryType::Scoop,
        QueryType::Neutron,
        QueryType::Set,
        QueryType::Expiring,
        QueryType::Farthest,
        QueryType::Most,
        QueryType::Nearest,
        QueryType::Route,
        QueryType::Source,
        QueryType::Encoded,
        QueryType::Manufactured,
        QueryType::Raw,
        QueryType::Guardian,
        QueryType::Human,
        QueryType::Interstellar,
        QueryType::Facilitator,
        QueryType::BlackMarket,
        QueryType::Carrier,
        QueryType::Cancel,
        QueryType::Update,
    ];

    /// The group this query belongs to, `None` for route management.
    pub fn group(self) -> Option<QueryGroup> {
        match self {
            QueryType::Scoop | QueryType::Neutron | QueryType::Set => Some(QueryGroup::Galaxy),
            QueryType::Expiring
            | QueryType::Farthest
            | QueryType::Most
            | QueryType::Nearest
            | QueryType::Route
            | QueryType::Source => Some(QueryGroup::Missions),
            QueryType::Encoded
            | QueryType::Manufactured
            | QueryType::Raw
            | QueryType::Guardian
            | QueryType::Human
            | QueryType::Interstellar
            | QueryType::Facilitator
            | QueryType::BlackMarket => Some(QueryGroup::Services),
            QueryType::Carrier => Some(QueryGroup::Carrier),
            QueryType::Cancel | QueryType::Update => None,
        }
    }

    /// Facility searched for by a service query.
    pub fn station_service(self) -> Option<StationService> {
        let service = match self {
            QueryType::Encoded => StationService::EncodedMaterialTrader,
            QueryType::Manufactured => StationService::ManufacturedMaterialTrader,
            QueryType::Raw => StationService::RawMaterialTrader,
            QueryType::Guardian => StationService::GuardianTechBroker,
            QueryType::Human => StationService::HumanTechBroker,
            QueryType::Interstellar => StationService::InterstellarFactors,
            QueryType::Facilitator => StationService::Facilitator,
            QueryType::BlackMarket => StationService::BlackMarket,
            _ => return None,
        };
        Some(service)
    }

    /// Multi-hop plots that go through the route continuity check.
    pub fn is_continuity_checked(self) -> bool {
        matches!(
            self.group(),
            Some(QueryGroup::Galaxy) | Some(QueryGroup::Carrier)
        ) || self == QueryType::Route
    }

    /// Whether a route stored for `other` may stand in for a fresh `self` route.
    ///
    /// Galaxy queries share their plotted route. A mission circuit is only
    /// ever compared with another circuit.
    pub fn is_continuous_with(self, other: QueryType) -> bool {
        if !(self.is_continuity_checked() && other.is_continuity_checked()) {
            return false;
        }
        if self == QueryType::Route || other == QueryType::Route {
            return self == other;
        }
        self.group() == other.group()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryType::Scoop => "scoop",
            QueryType::Neutron => "neutron",
            QueryType::Set => "set",
            QueryType::Expiring => "expiring",
            QueryType::Farthest => "farthest",
            QueryType::Most => "most",
            QueryType::Nearest => "nearest",
            QueryType::Route => "route",
            QueryType::Source => "source",
            QueryType::Encoded => "encoded",
            QueryType::Manufactured => "manufactured",
            QueryType::Raw => "raw",
            QueryType::Guardian => "guardian",
            QueryType::Human => "human",
            QueryType::Interstellar => "interstellar",
            QueryType::Facilitator => "facilitator",
            QueryType::BlackMarket => "black_market",
            QueryType::Carrier => "carrier",
            QueryType::Cancel => "cancel",
            QueryType::Update => "update",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        QueryType::ALL
            .into_iter()
            .find(|q| q.as_str() == normalized)
            .ok_or_else(|| Error::InvalidQueryType {
                value: s.to_string(),
            })
    }
}

/// Immutable request descriptor. Each resolver interprets its own arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub query_type: QueryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg0: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<bool>,
    #[serde(default)]
    pub from_ui: bool,
}

impl Query {
    /// Convenience constructor for an argument-less, automatic query.
    pub fn new(query_type: QueryType) -> Self {
        Self {
            query_type,
            arg0: None,
            arg1: None,
            numeric: None,
            flag: None,
            from_ui: false,
        }
    }

    pub fn with_arg0(mut self, value: impl Into<String>) -> Self {
        self.arg0 = Some(value.into());
        self
    }

    pub fn with_arg1(mut self, value: impl Into<String>) -> Self {
        self.arg1 = Some(value.into());
        self
    }

    pub fn with_numeric(mut self, value: f64) -> Self {
        self.numeric = Some(value);
        self
    }

    pub fn with_flag(mut self, value: bool) -> Self {
        self.flag = Some(value);
        self
    }

    pub fn from_ui(mut self) -> Self {
        self.from_ui = true;
        self
    }

    /// First string argument, ignoring blank values.
    pub fn arg0(&self) -> Option<&str> {
        non_blank(self.arg0.as_deref())
    }

    /// Second string argument, ignoring blank values.
    pub fn arg1(&self) -> Option<&str> {
        non_blank(self.arg1.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
