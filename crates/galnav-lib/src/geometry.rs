//! Euclidean geometry in galactic light-year coordinates.
//!
//! All route costs in the engine are straight-line distances between star
//! systems. Coordinates coming from the data provider may be incomplete, so
//! the general form [`Coordinates`] carries optional axes and [`distance`]
//! returns `None` whenever either side is missing an axis. Callers that rank
//! candidates pick an explicit [`DistancePolicy`] for those incomparable pairs.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Cartesian coordinates for a star system, in light-years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SystemPosition {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Calculate the Euclidean distance to another position.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Coordinates as an array, the layout used by the KD-tree index.
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Possibly incomplete coordinates as reported by the data provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

impl Coordinates {
    /// The complete position, or `None` when any axis is unknown.
    pub fn position(&self) -> Option<SystemPosition> {
        Some(SystemPosition {
            x: self.x?,
            y: self.y?,
            z: self.z?,
        })
    }
}

impl From<SystemPosition> for Coordinates {
    fn from(position: SystemPosition) -> Self {
        Self {
            x: Some(position.x),
            y: Some(position.y),
            z: Some(position.z),
        }
    }
}

/// Distance between two coordinate triples, `None` if either is incomplete.
pub fn distance(a: &Coordinates, b: &Coordinates) -> Option<f64> {
    Some(a.position()?.distance_to(&b.position()?))
}

/// How a ranking treats a pair whose distance cannot be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistancePolicy {
    /// Drop the candidate from the ranking entirely.
    #[default]
    Exclude,
    /// Rank the candidate as if it were adjacent (distance zero).
    TreatAsZero,
}

impl DistancePolicy {
    /// Apply the policy to a computed distance.
    pub fn apply(self, distance: Option<f64>) -> Option<f64> {
        match (self, distance) {
            (_, Some(d)) => Some(d),
            (DistancePolicy::Exclude, None) => None,
            (DistancePolicy::TreatAsZero, None) => Some(0.0),
        }
    }
}

/// Total order over distances; NaN sorts last.
pub(crate) fn compare_distance(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Greater)
}
