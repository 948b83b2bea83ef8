//! The observation capability consumed by the window and the clusterer.
//!
//! The clusterer never looks inside an observation. It only asks for the
//! distance to another observation of the same kind and for the epsilon
//! threshold under which two observations count as neighbors.

use serde::{Deserialize, Serialize};

use crate::GpsPoint;
use crate::geo_utils::haversine_distance;

/// A single timestamped sensor reading, minus the timestamp.
pub trait Observation {
    /// Distance to `other`. Non-negative, symmetric, zero for identical readings.
    fn distance_from(&self, other: &Self) -> f64;

    /// Neighbor threshold for this kind of reading. Positive.
    fn epsilon(&self) -> f64;
}

/// A GPS fix with a neighbor radius in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsObservation {
    pub point: GpsPoint,
    /// Fixes closer than this are neighbors.
    pub eps_meters: f64,
}

impl GpsObservation {
    /// Create a fix from raw coordinates and a neighbor radius in meters.
    pub fn new(latitude: f64, longitude: f64, eps_meters: f64) -> Self {
        Self {
            point: GpsPoint::new(latitude, longitude),
            eps_meters,
        }
    }

    /// Wrap an existing point with a neighbor radius in meters.
    pub fn from_point(point: GpsPoint, eps_meters: f64) -> Self {
        Self { point, eps_meters }
    }
}

impl Observation for GpsObservation {
    fn distance_from(&self, other: &Self) -> f64 {
        haversine_distance(&self.point, &other.point)
    }

    fn epsilon(&self) -> f64 {
        self.eps_meters
    }
}
