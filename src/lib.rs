//! # staymatch
//!
//! Online stationary/motion detection for streams of sensor fixes.
//!
//! This library provides:
//! - A bounded observation window with an incrementally maintained
//!   pairwise distance matrix (time-based or count-based eviction)
//! - A windowed density clusterer that votes motion vs. stationary on every
//!   new fix, with hysteresis between the two states
//! - Stationary episodes handed to a pluggable place clusterer
//! - A reference GPS observation type and an R-tree backed place registry
//!
//! ## Features
//!
//! - **`parallel`** - Count neighbors in parallel with rayon
//! - **`synthetic`** - Seeded dwell/travel stream generator for tests and benches
//! - **`cli`** - The `staymatch-cli` replay tool
//!
//! ## Quick Start
//!
//! ```rust
//! use staymatch::{GpsObservation, PlaceRegistry, WindowConfig, WindowedClusterer};
//!
//! let config = WindowConfig::count_based(20, 0.5);
//! let mut clusterer = WindowedClusterer::new(config, PlaceRegistry::default()).unwrap();
//!
//! // Sitting still: fixes a couple of meters apart
//! for i in 0..20 {
//!     let fix = GpsObservation::new(51.5074 + i as f64 * 0.00001, -0.1278, 50.0);
//!     let update = clusterer.process(i as f64, fix).unwrap();
//!     if let Some(place) = update.place_id {
//!         println!("stopped at place {}", place);
//!     }
//! }
//! assert!(!clusterer.is_moving());
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{Result, StayMatchError};

// Geographic utilities (distance, centroid, degree conversions)
pub mod geo_utils;

// Observation capability and the GPS reference type
pub mod observation;
pub use observation::{GpsObservation, Observation};

// Bounded observation window with the slot-indexed distance matrix
pub mod window;
pub use window::{DistanceMatrix, EvictionPolicy, ObservationWindow, SENTINEL, Slot, WindowEntry};

// Density clustering and the motion/stationary vote
pub mod clusterer;
pub use clusterer::{MotionState, MotionUpdate, PointStatus, Transition, WindowedClusterer};

// Place clusterer collaborator and the reference registry
pub mod places;
pub use places::{
    GpsEpisode, Place, PlaceClusterer, PlaceId, PlaceRegistry, PlaceRegistryConfig,
    StationaryEpisode,
};

// Synthetic dwell/travel streams
#[cfg(feature = "synthetic")]
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use staymatch::GpsPoint;
/// let point = GpsPoint::new(51.5074, -0.1278); // London
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for the observation window and the density vote.
///
/// Fixed at construction; a clusterer never changes it afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Evict by age (`true`) or by count (`false`).
    pub time_based_window: bool,

    /// Window length: seconds when time based, maximum pool size otherwise.
    /// Default: 120
    pub window_length: u32,

    /// Fraction of the pool that must lie within epsilon of a point for the
    /// point to be marked stationary. Must be in (0, 1].
    /// Default: 0.5
    pub delta: f64,

    /// Number of slots in the distance matrix. Hard upper bound on the pool
    /// size in both window modes.
    /// Default: 120
    pub capacity: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            time_based_window: true,
            window_length: 120,
            delta: 0.5,
            capacity: 120,
        }
    }
}

impl WindowConfig {
    /// Time-based window of `window_seconds`, holding at most `capacity` fixes.
    pub fn time_based(window_seconds: u32, capacity: usize, delta: f64) -> Self {
        Self {
            time_based_window: true,
            window_length: window_seconds,
            delta,
            capacity,
        }
    }

    /// Fixed-size FIFO window of `length` fixes.
    pub fn count_based(length: u32, delta: f64) -> Self {
        Self {
            time_based_window: false,
            window_length: length,
            delta,
            capacity: length as usize,
        }
    }

    /// Check that the configuration describes a usable window.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(StayMatchError::config("capacity", "must be positive"));
        }
        if self.window_length == 0 {
            return Err(StayMatchError::config("window_length", "must be positive"));
        }
        if !self.delta.is_finite() || self.delta <= 0.0 || self.delta > 1.0 {
            return Err(StayMatchError::config(
                "delta",
                format!("must be in (0, 1], got {}", self.delta),
            ));
        }
        Ok(())
    }

    /// The eviction policy selected by this configuration.
    pub fn eviction_policy(&self) -> EvictionPolicy {
        if self.time_based_window {
            EvictionPolicy::TimeBased {
                window_seconds: f64::from(self.window_length),
            }
        } else {
            EvictionPolicy::CountBased {
                max_entries: (self.window_length as usize).min(self.capacity),
            }
        }
    }
}
