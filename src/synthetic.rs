//! Synthetic GPS streams for stress testing and benchmarking.
//!
//! Generates a timestamped stream of fixes that alternates between dwells
//! (noisy fixes around a fixed point) and travel legs, together with the
//! ground-truth dwell intervals.
//!
//! Feature-gated behind `synthetic`; not included in production builds.
//!
//! # Example
//!
//! ```rust
//! use staymatch::synthetic::{DwellScenario, Leg};
//! use staymatch::GpsPoint;
//!
//! let scenario = DwellScenario {
//!     origin: GpsPoint::new(47.37, 8.55),
//!     legs: vec![
//!         Leg::Travel { duration_secs: 120.0, speed_mps: 10.0, heading_degrees: 90.0 },
//!         Leg::Dwell { duration_secs: 300.0 },
//!     ],
//!     sample_interval_secs: 5.0,
//!     gps_noise_sigma_meters: 3.0,
//!     eps_meters: 25.0,
//!     seed: 42,
//! };
//!
//! let stream = scenario.generate();
//! assert_eq!(stream.fixes.len(), 84);
//! assert_eq!(stream.dwells.len(), 1);
//! ```

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geo_utils::{meters_to_deg_lat, meters_to_deg_lng};
use crate::{GpsObservation, GpsPoint};

// ============================================================================
// Types
// ============================================================================

/// One leg of a synthetic day.
#[derive(Debug, Clone, Copy)]
pub enum Leg {
    /// Stay put (apart from GPS noise).
    Dwell { duration_secs: f64 },
    /// Move in a straight line.
    Travel {
        duration_secs: f64,
        speed_mps: f64,
        /// Compass heading, 0 = north, 90 = east
        heading_degrees: f64,
    },
}

impl Leg {
    pub fn duration_secs(&self) -> f64 {
        match *self {
            Leg::Dwell { duration_secs } | Leg::Travel { duration_secs, .. } => duration_secs,
        }
    }
}

/// Ground truth for one dwell leg.
#[derive(Debug, Clone, Copy)]
pub struct DwellTruth {
    pub start: f64,
    pub end: f64,
    pub center: GpsPoint,
}

/// A generated stream with its ground truth.
#[derive(Debug, Clone)]
pub struct SyntheticStream {
    /// `(timestamp, fix)` pairs in time order
    pub fixes: Vec<(f64, GpsObservation)>,
    pub dwells: Vec<DwellTruth>,
}

/// Scenario configuration for generating a stream.
#[derive(Debug, Clone)]
pub struct DwellScenario {
    /// Starting point of the stream.
    pub origin: GpsPoint,
    pub legs: Vec<Leg>,
    /// Seconds between consecutive fixes.
    pub sample_interval_secs: f64,
    /// GPS noise standard deviation in meters.
    pub gps_noise_sigma_meters: f64,
    /// Neighbor radius attached to every fix.
    pub eps_meters: f64,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

// ============================================================================
// Helpers
// ============================================================================

/// Offset `point` by Gaussian noise of `sigma_meters`.
fn add_gps_noise(point: &GpsPoint, sigma_meters: f64, rng: &mut StdRng) -> GpsPoint {
    if sigma_meters <= 0.0 {
        return *point;
    }

    // Box-Muller transform for Gaussian noise
    let u1: f64 = rng.gen_range(0.0001..1.0);
    let u2: f64 = rng.r#gen();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    let z1 = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).sin();

    GpsPoint::new(
        point.latitude + meters_to_deg_lat(z0 * sigma_meters),
        point.longitude + meters_to_deg_lng(z1 * sigma_meters, point.latitude),
    )
}

/// Move `point` by `meters` along `heading_degrees`.
fn advance(point: &GpsPoint, meters: f64, heading_degrees: f64) -> GpsPoint {
    let heading = heading_degrees.to_radians();
    GpsPoint::new(
        point.latitude + meters_to_deg_lat(meters * heading.cos()),
        point.longitude + meters_to_deg_lng(meters * heading.sin(), point.latitude),
    )
}

// ============================================================================
// Scenario Implementation
// ============================================================================

impl DwellScenario {
    /// Total duration of all legs in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.legs.iter().map(Leg::duration_secs).sum()
    }

    /// Generate the stream. Each leg contributes
    /// `floor(duration / sample_interval)` fixes.
    pub fn generate(&self) -> SyntheticStream {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut fixes = Vec::new();
        let mut dwells = Vec::new();

        let mut position = self.origin;
        let mut clock = 0.0;

        for leg in &self.legs {
            let samples = (leg.duration_secs() / self.sample_interval_secs) as usize;
            let start = clock;

            for _ in 0..samples {
                if let Leg::Travel {
                    speed_mps,
                    heading_degrees,
                    ..
                } = *leg
                {
                    position = advance(
                        &position,
                        speed_mps * self.sample_interval_secs,
                        heading_degrees,
                    );
                }
                let noisy = add_gps_noise(&position, self.gps_noise_sigma_meters, &mut rng);
                fixes.push((clock, GpsObservation::from_point(noisy, self.eps_meters)));
                clock += self.sample_interval_secs;
            }

            if let Leg::Dwell { .. } = leg {
                dwells.push(DwellTruth {
                    start,
                    end: clock,
                    center: position,
                });
            }
        }

        SyntheticStream { fixes, dwells }
    }
}
