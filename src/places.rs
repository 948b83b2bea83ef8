//! Place clustering collaborator.
//!
//! The clusterer hands every motion-to-stationary transition to a
//! [`PlaceClusterer`] as a stationary episode. What happens next (which
//! long-term place the episode belongs to) is the collaborator's business.
//!
//! [`PlaceRegistry`] is the reference implementation for GPS fixes: episodes
//! are reduced to their centroid and merged into the nearest known place
//! within a radius, or registered as a new place.

use std::fmt;

use log::{debug, info, warn};
use rstar::RTree;
use rstar::primitives::GeomWithData;
use serde::{Deserialize, Serialize};

use crate::geo_utils::{centroid, haversine_distance};
use crate::{GpsObservation, GpsPoint};

/// Identifier returned by a place clusterer.
pub type PlaceId = u64;

/// In-progress accumulation of the observations of one dwell.
pub trait StationaryEpisode<O> {
    fn add_observation(&mut self, observation: &O);
}

/// Receives finalized stationary episodes and assigns them to places.
pub trait PlaceClusterer<O> {
    type Episode: StationaryEpisode<O>;

    /// Start an episode whose first stationary fix is at `timestamp`.
    fn new_episode(&mut self, timestamp: f64) -> Self::Episode;

    /// Take ownership of a finished episode and return its place.
    fn submit(&mut self, episode: Self::Episode) -> PlaceId;

    /// Human-readable snapshot of the current places.
    fn describe(&self) -> String;
}

// ============================================================================
// GPS reference implementation
// ============================================================================

/// Stationary episode made of GPS fixes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsEpisode {
    /// Timestamp of the first stationary fix
    pub started_at: f64,
    pub points: Vec<GpsPoint>,
}

impl GpsEpisode {
    pub fn new(started_at: f64) -> Self {
        Self {
            started_at,
            points: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn centroid(&self) -> Option<GpsPoint> {
        centroid(&self.points)
    }
}

impl StationaryEpisode<GpsObservation> for GpsEpisode {
    fn add_observation(&mut self, observation: &GpsObservation) {
        self.points.push(observation.point);
    }
}

/// Configuration for the place registry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaceRegistryConfig {
    /// Episodes whose centroid falls within this distance of a known place
    /// are merged into it.
    /// Default: 50.0 meters
    pub merge_radius_meters: f64,
}

impl Default for PlaceRegistryConfig {
    fn default() -> Self {
        Self {
            merge_radius_meters: 50.0,
        }
    }
}

/// A significant location built from one or more episodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    /// Running mean of all fixes merged into the place
    pub center: GpsPoint,
    pub visits: u32,
    pub observation_count: usize,
    pub first_visit: f64,
    pub last_visit: f64,
}

type IndexedCenter = GeomWithData<[f64; 2], usize>;

fn indexed(center: &GpsPoint, idx: usize) -> IndexedCenter {
    GeomWithData::new([center.longitude, center.latitude], idx)
}

/// In-memory place clusterer for GPS episodes.
#[derive(Debug)]
pub struct PlaceRegistry {
    config: PlaceRegistryConfig,
    places: Vec<Place>,
    index: RTree<IndexedCenter>,
    next_id: PlaceId,
}

impl Default for PlaceRegistry {
    fn default() -> Self {
        Self::new(PlaceRegistryConfig::default())
    }
}

impl PlaceRegistry {
    pub fn new(config: PlaceRegistryConfig) -> Self {
        Self {
            config,
            places: Vec::new(),
            index: RTree::new(),
            next_id: 1,
        }
    }

    pub fn config(&self) -> &PlaceRegistryConfig {
        &self.config
    }

    /// All known places, in registration order.
    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn get(&self, id: PlaceId) -> Option<&Place> {
        self.places.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Known place within the merge radius of `point`, if any.
    ///
    /// The R-tree finds the nearest center in degree space; the radius is
    /// then checked in meters.
    pub fn find_nearby(&self, point: &GpsPoint) -> Option<&Place> {
        self.nearby_index(point).map(|idx| &self.places[idx])
    }

    fn nearby_index(&self, point: &GpsPoint) -> Option<usize> {
        let nearest = self
            .index
            .nearest_neighbor(&[point.longitude, point.latitude])?;
        let place = &self.places[nearest.data];
        (haversine_distance(&place.center, point) <= self.config.merge_radius_meters)
            .then_some(nearest.data)
    }

    fn allocate_id(&mut self) -> PlaceId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn merge(&mut self, idx: usize, center: GpsPoint, episode: &GpsEpisode) -> PlaceId {
        let place = &mut self.places[idx];
        self.index.remove(&indexed(&place.center, idx));

        let old = place.observation_count as f64;
        let new = episode.len() as f64;
        let total = old + new;
        place.center = GpsPoint::new(
            (place.center.latitude * old + center.latitude * new) / total,
            (place.center.longitude * old + center.longitude * new) / total,
        );
        place.visits += 1;
        place.observation_count += episode.len();
        place.last_visit = place.last_visit.max(episode.started_at);

        self.index.insert(indexed(&place.center, idx));
        debug!("merged episode into place {} ({} visits)", place.id, place.visits);
        place.id
    }
}

impl PlaceClusterer<GpsObservation> for PlaceRegistry {
    type Episode = GpsEpisode;

    fn new_episode(&mut self, timestamp: f64) -> GpsEpisode {
        GpsEpisode::new(timestamp)
    }

    fn submit(&mut self, episode: GpsEpisode) -> PlaceId {
        let Some(center) = episode.centroid() else {
            let id = self.allocate_id();
            warn!(
                "empty episode at t={}, issued place {} without a location",
                episode.started_at, id
            );
            return id;
        };

        if let Some(idx) = self.nearby_index(&center) {
            return self.merge(idx, center, &episode);
        }

        let id = self.allocate_id();
        let idx = self.places.len();
        self.places.push(Place {
            id,
            center,
            visits: 1,
            observation_count: episode.len(),
            first_visit: episode.started_at,
            last_visit: episode.started_at,
        });
        self.index.insert(indexed(&center, idx));
        info!(
            "new place {} at ({:.6}, {:.6})",
            id, center.latitude, center.longitude
        );
        id
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PlaceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} places", self.places.len())?;
        for place in &self.places {
            writeln!(
                f,
                "  place {}: ({:.6}, {:.6}) visits={} fixes={} last={}",
                place.id,
                place.center.latitude,
                place.center.longitude,
                place.visits,
                place.observation_count,
                place.last_visit
            )?;
        }
        Ok(())
    }
}
