//! # Windowed Density Clusterer
//!
//! Decides, on every new observation, which points of the current window
//! are stationary and whether the device as a whole is moving.
//!
//! Each call to [`WindowedClusterer::process`]:
//! 1. evicts stale entries and inserts the new observation,
//! 2. marks every point with enough eps-neighbors (and those neighbors) as
//!    stationary, using the epsilon of the newest observation,
//! 3. tallies a motion/stationary vote over the pool, oldest first,
//! 4. on a moving to stationary transition, builds one stationary episode
//!    from the stationary points and submits it to the place clusterer.
//!
//! Membership is recomputed from scratch on every call; the only state
//! carried between calls besides the window is the motion flag.

use log::{debug, info};
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::Result;
use crate::places::{PlaceClusterer, PlaceId, StationaryEpisode};
use crate::window::{DistanceMatrix, ObservationWindow, Slot};
use crate::{Observation, WindowConfig};

/// Motion state after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionState {
    Moving,
    Stationary,
}

/// State change caused by an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    /// Moving before, at least one stationary point now.
    Stopped,
    /// Stationary before, no stationary point left.
    Resumed,
}

/// Cluster membership of one pooled point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointStatus {
    pub timestamp: f64,
    pub slot: Slot,
    pub stationary: bool,
}

/// Outcome of a single [`WindowedClusterer::process`] call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionUpdate {
    /// Slot the new observation landed in
    pub slot: Slot,
    /// Pool size after eviction and insertion
    pub pool_size: usize,
    /// Entries evicted before the insert
    pub evicted: usize,
    /// Per-point membership, oldest first
    pub points: Vec<PointStatus>,
    /// Number of points marked stationary
    pub stationary_points: usize,
    /// Net vote: +1 per moving point, -1 per stationary point
    pub vote: i64,
    pub state: MotionState,
    pub transition: Option<Transition>,
    /// Place returned by the collaborator when an episode was submitted
    pub place_id: Option<PlaceId>,
}

/// Online density clusterer over a bounded window.
///
/// Not shared between threads; callers serialize `process` calls. Independent
/// instances (e.g. one per sensor stream) keep independent motion state.
pub struct WindowedClusterer<O, P> {
    config: WindowConfig,
    window: ObservationWindow<O>,
    places: P,
    previously_moving: bool,
}

impl<O, P> WindowedClusterer<O, P>
where
    O: Observation,
    P: PlaceClusterer<O>,
{
    /// Create a clusterer. Starts in the moving state.
    pub fn new(config: WindowConfig, places: P) -> Result<Self> {
        let window = ObservationWindow::new(&config)?;
        Ok(Self {
            config,
            window,
            places,
            previously_moving: true,
        })
    }

    /// Feed one observation.
    ///
    /// Fails without touching any state when `timestamp` is not finite or is
    /// earlier than the newest pooled timestamp.
    pub fn process(&mut self, timestamp: f64, observation: O) -> Result<MotionUpdate> {
        let eps = observation.epsilon();

        let (evicted, slot) = self.window.admit(timestamp, observation)?;

        let pool_size = self.window.pool_size();
        let status = density_marks(
            self.window.matrix(),
            &self.window.live_slots(),
            eps,
            min_neighbors(self.config.delta, pool_size),
        );

        let was_moving = self.previously_moving;
        let mut episode: Option<P::Episode> = None;
        let mut points = Vec::with_capacity(pool_size);
        let mut stationary_points = 0;
        let mut vote: i64 = 0;

        for entry in self.window.entries() {
            let stationary = status[entry.slot];
            points.push(PointStatus {
                timestamp: entry.timestamp,
                slot: entry.slot,
                stationary,
            });

            if !stationary {
                vote += 1;
                continue;
            }
            vote -= 1;
            stationary_points += 1;

            if was_moving {
                let current =
                    episode.get_or_insert_with(|| self.places.new_episode(entry.timestamp));
                if let Some(obs) = self.window.observation(entry.slot) {
                    current.add_observation(obs);
                }
            }
        }

        debug!(
            "t={}: clustered {} of {} points (vote {})",
            timestamp, stationary_points, pool_size, vote
        );

        let mut transition = None;
        let mut place_id = None;
        if stationary_points > 0 {
            if let Some(episode) = episode {
                let id = self.places.submit(episode);
                info!(
                    "t={}: stopped, place clusterer assigned place {}",
                    timestamp, id
                );
                place_id = Some(id);
                transition = Some(Transition::Stopped);
            }
            self.previously_moving = false;
        } else if !self.previously_moving {
            info!("t={}: moving again", timestamp);
            self.previously_moving = true;
            transition = Some(Transition::Resumed);
        }

        Ok(MotionUpdate {
            slot,
            pool_size,
            evicted,
            points,
            stationary_points,
            vote,
            state: self.motion_state(),
            transition,
            place_id,
        })
    }

    /// Human-readable snapshot of the place clusterer.
    pub fn cluster_status(&self) -> String {
        self.places.describe()
    }
}

impl<O, P> WindowedClusterer<O, P> {
    pub fn pool_size(&self) -> usize {
        self.window.pool_size()
    }

    pub fn capacity(&self) -> usize {
        self.window.capacity()
    }

    /// Seconds for a time-based window, entries for a count-based one.
    pub fn window_length(&self) -> u32 {
        self.config.window_length
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// True until the first stationary point, and again after every point
    /// has left the cluster.
    pub fn is_moving(&self) -> bool {
        self.previously_moving
    }

    pub fn motion_state(&self) -> MotionState {
        if self.previously_moving {
            MotionState::Moving
        } else {
            MotionState::Stationary
        }
    }

    pub fn window(&self) -> &ObservationWindow<O> {
        &self.window
    }

    pub fn places(&self) -> &P {
        &self.places
    }

    pub fn places_mut(&mut self) -> &mut P {
        &mut self.places
    }

    /// Consume the clusterer and return the place clusterer.
    pub fn into_places(self) -> P {
        self.places
    }
}

/// Neighbors a point needs to be a cluster core: `floor(delta * pool_size)`.
///
/// Small pools truncate to zero, which makes every pooled point a core.
pub fn min_neighbors(delta: f64, pool_size: usize) -> usize {
    (delta * pool_size as f64) as usize
}

/// Stationary flag per slot (indexed by slot, `capacity` long).
///
/// A live slot with at least `min_neighbors` eps-neighbors among `live` is
/// a core; cores and all of their eps-neighbors are stationary. Marks never
/// feed back into neighbor counts. A pool of zero or one point never
/// clusters.
pub fn density_marks(
    matrix: &DistanceMatrix,
    live: &[Slot],
    eps: f64,
    min_neighbors: usize,
) -> Vec<bool> {
    let mut status = vec![false; matrix.capacity()];
    if live.len() <= 1 {
        return status;
    }

    for core in core_slots(matrix, live, eps, min_neighbors) {
        status[core] = true;
        for j in 0..matrix.capacity() {
            if matrix.is_neighbor(core, j, eps) {
                status[j] = true;
            }
        }
    }
    status
}

fn core_slots(matrix: &DistanceMatrix, live: &[Slot], eps: f64, min_neighbors: usize) -> Vec<Slot> {
    let is_core = |i: &Slot| {
        live.iter()
            .filter(|&&j| matrix.is_neighbor(*i, j, eps))
            .count()
            >= min_neighbors
    };

    #[cfg(feature = "parallel")]
    {
        live.par_iter().copied().filter(|i| is_core(i)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        live.iter().copied().filter(|i| is_core(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_neighbors_truncates() {
        assert_eq!(min_neighbors(0.5, 10), 5);
        assert_eq!(min_neighbors(0.5, 9), 4);
        assert_eq!(min_neighbors(0.3, 5), 1);
        assert_eq!(min_neighbors(0.3, 3), 0);
        assert_eq!(min_neighbors(0.1, 1), 0);
        assert_eq!(min_neighbors(1.0, 0), 0);
    }

    #[test]
    fn test_lone_point_is_never_marked() {
        let mut m = DistanceMatrix::new(3);
        m.occupy(1);
        assert_eq!(density_marks(&m, &[1], 1.0, 0), vec![false; 3]);
        assert_eq!(density_marks(&m, &[], 1.0, 0), vec![false; 3]);
    }

    #[test]
    fn test_density_marks_core_and_neighbors() {
        // 0 -- 1 -- 2 in a line, 3 far away
        let mut m = DistanceMatrix::new(4);
        for s in 0..4 {
            m.occupy(s);
        }
        m.set(0, 1, 1.0);
        m.set(1, 2, 1.0);
        m.set(0, 2, 2.0);
        for s in 0..3 {
            m.set(s, 3, 50.0);
        }

        // Only slot 1 has two neighbors under eps 1.5; it drags 0 and 2 along.
        let status = density_marks(&m, &[0, 1, 2, 3], 1.5, 2);
        assert_eq!(status, vec![true, true, true, false]);

        let status = density_marks(&m, &[0, 1, 2, 3], 1.5, 3);
        assert_eq!(status, vec![false; 4]);
    }
}
