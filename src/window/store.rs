//! Bounded observation window.
//!
//! Owns the live observations, their FIFO order and the distance matrix.
//! Slots are plain indices into the matrix and the observation table, so
//! nothing outside the window ever holds on to an observation.

use std::collections::VecDeque;

use log::{debug, trace};

use crate::error::{Result, StayMatchError};
use crate::{Observation, WindowConfig};

use super::distance_matrix::{DistanceMatrix, Slot};
use super::eviction::EvictionPolicy;

/// A live pool entry, ordered oldest first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowEntry {
    pub timestamp: f64,
    pub slot: Slot,
}

/// Fixed-capacity window of recent observations.
#[derive(Debug)]
pub struct ObservationWindow<O> {
    policy: EvictionPolicy,
    matrix: DistanceMatrix,
    observations: Vec<Option<O>>,
    pool: VecDeque<WindowEntry>,
}

impl<O: Observation> ObservationWindow<O> {
    /// Create a window from a validated configuration.
    pub fn new(config: &WindowConfig) -> Result<Self> {
        config.validate()?;
        Self::with_policy(config.eviction_policy(), config.capacity)
    }

    /// Create a window with an explicit policy and slot capacity.
    pub fn with_policy(policy: EvictionPolicy, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(StayMatchError::config("capacity", "must be positive"));
        }
        if policy.pool_limit(capacity) == 0 {
            return Err(StayMatchError::config("window_length", "must be positive"));
        }
        Ok(Self {
            policy,
            matrix: DistanceMatrix::new(capacity),
            observations: (0..capacity).map(|_| None).collect(),
            pool: VecDeque::with_capacity(capacity),
        })
    }

    /// Reject timestamps that are not finite or that would break FIFO order.
    pub fn check_timestamp(&self, timestamp: f64) -> Result<()> {
        if !timestamp.is_finite() {
            return Err(StayMatchError::InvalidTimestamp(timestamp));
        }
        if let Some(newest) = self.newest_timestamp() {
            if timestamp < newest {
                return Err(StayMatchError::NonMonotonicTimestamp { timestamp, newest });
            }
        }
        Ok(())
    }

    /// Validate, evict for `timestamp`, then insert.
    ///
    /// Returns the number of evicted entries and the new slot. A rejected
    /// timestamp leaves the window untouched.
    pub fn admit(&mut self, timestamp: f64, observation: O) -> Result<(usize, Slot)> {
        self.check_timestamp(timestamp)?;
        let evicted = self.evict_stale(timestamp);
        let slot = self.store(timestamp, observation)?;
        Ok((evicted, slot))
    }

    /// Lowest free slot, or an error when every slot is live.
    pub fn allocate_slot(&self) -> Result<Slot> {
        self.matrix
            .first_free()
            .ok_or(StayMatchError::SlotExhausted {
                capacity: self.capacity(),
            })
    }

    /// Store `observation` in a fresh slot and cache its distance to every
    /// other live observation.
    pub fn insert(&mut self, timestamp: f64, observation: O) -> Result<Slot> {
        self.check_timestamp(timestamp)?;
        self.store(timestamp, observation)
    }

    fn store(&mut self, timestamp: f64, observation: O) -> Result<Slot> {
        let slot = self.allocate_slot()?;

        self.matrix.occupy(slot);
        for entry in &self.pool {
            if let Some(other) = self.observations[entry.slot].as_ref() {
                self.matrix
                    .set(slot, entry.slot, observation.distance_from(other));
            }
        }

        self.observations[slot] = Some(observation);
        self.pool.push_back(WindowEntry { timestamp, slot });
        trace!(
            "inserted t={} into slot {} (pool {})",
            timestamp,
            slot,
            self.pool.len()
        );
        Ok(slot)
    }

    /// Drop the oldest entries the policy no longer admits at `now`.
    ///
    /// Returns the number of evicted entries.
    pub fn evict_stale(&mut self, now: f64) -> usize {
        let capacity = self.capacity();
        let mut evicted = 0;

        while let Some(oldest) = self.pool.front().copied() {
            if self.policy.max_evictions().is_some_and(|max| evicted >= max) {
                break;
            }
            if !self
                .policy
                .should_evict(oldest.timestamp, self.pool.len(), capacity, now)
            {
                break;
            }
            self.pool.pop_front();
            self.matrix.clear(oldest.slot);
            self.observations[oldest.slot] = None;
            evicted += 1;
        }

        if evicted > 0 {
            debug!(
                "evicted {} entries at t={} (pool {})",
                evicted,
                now,
                self.pool.len()
            );
        }
        evicted
    }
}

impl<O> ObservationWindow<O> {
    /// Number of live entries.
    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    /// Check if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.matrix.capacity()
    }

    /// Largest pool size the eviction policy keeps.
    pub fn pool_limit(&self) -> usize {
        self.policy.pool_limit(self.capacity())
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    pub fn matrix(&self) -> &DistanceMatrix {
        &self.matrix
    }

    /// Cached distance between two slots.
    pub fn distance(&self, i: Slot, j: Slot) -> Option<f64> {
        self.matrix.distance(i, j)
    }

    /// Live entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &WindowEntry> {
        self.pool.iter()
    }

    /// Live slots, oldest first.
    pub fn live_slots(&self) -> Vec<Slot> {
        self.pool.iter().map(|e| e.slot).collect()
    }

    /// The observation stored in `slot`, if live.
    pub fn observation(&self, slot: Slot) -> Option<&O> {
        self.observations.get(slot).and_then(Option::as_ref)
    }

    pub fn newest_timestamp(&self) -> Option<f64> {
        self.pool.back().map(|e| e.timestamp)
    }

    pub fn oldest_timestamp(&self) -> Option<f64> {
        self.pool.front().map(|e| e.timestamp)
    }
}
