//! Sliding-window eviction policies.

use serde::{Deserialize, Serialize};

/// How the oldest entries leave the window. Chosen once, from
/// [`WindowConfig`](crate::WindowConfig), when the window is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EvictionPolicy {
    /// Drop every entry older than `window_seconds`. The matrix capacity is
    /// still a hard backstop.
    TimeBased { window_seconds: f64 },
    /// Strict FIFO of at most `max_entries`; drops at most one entry per insert.
    CountBased { max_entries: usize },
}

impl EvictionPolicy {
    /// Whether the oldest entry (timestamped `oldest`) must go before an
    /// insert at `now`, given the current pool size.
    pub fn should_evict(&self, oldest: f64, pool_size: usize, capacity: usize, now: f64) -> bool {
        match *self {
            Self::TimeBased { window_seconds } => {
                now - oldest > window_seconds || pool_size >= capacity
            }
            Self::CountBased { max_entries } => pool_size >= max_entries.min(capacity),
        }
    }

    /// Upper bound on evictions per insert, `None` when unbounded.
    pub fn max_evictions(&self) -> Option<usize> {
        match self {
            Self::TimeBased { .. } => None,
            Self::CountBased { .. } => Some(1),
        }
    }

    /// Largest pool the policy will keep.
    pub fn pool_limit(&self, capacity: usize) -> usize {
        match *self {
            Self::TimeBased { .. } => capacity,
            Self::CountBased { max_entries } => max_entries.min(capacity),
        }
    }
}
