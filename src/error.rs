//! Unified error handling for staymatch.
//!
//! Only two things can go wrong: a configuration that cannot describe a
//! bounded window, and a caller feeding fixes out of time order. Both are
//! reported before any state is touched.

use thiserror::Error;

/// Errors raised by the window store and the clusterer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StayMatchError {
    /// A configuration field is out of range.
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    /// A timestamp arrived that is older than the newest pooled observation.
    #[error("timestamp {timestamp} is earlier than newest pooled timestamp {newest}")]
    NonMonotonicTimestamp { timestamp: f64, newest: f64 },

    /// A timestamp that is NaN or infinite.
    #[error("timestamp {0} is not finite")]
    InvalidTimestamp(f64),

    /// No free slot left in the distance matrix.
    #[error("no free slot in a window of capacity {capacity}")]
    SlotExhausted { capacity: usize },
}

impl StayMatchError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for staymatch operations.
pub type Result<T> = std::result::Result<T, StayMatchError>;
