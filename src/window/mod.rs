//! # Observation Window
//!
//! Bounded storage for the active window:
//! - `DistanceMatrix` - Slot-indexed symmetric distances, doubling as the slot allocator
//! - `EvictionPolicy` - Time-based or count-based sliding window
//! - `ObservationWindow` - FIFO pool of live observations

pub mod distance_matrix;
pub mod eviction;
pub mod store;

pub use distance_matrix::{DistanceMatrix, SENTINEL, Slot};
pub use eviction::EvictionPolicy;
pub use store::{ObservationWindow, WindowEntry};
