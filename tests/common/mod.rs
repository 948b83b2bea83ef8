//! Shared fixtures: a one-dimensional observation and a recording place clusterer.

#![allow(dead_code)]

use staymatch::{Observation, PlaceClusterer, PlaceId, StationaryEpisode};

/// A reading on a line; distance is the absolute difference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scalar {
    pub x: f64,
    pub eps: f64,
}

impl Scalar {
    pub fn new(x: f64) -> Self {
        Self { x, eps: 1.0 }
    }

    pub fn with_eps(x: f64, eps: f64) -> Self {
        Self { x, eps }
    }
}

impl Observation for Scalar {
    fn distance_from(&self, other: &Self) -> f64 {
        (self.x - other.x).abs()
    }

    fn epsilon(&self) -> f64 {
        self.eps
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEpisode {
    pub started_at: f64,
    pub xs: Vec<f64>,
}

impl StationaryEpisode<Scalar> for RecordedEpisode {
    fn add_observation(&mut self, observation: &Scalar) {
        self.xs.push(observation.x);
    }
}

/// Records every episode it receives and hands out ids 1, 2, 3, ...
#[derive(Debug, Default)]
pub struct Recorder {
    pub created: usize,
    pub submitted: Vec<RecordedEpisode>,
}

impl PlaceClusterer<Scalar> for Recorder {
    type Episode = RecordedEpisode;

    fn new_episode(&mut self, timestamp: f64) -> RecordedEpisode {
        self.created += 1;
        RecordedEpisode {
            started_at: timestamp,
            xs: Vec::new(),
        }
    }

    fn submit(&mut self, episode: RecordedEpisode) -> PlaceId {
        self.submitted.push(episode);
        self.submitted.len() as PlaceId
    }

    fn describe(&self) -> String {
        format!("{} episodes", self.submitted.len())
    }
}
