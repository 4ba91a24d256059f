use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::ids::ArtistId;

/// The metrics averaged per artist for similarity ranking.
pub const DEFAULT_METRICS: &[&str] = &[
    "danceability",
    "energy",
    "loudness",
    "speechiness",
    "acousticness",
    "instrumentalness",
];

/// An artist's averaged audio metrics for one ranking run.
///
/// Metrics are kept in a sorted map so iteration order is the same for
/// every vector in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub artist_id: ArtistId,
    pub metrics: BTreeMap<String, f64>,
}

impl FeatureVector {
    #[must_use]
    pub fn new(artist_id: impl Into<ArtistId>) -> Self {
        Self {
            artist_id: artist_id.into(),
            metrics: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn get(&self, metric: &str) -> Option<f64> {
        self.metrics.get(metric).copied()
    }

    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.metrics.keys().map(String::as_str)
    }

    /// Whether both vectors carry exactly the same metric names.
    #[must_use]
    pub fn same_schema(&self, other: &Self) -> bool {
        self.metrics.len() == other.metrics.len()
            && self.metrics.keys().zip(other.metrics.keys()).all(|(a, b)| a == b)
    }
}
