use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Population-wide bounds of a single metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    min: f64,
    max: f64,
}

impl Range {
    /// Create a range, rejecting bounds where `max < min` or either bound
    /// is not finite.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(Error::InvalidData(format!(
                "range bounds must be finite, got [{min}, {max}]"
            )));
        }
        if max < min {
            return Err(Error::InvalidData(format!(
                "range max {max} is below min {min}"
            )));
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    #[must_use]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// A range whose bounds coincide carries no information for ranking.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_degenerate(&self) -> bool {
        self.max == self.min
    }
}

/// Per-metric ranges for a whole population, keyed by metric name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeTable {
    ranges: BTreeMap<String, Range>,
}

impl RangeTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_range(mut self, metric: impl Into<String>, range: Range) -> Self {
        self.insert(metric, range);
        self
    }

    pub fn insert(&mut self, metric: impl Into<String>, range: Range) {
        self.ranges.insert(metric.into(), range);
    }

    #[must_use]
    pub fn get(&self, metric: &str) -> Option<&Range> {
        self.ranges.get(metric)
    }

    /// Iterate over `(metric, range)` in metric-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Range)> {
        self.ranges.iter().map(|(name, range)| (name.as_str(), range))
    }

    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.ranges.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
