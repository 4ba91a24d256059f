//! Min-max normalization against population ranges.

use kindred_core::model::{FeatureVector, Range, RangeTable};

use crate::error::{SimilarityError, SimilarityResult};

/// Map `value` into the unit interval of `range`.
///
/// A degenerate range (`min == max`) has no discriminative power and maps
/// every value to `0.0`. Values are not clamped: the range is derived from
/// the same population, so they fall inside it.
#[must_use]
pub fn normalize(value: f64, range: &Range) -> f64 {
    if range.is_degenerate() {
        0.0
    } else {
        (value - range.min()) / range.span()
    }
}

/// Normalizes metric values against a [`RangeTable`].
///
/// Degenerate ranges are reported once, when the normalizer is built, and
/// then fall back to `0.0` for every value of that metric.
#[derive(Debug, Clone)]
pub struct Normalizer<'a> {
    ranges: &'a RangeTable,
    degenerate: Vec<String>,
}

impl<'a> Normalizer<'a> {
    pub fn new(ranges: &'a RangeTable) -> Self {
        let degenerate: Vec<String> = ranges
            .iter()
            .filter(|(_, range)| range.is_degenerate())
            .map(|(metric, range)| {
                log::warn!(
                    "Degenerate range for metric {} (min = max = {}); normalizing it to 0.0",
                    metric,
                    range.min()
                );
                metric.to_string()
            })
            .collect();

        Self { ranges, degenerate }
    }

    /// Metrics whose population range collapsed to a single value.
    #[must_use]
    pub fn degenerate_metrics(&self) -> &[String] {
        &self.degenerate
    }

    /// Normalize a single metric value.
    pub fn normalize(&self, metric: &str, value: f64) -> SimilarityResult<f64> {
        let range = self
            .ranges
            .get(metric)
            .ok_or_else(|| SimilarityError::UnknownMetric(metric.to_string()))?;
        Ok(normalize(value, range))
    }

    /// Normalize every ranged metric of a vector, in the range table's
    /// metric order.
    ///
    /// A vector lacking any ranged metric, or carrying a non-finite value
    /// for one, is malformed. Metrics without a range are ignored.
    pub fn normalize_vector(&self, vector: &FeatureVector) -> SimilarityResult<Vec<f64>> {
        self.ranges
            .iter()
            .map(|(metric, range)| -> SimilarityResult<f64> {
                let value = vector.get(metric).ok_or_else(|| {
                    SimilarityError::malformed(&vector.artist_id, format!("missing metric {metric}"))
                })?;
                if !value.is_finite() {
                    return Err(SimilarityError::malformed(
                        &vector.artist_id,
                        format!("metric {metric} is not finite ({value})"),
                    ));
                }
                Ok(normalize(value, range))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RangeTable {
        RangeTable::new()
            .with_range("loudness", Range::new(-60.0, 0.0).unwrap())
            .with_range("energy", Range::new(0.0, 1.0).unwrap())
            .with_range("flat", Range::new(0.5, 0.5).unwrap())
    }

    #[test]
    fn test_normalize_bounds() {
        let range = Range::new(-23.5, -2.25).unwrap();
        assert_eq!(normalize(-23.5, &range), 0.0);
        assert_eq!(normalize(-2.25, &range), 1.0);
    }

    #[test]
    fn test_normalize_midpoint() {
        let range = Range::new(-60.0, 0.0).unwrap();
        assert!((normalize(-30.0, &range) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_range_falls_back_to_zero() {
        let range = Range::new(0.5, 0.5).unwrap();
        assert_eq!(normalize(0.5, &range), 0.0);

        let ranges = table();
        let normalizer = Normalizer::new(&ranges);
        assert_eq!(normalizer.degenerate_metrics(), ["flat".to_string()]);
        assert_eq!(normalizer.normalize("flat", 0.5).unwrap(), 0.0);
    }

    #[test]
    fn test_unknown_metric() {
        let ranges = table();
        let normalizer = Normalizer::new(&ranges);
        assert!(matches!(
            normalizer.normalize("tempo", 120.0),
            Err(SimilarityError::UnknownMetric(m)) if m == "tempo"
        ));
    }

    #[test]
    fn test_normalize_vector_uses_table_order() {
        let ranges = table();
        let normalizer = Normalizer::new(&ranges);
        let v = FeatureVector::new("a")
            .with_metric("loudness", -15.0)
            .with_metric("energy", 0.8)
            .with_metric("flat", 0.5)
            .with_metric("tempo", 128.0);

        let coords = normalizer.normalize_vector(&v).unwrap();
        // energy, flat, loudness
        assert_eq!(coords.len(), 3);
        assert!((coords[0] - 0.8).abs() < 1e-12);
        assert_eq!(coords[1], 0.0);
        assert!((coords[2] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_vector_missing_metric_is_malformed() {
        let ranges = table();
        let normalizer = Normalizer::new(&ranges);
        let v = FeatureVector::new("a").with_metric("energy", 0.8);

        let err = normalizer.normalize_vector(&v).unwrap_err();
        assert!(matches!(err, SimilarityError::MalformedInput { ref artist_id, .. } if artist_id.as_str() == "a"));
        assert!(err.to_string().contains("missing metric"));
    }

    #[test]
    fn test_normalize_vector_rejects_nan() {
        let ranges = table();
        let normalizer = Normalizer::new(&ranges);
        let v = FeatureVector::new("a")
            .with_metric("loudness", f64::NAN)
            .with_metric("energy", 0.8)
            .with_metric("flat", 0.5);

        assert!(matches!(
            normalizer.normalize_vector(&v),
            Err(SimilarityError::MalformedInput { .. })
        ));
    }
}
