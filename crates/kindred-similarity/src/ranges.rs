//! Population range building.

use std::collections::BTreeMap;

use kindred_core::model::{FeatureVector, Range, RangeTable};

use crate::error::{SimilarityError, SimilarityResult};

/// Compute per-metric min/max over a whole population.
///
/// The first vector fixes the metric schema; any vector whose metric set
/// differs, or that carries a non-finite value, makes the population
/// malformed. All vectors must come from the same snapshot.
pub fn build_ranges(vectors: &[FeatureVector]) -> SimilarityResult<RangeTable> {
    let first = vectors.first().ok_or(SimilarityError::EmptyPopulation)?;

    let mut bounds: BTreeMap<&str, (f64, f64)> = first
        .metrics
        .iter()
        .map(|(name, &value)| (name.as_str(), (value, value)))
        .collect();

    for vector in vectors {
        if !vector.same_schema(first) {
            return Err(SimilarityError::malformed(
                &vector.artist_id,
                schema_mismatch(vector, first),
            ));
        }
        for (name, &value) in &vector.metrics {
            if !value.is_finite() {
                return Err(SimilarityError::malformed(
                    &vector.artist_id,
                    format!("metric {name} is not finite ({value})"),
                ));
            }
            if let Some((min, max)) = bounds.get_mut(name.as_str()) {
                *min = min.min(value);
                *max = max.max(value);
            }
        }
    }

    let mut table = RangeTable::new();
    for (name, (min, max)) in bounds {
        table.insert(name, Range::new(min, max)?);
    }

    log::debug!(
        "Built ranges for {} metrics over {} artists",
        table.len(),
        vectors.len()
    );
    Ok(table)
}

fn schema_mismatch(vector: &FeatureVector, expected: &FeatureVector) -> String {
    let missing: Vec<&str> = expected
        .metric_names()
        .filter(|name| vector.get(name).is_none())
        .collect();
    let unexpected: Vec<&str> = vector
        .metric_names()
        .filter(|name| expected.get(name).is_none())
        .collect();

    match (missing.is_empty(), unexpected.is_empty()) {
        (false, true) => format!("missing metric {}", missing.join(", ")),
        (true, false) => format!("unexpected metric {}", unexpected.join(", ")),
        _ => format!(
            "missing metric {}; unexpected metric {}",
            missing.join(", "),
            unexpected.join(", ")
        ),
    }
}
