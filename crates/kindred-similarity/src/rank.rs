//! Pairwise nearest-neighbor ranking.

use std::collections::{BTreeMap, HashSet};

use kindred_core::model::{ArtistId, FeatureVector, RangeTable, RankedEdge};
use rayon::prelude::*;

use crate::error::{SimilarityError, SimilarityResult};
use crate::normalize::Normalizer;

/// Number of neighbors kept per artist unless configured otherwise.
pub const DEFAULT_K: usize = 5;

/// Ranked neighbors per source artist, in artist-id order.
pub type Ranking = BTreeMap<ArtistId, Vec<RankedEdge>>;

/// Rank the `k` nearest neighbors of every artist.
///
/// Distances are Euclidean over the metrics of `ranges`, each normalized
/// against its population range. Pairs at distance exactly zero are
/// dropped. Each list is sorted by ascending distance, ties broken by
/// ascending related artist id.
///
/// Every input artist gets an entry, possibly empty (a lone artist, or
/// `k == 0`). An empty population yields an empty ranking.
///
/// Artists are ranked in parallel; the result does not depend on
/// scheduling.
pub fn rank(
    vectors: &[FeatureVector],
    ranges: &RangeTable,
    k: usize,
) -> SimilarityResult<Ranking> {
    if vectors.is_empty() {
        return Ok(Ranking::new());
    }

    let mut seen = HashSet::with_capacity(vectors.len());
    if let Some(dup) = vectors.iter().find(|v| !seen.insert(&v.artist_id)) {
        return Err(SimilarityError::malformed(
            &dup.artist_id,
            "artist appears more than once in the population",
        ));
    }

    let normalizer = Normalizer::new(ranges);
    let points = vectors
        .iter()
        .map(|v| -> SimilarityResult<_> { Ok((&v.artist_id, normalizer.normalize_vector(v)?)) })
        .collect::<SimilarityResult<Vec<_>>>()?;

    let ranking: Ranking = points
        .par_iter()
        .enumerate()
        .map(|(source, (artist_id, _))| ((*artist_id).clone(), nearest(source, &points, k)))
        .collect::<Vec<_>>()
        .into_iter()
        .collect();

    log::debug!(
        "Ranked {} artists over {} metrics (k = {})",
        ranking.len(),
        ranges.len(),
        k
    );
    Ok(ranking)
}

/// Euclidean distance between two normalized points of equal length.
#[must_use]
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

fn nearest(source: usize, points: &[(&ArtistId, Vec<f64>)], k: usize) -> Vec<RankedEdge> {
    if k == 0 {
        return Vec::new();
    }

    let (artist_id, origin) = &points[source];
    let mut candidates: Vec<(&ArtistId, f64)> = points
        .iter()
        .enumerate()
        .filter(|(other, _)| *other != source)
        .map(|(_, (other_id, coords))| (*other_id, euclidean(origin, coords)))
        .filter(|(_, distance)| *distance > 0.0)
        .collect();

    candidates.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    candidates.truncate(k);

    candidates
        .into_iter()
        .map(|(related, distance)| RankedEdge::new((*artist_id).clone(), related.clone(), distance))
        .collect()
}
