//! The ranking run: read a population, rank it, persist the edges.
//!
//! A run is all-or-nothing. Every failure before persistence leaves the
//! sink untouched, and the sink itself commits the edge set atomically.
//! The driver does not retry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use kindred_core::model::{ArtistId, FeatureVector, RangeTable, RankedEdge};
use kindred_core::{EdgeSink, FeatureSource};
use kindred_similarity::{build_ranges, rank, SimilarityError, DEFAULT_K};

use crate::error::{PipelineError, PipelineResult};

/// Where a run takes its normalization ranges from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeSource {
    /// Min/max over the averaged artist vectors being ranked.
    #[default]
    Artists,
    /// Min/max over the individual tracks of the snapshot.
    Tracks,
}

impl FromStr for RangeSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "artists" => Ok(Self::Artists),
            "tracks" => Ok(Self::Tracks),
            other => Err(format!(
                "unknown range source '{other}' (expected 'artists' or 'tracks')"
            )),
        }
    }
}

impl fmt::Display for RangeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Artists => f.write_str("artists"),
            Self::Tracks => f.write_str("tracks"),
        }
    }
}

/// Parameters of a ranking run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankOptions {
    /// Neighbors kept per artist.
    pub k: usize,
    pub range_source: RangeSource,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            range_source: RangeSource::default(),
        }
    }
}

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Artists in the ranked population.
    pub artists: usize,
    /// Edges written to the sink.
    pub edges: usize,
    /// Metrics whose range was degenerate and so did not affect distances.
    pub degenerate_metrics: Vec<String>,
}

/// A materialized population, detached from wherever it was read from.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    vectors: Vec<FeatureVector>,
    track_ranges: Option<RangeTable>,
}

impl Snapshot {
    #[must_use]
    pub fn new(vectors: Vec<FeatureVector>) -> Self {
        Self {
            vectors,
            track_ranges: None,
        }
    }

    #[must_use]
    pub fn with_track_ranges(mut self, ranges: RangeTable) -> Self {
        self.track_ranges = Some(ranges);
        self
    }

    /// Read everything a run with `range_source` needs from `source`, so
    /// the source can be released (or written to) before ranking starts.
    pub fn capture<S>(source: &S, range_source: RangeSource) -> PipelineResult<Self>
    where
        S: FeatureSource + ?Sized,
    {
        let vectors = source.fetch_vectors().map_err(PipelineError::Fetch)?;
        let track_ranges = match range_source {
            RangeSource::Artists => None,
            RangeSource::Tracks if vectors.is_empty() => None,
            RangeSource::Tracks => Some(
                source
                    .fetch_track_ranges()
                    .map_err(PipelineError::Fetch)?,
            ),
        };
        Ok(Self {
            vectors,
            track_ranges,
        })
    }

    #[must_use]
    pub fn vectors(&self) -> &[FeatureVector] {
        &self.vectors
    }
}

impl FeatureSource for Snapshot {
    fn fetch_vectors(&self) -> kindred_core::Result<Vec<FeatureVector>> {
        Ok(self.vectors.clone())
    }

    fn fetch_track_ranges(&self) -> kindred_core::Result<RangeTable> {
        self.track_ranges
            .clone()
            .ok_or_else(|| kindred_core::Error::NotFound {
                entity: "track ranges",
                id: "snapshot".to_string(),
            })
    }
}

/// Run one full ranking pass from `source` into `sink`.
pub fn run_once<S, K>(source: &S, sink: &mut K, options: &RankOptions) -> PipelineResult<RunSummary>
where
    S: FeatureSource + ?Sized,
    K: EdgeSink + ?Sized,
{
    let vectors = source.fetch_vectors().map_err(PipelineError::Fetch)?;
    if vectors.is_empty() {
        return Err(SimilarityError::EmptyPopulation.into());
    }
    log::info!("Ranking {} artists (k = {})", vectors.len(), options.k);

    let ranges = match options.range_source {
        RangeSource::Artists => build_ranges(&vectors)?,
        RangeSource::Tracks => source.fetch_track_ranges().map_err(PipelineError::Fetch)?,
    };

    let degenerate_metrics: Vec<String> = ranges
        .iter()
        .filter(|(_, range)| range.is_degenerate())
        .map(|(metric, _)| metric.to_string())
        .collect();

    let ranking = rank(&vectors, &ranges, options.k)?;
    let sources: Vec<ArtistId> = ranking.keys().cloned().collect();
    let edges: Vec<RankedEdge> = ranking.into_values().flatten().collect();

    let written = sink
        .persist(&sources, &edges)
        .map_err(PipelineError::Persist)?;
    log::info!(
        "Persisted {} related-artist edges for {} artists",
        written,
        vectors.len()
    );

    Ok(RunSummary {
        artists: vectors.len(),
        edges: edges.len(),
        degenerate_metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kindred_core::model::Range;
    use kindred_core::schema::Database;

    /// Records every batch it is given, or fails every call.
    #[derive(Debug, Default)]
    struct RecordingSink {
        sources: Vec<Vec<ArtistId>>,
        batches: Vec<Vec<RankedEdge>>,
        fail: bool,
    }

    impl EdgeSink for RecordingSink {
        fn persist(
            &mut self,
            sources: &[ArtistId],
            edges: &[RankedEdge],
        ) -> kindred_core::Result<usize> {
            if self.fail {
                return Err(kindred_core::Error::InvalidData("sink offline".to_string()));
            }
            self.sources.push(sources.to_vec());
            self.batches.push(edges.to_vec());
            Ok(edges.len())
        }
    }

    fn vector(id: &str, d: f64, e: f64) -> FeatureVector {
        FeatureVector::new(id).with_metric("d", d).with_metric("e", e)
    }

    fn population() -> Snapshot {
        Snapshot::new(vec![
            vector("A", 0.2, 0.4),
            vector("B", 0.8, 0.6),
            vector("C", 0.2, 0.4),
            vector("D", 0.5, 0.1),
        ])
    }

    #[test]
    fn test_run_once_persists_all_edges_in_one_batch() {
        let mut sink = RecordingSink::default();
        let options = RankOptions {
            k: 2,
            ..RankOptions::default()
        };

        let summary = run_once(&population(), &mut sink, &options).unwrap();

        assert_eq!(sink.batches.len(), 1);
        assert_eq!(summary.artists, 4);
        assert_eq!(summary.edges, sink.batches[0].len());
        // A and C coincide, so each has two non-zero neighbors; B and D have two.
        assert_eq!(summary.edges, 8);
        assert!(summary.degenerate_metrics.is_empty());

        let sources: Vec<&str> = sink.batches[0]
            .iter()
            .map(|e| e.artist_id.as_str())
            .collect();
        assert_eq!(sources, vec!["A", "A", "B", "B", "C", "C", "D", "D"]);
    }

    #[test]
    fn test_run_once_passes_every_ranked_artist_as_source() {
        let snapshot = Snapshot::new(vec![
            vector("A", 0.2, 0.4),
            vector("B", 0.8, 0.6),
            vector("C", 0.2, 0.4),
        ]);
        let mut sink = RecordingSink::default();
        let options = RankOptions {
            k: 0,
            ..RankOptions::default()
        };

        run_once(&snapshot, &mut sink, &options).unwrap();

        assert!(sink.batches[0].is_empty());
        let sources: Vec<&str> = sink.sources[0].iter().map(ArtistId::as_str).collect();
        assert_eq!(sources, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_run_once_replaces_edges_from_previous_snapshot() {
        let mut db = Database::open_in_memory().unwrap();
        let options = RankOptions {
            k: 2,
            ..RankOptions::default()
        };

        run_once(&population(), &mut db, &options).unwrap();
        let before: Vec<String> = db
            .related_artists(&"A".into(), 10)
            .unwrap()
            .into_iter()
            .map(|r| r.artist_id.to_string())
            .collect();
        assert_eq!(before, vec!["D".to_string(), "B".to_string()]);

        let next = Snapshot::new(vec![
            vector("A", 0.2, 0.4),
            vector("D", 0.5, 0.1),
            vector("E", 0.9, 0.9),
            vector("F", 0.3, 0.6),
        ]);
        run_once(&next, &mut db, &options).unwrap();

        for artist in ["A", "D", "E", "F"] {
            let related = db.related_artists(&artist.into(), 10).unwrap();
            assert_eq!(related.len(), 2, "stored edges for {artist}");
            assert!(related
                .iter()
                .all(|r| ["A", "D", "E", "F"].contains(&r.artist_id.as_str())));
        }
        let top = db.related_artists(&"A".into(), 2).unwrap();
        assert!(top.iter().all(|r| !["B", "C"].contains(&r.artist_id.as_str())));
    }

    #[test]
    fn test_run_once_empty_population() {
        let mut sink = RecordingSink::default();
        let err = run_once(&Snapshot::default(), &mut sink, &RankOptions::default()).unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Similarity(SimilarityError::EmptyPopulation)
        ));
        assert!(sink.batches.is_empty());
    }

    #[test]
    fn test_run_once_malformed_input_writes_nothing() {
        let snapshot = Snapshot::new(vec![
            vector("A", 0.2, 0.4),
            FeatureVector::new("B").with_metric("d", 0.8),
        ]);
        let mut sink = RecordingSink::default();

        let err = run_once(&snapshot, &mut sink, &RankOptions::default()).unwrap_err();
        assert!(err.is_input_error());
        assert!(sink.batches.is_empty());
    }

    #[test]
    fn test_run_once_reports_sink_failure() {
        let mut sink = RecordingSink {
            fail: true,
            ..RecordingSink::default()
        };
        let err = run_once(&population(), &mut sink, &RankOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Persist(_)));
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_run_once_with_track_ranges() {
        let ranges = RangeTable::new()
            .with_range("d", Range::new(0.0, 1.0).unwrap())
            .with_range("e", Range::new(0.5, 0.5).unwrap());
        let snapshot = population().with_track_ranges(ranges);
        let mut sink = RecordingSink::default();
        let options = RankOptions {
            k: 1,
            range_source: RangeSource::Tracks,
        };

        let summary = run_once(&snapshot, &mut sink, &options).unwrap();
        assert_eq!(summary.degenerate_metrics, vec!["e".to_string()]);

        // With e flattened, A's nearest is D (|0.2 - 0.5|) rather than B.
        let a: Vec<&RankedEdge> = sink.batches[0]
            .iter()
            .filter(|e| e.artist_id == ArtistId::from("A"))
            .collect();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].related_artist_id.as_str(), "D");
    }

    #[test]
    fn test_run_once_missing_track_ranges() {
        let mut sink = RecordingSink::default();
        let options = RankOptions {
            k: 1,
            range_source: RangeSource::Tracks,
        };
        let err = run_once(&population(), &mut sink, &options).unwrap_err();
        assert!(matches!(err, PipelineError::Fetch(_)));
        assert!(sink.batches.is_empty());
    }

    #[test]
    fn test_run_once_twice_leaves_same_store() {
        let mut db = Database::open_in_memory().unwrap();
        let options = RankOptions::default();

        run_once(&population(), &mut db, &options).unwrap();
        let first = db.related_artists(&"B".into(), 10).unwrap();
        let first_count = db.stats().unwrap().related_edges;

        run_once(&population(), &mut db, &options).unwrap();
        let second = db.related_artists(&"B".into(), 10).unwrap();

        assert_eq!(db.stats().unwrap().related_edges, first_count);
        let ids = |rows: &[kindred_core::schema::RelatedArtist]| {
            rows.iter()
                .map(|r| (r.artist_id.clone(), r.distance))
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(first.as_slice()), ids(second.as_slice()));
    }

    #[test]
    fn test_snapshot_capture_from_database() {
        let db = Database::open_in_memory().unwrap();
        let snapshot = Snapshot::capture(&db, RangeSource::Tracks).unwrap();
        assert!(snapshot.vectors().is_empty());
        assert!(snapshot.fetch_track_ranges().is_err());
    }

    #[test]
    fn test_range_source_parsing() {
        assert_eq!("tracks".parse::<RangeSource>(), Ok(RangeSource::Tracks));
        assert_eq!("Artists".parse::<RangeSource>(), Ok(RangeSource::Artists));
        assert!("albums".parse::<RangeSource>().is_err());
        assert_eq!(RangeSource::Tracks.to_string(), "tracks");
    }
}
