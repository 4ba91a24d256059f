//! Collaborator boundaries of a ranking run.
//!
//! A run reads a complete population snapshot from a [`FeatureSource`] and
//! hands the finished edge set to an [`EdgeSink`]. Both are passed to the
//! run explicitly; nothing here holds a connection of its own.

use crate::error::Result;
use crate::model::{ArtistId, FeatureVector, RangeTable, RankedEdge};

/// Supplies the population a ranking run works on.
pub trait FeatureSource {
    /// One averaged feature vector per artist in the current snapshot.
    fn fetch_vectors(&self) -> Result<Vec<FeatureVector>>;

    /// Per-metric min/max over the individual tracks of the current
    /// snapshot, for runs that normalize against track-level bounds.
    fn fetch_track_ranges(&self) -> Result<RangeTable>;
}

/// Persists ranked edges.
///
/// A batch replaces the stored neighbors of every artist in `sources`,
/// including sources whose list came out empty, so no edge of an earlier
/// run survives for an artist that was ranked again. Implementations upsert
/// by `(artist_id, related_artist_id)`, so writing the same batch twice
/// leaves the same final state, and must store the whole batch or none of
/// it. Artists outside `sources` are left untouched.
pub trait EdgeSink {
    /// Persist a batch of edges, returning how many rows were written.
    fn persist(&mut self, sources: &[ArtistId], edges: &[RankedEdge]) -> Result<usize>;
}
