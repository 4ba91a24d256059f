//! Similarity error types.

use kindred_core::model::ArtistId;
use thiserror::Error;

/// Errors that abort a ranking computation.
#[derive(Debug, Error)]
pub enum SimilarityError {
    /// A feature vector does not match the population's metric schema or
    /// carries an unusable value.
    #[error("malformed feature vector for {artist_id}: {reason}")]
    MalformedInput { artist_id: ArtistId, reason: String },

    /// No feature vectors were supplied, so ranges cannot be derived.
    #[error("empty population: no feature vectors to rank")]
    EmptyPopulation,

    /// A metric was normalized without a range for it.
    #[error("no range for metric {0}")]
    UnknownMetric(String),

    /// An error propagated from the core domain layer.
    #[error(transparent)]
    Core(#[from] kindred_core::Error),
}

impl SimilarityError {
    pub(crate) fn malformed(artist_id: &ArtistId, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            artist_id: artist_id.clone(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias for similarity results.
pub type SimilarityResult<T> = std::result::Result<T, SimilarityError>;
