//! Pipeline error types.

use std::path::PathBuf;

use kindred_similarity::SimilarityError;
use thiserror::Error;

/// Errors that abort an ingest or ranking run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The population could not be read from the feature source.
    #[error("failed to read population: {0}")]
    Fetch(#[source] kindred_core::Error),

    /// Ranges or rankings could not be computed from the population.
    #[error(transparent)]
    Similarity(#[from] SimilarityError),

    /// The edge sink rejected or failed to store the run's edges.
    #[error("failed to persist related artists: {0}")]
    Persist(#[source] kindred_core::Error),

    /// A snapshot file could not be parsed or is inconsistent.
    #[error("invalid snapshot {}: {message}", .path.display())]
    Snapshot { path: PathBuf, message: String },

    /// An error propagated from the core domain layer.
    #[error("database error: {0}")]
    Database(#[from] kindred_core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Returns `true` when the run failed because of its input data rather
    /// than the environment; retrying without new data will fail again.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Similarity(
                SimilarityError::MalformedInput { .. } | SimilarityError::EmptyPopulation
            ) | Self::Snapshot { .. }
        )
    }
}

/// Convenience alias for pipeline results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors() {
        assert!(PipelineError::Similarity(SimilarityError::EmptyPopulation).is_input_error());
        assert!(PipelineError::Snapshot {
            path: PathBuf::from("snap.json"),
            message: "bad".to_string(),
        }
        .is_input_error());
        assert!(!PipelineError::Persist(kindred_core::Error::InvalidData("x".to_string()))
            .is_input_error());
    }

    #[test]
    fn test_snapshot_error_message() {
        let err = PipelineError::Snapshot {
            path: PathBuf::from("/tmp/snap.json"),
            message: "missing dt".to_string(),
        };
        assert_eq!(err.to_string(), "invalid snapshot /tmp/snap.json: missing dt");
    }
}
