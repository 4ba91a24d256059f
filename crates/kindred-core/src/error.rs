//! Errors raised by the store and the model constructors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A value that violates a model invariant, rejected before any write.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;
