//! Core domain model for kindred.
//!
//! This crate defines the artist feature model (feature vectors, range
//! tables, ranked edges), the snapshot records they are aggregated from,
//! the SQLite schema, and the collaborator traits the ranking run reads
//! from and writes to.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod schema;
pub mod store;

pub use error::{Error, Result};
pub use store::{EdgeSink, FeatureSource};
