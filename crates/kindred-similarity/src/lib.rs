//! Artist similarity ranking for kindred.
//!
//! Normalizes per-artist feature vectors against population-wide ranges
//! and selects, for every artist, the nearest other artists by Euclidean
//! distance. Everything here is pure computation over a fully materialized
//! snapshot; fetching the snapshot and persisting results happen elsewhere.
//!
//! The all-pairs scan is quadratic in the number of artists. A spatial index
//! or approximate search would slot in behind [`rank`] without changing its
//! contract.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod normalize;
pub mod rank;
pub mod ranges;

pub use error::{SimilarityError, SimilarityResult};
pub use normalize::{normalize, Normalizer};
pub use rank::{rank, Ranking, DEFAULT_K};
pub use ranges::build_ranges;
