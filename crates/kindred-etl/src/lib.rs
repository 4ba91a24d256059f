//! ETL pipeline stages for kindred.
//!
//! Loads provider snapshots into the local store and runs the related-artist
//! ranking over the latest snapshot, as treadle `Stage` implementations.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod driver;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod rank;
pub mod work_item;

pub use config::Config;
pub use driver::{run_once, RangeSource, RankOptions, RunSummary, Snapshot};
pub use error::{PipelineError, PipelineResult};
pub use ingest::{ingest_snapshot, IngestStage, IngestSummary, SnapshotFile};
pub use pipeline::build_pipeline;
pub use rank::RankStage;
pub use work_item::SnapshotRun;
