use std::path::PathBuf;
use treadle::Workflow;

use crate::driver::RankOptions;
use crate::{IngestStage, RankStage};

/// Build the ingest + rank pipeline.
///
/// With no snapshot the ingest stage is a no-op and the run ranks the
/// partitions already in the database.
///
/// # Errors
/// Returns an error if the workflow cannot be built.
pub fn build_pipeline(
    snapshot: Option<PathBuf>,
    db_path: PathBuf,
    options: RankOptions,
) -> treadle::Result<Workflow> {
    let ingest_stage = IngestStage::new(snapshot, db_path.clone());
    let rank_stage = RankStage::new(db_path, options);

    Workflow::builder()
        .stage("ingest", ingest_stage)
        .stage("rank", rank_stage)
        .dependency("rank", "ingest")
        .build()
}
