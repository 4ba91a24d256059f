use std::path::PathBuf;

use kindred_core::schema::Database;
use treadle::{Stage, StageContext, StageOutcome};

use crate::driver::{run_once, RankOptions, RunSummary, Snapshot};
use crate::error::PipelineResult;

/// The Rank stage: recompute the related-artist table from the latest
/// stored partitions.
#[derive(Debug, Clone)]
pub struct RankStage {
    db_path: PathBuf,
    options: RankOptions,
}

impl RankStage {
    #[must_use]
    pub fn new(db_path: PathBuf, options: RankOptions) -> Self {
        Self { db_path, options }
    }

    /// Run the ranking synchronously against the stage's database.
    pub fn run(&self) -> PipelineResult<RunSummary> {
        let mut db = Database::open(&self.db_path)?;
        let snapshot = Snapshot::capture(&db, self.options.range_source)?;
        run_once(&snapshot, &mut db, &self.options)
    }
}

#[async_trait::async_trait]
impl Stage for RankStage {
    fn name(&self) -> &str {
        "rank"
    }

    async fn execute(
        &self,
        _item: &dyn treadle::WorkItem,
        ctx: &mut StageContext,
    ) -> treadle::Result<StageOutcome> {
        let stage = self.clone();
        let summary = tokio::task::spawn_blocking(move || stage.run())
            .await
            .map_err(|e| {
                treadle::TreadleError::StageExecution(format!("Rank task panicked: {e}"))
            })?
            .map_err(|e| treadle::TreadleError::StageExecution(format!("Rank failed: {e}")))?;

        if !summary.degenerate_metrics.is_empty() {
            log::warn!(
                "Metrics with no spread in this population: {}",
                summary.degenerate_metrics.join(", ")
            );
        }

        let summary_json = serde_json::to_value(&summary).map_err(|e| {
            treadle::TreadleError::StageExecution(format!("Failed to serialize summary: {e}"))
        })?;
        ctx.metadata.insert("rank_summary".to_string(), summary_json);

        Ok(StageOutcome::Complete)
    }
}
