//! Ingest stage: load a provider snapshot file into the local store.
//!
//! A snapshot file is one dated partition of the provider's catalog:
//! artists, their top tracks, and the audio features of those tracks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use kindred_core::model::{Artist, AudioFeatures, TopTrack};
use kindred_core::schema::Database;
use treadle::{Stage, StageContext, StageOutcome};

use crate::error::{PipelineError, PipelineResult};

/// The on-disk snapshot format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotFile {
    /// Partition date, `YYYY-MM-DD`.
    pub dt: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub top_tracks: Vec<TopTrack>,
    #[serde(default)]
    pub audio_features: Vec<AudioFeatures>,
}

impl SnapshotFile {
    /// Read and validate a snapshot file.
    pub fn load(path: &Path) -> PipelineResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let snapshot: Self =
            serde_json::from_str(&contents).map_err(|e| PipelineError::Snapshot {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if NaiveDate::parse_from_str(&snapshot.dt, "%Y-%m-%d").is_err() {
            return Err(PipelineError::Snapshot {
                path: path.to_path_buf(),
                message: format!("partition date '{}' is not YYYY-MM-DD", snapshot.dt),
            });
        }

        Ok(snapshot)
    }

    /// Top tracks that have no audio features in this snapshot. They are
    /// stored but drop out of the per-artist averages.
    #[must_use]
    pub fn tracks_without_features(&self) -> usize {
        let featured: HashSet<&str> = self
            .audio_features
            .iter()
            .map(|f| f.track_id.as_str())
            .collect();
        self.top_tracks
            .iter()
            .filter(|t| !featured.contains(t.track_id.as_str()))
            .count()
    }
}

/// What an ingest wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub dt: String,
    pub artists: usize,
    pub top_tracks: usize,
    pub audio_features: usize,
}

/// Load the snapshot at `path` into `db` in a single transaction.
///
/// Re-ingesting the same file leaves the store unchanged.
pub fn ingest_snapshot(path: &Path, db: &mut Database) -> PipelineResult<IngestSummary> {
    let snapshot = SnapshotFile::load(path)?;

    let missing = snapshot.tracks_without_features();
    if missing > 0 {
        log::warn!(
            "{} of {} top tracks in {} have no audio features",
            missing,
            snapshot.top_tracks.len(),
            path.display()
        );
    }

    db.insert_snapshot(
        &snapshot.dt,
        &snapshot.artists,
        &snapshot.top_tracks,
        &snapshot.audio_features,
    )?;

    log::info!(
        "Ingested partition {}: {} artists, {} top tracks, {} audio features",
        snapshot.dt,
        snapshot.artists.len(),
        snapshot.top_tracks.len(),
        snapshot.audio_features.len()
    );

    Ok(IngestSummary {
        dt: snapshot.dt,
        artists: snapshot.artists.len(),
        top_tracks: snapshot.top_tracks.len(),
        audio_features: snapshot.audio_features.len(),
    })
}

/// The Ingest stage: load a snapshot file, if one was given.
///
/// Without a snapshot the stage completes immediately and the run ranks
/// whatever is already stored.
#[derive(Debug)]
pub struct IngestStage {
    snapshot: Option<PathBuf>,
    db_path: PathBuf,
}

impl IngestStage {
    #[must_use]
    pub fn new(snapshot: Option<PathBuf>, db_path: PathBuf) -> Self {
        Self { snapshot, db_path }
    }
}

#[async_trait::async_trait]
impl Stage for IngestStage {
    fn name(&self) -> &str {
        "ingest"
    }

    async fn execute(
        &self,
        _item: &dyn treadle::WorkItem,
        ctx: &mut StageContext,
    ) -> treadle::Result<StageOutcome> {
        let Some(snapshot) = &self.snapshot else {
            log::info!("No snapshot given, ranking the stored partitions");
            return Ok(StageOutcome::Complete);
        };

        let mut db = Database::open(&self.db_path).map_err(|e| {
            treadle::TreadleError::StageExecution(format!("Failed to open database: {e}"))
        })?;

        let summary = ingest_snapshot(snapshot, &mut db).map_err(|e| {
            treadle::TreadleError::StageExecution(format!("Ingest failed: {e}"))
        })?;

        let summary_json = serde_json::to_value(&summary).map_err(|e| {
            treadle::TreadleError::StageExecution(format!("Failed to serialize summary: {e}"))
        })?;
        ctx.metadata.insert("ingest_summary".to_string(), summary_json);

        Ok(StageOutcome::Complete)
    }
}
