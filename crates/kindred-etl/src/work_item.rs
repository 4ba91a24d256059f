use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use treadle::WorkItem;

/// One pass of the pipeline: optionally ingest a snapshot, then rank.
///
/// This is the treadle `WorkItem` that flows through ingest → rank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRun {
    /// Unique ID for this run.
    id: String,
    /// Snapshot file to ingest before ranking, if any.
    pub snapshot: Option<PathBuf>,
}

impl SnapshotRun {
    #[must_use]
    pub fn new(snapshot: Option<PathBuf>) -> Self {
        Self {
            id: format!("run-{}", uuid::Uuid::new_v4()),
            snapshot,
        }
    }

    #[must_use]
    pub fn with_id(id: impl Into<String>, snapshot: Option<PathBuf>) -> Self {
        Self {
            id: id.into(),
            snapshot,
        }
    }
}

impl WorkItem for SnapshotRun {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for SnapshotRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.snapshot {
            Some(path) => write!(f, "{} ({})", self.id, path.display()),
            None => write!(f, "{} (stored partitions)", self.id),
        }
    }
}
