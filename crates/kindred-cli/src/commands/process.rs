use anyhow::{Context, Result};
use kindred_etl::{build_pipeline, RankOptions, SnapshotRun};
use std::path::PathBuf;

/// Orchestrate the ingest → rank pipeline.
///
/// Steps:
/// 1. Ingest - load the snapshot file, if one is given
/// 2. Rank - recompute the related-artist table
pub async fn run_process(
    snapshot: Option<PathBuf>,
    db_path: PathBuf,
    options: RankOptions,
) -> Result<()> {
    println!("\n🎧 Kindred Processing Pipeline\n");
    match &snapshot {
        Some(path) => println!("  Snapshot: {}", path.display()),
        None => println!("  Snapshot: <none, ranking stored data>"),
    }
    println!("  Database: {}", db_path.display());
    println!("  Neighbors per artist: {}", options.k);
    println!();

    let workflow = build_pipeline(snapshot.clone(), db_path.clone(), options)
        .context("Failed to build pipeline")?;

    // Create state store
    let parent = db_path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
    let state_path = parent.join("pipeline.db");
    let mut store = treadle::SqliteStateStore::open(&state_path)
        .await
        .context("Failed to open pipeline state store")?;

    let run = SnapshotRun::new(snapshot);
    log::info!("Starting pipeline run {run}");

    // Subscribe to events for progress display
    let mut events = workflow.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                treadle::WorkflowEvent::StageStarted { stage, .. } => {
                    println!("  ⏳ [{stage}] Starting...");
                }
                treadle::WorkflowEvent::StageCompleted { stage, .. } => {
                    println!("  ✓ [{stage}] Complete");
                }
                treadle::WorkflowEvent::StageFailed { stage, error, .. } => {
                    eprintln!("  ✗ [{stage}] FAILED: {error}");
                }
                _ => {}
            }
        }
    });

    workflow
        .advance(&run, &mut store)
        .await
        .context("Pipeline execution failed")?;

    println!("\n✓ Pipeline complete!");
    println!("\nNext steps:");
    println!("  - Run 'kindred related <ARTIST>' to see an artist's neighbors");
    println!("  - Run 'kindred status' to see database status");

    Ok(())
}
