use anyhow::{Context, Result};
use kindred_core::schema::Database;
use kindred_etl::ingest_snapshot;
use std::path::PathBuf;

pub fn run_ingest(file: PathBuf, db_path: PathBuf) -> Result<()> {
    log::info!("Ingesting {}", file.display());

    let mut db = Database::open(&db_path).context("Failed to open database")?;
    let summary = ingest_snapshot(&file, &mut db)
        .with_context(|| format!("Failed to ingest {}", file.display()))?;

    println!("\n✓ Ingested partition {}", summary.dt);
    println!("  Artists:        {}", summary.artists);
    println!("  Top tracks:     {}", summary.top_tracks);
    println!("  Audio features: {}", summary.audio_features);
    println!("\nRun 'kindred rank' to update related artists");

    Ok(())
}
