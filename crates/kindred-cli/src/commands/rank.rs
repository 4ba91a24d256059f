use anyhow::{Context, Result};
use kindred_etl::{RankOptions, RankStage};
use std::path::PathBuf;

pub async fn run_rank(db_path: PathBuf, options: RankOptions) -> Result<()> {
    log::info!(
        "Ranking related artists (k = {}, ranges from {})",
        options.k,
        options.range_source
    );

    let stage = RankStage::new(db_path, options);
    let summary = tokio::task::spawn_blocking(move || stage.run())
        .await
        .context("Rank task panicked")?
        .context("Ranking failed")?;

    println!("\n✓ Ranked {} artists", summary.artists);
    println!("  Related-artist edges: {}", summary.edges);
    if !summary.degenerate_metrics.is_empty() {
        println!(
            "  Metrics without spread (ignored): {}",
            summary.degenerate_metrics.join(", ")
        );
    }

    Ok(())
}
