use anyhow::Result;
use kindred_core::schema::Database;
use std::path::PathBuf;

pub fn show_status(db_path: PathBuf) -> Result<()> {
    let db = Database::open(&db_path)?;
    let stats = db.stats()?;

    println!("\n📊 Kindred Status\n");
    println!("  Database: {}", db_path.display());
    println!("  Artists: {}", stats.artists);
    println!("  Top tracks: {}", stats.top_tracks);
    println!("  Audio features: {}", stats.audio_features);
    println!("  Related-artist edges: {}", stats.related_edges);
    println!(
        "  Latest track partition: {}",
        stats.latest_track_partition.as_deref().unwrap_or("<none>")
    );
    println!(
        "  Latest feature partition: {}",
        stats.latest_feature_partition.as_deref().unwrap_or("<none>")
    );

    if stats.artists == 0 {
        println!("\n  Run `kindred ingest <FILE>` to load a snapshot");
    } else if stats.related_edges == 0 {
        println!("\n  Run `kindred rank` to compute related artists");
    }

    Ok(())
}
