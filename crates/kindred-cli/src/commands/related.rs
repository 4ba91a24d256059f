use anyhow::{Context, Result};
use kindred_core::model::{Artist, TopTrack};
use kindred_core::schema::Database;
use std::path::PathBuf;

/// Print the stored neighbors of the artist matching `query`, each with its
/// most popular tracks.
pub fn show_related(db_path: PathBuf, query: &str, limit: usize, tracks: usize) -> Result<()> {
    let db = Database::open(&db_path).context("Failed to open database")?;

    let Some(artist) = db.resolve_artist(query)? else {
        anyhow::bail!("No artist matches '{query}'");
    };

    println!("\n🎧 {} ({})", artist.name, artist.id);
    print_profile(&artist);
    print_tracks(&db.top_tracks(&artist.id, tracks)?);

    let related = db.related_artists(&artist.id, limit)?;

    println!("\n  Related artists:\n");
    if related.is_empty() {
        println!("  No related artists stored.");
        println!("\n  Run `kindred rank` to compute them");
        return Ok(());
    }

    for (i, r) in related.iter().enumerate() {
        let name = r.name.as_deref().unwrap_or("<unknown>");
        println!(
            "  {}. {} ({})  distance {:.4}",
            i + 1,
            name,
            r.artist_id,
            r.distance
        );
        print_tracks(&db.top_tracks(&r.artist_id, tracks)?);
    }

    if let Some(updated) = related.iter().map(|r| r.updated_at).max() {
        println!("\n  Last ranked: {}", updated.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    Ok(())
}

fn print_profile(artist: &Artist) {
    if let Some(popularity) = artist.popularity {
        println!("  Popularity: {popularity}");
    }
    if let Some(followers) = artist.followers {
        println!("  Followers: {followers}");
    }
    if let Some(url) = &artist.artist_url {
        println!("  {url}");
    }
}

fn print_tracks(tracks: &[TopTrack]) {
    for track in tracks {
        match &track.album_name {
            Some(album) => println!("       ♪ {} ({})", track.track_name, album),
            None => println!("       ♪ {}", track.track_name),
        }
    }
}
