//! Integration tests for the ingest → rank pipeline.
//!
//! Each test writes a small provider snapshot to a temp dir and drives it
//! through the public API against a real SQLite file.

use std::path::{Path, PathBuf};

use kindred_core::schema::Database;
use kindred_etl::{
    build_pipeline, ingest_snapshot, RangeSource, RankOptions, RankStage, SnapshotRun,
};
use serde_json::json;
use tempfile::TempDir;
use treadle::WorkItem;

fn features(id: &str, danceability: f64, energy: f64, acousticness: f64) -> serde_json::Value {
    json!({
        "id": id,
        "danceability": danceability,
        "energy": energy,
        "loudness": -8.0,
        "speechiness": 0.05,
        "acousticness": acousticness,
        "instrumentalness": 0.0
    })
}

fn write_snapshot(dir: &Path) -> PathBuf {
    let snapshot = json!({
        "dt": "2023-01-17",
        "artists": [
            { "id": "a1", "name": "Alpha" },
            { "id": "a2", "name": "Beta" },
            { "id": "a3", "name": "Gamma" },
            { "id": "a4", "name": "Delta" }
        ],
        "top_tracks": [
            { "track_id": "t1", "artist_id": "a1", "track_name": "One" },
            { "track_id": "t2", "artist_id": "a1", "track_name": "Two" },
            { "track_id": "t3", "artist_id": "a2", "track_name": "Three" },
            { "track_id": "t4", "artist_id": "a3", "track_name": "Four" },
            { "track_id": "t5", "artist_id": "a4", "track_name": "Five" }
        ],
        "audio_features": [
            features("t1", 0.25, 0.5, 0.25),
            features("t2", 0.75, 0.5, 0.75),
            features("t3", 0.5, 0.5, 0.5),
            features("t4", 1.0, 0.0, 0.0),
            features("t5", 0.0, 1.0, 1.0)
        ]
    });
    let path = dir.join("snapshot-2023-01-17.json");
    std::fs::write(&path, serde_json::to_string_pretty(&snapshot).unwrap()).unwrap();
    path
}

/// Test that the pipeline can be built and wired correctly
#[tokio::test]
async fn test_pipeline_construction() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let result = build_pipeline(None, db_path, RankOptions::default());

    assert!(result.is_ok(), "Pipeline should build successfully");
}

/// Ingest then rank, and read the related artists back.
#[test]
fn test_ingest_and_rank() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let snapshot = write_snapshot(temp_dir.path());

    let mut db = Database::open(&db_path).unwrap();
    let summary = ingest_snapshot(&snapshot, &mut db).unwrap();
    assert_eq!(summary.artists, 4);
    assert_eq!(summary.audio_features, 5);
    drop(db);

    let stage = RankStage::new(db_path.clone(), RankOptions::default());
    let run = stage.run().unwrap();

    // a1 averages to the same point as a2, so they are not related.
    assert_eq!(run.artists, 4);
    assert_eq!(run.edges, 10);

    let db = Database::open(&db_path).unwrap();
    let related: Vec<String> = db
        .related_artists(&"a1".into(), 10)
        .unwrap()
        .into_iter()
        .map(|r| r.artist_id.to_string())
        .collect();
    assert_eq!(related, vec!["a3".to_string(), "a4".to_string()]);

    let stats = db.stats().unwrap();
    assert_eq!(stats.related_edges, 10);
}

/// Running the whole pipeline twice leaves the same related-artist table.
#[test]
fn test_rerun_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let snapshot = write_snapshot(temp_dir.path());
    let stage = RankStage::new(db_path.clone(), RankOptions::default());

    for _ in 0..2 {
        let mut db = Database::open(&db_path).unwrap();
        ingest_snapshot(&snapshot, &mut db).unwrap();
        drop(db);
        stage.run().unwrap();
    }

    let db = Database::open(&db_path).unwrap();
    let stats = db.stats().unwrap();
    assert_eq!(stats.artists, 4);
    assert_eq!(stats.top_tracks, 5);
    assert_eq!(stats.related_edges, 10);
}

/// Track ranges span the individual tracks, not the per-artist averages.
#[test]
fn test_rank_with_track_ranges() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let snapshot = write_snapshot(temp_dir.path());

    let mut db = Database::open(&db_path).unwrap();
    ingest_snapshot(&snapshot, &mut db).unwrap();
    let ranges = kindred_core::FeatureSource::fetch_track_ranges(&db).unwrap();
    drop(db);

    let energy = ranges.get("energy").unwrap();
    assert_eq!((energy.min(), energy.max()), (0.0, 1.0));

    let stage = RankStage::new(
        db_path,
        RankOptions {
            k: 1,
            range_source: RangeSource::Tracks,
        },
    );
    let run = stage.run().unwrap();
    assert_eq!(run.edges, 4);
}

/// The treadle workflow runs ingest and then rank for a snapshot run.
#[tokio::test]
async fn test_workflow_advance() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let snapshot = write_snapshot(temp_dir.path());

    let workflow =
        build_pipeline(Some(snapshot.clone()), db_path.clone(), RankOptions::default()).unwrap();
    let mut store = treadle::SqliteStateStore::open(&temp_dir.path().join("pipeline.db"))
        .await
        .unwrap();

    let run = SnapshotRun::new(Some(snapshot));
    assert!(run.id().starts_with("run-"));

    workflow.advance(&run, &mut store).await.unwrap();

    let db = Database::open(&db_path).unwrap();
    assert_eq!(db.stats().unwrap().related_edges, 10);
}

/// Artist profiles and track popularity from the snapshot feed the lookups.
#[test]
fn test_profile_and_top_tracks_from_snapshot() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("profile.json");
    let snapshot = json!({
        "dt": "2023-01-18",
        "artists": [
            { "id": "a1", "name": "Alpha", "followers": 1200, "popularity": 64,
              "artist_url": "https://open.spotify.com/artist/a1" }
        ],
        "top_tracks": [
            { "track_id": "t1", "artist_id": "a1", "track_name": "Quiet", "popularity": 12 },
            { "track_id": "t2", "artist_id": "a1", "track_name": "Loud", "popularity": 88,
              "album_name": "Volume" }
        ],
        "audio_features": []
    });
    std::fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();

    let mut db = Database::open_in_memory().unwrap();
    ingest_snapshot(&path, &mut db).unwrap();

    let artist = db.resolve_artist("ALPHA").unwrap().unwrap();
    assert_eq!(artist.followers, Some(1200));
    assert_eq!(artist.popularity, Some(64));

    let tracks = db.top_tracks(&artist.id, 3).unwrap();
    let names: Vec<&str> = tracks.iter().map(|t| t.track_name.as_str()).collect();
    assert_eq!(names, vec!["Loud", "Quiet"]);
    assert_eq!(tracks[0].album_name.as_deref(), Some("Volume"));
}
