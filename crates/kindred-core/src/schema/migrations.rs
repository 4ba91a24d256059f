/// A schema migration.
#[derive(Debug)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

const MIGRATION_001: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Artists known to the catalog
CREATE TABLE IF NOT EXISTS artists (
    artist_id TEXT PRIMARY KEY,
    artist_name TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_artists_name ON artists(artist_name);

-- Top tracks per artist, partitioned by snapshot date
CREATE TABLE IF NOT EXISTS top_tracks (
    track_id TEXT NOT NULL,
    artist_id TEXT NOT NULL,
    track_name TEXT NOT NULL,
    album_name TEXT,
    popularity INTEGER,
    image_url TEXT,
    dt TEXT NOT NULL,
    PRIMARY KEY (dt, track_id, artist_id)
);

CREATE INDEX IF NOT EXISTS idx_top_tracks_artist_id ON top_tracks(artist_id);

-- Audio descriptors per track, partitioned by snapshot date
CREATE TABLE IF NOT EXISTS audio_features (
    track_id TEXT NOT NULL,
    danceability REAL NOT NULL,
    energy REAL NOT NULL,
    loudness REAL NOT NULL,
    speechiness REAL NOT NULL,
    acousticness REAL NOT NULL,
    instrumentalness REAL NOT NULL,
    liveness REAL,
    valence REAL,
    tempo REAL,
    duration_ms INTEGER,
    dt TEXT NOT NULL,
    PRIMARY KEY (dt, track_id)
);

-- Nearest neighbors per artist, one row per directed pair
CREATE TABLE IF NOT EXISTS related_artists (
    artist_id TEXT NOT NULL,
    related_artist_id TEXT NOT NULL,
    distance REAL NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (artist_id, related_artist_id)
);

CREATE INDEX IF NOT EXISTS idx_related_artists_distance ON related_artists(artist_id, distance);
"#;

const MIGRATION_002: &str = r#"
-- Artist profile, as shown next to related-artist lookups
ALTER TABLE artists ADD COLUMN followers INTEGER;
ALTER TABLE artists ADD COLUMN popularity INTEGER;
ALTER TABLE artists ADD COLUMN artist_url TEXT;
ALTER TABLE artists ADD COLUMN image_url TEXT;

CREATE INDEX IF NOT EXISTS idx_top_tracks_popularity ON top_tracks(dt, artist_id, popularity);
"#;

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        sql: MIGRATION_001,
    },
    Migration {
        version: 2,
        name: "artist_profile",
        sql: MIGRATION_002,
    },
];
