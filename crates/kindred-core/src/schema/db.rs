use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{
    Artist, ArtistId, AudioFeatures, FeatureVector, Range, RangeTable, RankedEdge, TopTrack,
    DEFAULT_METRICS,
};
use crate::store::{EdgeSink, FeatureSource};

use super::migrations::MIGRATIONS;

/// A database connection holding the snapshot tables and the related-artist
/// store.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

/// A stored neighbor of an artist, as served to lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedArtist {
    pub artist_id: ArtistId,
    /// Display name, when the artist is present in the catalog.
    pub name: Option<String>,
    pub distance: f64,
    pub updated_at: DateTime<Utc>,
}

/// Row counts and latest partitions, for status reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub artists: u64,
    pub top_tracks: u64,
    pub audio_features: u64,
    pub related_edges: u64,
    pub latest_track_partition: Option<String>,
    pub latest_feature_partition: Option<String>,
}

impl Database {
    /// Open (or create) a database at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    fn apply_migrations(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                self.conn.execute_batch(migration.sql)?;
                self.conn.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, migration.name],
                )?;
            }
        }

        Ok(())
    }
}

// Snapshot tables
impl Database {
    /// Write one snapshot partition in a single transaction.
    ///
    /// Rows are upserted, so loading the same partition twice is a no-op
    /// apart from refreshed artist timestamps. Returns the number of rows
    /// written across all three tables.
    pub fn insert_snapshot(
        &mut self,
        dt: &str,
        artists: &[Artist],
        tracks: &[TopTrack],
        features: &[AudioFeatures],
    ) -> Result<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut written = 0;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO artists (
                    artist_id, artist_name, followers, popularity, artist_url, image_url,
                    updated_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(artist_id) DO UPDATE SET
                    artist_name = excluded.artist_name,
                    followers = excluded.followers,
                    popularity = excluded.popularity,
                    artist_url = excluded.artist_url,
                    image_url = excluded.image_url,
                    updated_at = excluded.updated_at",
            )?;
            for artist in artists {
                written += stmt.execute(rusqlite::params![
                    artist.id.as_str(),
                    artist.name,
                    artist.followers,
                    artist.popularity,
                    artist.artist_url,
                    artist.image_url,
                    now,
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO top_tracks (
                    track_id, artist_id, track_name, album_name, popularity, image_url, dt
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(dt, track_id, artist_id) DO UPDATE SET
                    track_name = excluded.track_name,
                    album_name = excluded.album_name,
                    popularity = excluded.popularity,
                    image_url = excluded.image_url",
            )?;
            for track in tracks {
                written += stmt.execute(rusqlite::params![
                    track.track_id.as_str(),
                    track.artist_id.as_str(),
                    track.track_name,
                    track.album_name,
                    track.popularity,
                    track.image_url,
                    dt,
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO audio_features (
                    track_id, danceability, energy, loudness, speechiness,
                    acousticness, instrumentalness, liveness, valence, tempo,
                    duration_ms, dt
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                 ON CONFLICT(dt, track_id) DO UPDATE SET
                    danceability = excluded.danceability,
                    energy = excluded.energy,
                    loudness = excluded.loudness,
                    speechiness = excluded.speechiness,
                    acousticness = excluded.acousticness,
                    instrumentalness = excluded.instrumentalness,
                    liveness = excluded.liveness,
                    valence = excluded.valence,
                    tempo = excluded.tempo,
                    duration_ms = excluded.duration_ms",
            )?;
            for f in features {
                written += stmt.execute(rusqlite::params![
                    f.track_id.as_str(),
                    f.danceability,
                    f.energy,
                    f.loudness,
                    f.speechiness,
                    f.acousticness,
                    f.instrumentalness,
                    f.liveness,
                    f.valence,
                    f.tempo,
                    f.duration_ms,
                    dt,
                ])?;
            }
        }

        tx.commit()?;
        Ok(written)
    }

    /// Find an artist by provider id, falling back to a case-insensitive
    /// name match.
    pub fn resolve_artist(&self, query: &str) -> Result<Option<Artist>> {
        let row = self
            .conn
            .query_row(
                "SELECT artist_id, artist_name, followers, popularity, artist_url, image_url
                 FROM artists
                 WHERE artist_id = ?1 OR artist_name = ?1 COLLATE NOCASE
                 ORDER BY artist_id = ?1 DESC, artist_id
                 LIMIT 1",
                [query],
                row_to_artist,
            )
            .optional()?;
        Ok(row)
    }

    /// An artist's top tracks in the latest partition, most popular first.
    ///
    /// Tracks without a popularity sort last, then by track id.
    pub fn top_tracks(&self, artist_id: &ArtistId, limit: usize) -> Result<Vec<TopTrack>> {
        let mut stmt = self.conn.prepare(
            "SELECT track_id, artist_id, track_name, album_name, popularity, image_url
             FROM top_tracks
             WHERE artist_id = ?1 AND dt = (SELECT MAX(dt) FROM top_tracks)
             ORDER BY popularity IS NULL, popularity DESC, track_id
             LIMIT ?2",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let tracks = stmt
            .query_map(rusqlite::params![artist_id.as_str(), limit], |row| {
                Ok(TopTrack {
                    track_id: row.get::<_, String>(0)?.into(),
                    artist_id: row.get::<_, String>(1)?.into(),
                    track_name: row.get(2)?,
                    album_name: row.get(3)?,
                    popularity: row.get(4)?,
                    image_url: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(tracks)
    }

    /// Row counts and latest partitions across all tables.
    pub fn stats(&self) -> Result<StoreStats> {
        let count = |table: &str| -> Result<u64> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })?;
            Ok(u64::try_from(n).unwrap_or(0))
        };
        let latest = |table: &str| -> Result<Option<String>> {
            let dt: Option<String> =
                self.conn
                    .query_row(&format!("SELECT MAX(dt) FROM {table}"), [], |row| {
                        row.get(0)
                    })?;
            Ok(dt)
        };

        Ok(StoreStats {
            artists: count("artists")?,
            top_tracks: count("top_tracks")?,
            audio_features: count("audio_features")?,
            related_edges: count("related_artists")?,
            latest_track_partition: latest("top_tracks")?,
            latest_feature_partition: latest("audio_features")?,
        })
    }
}

impl FeatureSource for Database {
    fn fetch_vectors(&self) -> Result<Vec<FeatureVector>> {
        let averages = DEFAULT_METRICS
            .iter()
            .map(|m| format!("AVG(f.{m})"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT t.artist_id, {averages}
             FROM top_tracks t
             JOIN audio_features f ON f.track_id = t.track_id
             WHERE t.dt = (SELECT MAX(dt) FROM top_tracks)
               AND f.dt = (SELECT MAX(dt) FROM audio_features)
             GROUP BY t.artist_id
             ORDER BY t.artist_id"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let vectors = stmt
            .query_map([], |row| {
                let mut vector = FeatureVector::new(row.get::<_, String>(0)?);
                for (i, metric) in DEFAULT_METRICS.iter().enumerate() {
                    vector = vector.with_metric(*metric, row.get::<_, f64>(i + 1)?);
                }
                Ok(vector)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        log::debug!("Aggregated feature vectors for {} artists", vectors.len());
        Ok(vectors)
    }

    fn fetch_track_ranges(&self) -> Result<RangeTable> {
        let bounds = DEFAULT_METRICS
            .iter()
            .map(|m| format!("MIN({m}), MAX({m})"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {bounds} FROM audio_features
             WHERE dt = (SELECT MAX(dt) FROM audio_features)"
        );

        let raw: Vec<(Option<f64>, Option<f64>)> = self.conn.query_row(&sql, [], |row| {
            (0..DEFAULT_METRICS.len())
                .map(|i| -> rusqlite::Result<(Option<f64>, Option<f64>)> {
                    Ok((row.get(2 * i)?, row.get(2 * i + 1)?))
                })
                .collect()
        })?;

        let mut table = RangeTable::new();
        for (metric, bounds) in DEFAULT_METRICS.iter().zip(raw) {
            let (Some(min), Some(max)) = bounds else {
                return Err(Error::NotFound {
                    entity: "audio_features partition",
                    id: "latest".to_string(),
                });
            };
            table.insert(*metric, Range::new(min, max)?);
        }
        Ok(table)
    }
}

// Related-artist store
impl EdgeSink for Database {
    fn persist(&mut self, sources: &[ArtistId], edges: &[RankedEdge]) -> Result<usize> {
        let ranked: HashSet<&ArtistId> = sources.iter().collect();
        if let Some(bad) = edges.iter().find(|e| {
            e.artist_id == e.related_artist_id
                || e.distance.is_nan()
                || e.distance <= 0.0
                || !ranked.contains(&e.artist_id)
        }) {
            return Err(Error::InvalidData(format!(
                "refusing to store edge {} -> {} with distance {}",
                bad.artist_id, bad.related_artist_id, bad.distance
            )));
        }

        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut cleared = 0;
        let mut written = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM related_artists WHERE artist_id = ?1")?;
            for source in sources {
                cleared += stmt.execute([source.as_str()])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO related_artists (artist_id, related_artist_id, distance, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(artist_id, related_artist_id) DO UPDATE SET
                    distance = excluded.distance,
                    updated_at = excluded.updated_at",
            )?;
            for edge in edges {
                written += stmt.execute(rusqlite::params![
                    edge.artist_id.as_str(),
                    edge.related_artist_id.as_str(),
                    edge.distance,
                    now,
                ])?;
            }
        }
        tx.commit()?;

        log::debug!(
            "Replaced {} related-artist edges with {} for {} artists",
            cleared,
            written,
            sources.len()
        );
        Ok(written)
    }
}

impl Database {
    /// Stored neighbors of an artist, nearest first.
    pub fn related_artists(&self, artist_id: &ArtistId, limit: usize) -> Result<Vec<RelatedArtist>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.related_artist_id, a.artist_name, r.distance, r.updated_at
             FROM related_artists r
             LEFT JOIN artists a ON a.artist_id = r.related_artist_id
             WHERE r.artist_id = ?1
             ORDER BY r.distance, r.related_artist_id
             LIMIT ?2",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let related = stmt
            .query_map(rusqlite::params![artist_id.as_str(), limit], |row| {
                let updated_at: String = row.get(3)?;
                let updated_at = DateTime::parse_from_rfc3339(&updated_at)
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e))
                    })?
                    .with_timezone(&Utc);
                Ok(RelatedArtist {
                    artist_id: ArtistId::new(row.get::<_, String>(0)?),
                    name: row.get(1)?,
                    distance: row.get(2)?,
                    updated_at,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(related)
    }
}

fn row_to_artist(row: &rusqlite::Row<'_>) -> rusqlite::Result<Artist> {
    Ok(Artist {
        id: ArtistId::new(row.get::<_, String>(0)?),
        name: row.get(1)?,
        followers: row.get(2)?,
        popularity: row.get(3)?,
        artist_url: row.get(4)?,
        image_url: row.get(5)?,
    })
}
