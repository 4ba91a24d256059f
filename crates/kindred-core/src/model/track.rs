use serde::{Deserialize, Serialize};

use crate::model::ids::{ArtistId, TrackId};

/// One of an artist's top tracks, as reported by the metadata provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopTrack {
    pub track_id: TrackId,
    pub artist_id: ArtistId,
    pub track_name: String,
    pub album_name: Option<String>,
    pub popularity: Option<i64>,
    pub image_url: Option<String>,
}

impl TopTrack {
    #[must_use]
    pub fn new(
        track_id: impl Into<TrackId>,
        artist_id: impl Into<ArtistId>,
        track_name: impl Into<String>,
    ) -> Self {
        Self {
            track_id: track_id.into(),
            artist_id: artist_id.into(),
            track_name: track_name.into(),
            album_name: None,
            popularity: None,
            image_url: None,
        }
    }
}

/// Audio descriptors for a single track.
///
/// Field names follow the provider's audio-features payload, so a raw
/// response deserializes directly (`id` is accepted for `track_id`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    #[serde(alias = "id")]
    pub track_id: TrackId,
    pub danceability: f64,
    pub energy: f64,
    pub loudness: f64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    #[serde(default)]
    pub liveness: Option<f64>,
    #[serde(default)]
    pub valence: Option<f64>,
    #[serde(default)]
    pub tempo: Option<f64>,
    #[serde(default)]
    pub duration_ms: Option<i64>,
}
