use serde::{Deserialize, Serialize};

use crate::model::ids::ArtistId;

/// An artist known to the catalog.
///
/// The profile fields are optional; snapshots that only carry ids and
/// names still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    #[serde(default)]
    pub followers: Option<i64>,
    #[serde(default)]
    pub popularity: Option<i64>,
    #[serde(default)]
    pub artist_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Artist {
    #[must_use]
    pub fn new(id: impl Into<ArtistId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            followers: None,
            popularity: None,
            artist_url: None,
            image_url: None,
        }
    }

    #[must_use]
    pub const fn with_followers(mut self, followers: i64) -> Self {
        self.followers = Some(followers);
        self
    }

    #[must_use]
    pub const fn with_popularity(mut self, popularity: i64) -> Self {
        self.popularity = Some(popularity);
        self
    }

    #[must_use]
    pub fn with_artist_url(mut self, url: impl Into<String>) -> Self {
        self.artist_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}
