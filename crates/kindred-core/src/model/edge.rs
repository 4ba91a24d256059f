use serde::{Deserialize, Serialize};

use crate::model::ids::ArtistId;

/// A directed similarity relationship: `related_artist_id` is one of the
/// nearest neighbors of `artist_id`, `distance` away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEdge {
    pub artist_id: ArtistId,
    pub related_artist_id: ArtistId,
    pub distance: f64,
}

impl RankedEdge {
    #[must_use]
    pub fn new(artist_id: ArtistId, related_artist_id: ArtistId, distance: f64) -> Self {
        Self {
            artist_id,
            related_artist_id,
            distance,
        }
    }
}
