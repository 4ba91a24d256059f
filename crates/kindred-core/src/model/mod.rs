pub mod artist;
pub mod edge;
pub mod feature;
pub mod ids;
pub mod range;
pub mod track;

pub use artist::Artist;
pub use edge::RankedEdge;
pub use feature::{FeatureVector, DEFAULT_METRICS};
pub use ids::{ArtistId, TrackId};
pub use range::{Range, RangeTable};
pub use track::{AudioFeatures, TopTrack};
