use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        ///
        /// The provider's identifier is opaque to kindred; ordering is plain
        /// lexicographic byte order, which is what ranking uses to break ties.
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(ArtistId, "Identifier for an artist as issued by the metadata provider.");
define_id!(TrackId, "Identifier for a track as issued by the metadata provider.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artist_id_display() {
        let id = ArtistId::new("0TnOYISbd1XYRBk9myaseg");
        assert_eq!(id.to_string(), "0TnOYISbd1XYRBk9myaseg");
        assert_eq!(id.as_str(), "0TnOYISbd1XYRBk9myaseg");
    }

    #[test]
    fn test_artist_id_ordering_is_lexicographic() {
        let mut ids = vec![ArtistId::from("b"), ArtistId::from("C"), ArtistId::from("a")];
        ids.sort();
        let ordered: Vec<&str> = ids.iter().map(ArtistId::as_str).collect();
        assert_eq!(ordered, vec!["C", "a", "b"]);
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = TrackId::new("track-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"track-1\"");

        let back: TrackId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
