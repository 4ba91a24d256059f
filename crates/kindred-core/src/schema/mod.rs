mod db;
mod migrations;

pub use db::{Database, RelatedArtist, StoreStats};
pub use migrations::{Migration, MIGRATIONS};
