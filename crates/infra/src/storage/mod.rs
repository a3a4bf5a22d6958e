//! Backing media for persisted cache entries

mod media;
mod sqlite;

pub use media::open_storage_media;
pub use sqlite::SqliteMedium;
