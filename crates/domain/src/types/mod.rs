//! Catalog types cached by the client
//!
//! Every type here is produced by a metadata source (AniList, Jikan or the
//! image CDN), stored in one of the domain caches and handed to route
//! handlers. They are plain serde structs; persisted cache records embed them
//! as JSON.

pub mod anime;
pub mod episode;
pub mod image;
pub mod search;

pub use anime::{AnimeRecord, AnimeStatus};
pub use episode::{Episode, EpisodeList};
pub use image::ImageAsset;
pub use search::{SearchPage, SearchQuery, SearchResult};
