//! Port interfaces for catalog metadata
//!
//! Implemented outside this workspace by the AniList and Jikan clients.

use anistream_domain::{AnimeRecord, EpisodeList, ImageAsset, Result, SearchPage, SearchQuery};
use async_trait::async_trait;

/// Upstream source of catalog data
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch one anime record
    async fn fetch_anime(&self, id: u64) -> Result<AnimeRecord>;

    /// Fetch the episode list of an anime
    async fn fetch_episodes(&self, anime_id: u64) -> Result<EpisodeList>;

    /// Run a normalized search query
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage>;

    /// Resolve metadata for an image URL
    async fn resolve_image(&self, url: &str) -> Result<ImageAsset>;
}
