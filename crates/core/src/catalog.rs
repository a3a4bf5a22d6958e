//! Catalog service - cache-aside reads over the domain caches

use std::sync::Arc;

use anistream_common::cache::EntryOptions;
use anistream_common::{Clock, SystemClock};
use anistream_domain::keys::{anime_key, anime_tag, episodes_key, genre_tag, image_key, search_key};
use anistream_domain::{AnimeRecord, EpisodeList, ImageAsset, Result, SearchPage, SearchQuery};
use tracing::debug;

use crate::ports::MetadataSource;
use crate::registry::DomainCaches;

/// Read path used by route handlers
///
/// Every read goes to the matching domain cache first and only reaches the
/// metadata source on a miss. Upstream errors are returned unchanged and
/// nothing is cached for them.
pub struct CatalogService<C: Clock + Clone = SystemClock> {
    caches: DomainCaches<C>,
    source: Arc<dyn MetadataSource>,
}

impl<C: Clock + Clone> CatalogService<C> {
    /// Create a catalog service over `caches`
    pub fn new(caches: DomainCaches<C>, source: Arc<dyn MetadataSource>) -> Self {
        Self { caches, source }
    }

    /// Caches this service reads through
    pub fn caches(&self) -> &DomainCaches<C> {
        &self.caches
    }

    /// Anime record by id
    ///
    /// Records are tagged with `anime:<id>` and one `genre:<slug>` per genre,
    /// which are only known once the record is fetched.
    pub async fn anime(&self, id: u64) -> Result<AnimeRecord> {
        let key = anime_key(id);
        if let Some(record) = self.caches.anime().get(&key) {
            return Ok(record);
        }

        debug!(id, "anime cache miss");
        let record = self.source.fetch_anime(id).await?;
        let options = EntryOptions::new()
            .tag(anime_tag(id))
            .tags(record.genres.iter().map(|genre| genre_tag(genre)));
        self.caches.anime().set_with(key, record.clone(), options);
        Ok(record)
    }

    /// Episode list of an anime
    ///
    /// Concurrent misses for the same anime share one upstream request.
    pub async fn episodes(&self, anime_id: u64) -> Result<EpisodeList> {
        let source = Arc::clone(&self.source);
        self.caches
            .episodes()
            .get_or_set_coalesced(
                &episodes_key(anime_id),
                || async move {
                    debug!(anime_id, "episodes cache miss");
                    source.fetch_episodes(anime_id).await
                },
                EntryOptions::new().tag(anime_tag(anime_id)),
            )
            .await
    }

    /// One page of search results
    ///
    /// # Errors
    /// Returns `AniStreamError::InvalidInput` for a blank query or page 0
    /// without touching the cache.
    pub async fn search(&self, text: &str, page: u32) -> Result<SearchPage> {
        let query = SearchQuery::new(text, page)?;
        let source = Arc::clone(&self.source);
        self.caches
            .search()
            .get_or_set(
                &search_key(&query),
                || async move {
                    debug!(query = query.text(), page = query.page(), "search cache miss");
                    source.search(&query).await
                },
                EntryOptions::default(),
            )
            .await
    }

    /// Image metadata for a URL
    pub async fn image(&self, url: &str) -> Result<ImageAsset> {
        let source = Arc::clone(&self.source);
        let url_owned = url.to_string();
        self.caches
            .images()
            .get_or_set_coalesced(
                &image_key(url),
                || async move { source.resolve_image(&url_owned).await },
                EntryOptions::default(),
            )
            .await
    }

    /// Drop an anime record and every episode list derived from it
    ///
    /// Returns how many entries were removed.
    pub fn invalidate_anime(&self, id: u64) -> usize {
        let record = usize::from(self.caches.anime().delete(&anime_key(id)));
        let episodes = self.caches.episodes().invalidate_by_tag(&anime_tag(id));
        debug!(id, removed = record + episodes, "anime invalidated");
        record + episodes
    }

    /// Drop every cached anime record of a genre
    pub fn invalidate_genre(&self, genre: &str) -> usize {
        let tag = genre_tag(genre);
        let removed = self.caches.anime().invalidate_by_tag(&tag);
        debug!(tag = %tag, removed, "genre invalidated");
        removed
    }
}
