//! Domain cache registry
//!
//! One typed cache per data domain, built once at start-up from
//! [`CacheSettings`] and the available storage media, then shared with route
//! handlers by `Arc`. All persisted domains share one medium and are kept
//! apart by their key prefix (`anistream:<domain>:`).

use std::sync::Arc;
use std::time::Duration;

use anistream_common::cache::{
    Cache, CacheConfig, CacheStats, CacheValue, CleanupHandle, KeyValueMedium, MediumStorage,
    MemoryMedium, NoopStorage, StorageAdapter, StorageKind,
};
use anistream_common::{Clock, SystemClock};
use anistream_domain::constants::KEY_NAMESPACE;
use anistream_domain::{
    impl_domain_status_conversions, AnimeRecord, CacheSettings, DomainCacheConfig, EpisodeList,
    ImageAsset, SearchPage, StorageBackend,
};
use tracing::{debug, info, warn};

/// The data domains with a dedicated cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheDomain {
    /// Anime records keyed by id, tagged by anime and genre
    Anime,
    /// Episode lists keyed by anime id, tagged by anime
    Episodes,
    /// Search result pages keyed by page and normalized query
    Search,
    /// Image metadata keyed by URL
    Images,
}

impl_domain_status_conversions!(CacheDomain {
    Anime => "anime",
    Episodes => "episodes",
    Search => "search",
    Images => "images",
});

impl CacheDomain {
    /// Every domain, in registry order
    pub const ALL: [Self; 4] = [Self::Anime, Self::Episodes, Self::Search, Self::Images];

    /// Storage prefix, e.g. `anistream:anime:`
    pub fn key_prefix(self) -> String {
        format!("{KEY_NAMESPACE}:{self}:")
    }

    /// Production size, lifetime and backend of this domain
    pub fn default_config(self) -> DomainCacheConfig {
        self.settings_in(&CacheSettings::default())
    }

    /// This domain's section of `settings`
    pub fn settings_in(self, settings: &CacheSettings) -> DomainCacheConfig {
        match self {
            Self::Anime => settings.anime,
            Self::Episodes => settings.episodes,
            Self::Search => settings.search,
            Self::Images => settings.images,
        }
    }
}

/// Backing media shared by the domain caches
///
/// `session` lives as long as the process. `persistent` is absent when no
/// durable medium could be opened; persistent domains then fall back to the
/// session medium.
#[derive(Clone, Default)]
pub struct StorageMedia {
    /// Process-lifetime medium backing session domains
    pub session: MemoryMedium,
    /// Durable medium backing persistent domains, usually SQLite
    pub persistent: Option<Arc<dyn KeyValueMedium>>,
}

impl StorageMedia {
    /// Session medium only
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Session medium plus a durable one
    pub fn with_persistent(persistent: Arc<dyn KeyValueMedium>) -> Self {
        Self { session: MemoryMedium::new(), persistent: Some(persistent) }
    }

    /// Whether a durable medium is available
    pub fn has_persistent(&self) -> bool {
        self.persistent.is_some()
    }

    fn adapter<V: CacheValue>(
        &self,
        domain: CacheDomain,
        backend: StorageBackend,
    ) -> Arc<dyn StorageAdapter<V>> {
        let prefix = domain.key_prefix();
        match backend {
            StorageBackend::Memory => Arc::new(NoopStorage),
            StorageBackend::Session => {
                Arc::new(MediumStorage::session(self.session.clone(), prefix))
            }
            StorageBackend::Persistent => match &self.persistent {
                Some(medium) => Arc::new(MediumStorage::persistent(Arc::clone(medium), prefix)),
                None => {
                    warn!(%domain, "no persistent medium, falling back to session storage");
                    Arc::new(MediumStorage::session(self.session.clone(), prefix))
                }
            },
        }
    }
}

impl std::fmt::Debug for StorageMedia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageMedia")
            .field("session_records", &self.session.len())
            .field("persistent", &self.has_persistent())
            .finish()
    }
}

/// The four domain caches
///
/// Cloning is cheap; clones share the same caches.
#[derive(Debug, Clone)]
pub struct DomainCaches<C: Clock + Clone = SystemClock> {
    anime: Cache<AnimeRecord, C>,
    episodes: Cache<EpisodeList, C>,
    search: Cache<SearchPage, C>,
    images: Cache<ImageAsset, C>,
}

impl DomainCaches<SystemClock> {
    /// Build every domain cache, restoring persisted entries
    pub fn new(settings: &CacheSettings, media: &StorageMedia) -> Self {
        Self::with_clock(settings, media, SystemClock)
    }

    /// Default sizes and lifetimes with nothing persisted
    pub fn in_memory() -> Self {
        let mut settings = CacheSettings::default();
        for domain in [
            &mut settings.anime,
            &mut settings.episodes,
            &mut settings.search,
            &mut settings.images,
        ] {
            domain.backend = StorageBackend::Memory;
        }
        Self::new(&settings, &StorageMedia::in_memory())
    }
}

impl<C: Clock + Clone> DomainCaches<C> {
    /// Build every domain cache on an explicit clock
    pub fn with_clock(settings: &CacheSettings, media: &StorageMedia, clock: C) -> Self {
        let caches = Self {
            anime: build(CacheDomain::Anime, settings, media, clock.clone()),
            episodes: build(CacheDomain::Episodes, settings, media, clock.clone()),
            search: build(CacheDomain::Search, settings, media, clock.clone()),
            images: build(CacheDomain::Images, settings, media, clock),
        };
        info!(
            anime = caches.anime.len(),
            episodes = caches.episodes.len(),
            search = caches.search.len(),
            images = caches.images.len(),
            persistent = media.has_persistent(),
            "domain caches ready"
        );
        caches
    }

    /// Anime records, keyed by [`anime_key`](anistream_domain::keys::anime_key)
    pub fn anime(&self) -> &Cache<AnimeRecord, C> {
        &self.anime
    }

    /// Episode lists, keyed by
    /// [`episodes_key`](anistream_domain::keys::episodes_key)
    pub fn episodes(&self) -> &Cache<EpisodeList, C> {
        &self.episodes
    }

    /// Search pages, keyed by [`search_key`](anistream_domain::keys::search_key)
    pub fn search(&self) -> &Cache<SearchPage, C> {
        &self.search
    }

    /// Image metadata, keyed by [`image_key`](anistream_domain::keys::image_key)
    pub fn images(&self) -> &Cache<ImageAsset, C> {
        &self.images
    }

    /// Start the expiry sweep of every domain
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_maintenance(&self) -> MaintenanceHandle {
        let handles = vec![
            self.anime.spawn_cleanup(),
            self.episodes.spawn_cleanup(),
            self.search.spawn_cleanup(),
            self.images.spawn_cleanup(),
        ];
        debug!(tasks = handles.len(), "cache maintenance started");
        MaintenanceHandle { handles }
    }

    /// Statistics of every domain, in registry order
    pub fn stats(&self) -> Vec<(CacheDomain, CacheStats)> {
        vec![
            (CacheDomain::Anime, self.anime.stats()),
            (CacheDomain::Episodes, self.episodes.stats()),
            (CacheDomain::Search, self.search.stats()),
            (CacheDomain::Images, self.images.stats()),
        ]
    }

    /// Wait until every domain's queued storage writes have been applied
    pub fn flush(&self) {
        self.anime.flush();
        self.episodes.flush();
        self.search.flush();
        self.images.flush();
    }

    /// Empty every domain, including persisted copies
    pub fn clear_all(&self) {
        self.anime.clear();
        self.episodes.clear();
        self.search.clear();
        self.images.clear();
        info!("all domain caches cleared");
    }

    /// Drop entries carrying `tag` in every domain, returning how many went
    pub fn invalidate_tag_everywhere(&self, tag: &str) -> usize {
        let removed = self.anime.invalidate_by_tag(tag)
            + self.episodes.invalidate_by_tag(tag)
            + self.search.invalidate_by_tag(tag)
            + self.images.invalidate_by_tag(tag);
        debug!(tag, removed, "tag invalidated in all domains");
        removed
    }
}

fn build<V, C>(
    domain: CacheDomain,
    settings: &CacheSettings,
    media: &StorageMedia,
    clock: C,
) -> Cache<V, C>
where
    V: CacheValue,
    C: Clock,
{
    let section = domain.settings_in(settings);
    let config = CacheConfig::builder()
        .max_size(section.max_size)
        .default_ttl(Duration::from_secs(section.ttl_secs))
        .storage(storage_kind(section.backend))
        .key_prefix(domain.key_prefix())
        .cleanup_interval(Duration::from_secs(settings.cleanup_interval_secs))
        .build();
    Cache::with_clock(config, media.adapter(domain, section.backend), clock)
}

fn storage_kind(backend: StorageBackend) -> StorageKind {
    match backend {
        StorageBackend::Memory => StorageKind::Memory,
        StorageBackend::Session => StorageKind::Session,
        StorageBackend::Persistent => StorageKind::Persistent,
    }
}

/// Handle to the sweep tasks started by [`DomainCaches::start_maintenance`]
///
/// Dropping the handle leaves the sweeps running until their caches drop.
#[derive(Debug)]
pub struct MaintenanceHandle {
    handles: Vec<CleanupHandle>,
}

impl MaintenanceHandle {
    /// Stop every sweep
    pub fn stop(&self) {
        for handle in &self.handles {
            handle.stop();
        }
    }

    /// Number of sweeps still running
    pub fn running(&self) -> usize {
        self.handles.iter().filter(|handle| !handle.is_finished()).count()
    }
}
