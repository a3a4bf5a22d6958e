//! Cache layer bootstrap
//!
//! Builds the domain caches from loaded configuration. Collaborators receive
//! the resulting [`DomainCaches`] by injection; nothing here is global.

use anistream_core::{DomainCaches, MaintenanceHandle};
use anistream_domain::{AppConfig, Result};
use tracing::info;

use crate::storage::open_storage_media;

/// Running cache layer: the caches plus their expiry sweeps
#[derive(Debug)]
pub struct CacheRuntime {
    pub caches: DomainCaches,
    pub maintenance: MaintenanceHandle,
}

impl CacheRuntime {
    /// Stop the sweeps and wait for queued storage writes
    ///
    /// The caches stay usable afterwards.
    pub fn shutdown(&self) {
        self.maintenance.stop();
        self.caches.flush();
        info!("cache maintenance stopped");
    }
}

/// Validate `config`, open storage media and build the domain caches
///
/// Persisted entries are restored during construction. An unavailable
/// database degrades persistent domains to session storage.
///
/// # Errors
/// Returns `AniStreamError::Config` if the configuration is invalid.
pub fn build_caches(config: &AppConfig) -> Result<DomainCaches> {
    config.validate()?;
    let media = open_storage_media(&config.cache);
    Ok(DomainCaches::new(&config.cache, &media))
}

/// Build the domain caches and start their expiry sweeps
///
/// Must be called from within a tokio runtime.
///
/// # Errors
/// Returns `AniStreamError::Config` if the configuration is invalid.
pub fn start_cache_runtime(config: &AppConfig) -> Result<CacheRuntime> {
    let caches = build_caches(config)?;
    let maintenance = caches.start_maintenance();
    info!(
        cleanup_interval_secs = config.cache.cleanup_interval_secs,
        "cache runtime started"
    );
    Ok(CacheRuntime { caches, maintenance })
}
