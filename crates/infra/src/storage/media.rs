//! Storage media bootstrap

use std::sync::Arc;

use anistream_core::StorageMedia;
use anistream_domain::CacheSettings;
use tracing::{info, warn};

use super::sqlite::SqliteMedium;

/// Open the media the configured domains need
///
/// A persistent medium is only opened when some domain asks for one. If the
/// database cannot be opened the failure is logged and the media carry only
/// the session medium; persistent domains then behave as session-scoped.
pub fn open_storage_media(settings: &CacheSettings) -> StorageMedia {
    if !settings.needs_persistent_medium() {
        info!("no domain uses persistent storage, skipping database");
        return StorageMedia::in_memory();
    }

    match SqliteMedium::open(&settings.db_path) {
        Ok(medium) => StorageMedia::with_persistent(Arc::new(medium)),
        Err(err) => {
            warn!(
                db_path = %settings.db_path,
                error = %err,
                "persistent cache storage unavailable, falling back to session storage"
            );
            StorageMedia::in_memory()
        }
    }
}
