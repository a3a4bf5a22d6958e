//! Cache key and tag builders
//!
//! Keys are relative to a domain cache and do not repeat the domain; the
//! storage prefix (`anistream:<domain>:`) is added by the cache's storage
//! adapter, so anime 21 is stored as `anistream:anime:21`. Keeping the
//! builders here means route handlers, the catalog service and invalidation
//! hooks all agree on the same keys.

use crate::constants::{ANIME_TAG_PREFIX, GENRE_TAG_PREFIX};
use crate::types::SearchQuery;

/// Key of an anime record
pub fn anime_key(id: u64) -> String {
    id.to_string()
}

/// Key of the episode list of an anime
pub fn episodes_key(anime_id: u64) -> String {
    anime_id.to_string()
}

/// Key of a search page, built from the normalized query
pub fn search_key(query: &SearchQuery) -> String {
    format!("{}:{}", query.page(), query.text())
}

/// Key of an image asset
pub fn image_key(url: &str) -> String {
    url.trim().to_string()
}

/// Tag shared by every entry belonging to one genre
///
/// Genre names are slugged so `"Slice of Life"` and `"slice-of-life"` land on
/// the same tag.
pub fn genre_tag(genre: &str) -> String {
    format!("{GENRE_TAG_PREFIX}{}", slug(genre))
}

/// Tag shared by every entry derived from one anime
pub fn anime_tag(id: u64) -> String {
    format!("{ANIME_TAG_PREFIX}{id}")
}

fn slug(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_dash = false;
    for ch in value.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}
