//! Search queries and result pages

use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use crate::constants::MAX_SEARCH_QUERY_LENGTH;
use crate::errors::{AniStreamError, Result};

/// A validated, normalized search request
///
/// Queries are trimmed, lowercased, whitespace-collapsed and truncated so that
/// equivalent user input maps to one cache entry. Pages start at 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchQuery {
    text: String,
    page: u32,
}

impl SearchQuery {
    /// Normalize `text` and validate `page`
    ///
    /// # Errors
    /// Returns `AniStreamError::InvalidInput` for a blank query or page 0.
    pub fn new(text: &str, page: u32) -> Result<Self> {
        if page == 0 {
            return Err(AniStreamError::InvalidInput("search page starts at 1".to_string()));
        }

        let normalized: String = text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
            .chars()
            .take(MAX_SEARCH_QUERY_LENGTH)
            .collect();
        if normalized.is_empty() {
            return Err(AniStreamError::InvalidInput("search query is empty".to_string()));
        }

        Ok(Self { text: normalized, page })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn page(&self) -> u32 {
        self.page
    }
}

/// One hit in a search page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct SearchResult {
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub id: u64,

    pub title: String,

    #[serde(default)]
    pub cover_image: Option<String>,

    #[serde(default)]
    pub score: Option<f32>,
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct SearchPage {
    /// Normalized query text
    pub query: String,

    pub page: u32,

    pub has_next_page: bool,

    #[serde(default)]
    pub results: Vec<SearchResult>,
}
