//! Anime records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use crate::impl_domain_status_conversions;

/// Broadcast status of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum AnimeStatus {
    Airing,
    Finished,
    Upcoming,
    Hiatus,
    Cancelled,
    #[default]
    Unknown,
}

impl_domain_status_conversions!(AnimeStatus {
    Airing => "airing",
    Finished => "finished",
    Upcoming => "upcoming",
    Hiatus => "hiatus",
    Cancelled => "cancelled",
    Unknown => "unknown",
});

/// Metadata for one series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct AnimeRecord {
    /// Catalog identifier (AniList id)
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub id: u64,

    /// Romaji title
    pub title: String,

    /// English title when the source provides one
    #[serde(default)]
    pub title_english: Option<String>,

    #[serde(default)]
    pub synopsis: Option<String>,

    /// Genre display names, e.g. `"Slice of Life"`
    #[serde(default)]
    pub genres: Vec<String>,

    #[serde(default)]
    pub status: AnimeStatus,

    /// Announced episode count, unknown while airing
    #[serde(default)]
    pub episode_count: Option<u32>,

    /// Average score on a 0-100 scale
    #[serde(default)]
    pub score: Option<f32>,

    /// Cover image URL
    #[serde(default)]
    pub cover_image: Option<String>,

    /// When the source last changed this record
    pub updated_at: DateTime<Utc>,
}

impl AnimeRecord {
    /// English title if known, romaji otherwise
    pub fn display_title(&self) -> &str {
        self.title_english.as_deref().unwrap_or(&self.title)
    }

    /// Whether new episodes may still appear
    pub fn is_ongoing(&self) -> bool {
        matches!(self.status, AnimeStatus::Airing | AnimeStatus::Hiatus)
    }
}
