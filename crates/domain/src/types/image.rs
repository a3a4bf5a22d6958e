//! Image assets

use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

/// Resolved metadata for a cover, banner or thumbnail URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct ImageAsset {
    /// Source URL, also the cache identity
    pub url: String,

    #[serde(default)]
    pub content_type: Option<String>,

    #[serde(default)]
    pub width: Option<u32>,

    #[serde(default)]
    pub height: Option<u32>,

    /// Hex color used as a placeholder while loading
    #[serde(default)]
    pub dominant_color: Option<String>,
}

impl ImageAsset {
    /// Asset with only the URL known
    pub fn from_url(url: impl Into<String>) -> Self {
        Self { url: url.into(), content_type: None, width: None, height: None, dominant_color: None }
    }

    /// Width over height when both are known
    pub fn aspect_ratio(&self) -> Option<f64> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if h > 0 => Some(f64::from(w) / f64::from(h)),
            _ => None,
        }
    }
}
