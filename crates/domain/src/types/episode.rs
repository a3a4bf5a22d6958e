//! Episode lists

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

/// One episode of a series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct Episode {
    pub number: u32,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub aired_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub duration_secs: Option<u32>,

    #[serde(default)]
    pub thumbnail: Option<String>,

    #[serde(default)]
    pub filler: bool,
}

/// All known episodes of one series, ordered by number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct EpisodeList {
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub anime_id: u64,

    pub episodes: Vec<Episode>,
}

impl EpisodeList {
    /// Build a list, sorting episodes by number
    pub fn new(anime_id: u64, mut episodes: Vec<Episode>) -> Self {
        episodes.sort_by_key(|episode| episode.number);
        Self { anime_id, episodes }
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    /// Highest-numbered episode
    pub fn latest(&self) -> Option<&Episode> {
        self.episodes.last()
    }

    /// Episode with the given number
    pub fn episode(&self, number: u32) -> Option<&Episode> {
        self.episodes
            .binary_search_by_key(&number, |episode| episode.number)
            .ok()
            .map(|index| &self.episodes[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(number: u32) -> Episode {
        Episode {
            number,
            title: None,
            aired_at: None,
            duration_secs: Some(1440),
            thumbnail: None,
            filler: false,
        }
    }

    #[test]
    fn test_new_sorts_by_number() {
        let list = EpisodeList::new(21, vec![episode(3), episode(1), episode(2)]);

        let numbers: Vec<u32> = list.episodes.iter().map(|e| e.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(list.latest().map(|e| e.number), Some(3));
    }

    #[test]
    fn test_episode_lookup() {
        let list = EpisodeList::new(21, vec![episode(1), episode(5)]);

        assert!(list.episode(5).is_some());
        assert!(list.episode(2).is_none());
        assert_eq!(list.len(), 2);
        assert!(EpisodeList::new(1, Vec::new()).is_empty());
    }
}
