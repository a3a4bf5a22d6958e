//! Shared test helpers for `anistream-core` integration tests.
//!
//! Provides catalog fixtures and an in-memory metadata source that counts
//! upstream calls so tests can tell hits from misses.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use anistream_core::MetadataSource;
use anistream_domain::{
    AniStreamError, AnimeRecord, AnimeStatus, Episode, EpisodeList, ImageAsset,
    Result as DomainResult, SearchPage, SearchQuery, SearchResult,
};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};

/// Anime fixture with the given genres
pub fn anime(id: u64, genres: &[&str]) -> AnimeRecord {
    AnimeRecord {
        id,
        title: format!("Title {id}"),
        title_english: None,
        synopsis: None,
        genres: genres.iter().map(|g| (*g).to_string()).collect(),
        status: AnimeStatus::Finished,
        episode_count: Some(12),
        score: Some(75.0),
        cover_image: Some(format!("https://img.example/{id}.jpg")),
        updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

/// Episode list fixture with `count` episodes
pub fn episodes(anime_id: u64, count: u32) -> EpisodeList {
    EpisodeList::new(
        anime_id,
        (1..=count)
            .map(|number| Episode {
                number,
                title: None,
                aired_at: None,
                duration_secs: Some(1440),
                thumbnail: None,
                filler: false,
            })
            .collect(),
    )
}

/// Metadata source serving fixtures and counting calls
///
/// Genres of anime `id` come from `genres_for`; every other call succeeds
/// unless `fail` is switched on.
#[derive(Default)]
pub struct MockMetadataSource {
    pub anime_calls: AtomicUsize,
    pub episode_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub image_calls: AtomicUsize,
    fail: AtomicBool,
    latency: Option<Duration>,
}

impl MockMetadataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response, to let concurrent callers overlap
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every following call fail with an upstream error
    pub fn fail(&self, enabled: bool) {
        self.fail.store(enabled, Ordering::SeqCst);
    }

    pub fn anime_calls(&self) -> usize {
        self.anime_calls.load(Ordering::SeqCst)
    }

    pub fn episode_calls(&self) -> usize {
        self.episode_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn image_calls(&self) -> usize {
        self.image_calls.load(Ordering::SeqCst)
    }

    async fn respond(&self, counter: &AtomicUsize) -> DomainResult<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(AniStreamError::Upstream("anilist: 503 service unavailable".into()));
        }
        Ok(())
    }
}

fn genres_for(id: u64) -> &'static [&'static str] {
    if id % 2 == 0 {
        &["Action", "Slice of Life"]
    } else {
        &["Drama"]
    }
}

#[async_trait]
impl MetadataSource for MockMetadataSource {
    async fn fetch_anime(&self, id: u64) -> DomainResult<AnimeRecord> {
        self.respond(&self.anime_calls).await?;
        Ok(anime(id, genres_for(id)))
    }

    async fn fetch_episodes(&self, anime_id: u64) -> DomainResult<EpisodeList> {
        self.respond(&self.episode_calls).await?;
        Ok(episodes(anime_id, 12))
    }

    async fn search(&self, query: &SearchQuery) -> DomainResult<SearchPage> {
        self.respond(&self.search_calls).await?;
        Ok(SearchPage {
            query: query.text().to_string(),
            page: query.page(),
            has_next_page: false,
            results: vec![SearchResult {
                id: 1,
                title: "Title 1".to_string(),
                cover_image: None,
                score: None,
            }],
        })
    }

    async fn resolve_image(&self, url: &str) -> DomainResult<ImageAsset> {
        self.respond(&self.image_calls).await?;
        Ok(ImageAsset::from_url(url))
    }
}
