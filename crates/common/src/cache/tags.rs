//! Tag index
//!
//! Maps each tag to the set of keys carrying it so that group invalidation
//! never scans the entry table. The cache updates the index on every path
//! that inserts or removes an entry.

use std::collections::{HashMap, HashSet};

/// Reverse index from tag to cache keys
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    by_tag: HashMap<String, HashSet<String>>,
}

impl TagIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key` under every tag in `tags`
    pub fn insert<'a, I>(&mut self, key: &str, tags: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        for tag in tags {
            self.by_tag.entry(tag.clone()).or_default().insert(key.to_string());
        }
    }

    /// Drop `key` from every tag in `tags`, forgetting tags left empty
    pub fn remove<'a, I>(&mut self, key: &str, tags: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        for tag in tags {
            if let Some(keys) = self.by_tag.get_mut(tag.as_str()) {
                keys.remove(key);
                if keys.is_empty() {
                    self.by_tag.remove(tag.as_str());
                }
            }
        }
    }

    /// Keys currently registered under `tag`
    pub fn keys_for(&self, tag: &str) -> Vec<String> {
        self.by_tag.get(tag).map(|keys| keys.iter().cloned().collect()).unwrap_or_default()
    }

    /// Whether `key` is registered under `tag`
    pub fn contains(&self, tag: &str, key: &str) -> bool {
        self.by_tag.get(tag).is_some_and(|keys| keys.contains(key))
    }

    /// Number of distinct tags with at least one key
    pub fn tag_count(&self) -> usize {
        self.by_tag.len()
    }

    /// Whether no tag is registered
    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }

    /// Forget every tag
    pub fn clear(&mut self) {
        self.by_tag.clear();
    }
}
