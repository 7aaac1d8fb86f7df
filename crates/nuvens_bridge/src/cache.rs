//! Script source cache with a time-to-live

use rustc_hash::FxHashMap;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
struct Cached {
    source: String,
    stored_at: Instant,
}

/// Path to source text, expiring `ttl` after insertion
#[derive(Debug)]
pub struct ScriptCache {
    ttl: Duration,
    entries: FxHashMap<String, Cached>,
}

impl ScriptCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: FxHashMap::default(),
        }
    }

    /// Cached source, dropping it first if expired
    pub fn get(&mut self, path: &str, now: Instant) -> Option<&str> {
        let expired = self
            .entries
            .get(path)
            .is_some_and(|c| now.saturating_duration_since(c.stored_at) > self.ttl);
        if expired {
            self.entries.remove(path);
            tracing::trace!(path, "script cache entry expired");
            return None;
        }
        self.entries.get(path).map(|c| c.source.as_str())
    }

    pub fn insert(&mut self, path: &str, source: String, now: Instant) {
        self.entries.insert(
            path.to_string(),
            Cached {
                source,
                stored_at: now,
            },
        );
    }

    /// Drop every expired entry; returns how many were removed
    pub fn evict_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries
            .retain(|_, c| now.saturating_duration_since(c.stored_at) <= ttl);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
