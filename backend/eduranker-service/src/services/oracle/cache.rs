// ============================================
// Decay Classification Cache
// ============================================
//
// Topic → DecayInfo memo shared across requests. Entries are written only
// by the classification step, which completes before a batch fans out;
// item tasks never touch the cache. Failed classifications are not stored.
//
// Topics come straight from callers, so the cache is bounded in size and
// entries expire.

use super::{DecayClassifier, Result};
use crate::models::DecayInfo;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_CACHE_CAPACITY: u64 = 1_000;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub struct DecayCache {
    entries: Cache<String, DecayInfo>,
}

impl Default for DecayCache {
    fn default() -> Self {
        Self::with_limits(DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL)
    }
}

impl DecayCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(max_capacity: u64, ttl: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self { entries }
    }

    fn key(topic: &str) -> String {
        topic.trim().to_string()
    }

    pub async fn get(&self, topic: &str) -> Option<DecayInfo> {
        self.entries.get(&Self::key(topic)).await
    }

    pub async fn insert(&self, topic: &str, info: DecayInfo) {
        self.entries.insert(Self::key(topic), info).await;
    }

    /// Number of live entries, after pending evictions have been applied
    pub async fn len(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks().await;
    }
}

/// Classifier decorator that memoizes successful classifications
pub struct CachedDecayClassifier {
    inner: Arc<dyn DecayClassifier>,
    cache: Arc<DecayCache>,
}

impl CachedDecayClassifier {
    pub fn new(inner: Arc<dyn DecayClassifier>, cache: Arc<DecayCache>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &Arc<DecayCache> {
        &self.cache
    }
}

#[async_trait]
impl DecayClassifier for CachedDecayClassifier {
    async fn classify(&self, topic: &str) -> Result<DecayInfo> {
        if let Some(info) = self.cache.get(topic).await {
            debug!(topic, "Decay cache hit");
            return Ok(info);
        }

        let info = self.inner.classify(topic).await?;
        self.cache.insert(topic, info).await;
        Ok(info)
    }
}
