// ============================================
// Candidate Item Sources
// ============================================
//
// Supplies candidate items for a topic. Items are loaded, never generated:
// - JsonFileItemSource: JSON array of items on disk (fixture / export);
//   malformed entries are skipped individually
// - InMemoryItemSource: fixed list, for wiring and tests

use crate::models::Item;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ItemSourceError {
    #[error("No item source configured")]
    NotConfigured,

    #[error("Failed to read items from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode items from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ItemSourceError>;

#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Up to `limit` candidate items for `topic`
    async fn candidates(&self, topic: &str, limit: usize) -> Result<Vec<Item>>;
}

pub struct JsonFileItemSource {
    path: PathBuf,
}

impl JsonFileItemSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ItemSource for JsonFileItemSource {
    async fn candidates(&self, topic: &str, limit: usize) -> Result<Vec<Item>> {
        let path = self.path.display().to_string();

        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|source| ItemSourceError::Io {
                path: path.clone(),
                source,
            })?;

        let entries: Vec<serde_json::Value> =
            serde_json::from_slice(&raw).map_err(|source| ItemSourceError::Decode {
                path: path.clone(),
                source,
            })?;
        let mut items = Item::decode_each(entries);
        items.truncate(limit);

        debug!(topic, path = %path, count = items.len(), "Loaded candidate items");
        Ok(items)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryItemSource {
    items: Vec<Item>,
}

impl InMemoryItemSource {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl ItemSource for InMemoryItemSource {
    async fn candidates(&self, _topic: &str, limit: usize) -> Result<Vec<Item>> {
        Ok(self.items.iter().take(limit).cloned().collect())
    }
}

/// Placeholder used when no source is configured
pub struct UnconfiguredItemSource;

#[async_trait]
impl ItemSource for UnconfiguredItemSource {
    async fn candidates(&self, _topic: &str, _limit: usize) -> Result<Vec<Item>> {
        Err(ItemSourceError::NotConfigured)
    }
}
