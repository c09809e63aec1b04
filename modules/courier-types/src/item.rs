//! The `Item` — the unit of work flowing through the pipeline.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::metadata::{Metadata, MetadataValue};

/// Mutable part of an `Item`: metadata and extracted text. Guarded by a
/// single lock so processors see a consistent snapshot while still
/// allowing concurrent readers between writes.
#[derive(Debug, Default)]
struct ItemInner {
    metadata: Metadata,
    text_content: String,
}

/// A single piece of content flowing through the chain and dispatcher.
///
/// `id` and `source` are immutable after construction. `metadata` and
/// `text_content` are append/overwrite under an internal lock — callers
/// clone the handle cheaply (it's `Arc`-backed) rather than the content.
#[derive(Clone, Debug)]
pub struct Item {
    id: Arc<str>,
    source: Arc<str>,
    timestamp: DateTime<Utc>,
    content: Arc<serde_json::Value>,
    inner: Arc<RwLock<ItemInner>>,
}

impl Item {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        timestamp: DateTime<Utc>,
        content: serde_json::Value,
    ) -> Self {
        Self {
            id: Arc::from(id.into()),
            source: Arc::from(source.into()),
            timestamp,
            content: Arc::new(content),
            inner: Arc::new(RwLock::new(ItemInner::default())),
        }
    }

    /// Build the stable, source-scoped, globally-unique item id:
    /// `"<sourcetype>_<sourceid>"`.
    pub fn make_id(source_type: &str, source_id: &str) -> String {
        format!("{source_type}_{source_id}")
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn content(&self) -> &serde_json::Value {
        &self.content
    }

    pub async fn metadata_snapshot(&self) -> Metadata {
        self.inner.read().await.metadata.clone()
    }

    pub async fn get_metadata(&self, key: &str) -> Option<MetadataValue> {
        self.inner.read().await.metadata.get(key).cloned()
    }

    pub async fn set_metadata(&self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        self.inner.write().await.metadata.insert(key.into(), value.into());
    }

    pub async fn text_content(&self) -> String {
        self.inner.read().await.text_content.clone()
    }

    pub async fn set_text_content(&self, text: impl Into<String>) {
        self.inner.write().await.text_content = text.into();
    }

    /// SHA-256 over the canonical `{id, source, content}` triple, with
    /// fields serialized in a fixed order regardless of how `content`
    /// happens to be laid out internally.
    pub fn content_hash(&self) -> String {
        let canonical = serde_json::json!({
            "id": &*self.id,
            "source": &*self.source,
            "content": &*self.content,
        });
        let bytes = serde_json::to_vec(&canonical).expect("json serialization cannot fail here");
        let digest = Sha256::digest(&bytes);
        hex::encode(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_id_is_source_scoped() {
        assert_eq!(Item::make_id("hn", "42"), "hn_42");
    }

    #[tokio::test]
    async fn metadata_round_trips() {
        let item = Item::new("hn_1", "hn", Utc::now(), serde_json::json!({"title": "x"}));
        item.set_metadata("score", 150i64).await;
        assert_eq!(item.get_metadata("score").await.unwrap().as_int(), Some(150));
        assert_eq!(item.get_metadata("missing").await, None);
    }

    #[test]
    fn content_hash_is_stable_for_same_fields() {
        let a = Item::new("id1", "src", Utc::now(), serde_json::json!({"a": 1}));
        let b = Item::new("id1", "src", Utc::now(), serde_json::json!({"a": 1}));
        assert_eq!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn content_hash_changes_with_content() {
        let a = Item::new("id1", "src", Utc::now(), serde_json::json!({"a": 1}));
        let b = Item::new("id1", "src", Utc::now(), serde_json::json!({"a": 2}));
        assert_ne!(a.content_hash(), b.content_hash());
    }
}
