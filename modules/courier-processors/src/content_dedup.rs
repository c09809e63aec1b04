use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use courier_executor::{Processor, StateAccessor};
use courier_types::{ChainError, Item};
use sha2::{Digest, Sha256};

/// What to hash for the session dedup check.
pub enum HashSource {
    /// A specific metadata field, read as a string.
    MetadataField(String),
    /// The item's canonical content hash (id + source + content).
    CanonicalContent,
}

/// SHA-256 over a chosen field, deduplicated against an in-memory set
/// that lives for the process's lifetime (no persistence, no TTL).
pub struct ContentDedup {
    source: HashSource,
    seen: Mutex<HashSet<String>>,
}

impl ContentDedup {
    pub fn new(source: HashSource) -> Self {
        Self {
            source,
            seen: Mutex::new(HashSet::new()),
        }
    }

    async fn hash_for(&self, item: &Item) -> Option<String> {
        match &self.source {
            HashSource::MetadataField(field) => {
                let value = item.get_metadata(field).await?;
                let text = value.as_str()?.to_string();
                let digest = Sha256::digest(text.as_bytes());
                Some(hex::encode(digest))
            }
            HashSource::CanonicalContent => Some(item.content_hash()),
        }
    }
}

#[async_trait]
impl Processor for ContentDedup {
    fn name(&self) -> &str {
        "content_dedup"
    }

    fn depends_on(&self) -> &[String] {
        &[]
    }

    async fn process(&self, _state: &StateAccessor, item: &Item) -> Result<(), ChainError> {
        let Some(hash) = self.hash_for(item).await else {
            return Ok(());
        };
        let is_new = self.seen.lock().expect("content dedup set poisoned").insert(hash);
        if is_new {
            Ok(())
        } else {
            Err(ChainError::filtered(self.name(), "duplicate content seen this session"))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn first_occurrence_passes_subsequent_duplicates_filtered() {
        let dedup = ContentDedup::new(HashSource::CanonicalContent);
        let item = Item::new("id1", "src", Utc::now(), json!({"a": 1}));
        let state = StateAccessor::default();

        assert!(dedup.process(&state, &item).await.is_ok());
        let err = dedup.process(&state, &item).await.unwrap_err();
        assert!(err.is_filtered());
    }

    #[tokio::test]
    async fn distinct_content_is_not_deduplicated() {
        let dedup = ContentDedup::new(HashSource::CanonicalContent);
        let state = StateAccessor::default();
        let a = Item::new("id1", "src", Utc::now(), json!({"a": 1}));
        let b = Item::new("id2", "src", Utc::now(), json!({"a": 2}));

        assert!(dedup.process(&state, &a).await.is_ok());
        assert!(dedup.process(&state, &b).await.is_ok());
    }

    #[tokio::test]
    async fn metadata_field_source_hashes_that_field() {
        let dedup = ContentDedup::new(HashSource::MetadataField("url".to_string()));
        let state = StateAccessor::default();
        let a = Item::new("id1", "src", Utc::now(), json!({}));
        a.set_metadata("url", "https://example.com/x").await;
        let b = Item::new("id2", "src", Utc::now(), json!({}));
        b.set_metadata("url", "https://example.com/x").await;

        assert!(dedup.process(&state, &a).await.is_ok());
        let err = dedup.process(&state, &b).await.unwrap_err();
        assert!(err.is_filtered());
    }

    #[tokio::test]
    async fn missing_metadata_field_passes_without_hashing() {
        let dedup = ContentDedup::new(HashSource::MetadataField("url".to_string()));
        let state = StateAccessor::default();
        let item = Item::new("id1", "src", Utc::now(), json!({}));
        assert!(dedup.process(&state, &item).await.is_ok());
    }
}
