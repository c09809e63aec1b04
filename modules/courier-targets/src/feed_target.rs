//! The feed publish target: materializes an `Item` as a `FeedEntry` and
//! invalidates the served-feed cache for this feed name so the next
//! request re-renders with the new entry included.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use courier_cache::TtlCache;
use courier_dispatch::Target;
use courier_store::Store;
use courier_types::{FeedEntry, Item, PublishResult};
use tracing::warn;

/// Writes an entry, then invalidates every cached rendering for this
/// feed name. A later request sees the new row; until then the 1-hour
/// TTL bounds staleness if no invalidation occurs at all.
pub struct FeedTarget {
    name: String,
    store: Arc<Store>,
    cache: Arc<TtlCache<String>>,
}

impl FeedTarget {
    pub fn new(name: impl Into<String>, store: Arc<Store>, cache: Arc<TtlCache<String>>) -> Self {
        Self {
            name: name.into(),
            store,
            cache,
        }
    }

    async fn entry_for(&self, item: &Item) -> FeedEntry {
        let metadata = item.metadata_snapshot().await;
        let title = metadata
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or(item.id())
            .to_string();
        let link = metadata.get("url").and_then(|v| v.as_str()).unwrap_or_default().to_string();
        let author = metadata.get("author").and_then(|v| v.as_str()).map(str::to_string);
        let image_url = metadata.get("image_url").and_then(|v| v.as_str()).map(str::to_string);
        let summary = metadata.get("summary").and_then(|v| v.as_str()).map(str::to_string);
        let text_content = item.text_content().await;
        let description = summary.unwrap_or_else(|| text_content.chars().take(280).collect());

        FeedEntry {
            id: item.id().to_string(),
            title,
            link,
            description,
            content: text_content,
            author,
            source: item.source().to_string(),
            image_url,
            published_at: item.timestamp(),
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
impl Target for FeedTarget {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&self, item: &Item) -> PublishResult {
        let entry = self.entry_for(item).await;
        match self.store.feed.insert_entry(&entry).await {
            Ok(()) => {
                self.cache.invalidate_pattern(&format!("{}:", self.name));
                PublishResult::ok(&self.name, item.id())
            }
            Err(e) => {
                warn!(item_id = item.id(), target = %self.name, error = %e, "failed to insert feed entry");
                PublishResult::fail(&self.name, item.id(), e.to_string())
            }
        }
    }
}
