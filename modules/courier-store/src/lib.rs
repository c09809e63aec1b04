mod error;
mod feed;
mod items;
mod store;

pub use error::{Result, StoreError};
pub use feed::FeedStore;
pub use items::ItemStore;
pub use store::Store;

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use courier_types::{FeedEntry, ItemRecord};

    use super::*;

    async fn test_store() -> Store {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        store.migrate().await.unwrap();
        store
    }

    fn sample_item(id: &str, hash: &str) -> ItemRecord {
        let now = Utc::now();
        ItemRecord {
            id: id.to_string(),
            content_hash: hash.to_string(),
            source: "test-source".to_string(),
            timestamp: now,
            created_at: now,
        }
    }

    fn sample_entry(id: &str, published_at: chrono::DateTime<Utc>) -> FeedEntry {
        FeedEntry {
            id: id.to_string(),
            title: format!("title-{id}"),
            link: format!("https://example.test/{id}"),
            description: "a description".to_string(),
            content: "full content".to_string(),
            author: None,
            source: "test-source".to_string(),
            image_url: None,
            published_at,
            created_at: published_at,
        }
    }

    #[tokio::test]
    async fn storing_same_id_twice_is_idempotent() {
        let store = test_store().await;
        let record = sample_item("item-1", "hash-a");
        store.items.store(&record).await.unwrap();

        let mut changed = record.clone();
        changed.content_hash = "hash-b".to_string();
        store.items.store(&changed).await.unwrap();

        let stored = store.items.get_item("item-1").await.unwrap().unwrap();
        assert_eq!(stored.content_hash, "hash-a");
    }

    #[tokio::test]
    async fn exists_and_exists_by_hash_reflect_stored_items() {
        let store = test_store().await;
        let record = sample_item("item-2", "hash-c");
        assert!(!store.items.exists("item-2").await.unwrap());

        store.items.store(&record).await.unwrap();
        assert!(store.items.exists("item-2").await.unwrap());
        assert!(store.items.exists_by_hash("hash-c").await.unwrap());
        assert!(!store.items.exists_by_hash("hash-missing").await.unwrap());
    }

    #[tokio::test]
    async fn mark_published_is_idempotent_per_item_and_target() {
        let store = test_store().await;
        assert!(!store.items.is_published("item-3", "chat").await.unwrap());

        store.items.mark_published("item-3", "chat").await.unwrap();
        store.items.mark_published("item-3", "chat").await.unwrap();

        assert!(store.items.is_published("item-3", "chat").await.unwrap());
        assert!(!store.items.is_published("item-3", "feed").await.unwrap());
    }

    #[tokio::test]
    async fn delete_older_than_does_not_cascade_into_published() {
        let store = test_store().await;
        let mut old_record = sample_item("item-4", "hash-d");
        old_record.timestamp = Utc::now() - Duration::days(10);
        store.items.store(&old_record).await.unwrap();
        store.items.mark_published("item-4", "chat").await.unwrap();

        let deleted = store.items.delete_older_than(Duration::days(1)).await.unwrap();
        assert_eq!(deleted, 1);
        assert!(!store.items.exists("item-4").await.unwrap());
        assert!(store.items.is_published("item-4", "chat").await.unwrap());
    }

    #[tokio::test]
    async fn paginated_entries_respect_window_and_page_size() {
        let store = test_store().await;
        let base = Utc::now();
        for i in 0..5 {
            let entry = sample_entry(&format!("entry-{i}"), base - Duration::hours(i));
            store.feed.insert_entry(&entry).await.unwrap();
        }

        let page = store
            .feed
            .list_entries_paginated(1, 2, base - Duration::days(1), base + Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next);
        assert!(!page.has_previous);
        // most recent first
        assert_eq!(page.entries[0].id, "entry-0");
    }

    #[tokio::test]
    async fn recent_entries_are_ordered_newest_first() {
        let store = test_store().await;
        let base = Utc::now();
        store
            .feed
            .insert_entry(&sample_entry("older", base - Duration::hours(2)))
            .await
            .unwrap();
        store
            .feed
            .insert_entry(&sample_entry("newer", base))
            .await
            .unwrap();

        let recent = store.feed.list_recent_entries(10).await.unwrap();
        assert_eq!(recent[0].id, "newer");
        assert_eq!(recent[1].id, "older");
    }
}
