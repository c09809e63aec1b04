//! Durable record shapes. The engine never keeps a full
//! `Item` around after publishing finishes — only these header rows
//! plus the publish ledger persist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row in the `items` table: identity, content hash, and timing only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: String,
    pub content_hash: String,
    pub source: String,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A row in the `published` ledger: the exactly-once marker for a
/// `(item, target)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishLedgerRow {
    pub item_id: String,
    pub target_name: String,
    pub published_at: DateTime<Utc>,
}

/// A row in `feed_entries`, the materialized output the feed HTTP
/// server renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub id: String,
    pub title: String,
    pub link: String,
    pub description: String,
    pub content: String,
    pub author: Option<String>,
    pub source: String,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A single page of `ListEntriesPaginated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPage {
    pub entries: Vec<FeedEntry>,
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
    pub has_next: bool,
    pub has_previous: bool,
}
