//! Served-feed entries backing the RSS/Atom/JSON feed surface.

use chrono::{DateTime, Utc};
use courier_types::{FeedEntry, FeedPage};
use sqlx::SqlitePool;

use crate::error::Result;

#[derive(Clone)]
pub struct FeedStore {
    pool: SqlitePool,
}

impl FeedStore {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// First write wins — re-inserting an entry with the same id is a no-op.
    pub async fn insert_entry(&self, entry: &FeedEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO feed_entries
                (id, title, link, description, content, author, source, image_url, published_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.title)
        .bind(&entry.link)
        .bind(&entry.description)
        .bind(&entry.content)
        .bind(&entry.author)
        .bind(&entry.source)
        .bind(&entry.image_url)
        .bind(entry.published_at)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_recent_entries(&self, limit: i64) -> Result<Vec<FeedEntry>> {
        let rows = sqlx::query_as::<_, FeedEntryRow>(
            "SELECT * FROM feed_entries ORDER BY published_at DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn list_entries_paginated(
        &self,
        page: u32,
        per_page: u32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<FeedPage> {
        let page = page.max(1);
        let offset = ((page - 1) as i64) * per_page as i64;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM feed_entries WHERE published_at >= ? AND published_at < ?",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, FeedEntryRow>(
            r#"
            SELECT * FROM feed_entries
            WHERE published_at >= ? AND published_at < ?
            ORDER BY published_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = total.max(0) as u64;
        let total_pages = if per_page == 0 {
            0
        } else {
            ((total as f64) / per_page as f64).ceil() as u32
        }
        .max(1);

        Ok(FeedPage {
            entries: rows.into_iter().map(Into::into).collect(),
            page,
            total_pages,
            total,
            has_next: page < total_pages,
            has_previous: page > 1,
        })
    }
}

#[derive(sqlx::FromRow)]
struct FeedEntryRow {
    id: String,
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    content: Option<String>,
    author: Option<String>,
    source: String,
    image_url: Option<String>,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<FeedEntryRow> for FeedEntry {
    fn from(row: FeedEntryRow) -> Self {
        FeedEntry {
            id: row.id,
            title: row.title.unwrap_or_default(),
            link: row.link.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            content: row.content.unwrap_or_default(),
            author: row.author,
            source: row.source,
            image_url: row.image_url,
            published_at: row.published_at.unwrap_or(row.created_at),
            created_at: row.created_at,
        }
    }
}
