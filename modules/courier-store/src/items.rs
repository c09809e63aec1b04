//! Item records and the publish ledger.

use chrono::{DateTime, Duration, Utc};
use courier_types::ItemRecord;
use sqlx::SqlitePool;
use tracing::warn;

use crate::error::Result;

#[derive(Clone)]
pub struct ItemStore {
    pool: SqlitePool,
}

impl ItemStore {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Upsert on `id` — first write wins, later `store` calls for the
    /// same id are no-ops.
    pub async fn store(&self, record: &ItemRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO items (id, hash, source, timestamp, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(&record.id)
        .bind(&record.content_hash)
        .bind(&record.source)
        .bind(record.timestamp)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn exists(&self, id: &str) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM items WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    pub async fn exists_by_hash(&self, hash: &str) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM items WHERE hash = ?")
            .bind(hash)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Header-only record — there is no full-content retrieval API
    ///.
    pub async fn get_item(&self, id: &str) -> Result<Option<ItemRecord>> {
        let row = sqlx::query_as::<_, ItemRow>(
            "SELECT id, hash, source, timestamp, created_at FROM items WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Insert-or-ignore into the publish ledger: calling this twice for
    /// the same item/target pair is a no-op.
    pub async fn mark_published(&self, item_id: &str, target: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO published (item_id, target, published_at)
            VALUES (?, ?, ?)
            ON CONFLICT(item_id, target) DO NOTHING
            "#,
        )
        .bind(item_id)
        .bind(target)
        .bind(Utc::now())
        .execute(&self.pool)
        .await;

        if let Err(e) = &result {
            // A failed ledger write doesn't fail the publish itself —
            // it's retried next tick.
            warn!(item_id, target, error = %e, "failed to write publish ledger row");
        }
        result?;
        Ok(())
    }

    pub async fn is_published(&self, item_id: &str, target: &str) -> Result<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM published WHERE item_id = ? AND target = ?")
                .bind(item_id)
                .bind(target)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    /// Delete item records older than `age`. Does not cascade into
    /// `published` — the ledger outlives items.
    pub async fn delete_older_than(&self, age: Duration) -> Result<u64> {
        let cutoff: DateTime<Utc> = Utc::now() - age;
        let result = sqlx::query("DELETE FROM items WHERE timestamp < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: String,
    hash: String,
    source: String,
    timestamp: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<ItemRow> for ItemRecord {
    fn from(row: ItemRow) -> Self {
        ItemRecord {
            id: row.id,
            content_hash: row.hash,
            source: row.source,
            timestamp: row.timestamp,
            created_at: row.created_at,
        }
    }
}
