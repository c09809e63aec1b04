use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::Result;
use crate::feed::FeedStore;
use crate::items::ItemStore;

/// Durable store backing item dedup, the publish ledger, and served
/// feed entries. Wraps a single SQLite pool shared by both sub-stores.
#[derive(Clone)]
pub struct Store {
    pub items: ItemStore,
    pub feed: FeedStore,
    pool: SqlitePool,
}

impl Store {
    /// Connect to `database_url` (e.g. `sqlite://courier.db` or
    /// `sqlite::memory:`), creating the file if it doesn't exist.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            items: ItemStore::new(pool.clone()),
            feed: FeedStore::new(pool.clone()),
            pool,
        }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("applied pending migrations");
        Ok(())
    }
}
