use crate::config::Config;
use crate::models::{Item, PopOrder};

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Migration error: {0}")]
    Migration(String),
    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),
}

/// SQLite-backed item table.
///
/// `id` is assigned by the database and grows with every insert, so it doubles
/// as the insertion sequence used to break `created_on` ties.
#[derive(Debug, Clone)]
pub struct ItemStore {
    pool: SqlitePool,
}

impl ItemStore {
    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(|e| StoreError::Connection(e.to_string()))?
            .create_if_missing(true);

        // Each connection to an in-memory database gets its own database.
        let pool_options = if config.is_in_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.migrate().await?;

        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL,
                created_on TEXT NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Migration(e.to_string()))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_created_on ON items(created_on, id)")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        debug!("Item schema is up to date");
        Ok(())
    }

    /// Inserts a new item stamped with `created_on`, or with the newest stored
    /// stamp if the clock has gone backwards, so `created_on` never decreases
    /// in insertion order. RFC 3339 UTC text compares correctly as text.
    pub async fn insert(&self, text: &str, created_on: DateTime<Utc>) -> Result<Item, StoreError> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (text, created_on)
            VALUES (?, MAX(?, COALESCE((SELECT MAX(created_on) FROM items), '')))
            RETURNING id, text, created_on
        "#,
        )
        .bind(text)
        .bind(created_on)
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    pub async fn list(&self) -> Result<Vec<Item>, StoreError> {
        let items = sqlx::query_as::<_, Item>("SELECT id, text, created_on FROM items ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Returns the item a pop in `order` would remove, without removing it.
    pub async fn first(&self, order: PopOrder) -> Result<Option<Item>, StoreError> {
        let sql = match order {
            PopOrder::Lifo => {
                "SELECT id, text, created_on FROM items ORDER BY created_on DESC, id DESC LIMIT 1"
            }
            PopOrder::Fifo => {
                "SELECT id, text, created_on FROM items ORDER BY created_on ASC, id ASC LIMIT 1"
            }
        };

        let item = sqlx::query_as::<_, Item>(sql)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Returns false when no row had this id.
    pub async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
