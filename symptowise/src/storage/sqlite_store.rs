//! SQLite-backed key-value store
//!
//! One row per key in the `kv_store` table created by the schema
//! migrations. Writes are upserts.

use super::BackingStore;
use crate::error::Result;
use chrono::Utc;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All stored keys in alphabetical order
    pub async fn keys(&self) -> Result<Vec<String>> {
        let keys = sqlx::query_scalar::<_, String>("SELECT key FROM kv_store ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(keys)
    }
}

impl BackingStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::debug!("Set key: {} ({} bytes)", key, value.len());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::initialize_database;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_store() -> SqliteStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        SqliteStore::new(pool)
    }

    #[tokio::test]
    async fn test_upsert_and_read() {
        let store = create_test_store().await;

        store.set("symptoms", "[]").await.unwrap();
        store.set("symptoms", r#"[{"id":"1"}]"#).await.unwrap();

        let value = store.get("symptoms").await.unwrap();
        assert_eq!(value.as_deref(), Some(r#"[{"id":"1"}]"#));
    }

    #[tokio::test]
    async fn test_remove_and_keys() {
        let store = create_test_store().await;

        store.set("routineTasks", "[]").await.unwrap();
        store.set("carePlans", "[]").await.unwrap();
        assert_eq!(store.keys().await.unwrap(), vec!["carePlans", "routineTasks"]);

        store.remove("carePlans").await.unwrap();
        store.remove("carePlans").await.unwrap();

        assert_eq!(store.get("carePlans").await.unwrap(), None);
        assert_eq!(store.keys().await.unwrap(), vec!["routineTasks"]);
    }
}
