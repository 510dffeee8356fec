// SQLite KeyValueStore Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use swipedeck_core::error::Result;
use swipedeck_core::port::{KeyValueStore, TimeProvider};
use tracing::trace;

/// Durable key/value store on the `kv_store` table
pub struct SqliteKvStore {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteKvStore {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
        }
    }
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        trace!(key, found = value.is_some(), "kv get");
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
        .bind(self.time_provider.now_millis())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        trace!(key, bytes = value.len(), "kv set");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        trace!(key, "kv remove");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};
    use swipedeck_core::port::time_provider::mocks::MockTimeProvider;

    async fn setup_store() -> (SqlitePool, Arc<MockTimeProvider>, SqliteKvStore) {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        let clock = Arc::new(MockTimeProvider::new(1_000));
        let store = SqliteKvStore::new(pool.clone(), clock.clone());
        (pool, clock, store)
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let (_pool, _clock, store) = setup_store().await;
        assert_eq!(store.get("seenJobs_alice").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let (_pool, _clock, store) = setup_store().await;
        store.set("seenJobs_alice", r#"["j1"]"#).await.unwrap();

        assert_eq!(
            store.get("seenJobs_alice").await.unwrap().as_deref(),
            Some(r#"["j1"]"#)
        );
    }

    #[tokio::test]
    async fn test_set_overwrites_and_touches_timestamp() {
        let (pool, clock, store) = setup_store().await;
        store.set("k", "v1").await.unwrap();
        clock.advance_millis(500);
        store.set("k", "v2").await.unwrap();

        let (value, updated_at): (String, i64) =
            sqlx::query_as("SELECT value, updated_at FROM kv_store WHERE key = 'k'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(value, "v2");
        assert_eq!(updated_at, 1_500);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let (_pool, _clock, store) = setup_store().await;
        store.set("k", "v").await.unwrap();

        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_table_is_storage_error() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        let store = SqliteKvStore::new(pool, Arc::new(MockTimeProvider::new(0)));

        let err = store.get("k").await.unwrap_err();
        assert!(matches!(err, swipedeck_core::AppError::Storage(_)));
    }
}
