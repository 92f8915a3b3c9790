#![allow(async_fn_in_trait)]

use crate::error::StorageResult;
use sqlx::SqlitePool;

/// Flat string-to-string durable mapping.
///
/// Keys are compared byte for byte. There is no schema versioning; `clear`
/// removes every key unconditionally in a single statement, so a reset is
/// never partial.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove every key, returning how many were removed
    async fn clear(&self) -> StorageResult<u64>;

    /// Number of stored keys
    async fn len(&self) -> StorageResult<u64>;

    /// Whether the store holds no keys
    async fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len().await? == 0)
    }
}

/// SQLite implementation of KeyValueStore
#[derive(Debug, Clone)]
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

impl SqliteKeyValueStore {
    /// Create a new SQLite key-value store
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value)
            VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn clear(&self) -> StorageResult<u64> {
        let result = sqlx::query("DELETE FROM kv_store")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn len(&self) -> StorageResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM kv_store")
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Database;

    async fn store() -> SqliteKeyValueStore {
        let db = Database::in_memory().await.unwrap();
        SqliteKeyValueStore::new(db.pool().clone())
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = store().await;
        assert_eq!(store.get("ABC123").await.unwrap(), None);
        assert!(store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_set_then_overwrite() {
        let store = store().await;
        store.set("ABC123", "1").await.unwrap();
        store.set("ABC123", "2").await.unwrap();

        assert_eq!(store.get("ABC123").await.unwrap().as_deref(), Some("2"));
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_keys_are_exact() {
        let store = store().await;
        store.set("abc", "1").await.unwrap();

        assert_eq!(store.get("ABC").await.unwrap(), None);
        assert_eq!(store.get("abc ").await.unwrap(), None);
        assert_eq!(store.get("abc").await.unwrap().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let store = store().await;
        store.set("A", "1").await.unwrap();
        store.set("B", "7").await.unwrap();

        assert_eq!(store.clear().await.unwrap(), 2);
        assert!(store.is_empty().await.unwrap());
        assert_eq!(store.clear().await.unwrap(), 0);
    }
}
