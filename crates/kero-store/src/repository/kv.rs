//! # Key/Value Repository
//!
//! String values under string keys, with JSON helpers on top.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};

/// Repository for the `local_storage` table.
#[derive(Debug, Clone)]
pub struct KeyValueRepository {
    pool: SqlitePool,
}

impl KeyValueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        KeyValueRepository { pool }
    }

    /// Reads a value.
    pub async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM local_storage WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    /// Writes a value, replacing any previous one.
    pub async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        debug!(key = %key, bytes = value.len(), "Writing local value");

        sqlx::query(
            r#"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Removes a key. Returns true if it existed.
    pub async fn remove(&self, key: &str) -> StoreResult<bool> {
        debug!(key = %key, "Removing local value");

        let result = sqlx::query("DELETE FROM local_storage WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn contains(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// All keys, sorted.
    pub async fn keys(&self) -> StoreResult<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM local_storage ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(keys)
    }

    /// Reads and decodes a JSON value.
    ///
    /// A value that no longer decodes is logged and treated as absent.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        let Some(raw) = self.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key = %key, error = %e, "Ignoring unreadable stored value");
                Ok(None)
            }
        }
    }

    /// Encodes and writes a JSON value.
    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        let raw = serde_json::to_string(value).map_err(|e| StoreError::encode(key, e))?;
        self.set(key, &raw).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Store, StoreConfig};

    #[tokio::test]
    async fn test_set_get_overwrite_remove() {
        let kv = Store::open(StoreConfig::in_memory()).await.unwrap().kv();

        assert_eq!(kv.get("a").await.unwrap(), None);
        kv.set("a", "1").await.unwrap();
        kv.set("a", "2").await.unwrap();
        assert_eq!(kv.get("a").await.unwrap().as_deref(), Some("2"));
        assert_eq!(kv.keys().await.unwrap(), vec!["a".to_string()]);

        assert!(kv.remove("a").await.unwrap());
        assert!(!kv.remove("a").await.unwrap());
        assert!(!kv.contains("a").await.unwrap());
    }

    #[tokio::test]
    async fn test_json_helpers_tolerate_garbage() {
        let kv = Store::open(StoreConfig::in_memory()).await.unwrap().kv();

        kv.set_json("nums", &vec![1, 2, 3]).await.unwrap();
        let nums: Option<Vec<i32>> = kv.get_json("nums").await.unwrap();
        assert_eq!(nums, Some(vec![1, 2, 3]));

        kv.set("nums", "[1, 2,").await.unwrap();
        let nums: Option<Vec<i32>> = kv.get_json("nums").await.unwrap();
        assert_eq!(nums, None);
    }
}
