//! Durable client-side storage.
//!
//! A flat string key/value store holding the access token and the JSON
//! snapshots of the cart, the product catalog and the last known profile.
//! There is no versioning or migration: a snapshot that no longer parses is
//! treated as absent.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::Row;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config::StorageLocation;

/// Storage keys.
pub mod keys {
    pub const TOKEN: &str = "ironmonger.token";
    pub const CART: &str = "ironmonger.cart";
    pub const PRODUCTS: &str = "ironmonger.products";
    pub const PROFILE: &str = "ironmonger.profile";
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("failed to serialize value for {key}: {message}")]
    Serialize { key: String, message: String },
}

#[async_trait]
pub trait ClientStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Open the storage selected by configuration.
pub fn open(location: &StorageLocation) -> Arc<dyn ClientStorage> {
    match location {
        StorageLocation::Memory => Arc::new(MemoryStorage::new()),
        StorageLocation::Sqlite(path) => Arc::new(SqliteStorage::new(path.clone())),
    }
}

/// Read and decode a JSON snapshot. Unreadable snapshots count as absent.
pub async fn load_json<T: DeserializeOwned>(
    storage: &dyn ClientStorage,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = storage.get(key).await? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            tracing::warn!(key, error = %err, "discarding unreadable snapshot");
            Ok(None)
        }
    }
}

pub async fn save_json<T: Serialize + ?Sized>(
    storage: &dyn ClientStorage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|e| StorageError::Serialize {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    storage.set(key, &raw).await
}

/// Process-local storage. Used by tests and `IRONMONGER_STORAGE=memory`.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.lock().await.remove(key);
        Ok(())
    }
}

/// SQLite-backed storage: one `kv` table, opened lazily on first use.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    path: PathBuf,
    pool: Arc<Mutex<Option<SqlitePool>>>,
}

impl SqliteStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pool: Arc::new(Mutex::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the pool, connecting and creating the table on first call.
    async fn pool(&self) -> anyhow::Result<SqlitePool> {
        let mut guard = self.pool.lock().await;
        if let Some(pool) = guard.as_ref() {
            return Ok(pool.clone());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create storage directory at {parent:?}"))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .with_context(|| format!("failed to open SQLite storage at {:?}", self.path))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key        TEXT PRIMARY KEY NOT NULL,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("failed to create kv table")?;

        *guard = Some(pool.clone());
        Ok(pool)
    }
}

fn backend(err: anyhow::Error) -> StorageError {
    StorageError::Backend(format!("{err:#}"))
}

#[async_trait]
impl ClientStorage for SqliteStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let pool = self.pool().await.map_err(backend)?;
        let row = sqlx::query("SELECT value FROM kv WHERE key = ?1")
            .bind(key)
            .fetch_optional(&pool)
            .await
            .with_context(|| format!("failed to read {key}"))
            .map_err(backend)?;

        row.map(|row| row.try_get::<String, _>("value"))
            .transpose()
            .map_err(|e| StorageError::Backend(e.to_string()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let pool = self.pool().await.map_err(backend)?;
        let now = chrono::Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&pool)
        .await
        .with_context(|| format!("failed to write {key}"))
        .map_err(backend)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let pool = self.pool().await.map_err(backend)?;
        sqlx::query("DELETE FROM kv WHERE key = ?1")
            .bind(key)
            .execute(&pool)
            .await
            .with_context(|| format!("failed to remove {key}"))
            .map_err(backend)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_storage_round_trips_values() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get(keys::TOKEN).await.unwrap(), None);

        storage.set(keys::TOKEN, "abc").await.unwrap();
        assert_eq!(storage.get(keys::TOKEN).await.unwrap().as_deref(), Some("abc"));

        storage.remove(keys::TOKEN).await.unwrap();
        storage.remove(keys::TOKEN).await.unwrap();
        assert_eq!(storage.get(keys::TOKEN).await.unwrap(), None);
    }

    #[tokio::test]
    async fn unreadable_snapshot_counts_as_absent() {
        let storage = MemoryStorage::new();
        storage.set(keys::CART, "{not json").await.unwrap();

        let loaded: Option<Vec<u32>> = load_json(&storage, keys::CART).await.unwrap();
        assert_eq!(loaded, None);
    }

    #[tokio::test]
    async fn sqlite_storage_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.db");

        let first = SqliteStorage::new(&path);
        save_json(&first, keys::PRODUCTS, &vec![1, 2, 3]).await.unwrap();
        first.set(keys::TOKEN, "t1").await.unwrap();
        first.set(keys::TOKEN, "t2").await.unwrap();

        let second = SqliteStorage::new(&path);
        let products: Option<Vec<i32>> = load_json(&second, keys::PRODUCTS).await.unwrap();
        assert_eq!(products, Some(vec![1, 2, 3]));
        assert_eq!(second.get(keys::TOKEN).await.unwrap().as_deref(), Some("t2"));

        second.remove(keys::TOKEN).await.unwrap();
        assert_eq!(first.get(keys::TOKEN).await.unwrap(), None);
    }
}
