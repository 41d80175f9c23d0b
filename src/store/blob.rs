use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::{params, OptionalExtension};

use super::{StoreError, StoreResult};
use crate::state::DbPool;

/// A stored media object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub content_type: String,
    pub data: Bytes,
}

impl Blob {
    pub fn new(content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// What a blob looks like without its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobMeta {
    pub content_type: String,
    pub size: u64,
}

/// Persistent key-to-binary mapping.
///
/// Every operation is its own atomic unit and idempotent per key: a second
/// `put` overwrites, deleting a missing key succeeds.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, blob: Blob) -> StoreResult<()>;

    async fn get(&self, key: &str) -> StoreResult<Option<Blob>>;

    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Look up type and size without loading the bytes.
    async fn stat(&self, key: &str) -> StoreResult<Option<BlobMeta>>;

    async fn contains(&self, key: &str) -> StoreResult<bool> {
        Ok(self.stat(key).await?.is_some())
    }
}

/// Blob store backed by the `media` table.
#[derive(Clone)]
pub struct SqliteBlobStore {
    db: DbPool,
}

impl SqliteBlobStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    async fn with_conn<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&rusqlite::Connection) -> StoreResult<T> + Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || {
            let conn = db.get()?;
            f(&conn)
        })
        .await?
    }
}

#[async_trait]
impl BlobStore for SqliteBlobStore {
    async fn put(&self, key: &str, blob: Blob) -> StoreResult<()> {
        let key = key.to_owned();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO media (key, content_type, size, data) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(key) DO UPDATE SET
                   content_type = excluded.content_type,
                   size = excluded.size,
                   data = excluded.data,
                   created_at = datetime('now')",
                params![key, blob.content_type, blob.size() as i64, blob.data.as_ref()],
            )?;
            tracing::debug!(key = %key, size = blob.size(), "Stored blob");
            Ok(())
        })
        .await
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Blob>> {
        let key = key.to_owned();
        self.with_conn(move |conn| {
            let blob = conn
                .query_row(
                    "SELECT content_type, data FROM media WHERE key = ?1",
                    params![key],
                    |row| {
                        let content_type: String = row.get(0)?;
                        let data: Vec<u8> = row.get(1)?;
                        Ok(Blob::new(content_type, data))
                    },
                )
                .optional()?;
            Ok(blob)
        })
        .await
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let key = key.to_owned();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM media WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await
    }

    async fn stat(&self, key: &str) -> StoreResult<Option<BlobMeta>> {
        let key = key.to_owned();
        self.with_conn(move |conn| {
            let meta = conn
                .query_row(
                    "SELECT content_type, size FROM media WHERE key = ?1",
                    params![key],
                    |row| {
                        Ok(BlobMeta {
                            content_type: row.get(0)?,
                            size: row.get::<_, i64>(1)? as u64,
                        })
                    },
                )
                .optional()?;
            Ok(meta)
        })
        .await
    }
}

/// Process-local blob store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Blob>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, HashMap<String, Blob>>> {
        self.blobs
            .lock()
            .map_err(|_| StoreError::Storage("blob map poisoned".into()))
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, blob: Blob) -> StoreResult<()> {
        self.lock()?.insert(key.to_owned(), blob);
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Blob>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn stat(&self, key: &str) -> StoreResult<Option<BlobMeta>> {
        Ok(self.lock()?.get(key).map(|b| BlobMeta {
            content_type: b.content_type.clone(),
            size: b.size(),
        }))
    }
}
