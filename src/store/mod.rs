//! Local persistence: a key-to-binary blob store for media and a single
//! JSON slot holding the site document.
//!
//! The two stores fail independently. A blob failure never touches the
//! document and a document failure never touches stored blobs.

pub mod blob;
pub mod document;

use rand::Rng;

pub use self::blob::{Blob, BlobMeta, BlobStore, MemoryBlobStore, SqliteBlobStore};
pub use self::document::{DocumentStore, ExportEnvelope, EXPORT_FILE_NAME, STRUCT_KEY};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Malformed import: {0}")]
    MalformedImport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Storage(e.to_string())
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(e: r2d2::Error) -> Self {
        StoreError::Storage(e.to_string())
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(e: tokio::task::JoinError) -> Self {
        StoreError::Storage(format!("storage task failed: {}", e))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Generate a blob key of the form `<kind>-<unix millis>-<random hex>`.
pub fn generate_key(kind: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: [u8; 4] = rand::thread_rng().gen();
    format!("{}-{}-{}", kind, millis, hex::encode(suffix))
}
