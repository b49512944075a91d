//! The blob store seam.

use std::time::Duration;

use async_trait::async_trait;

/// How long export download links stay valid.
pub const EXPORT_URL_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Key-addressed blob storage.
///
/// Pipeline code and its tests depend only on this trait, so the S3
/// implementation can be swapped for a local directory without touching
/// any caller.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read the blob at `key` in full.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Write `bytes` to `key`, replacing any existing blob.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<(), StorageError>;

    /// Produce a time-limited download URL for `key`.
    ///
    /// The URL is minted without checking that the blob exists, so
    /// callers must write before signing.
    async fn signed_url(&self, key: &str, expires_in: Duration) -> Result<String, StorageError>;
}

/// Errors from the blob store implementations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No blob exists at the requested key.
    #[error("no blob at {0}")]
    NotFound(String),

    /// Local filesystem failure.
    #[error("blob I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// An S3 request failed.
    #[error("S3 {operation} failed for {key}: {source}")]
    S3 {
        /// Which S3 call failed (GET, PUT, presign).
        operation: &'static str,
        /// Object key involved.
        key: String,
        /// Underlying SDK error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
