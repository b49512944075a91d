//! Local-directory blob store for development and tests.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs;

use crate::store::{BlobStore, StorageError};

/// Blob store rooted at a local directory.
///
/// Keys map directly to relative paths under the root, so the on-disk
/// layout mirrors the bucket layout byte for byte.
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create a store rooted at `root`. Directories are created lazily
    /// on first write.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        match fs::read(self.blob_path(key)).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        let path = self.blob_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, bytes).await?;
        Ok(())
    }

    /// Local blobs are not signed; returns a `file://` URL so export
    /// links stay openable in development.
    async fn signed_url(&self, key: &str, _expires_in: Duration) -> Result<String, StorageError> {
        Ok(format!("file://{}", self.blob_path(key).display()))
    }
}

// --- Tests ---
