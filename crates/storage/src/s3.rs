//! S3-backed blob store.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;

use crate::store::{BlobStore, StorageError};

/// Blob store backed by a single S3 bucket.
///
/// Credentials and region come from the ambient AWS environment
/// (env vars, shared profile, or instance role).
pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3BlobStore {
    /// Connect using the ambient AWS configuration.
    pub async fn new(bucket: String) -> Self {
        let config = aws_config::load_from_env().await;
        let client = aws_sdk_s3::Client::new(&config);

        tracing::info!(bucket = %bucket, "S3 blob store initialized");

        Self { client, bucket }
    }

    fn request_err(
        operation: &'static str,
        key: &str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> StorageError {
        StorageError::S3 {
            operation,
            key: key.to_string(),
            source: Box::new(source),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                if err.as_service_error().map_or(false, |e| e.is_no_such_key()) {
                    StorageError::NotFound(key.to_string())
                } else {
                    Self::request_err("GET", key, err)
                }
            })?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|err| Self::request_err("GET", key, err))?;

        Ok(bytes.into_bytes().to_vec())
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        let size = bytes.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(bytes.into())
            .content_type(content_type)
            .send()
            .await
            .map_err(|err| Self::request_err("PUT", key, err))?;

        tracing::debug!(key, size, "Wrote blob to S3");
        Ok(())
    }

    async fn signed_url(&self, key: &str, expires_in: Duration) -> Result<String, StorageError> {
        let config = PresigningConfig::expires_in(expires_in)
            .map_err(|err| Self::request_err("presign", key, err))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(config)
            .await
            .map_err(|err| Self::request_err("presign", key, err))?;

        Ok(request.uri().to_string())
    }
}
