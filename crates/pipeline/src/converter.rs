//! Columnar conversion of uploaded timeseries payloads.
//!
//! Rewrites each drive's gzip JSON payload as a Parquet file at a
//! deterministic key, then stamps the drive with that key. Decode and
//! encode failures land on the drive's `parquetError` column and never
//! reach the sibling components handling the same transition.

use std::sync::Arc;

use driveline_core::columnar::{self, DriveIdentity};
use driveline_core::docs::DriveDoc;
use driveline_core::timeseries;
use driveline_db::repositories::DriveRepo;
use driveline_db::DbPool;
use driveline_storage::{paths, BlobStore};

use crate::error::PipelineError;

/// Content type of the written Parquet files.
const PARQUET_CONTENT_TYPE: &str = "application/octet-stream";

/// Converts each drive's raw payload into its columnar form.
pub struct ColumnarConverter {
    pool: DbPool,
    store: Arc<dyn BlobStore>,
}

/// What one conversion did.
enum Outcome {
    Written { key: String, row_count: usize },
    EmptyPayload,
}

impl ColumnarConverter {
    pub fn new(pool: DbPool, store: Arc<dyn BlobStore>) -> Self {
        Self { pool, store }
    }

    /// Convert one drive's payload and record the result. An empty payload
    /// is a silent skip; any failure is parked on `parquetError`.
    pub async fn convert(
        &self,
        user_id: &str,
        vehicle_id: &str,
        drive_id: &str,
        drive: &DriveDoc,
    ) -> Result<(), PipelineError> {
        match self.encode_to_store(user_id, vehicle_id, drive_id, drive).await {
            Ok(Outcome::Written { key, row_count }) => {
                DriveRepo::set_parquet_path(&self.pool, user_id, vehicle_id, drive_id, &key)
                    .await?;
                tracing::info!(user_id, vehicle_id, drive_id, row_count, key = %key, "Parquet file written");
            }
            Ok(Outcome::EmptyPayload) => {
                tracing::debug!(user_id, vehicle_id, drive_id, "Timeseries payload is empty, skipping conversion");
            }
            Err(err) => {
                tracing::warn!(user_id, vehicle_id, drive_id, error = %err, "Parquet conversion failed");
                DriveRepo::set_parquet_error(
                    &self.pool,
                    user_id,
                    vehicle_id,
                    drive_id,
                    &err.to_string(),
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn encode_to_store(
        &self,
        user_id: &str,
        vehicle_id: &str,
        drive_id: &str,
        drive: &DriveDoc,
    ) -> Result<Outcome, PipelineError> {
        // Clients may store the payload anywhere; fall back to the
        // conventional key when the drive does not say.
        let source_key = drive
            .timeseries_path
            .clone()
            .unwrap_or_else(|| paths::timeseries_key(user_id, vehicle_id, drive_id));

        let blob = self.store.get(&source_key).await?;
        let payload = timeseries::decode_payload(&blob)?;
        if payload.count == 0 {
            return Ok(Outcome::EmptyPayload);
        }

        let identity = DriveIdentity {
            user_id: user_id.to_string(),
            vehicle_id: vehicle_id.to_string(),
            drive_id: drive_id.to_string(),
        };
        let encoded = columnar::encode(&payload, &identity)?;
        if !encoded.dropped_columns.is_empty() {
            tracing::warn!(
                user_id,
                vehicle_id,
                drive_id,
                dropped = ?encoded.dropped_columns,
                "Dropped input columns outside the file schema"
            );
        }

        let key = paths::parquet_key(user_id, vehicle_id, drive_id);
        self.store.put(&key, encoded.bytes, PARQUET_CONTENT_TYPE).await?;
        Ok(Outcome::Written {
            key,
            row_count: encoded.row_count,
        })
    }
}
