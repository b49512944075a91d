//! Drive data export runner.
//!
//! Dedicated claimer for `export` jobs. Reads every requested drive's
//! rows (uploaded payload first, legacy datapoint rows as the fallback),
//! serializes them as CSV or JSON, uploads the artifact and completes the
//! job with a signed, time-limited download URL.

use std::sync::Arc;
use std::time::Duration;

use driveline_core::export::{self, ExportRow};
use driveline_core::jobs::{progress, ExportFormat, ExportParams, JobRequest, TYPE_EXPORT};
use driveline_core::timeseries;
use driveline_db::models::ai_job::AiJob;
use driveline_db::repositories::{AiJobRepo, DatapointRepo, DriveRepo};
use driveline_db::DbPool;
use driveline_storage::{paths, BlobStore, EXPORT_URL_TTL};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::error::PipelineError;

/// Default polling interval for the claim loop.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Background runner for `export` jobs.
pub struct ExportRunner {
    pool: DbPool,
    store: Arc<dyn BlobStore>,
    poll_interval: Duration,
}

impl ExportRunner {
    pub fn new(pool: DbPool, store: Arc<dyn BlobStore>) -> Self {
        Self {
            pool,
            store,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Run the claim loop until the cancellation token is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Export runner started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Export runner shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.try_claim().await {
                        tracing::error!(error = %e, "Export claim cycle failed");
                    }
                }
            }
        }
    }

    /// One cycle: claim at most one pending export job and drive it to a
    /// terminal state.
    pub async fn try_claim(&self) -> Result<(), sqlx::Error> {
        let Some(job) =
            AiJobRepo::claim_next_of_type(&self.pool, TYPE_EXPORT, progress::EXPORT_CLAIMED)
                .await?
        else {
            return Ok(());
        };
        tracing::info!(job_id = %job.id, "Export job claimed");

        if let Err(err) = self.process(&job).await {
            tracing::error!(job_id = %job.id, error = %err, "Export failed");
            AiJobRepo::fail(&self.pool, &job.user_id, &job.id, &err.to_string()).await?;
        }
        Ok(())
    }

    async fn process(&self, job: &AiJob) -> Result<(), PipelineError> {
        let request = JobRequest::parse(&job.job_type, job.params.as_ref())?;
        let JobRequest::Export(params) = &request else {
            return Err(PipelineError::WrongRunner(request.job_type()));
        };
        AiJobRepo::set_progress(&self.pool, &job.user_id, &job.id, progress::EXPORT_STARTED)
            .await?;

        let rows = self.collect_rows(job, params).await?;
        AiJobRepo::set_progress(&self.pool, &job.user_id, &job.id, progress::EXPORT_ROWS_READ)
            .await?;

        let content = match params.format {
            ExportFormat::Json => export::to_json(&rows)?,
            ExportFormat::Csv => export::to_csv(&rows),
        };
        AiJobRepo::set_progress(&self.pool, &job.user_id, &job.id, progress::EXPORT_SERIALIZED)
            .await?;

        let key = paths::export_key(
            &job.user_id,
            &job.vehicle_id,
            &job.id,
            params.format.extension(),
        );
        self.store
            .put(&key, content.into_bytes(), params.format.content_type())
            .await?;
        let download_url = self.store.signed_url(&key, EXPORT_URL_TTL).await?;

        let result = json!({
            "downloadUrl": download_url,
            "filePath": key,
            "rowCount": rows.len(),
            "format": params.format.as_str(),
        });
        AiJobRepo::complete(&self.pool, &job.user_id, &job.id, &result).await?;
        tracing::info!(
            job_id = %job.id,
            row_count = rows.len(),
            format = params.format.as_str(),
            "Export completed"
        );
        Ok(())
    }

    /// Gather the rows of every requested drive, each prefixed with its
    /// drive id. Unknown drive ids contribute nothing.
    async fn collect_rows(
        &self,
        job: &AiJob,
        params: &ExportParams,
    ) -> Result<Vec<ExportRow>, PipelineError> {
        let mut rows = Vec::new();
        for drive_id in &params.drive_ids {
            let doc = DriveRepo::find(&self.pool, &job.user_id, &job.vehicle_id, drive_id)
                .await?
                .map(|row| row.to_doc())
                .unwrap_or_default();

            match doc.timeseries_path.as_deref().filter(|_| doc.uploaded()) {
                Some(path) => {
                    let blob = self.store.get(path).await?;
                    let payload = timeseries::decode_payload(&blob)?;
                    rows.extend(payload.rows().map(|row| ExportRow {
                        drive_id: drive_id.clone(),
                        timestamp: row.timestamp,
                        values: row
                            .values
                            .into_iter()
                            .map(|(name, value)| (name, Value::from(value)))
                            .collect(),
                    }));
                }
                None => {
                    let datapoints = DatapointRepo::list_for_drive(
                        &self.pool,
                        &job.user_id,
                        &job.vehicle_id,
                        drive_id,
                    )
                    .await?;
                    rows.extend(datapoints.into_iter().map(|point| ExportRow {
                        drive_id: drive_id.clone(),
                        timestamp: point.timestamp,
                        values: match point.data {
                            Value::Object(fields) => fields.into_iter().collect(),
                            _ => Default::default(),
                        },
                    }));
                }
            }
        }
        Ok(rows)
    }
}
