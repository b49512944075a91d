//! Generic AI job runner.
//!
//! Claims pending `ai_jobs` rows (except the types owned by dedicated
//! runners), resolves the entities each job type needs, and asks the
//! oracle once per job. Every claimed job reaches a terminal state:
//! `completed` with the oracle's result, or `error` with the failure
//! message. There is no retry; resubmitting is the client's call.

use std::sync::Arc;
use std::time::Duration;

use driveline_core::docs::DriveDoc;
use driveline_core::jobs::{progress, JobRequest, DEDICATED_TYPES};
use driveline_core::prompts;
use driveline_db::models::ai_job::AiJob;
use driveline_db::models::drive::Drive;
use driveline_db::repositories::{AiJobRepo, DriveRepo, MaintenanceRepo, VehicleRepo};
use driveline_db::DbPool;
use driveline_gemini::{Oracle, Priority};
use tokio_util::sync::CancellationToken;

use crate::error::PipelineError;

/// Default polling interval for the claim loop.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How many recent drives feed a maintenance prediction.
const MAINTENANCE_DRIVE_WINDOW: i64 = 30;

/// How many recent drives feed a custom query.
const CUSTOM_QUERY_DRIVE_WINDOW: i64 = 20;

/// Background runner for analysis-style AI jobs.
pub struct JobRunner {
    pool: DbPool,
    oracle: Arc<dyn Oracle>,
    poll_interval: Duration,
}

impl JobRunner {
    pub fn new(pool: DbPool, oracle: Arc<dyn Oracle>) -> Self {
        Self {
            pool,
            oracle,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Run the claim loop until the cancellation token is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "AI job runner started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("AI job runner shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.try_claim().await {
                        tracing::error!(error = %e, "Job claim cycle failed");
                    }
                }
            }
        }
    }

    /// One cycle: claim at most one pending job and drive it to a
    /// terminal state.
    pub async fn try_claim(&self) -> Result<(), sqlx::Error> {
        let Some(job) =
            AiJobRepo::claim_next(&self.pool, &DEDICATED_TYPES, progress::CLAIMED).await?
        else {
            return Ok(());
        };
        tracing::info!(job_id = %job.id, job_type = %job.job_type, "AI job claimed");

        if let Err(err) = self.process(&job).await {
            tracing::error!(job_id = %job.id, job_type = %job.job_type, error = %err, "AI job failed");
            AiJobRepo::fail(&self.pool, &job.user_id, &job.id, &err.to_string()).await?;
        }
        Ok(())
    }

    /// Resolve the job's entities, invoke the oracle once, store the
    /// result. An unknown job type fails here, after the claim already
    /// marked the row `processing`.
    async fn process(&self, job: &AiJob) -> Result<(), PipelineError> {
        let request = JobRequest::parse(&job.job_type, job.params.as_ref())?;

        let vehicle = VehicleRepo::find(&self.pool, &job.user_id, &job.vehicle_id)
            .await?
            .map(|row| row.to_doc())
            .unwrap_or_default();

        let prompt = match &request {
            JobRequest::RangeAnalysis(params) => {
                self.set_progress(job, progress::ENTITIES_RESOLVED).await?;
                let drives = DriveRepo::list_in_range(
                    &self.pool,
                    &job.user_id,
                    &job.vehicle_id,
                    params.start_date,
                    params.end_date,
                )
                .await?;
                prompts::range_analysis(&vehicle, &drive_docs(&drives), params)
            }
            JobRequest::PredictiveMaintenance => {
                self.set_progress(job, progress::ENTITIES_RESOLVED).await?;
                let drives = DriveRepo::list_recent(
                    &self.pool,
                    &job.user_id,
                    &job.vehicle_id,
                    MAINTENANCE_DRIVE_WINDOW,
                )
                .await?;
                let history =
                    MaintenanceRepo::list_history(&self.pool, &job.user_id, &job.vehicle_id)
                        .await?;
                let entries: Vec<_> = history.iter().map(|record| record.to_entry()).collect();
                prompts::maintenance_prediction(&vehicle, &drive_docs(&drives), &entries)
            }
            JobRequest::CustomQuery(params) => {
                self.set_progress(job, progress::ENTITIES_RESOLVED).await?;
                let drives = DriveRepo::list_recent(
                    &self.pool,
                    &job.user_id,
                    &job.vehicle_id,
                    CUSTOM_QUERY_DRIVE_WINDOW,
                )
                .await?;
                prompts::custom_query(&vehicle, &drive_docs(&drives), params)
            }
            JobRequest::DashboardGeneration(_) | JobRequest::Export(_) => {
                return Err(PipelineError::WrongRunner(request.job_type()));
            }
        };

        self.set_progress(job, progress::ORACLE_INVOKED).await?;
        let result = self.oracle.invoke(&prompt, Priority::High).await?;

        AiJobRepo::complete(&self.pool, &job.user_id, &job.id, &result).await?;
        tracing::info!(job_id = %job.id, job_type = %job.job_type, "AI job completed");
        Ok(())
    }

    async fn set_progress(&self, job: &AiJob, progress: f64) -> Result<(), sqlx::Error> {
        AiJobRepo::set_progress(&self.pool, &job.user_id, &job.id, progress).await
    }
}

/// Wire-shaped views of drive rows, in the order they were queried.
fn drive_docs(drives: &[Drive]) -> Vec<DriveDoc> {
    drives.iter().map(Drive::to_doc).collect()
}
