//! Dashboard generation runner.
//!
//! Dedicated claimer for `dashboard_generation` jobs: turns a free-form
//! prompt into a widget layout via the oracle, persists the layout as a
//! Dashboard row, and completes the job with the layout plus the new
//! row's id.

use std::sync::Arc;
use std::time::Duration;

use driveline_core::jobs::{progress, JobRequest, TYPE_DASHBOARD_GENERATION};
use driveline_core::prompts;
use driveline_db::models::ai_job::AiJob;
use driveline_db::models::dashboard::GeneratedDashboard;
use driveline_db::repositories::{AiJobRepo, DashboardRepo, VehicleRepo};
use driveline_db::DbPool;
use driveline_gemini::{Oracle, Priority};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::PipelineError;

/// Default polling interval for the claim loop.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Background runner for `dashboard_generation` jobs.
pub struct DashboardRunner {
    pool: DbPool,
    oracle: Arc<dyn Oracle>,
    poll_interval: Duration,
}

impl DashboardRunner {
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
            "Dashboard runner started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Dashboard runner shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.try_claim().await {
                        tracing::error!(error = %e, "Dashboard claim cycle failed");
                    }
                }
            }
        }
    }

    /// One cycle: claim at most one pending dashboard job and drive it to
    /// a terminal state.
    pub async fn try_claim(&self) -> Result<(), sqlx::Error> {
        let Some(job) = AiJobRepo::claim_next_of_type(
            &self.pool,
            TYPE_DASHBOARD_GENERATION,
            progress::DASHBOARD_CLAIMED,
        )
        .await?
        else {
            return Ok(());
        };
        tracing::info!(job_id = %job.id, "Dashboard job claimed");

        if let Err(err) = self.process(&job).await {
            tracing::error!(job_id = %job.id, error = %err, "Dashboard generation failed");
            AiJobRepo::fail(&self.pool, &job.user_id, &job.id, &err.to_string()).await?;
        }
        Ok(())
    }

    async fn process(&self, job: &AiJob) -> Result<(), PipelineError> {
        let request = JobRequest::parse(&job.job_type, job.params.as_ref())?;
        let JobRequest::DashboardGeneration(params) = &request else {
            return Err(PipelineError::WrongRunner(request.job_type()));
        };

        let vehicle = VehicleRepo::find(&self.pool, &job.user_id, &job.vehicle_id)
            .await?
            .map(|row| row.to_doc())
            .unwrap_or_default();
        AiJobRepo::set_progress(
            &self.pool,
            &job.user_id,
            &job.id,
            progress::DASHBOARD_VEHICLE_RESOLVED,
        )
        .await?;

        let prompt = prompts::dashboard(&vehicle, params.prompt_or_default());
        let result = self.oracle.invoke(&prompt, Priority::Medium).await?;

        let layout: GeneratedDashboard = serde_json::from_value(result.clone()).unwrap_or_default();
        let dashboard = DashboardRepo::insert_generated(
            &self.pool,
            &job.user_id,
            &job.vehicle_id,
            &job.id,
            &layout,
        )
        .await?;

        // The completion result carries the generated layout alongside the
        // persisted row's id.
        let mut summary = serde_json::Map::new();
        summary.insert("dashboardId".to_string(), Value::String(dashboard.id.clone()));
        if let Value::Object(fields) = result {
            summary.extend(fields);
        }
        AiJobRepo::complete(&self.pool, &job.user_id, &job.id, &Value::Object(summary)).await?;
        tracing::info!(job_id = %job.id, dashboard_id = %dashboard.id, "Dashboard generated");
        Ok(())
    }
}
