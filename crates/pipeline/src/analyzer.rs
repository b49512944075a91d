//! Per-drive AI analysis.
//!
//! Runs once per completed upload: reads the owning vehicle for context,
//! asks the oracle for a verdict over the drive's aggregate stats, and
//! writes the verdict back onto the drive row. The raw timeseries blob is
//! never downloaded here; `parameterStats` on the drive document already
//! carries everything the prompt needs.

use std::sync::Arc;

use driveline_core::docs::DriveDoc;
use driveline_core::prompts;
use driveline_db::models::drive::DriveAnalysis;
use driveline_db::repositories::{DriveRepo, VehicleRepo};
use driveline_db::DbPool;
use driveline_gemini::{Oracle, Priority};

use crate::error::PipelineError;

/// Writes an AI verdict onto each freshly uploaded drive.
pub struct DriveAnalyzer {
    pool: DbPool,
    oracle: Arc<dyn Oracle>,
}

impl DriveAnalyzer {
    pub fn new(pool: DbPool, oracle: Arc<dyn Oracle>) -> Self {
        Self { pool, oracle }
    }

    /// Analyze one drive and persist the verdict. Lookup and oracle
    /// failures are parked on the drive's `aiError` column; only a failure
    /// to persist that column bubbles up.
    pub async fn analyze(
        &self,
        user_id: &str,
        vehicle_id: &str,
        drive_id: &str,
        drive: &DriveDoc,
    ) -> Result<(), PipelineError> {
        match self.verdict(user_id, vehicle_id, drive_id, drive).await {
            Ok(analysis) => {
                DriveRepo::set_analysis(&self.pool, user_id, vehicle_id, drive_id, &analysis)
                    .await?;
                tracing::info!(
                    user_id,
                    vehicle_id,
                    drive_id,
                    health_score = analysis.health_score,
                    "Drive analysis written"
                );
            }
            Err(err) => {
                tracing::warn!(user_id, vehicle_id, drive_id, error = %err, "Drive analysis failed");
                DriveRepo::set_analysis_error(
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

    async fn verdict(
        &self,
        user_id: &str,
        vehicle_id: &str,
        drive_id: &str,
        drive: &DriveDoc,
    ) -> Result<DriveAnalysis, PipelineError> {
        let vehicle = VehicleRepo::find(&self.pool, user_id, vehicle_id)
            .await?
            .map(|row| row.to_doc())
            .unwrap_or_default();

        let prompt = prompts::drive_analysis(&vehicle, drive_id, drive);
        let result = self.oracle.invoke(&prompt, Priority::Low).await?;

        let mut analysis: DriveAnalysis = serde_json::from_value(result).unwrap_or_default();
        // Even an empty summary must set the marker column, so that a
        // redelivered transition stays a no-op.
        if analysis.summary.is_none() {
            analysis.summary = Some(String::new());
        }
        Ok(analysis)
    }
}
