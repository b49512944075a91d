//! Scheduled oracle sweeps.
//!
//! Two fleet-wide passes share one loop: the daily predictive-maintenance
//! sweep and the weekly driving-baseline refresh. The loop sleeps until
//! the next due time instead of coarse polling, and a single vehicle's
//! failure is logged and skipped rather than aborting the rest of the
//! sweep.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use driveline_core::prompts;
use driveline_db::models::maintenance::MaintenancePrediction;
use driveline_db::models::vehicle::Vehicle;
use driveline_db::repositories::{DriveRepo, MaintenanceRepo, VehicleRepo};
use driveline_db::DbPool;
use driveline_gemini::{Oracle, Priority};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::PipelineError;

/// The maintenance sweep fires daily at 03:00 UTC.
const MAINTENANCE_HOUR_UTC: u32 = 3;

/// The baseline sweep fires Sundays at 04:00 UTC.
const BASELINE_HOUR_UTC: u32 = 4;

/// Output cap for the flash model during baseline computation.
const BASELINE_MAX_OUTPUT_TOKENS: u32 = 2048;

/// How many recent drives feed each maintenance prediction.
const MAINTENANCE_DRIVE_WINDOW: i64 = 30;

/// Days of history feeding each baseline.
const BASELINE_WINDOW_DAYS: i64 = 30;

/// Which sweep fires at a computed due time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sweep {
    Maintenance,
    Baseline,
}

/// Background service running both sweep schedules.
pub struct SweepScheduler {
    pool: DbPool,
    oracle: Arc<dyn Oracle>,
}

impl SweepScheduler {
    pub fn new(pool: DbPool, oracle: Arc<dyn Oracle>) -> Self {
        Self { pool, oracle }
    }

    /// Run both sweep schedules until the cancellation token is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!("Sweep scheduler started");

        loop {
            let (sweep, wait) = next_sweep(Utc::now());
            tracing::debug!(?sweep, wait_secs = wait.as_secs(), "Sleeping until next sweep");

            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Sweep scheduler shutting down");
                    break;
                }
                _ = tokio::time::sleep(wait) => {
                    let outcome = match sweep {
                        Sweep::Maintenance => self.run_maintenance_sweep().await,
                        Sweep::Baseline => self.run_baseline_sweep().await,
                    };
                    if let Err(e) = outcome {
                        tracing::error!(?sweep, error = %e, "Sweep failed");
                    }
                }
            }
        }
    }

    /// Predict upcoming maintenance for every vehicle with recent drives.
    pub async fn run_maintenance_sweep(&self) -> Result<(), sqlx::Error> {
        let vehicles = VehicleRepo::list_all(&self.pool).await?;
        tracing::info!(vehicle_count = vehicles.len(), "Maintenance sweep started");

        for vehicle in &vehicles {
            if let Err(err) = self.predict_maintenance(vehicle).await {
                tracing::error!(
                    user_id = %vehicle.user_id,
                    vehicle_id = %vehicle.id,
                    error = %err,
                    "Maintenance prediction failed for vehicle"
                );
            }
        }
        Ok(())
    }

    async fn predict_maintenance(&self, vehicle: &Vehicle) -> Result<(), PipelineError> {
        let drives = DriveRepo::list_recent(
            &self.pool,
            &vehicle.user_id,
            &vehicle.id,
            MAINTENANCE_DRIVE_WINDOW,
        )
        .await?;
        if drives.is_empty() {
            return Ok(());
        }
        let docs: Vec<_> = drives.iter().map(|drive| drive.to_doc()).collect();
        let history =
            MaintenanceRepo::list_history(&self.pool, &vehicle.user_id, &vehicle.id).await?;
        let entries: Vec<_> = history.iter().map(|record| record.to_entry()).collect();

        let prompt = prompts::maintenance_prediction(&vehicle.to_doc(), &docs, &entries);
        let result = self.oracle.invoke(&prompt, Priority::High).await?;

        let Some(predictions) = result.get("predictions").and_then(Value::as_array) else {
            tracing::warn!(
                user_id = %vehicle.user_id,
                vehicle_id = %vehicle.id,
                "Prediction response carried no predictions list"
            );
            return Ok(());
        };
        for value in predictions {
            let prediction: MaintenancePrediction =
                serde_json::from_value(value.clone()).unwrap_or_default();
            MaintenanceRepo::insert_prediction(
                &self.pool,
                &vehicle.user_id,
                &vehicle.id,
                &prediction,
            )
            .await?;
        }
        tracing::info!(
            user_id = %vehicle.user_id,
            vehicle_id = %vehicle.id,
            prediction_count = predictions.len(),
            "Maintenance predictions written"
        );
        Ok(())
    }

    /// Refresh the driving baseline of every vehicle active in the last
    /// thirty days.
    pub async fn run_baseline_sweep(&self) -> Result<(), sqlx::Error> {
        let vehicles = VehicleRepo::list_all(&self.pool).await?;
        tracing::info!(vehicle_count = vehicles.len(), "Baseline sweep started");

        for vehicle in &vehicles {
            if let Err(err) = self.compute_baseline(vehicle).await {
                tracing::error!(
                    user_id = %vehicle.user_id,
                    vehicle_id = %vehicle.id,
                    error = %err,
                    "Baseline computation failed for vehicle"
                );
            }
        }
        Ok(())
    }

    async fn compute_baseline(&self, vehicle: &Vehicle) -> Result<(), PipelineError> {
        let now = Utc::now();
        let drives = DriveRepo::list_in_range(
            &self.pool,
            &vehicle.user_id,
            &vehicle.id,
            now - chrono::Duration::days(BASELINE_WINDOW_DAYS),
            now,
        )
        .await?;
        if drives.is_empty() {
            return Ok(());
        }
        let docs: Vec<_> = drives.iter().map(|drive| drive.to_doc()).collect();

        let prompt = prompts::baseline(&vehicle.to_doc(), &docs);
        let baselines = self
            .oracle
            .invoke_flash(&prompt, BASELINE_MAX_OUTPUT_TOKENS)
            .await?;

        VehicleRepo::set_baseline(&self.pool, &vehicle.user_id, &vehicle.id, &baselines).await?;
        tracing::info!(user_id = %vehicle.user_id, vehicle_id = %vehicle.id, "Baseline updated");
        Ok(())
    }
}

// ---- schedule arithmetic ----

/// The next sweep to fire and how long to sleep until it is due.
fn next_sweep(now: DateTime<Utc>) -> (Sweep, std::time::Duration) {
    let maintenance = until_next_daily(now, MAINTENANCE_HOUR_UTC);
    let baseline = until_next_weekly(now, Weekday::Sun, BASELINE_HOUR_UTC);
    let (sweep, wait) = if baseline < maintenance {
        (Sweep::Baseline, baseline)
    } else {
        (Sweep::Maintenance, maintenance)
    };
    (sweep, wait.to_std().unwrap_or(std::time::Duration::ZERO))
}

/// Time until the next `hour`:00:00 UTC, always positive. `now`'s
/// sub-second part is truncated, so the wait never undershoots the mark.
fn until_next_daily(now: DateTime<Utc>, hour: u32) -> chrono::Duration {
    let mut delta = i64::from(hour) * 3600 - i64::from(now.num_seconds_from_midnight());
    if delta <= 0 {
        delta += 86_400;
    }
    chrono::Duration::seconds(delta)
}

/// Time until the next `weekday` `hour`:00:00 UTC, always positive.
fn until_next_weekly(now: DateTime<Utc>, weekday: Weekday, hour: u32) -> chrono::Duration {
    let days_ahead =
        i64::from((7 + weekday.num_days_from_monday() - now.weekday().num_days_from_monday()) % 7);
    let mut delta =
        days_ahead * 86_400 + i64::from(hour) * 3600 - i64::from(now.num_seconds_from_midnight());
    if delta <= 0 {
        delta += 7 * 86_400;
    }
    chrono::Duration::seconds(delta)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
