//! Fleet-wide sweep behavior:
//! - Maintenance sweeps write predictions only for vehicles with drives
//! - Unstructured oracle output and per-vehicle failures are tolerated
//! - Baseline sweeps cover only recently driven vehicles

mod common;

use chrono::{Duration, Utc};
use common::CannedOracle;
use driveline_core::docs::{DriveDoc, VehicleDoc};
use driveline_db::repositories::{DriveRepo, MaintenanceRepo, VehicleRepo};
use driveline_pipeline::SweepScheduler;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_vehicle_with_drive(pool: &PgPool, vehicle_id: &str, drive_age_days: i64) {
    VehicleRepo::upsert(pool, "u1", vehicle_id, &VehicleDoc::default())
        .await
        .unwrap();
    let drive = DriveDoc {
        start_time: Some(Utc::now() - Duration::days(drive_age_days)),
        average_mpg: Some(17.0),
        ..Default::default()
    };
    DriveRepo::upsert(pool, "u1", vehicle_id, &format!("{vehicle_id}-drive"), &drive)
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Test: Maintenance sweep
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_maintenance_sweep_writes_predictions(pool: PgPool) {
    seed_vehicle_with_drive(&pool, "v1", 3).await;
    // A vehicle with no drives gives the oracle nothing to work with
    VehicleRepo::upsert(&pool, "u1", "v-idle", &VehicleDoc::default())
        .await
        .unwrap();

    let oracle = CannedOracle::returning(json!({
        "predictions": [{
            "type": "oil_change",
            "urgency": "soon",
            "estimatedDate": "2026-09-15",
            "estimatedMiles": 81500.0,
            "confidence": 0.8,
            "reasoning": "Interval due based on recent mileage"
        }]
    }));
    SweepScheduler::new(pool.clone(), oracle.clone())
        .run_maintenance_sweep()
        .await
        .unwrap();

    let history = MaintenanceRepo::list_history(&pool, "u1", "v1").await.unwrap();
    assert_eq!(history.len(), 1);
    let prediction = &history[0];
    assert_eq!(prediction.source, "ai_prediction");
    assert_eq!(prediction.status.as_deref(), Some("predicted"));
    assert_eq!(prediction.record_type.as_deref(), Some("oil_change"));
    assert_eq!(prediction.urgency.as_deref(), Some("soon"));
    assert_eq!(prediction.estimated_miles, Some(81500.0));

    assert_eq!(oracle.call_count(), 1);
    assert!(MaintenanceRepo::list_history(&pool, "u1", "v-idle")
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_maintenance_sweep_tolerates_unstructured_responses(pool: PgPool) {
    seed_vehicle_with_drive(&pool, "v1", 3).await;

    let oracle = CannedOracle::returning(json!({"raw": "no usable prediction"}));
    SweepScheduler::new(pool.clone(), oracle.clone())
        .run_maintenance_sweep()
        .await
        .unwrap();

    assert!(MaintenanceRepo::list_history(&pool, "u1", "v1")
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failing_oracle_does_not_abort_the_sweep(pool: PgPool) {
    seed_vehicle_with_drive(&pool, "v1", 2).await;
    seed_vehicle_with_drive(&pool, "v2", 4).await;

    let oracle = CannedOracle::failing();
    SweepScheduler::new(pool.clone(), oracle.clone())
        .run_maintenance_sweep()
        .await
        .unwrap();

    // Both vehicles were attempted; neither got a prediction
    assert_eq!(oracle.call_count(), 2);
    assert!(MaintenanceRepo::list_history(&pool, "u1", "v1")
        .await
        .unwrap()
        .is_empty());
}

// ---------------------------------------------------------------------------
// Test: Baseline sweep
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_baseline_sweep_covers_only_recently_driven_vehicles(pool: PgPool) {
    seed_vehicle_with_drive(&pool, "v-active", 5).await;
    seed_vehicle_with_drive(&pool, "v-stale", 60).await;

    let oracle = CannedOracle::returning(json!({"avgMPG": 17.8, "typicalBoost": 12.5}));
    SweepScheduler::new(pool.clone(), oracle.clone())
        .run_baseline_sweep()
        .await
        .unwrap();

    let active = VehicleRepo::find(&pool, "u1", "v-active").await.unwrap().unwrap();
    assert_eq!(active.baseline_data.unwrap()["avgMPG"], 17.8);
    assert!(active.baseline_updated_at.is_some());

    let stale = VehicleRepo::find(&pool, "u1", "v-stale").await.unwrap().unwrap();
    assert!(stale.baseline_data.is_none());
    assert!(stale.baseline_updated_at.is_none());

    let calls = oracle.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, "flash:2048");
}
