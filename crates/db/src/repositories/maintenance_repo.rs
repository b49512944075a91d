//! Repository for the `maintenance_records` table.

use driveline_core::docs::MaintenanceEntry;
use sqlx::PgPool;

use crate::models::maintenance::{MaintenancePrediction, MaintenanceRecord};

/// Column list for `maintenance_records` queries.
const COLUMNS: &str = "\
    id, user_id, vehicle_id, date, record_type, description, cost, \
    source, urgency, estimated_date, estimated_miles, confidence, \
    reasoning, status, created_at, updated_at";

/// Source tag for rows written by the maintenance sweep.
const SOURCE_PREDICTION: &str = "ai_prediction";

/// Initial status of a freshly written prediction.
const STATUS_PREDICTED: &str = "predicted";

/// Provides history reads and prediction writes for maintenance records.
pub struct MaintenanceRepo;

impl MaintenanceRepo {
    /// Record a user-logged maintenance entry.
    pub async fn insert_manual(
        pool: &PgPool,
        user_id: &str,
        vehicle_id: &str,
        entry: &MaintenanceEntry,
    ) -> Result<MaintenanceRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO maintenance_records \
                 (user_id, vehicle_id, date, record_type, description, cost, source) \
             VALUES ($1, $2, $3, $4, $5, $6, 'manual') \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MaintenanceRecord>(&query)
            .bind(user_id)
            .bind(vehicle_id)
            .bind(&entry.date)
            .bind(&entry.record_type)
            .bind(&entry.description)
            .bind(entry.cost)
            .fetch_one(pool)
            .await
    }

    /// Record one AI-predicted upcoming maintenance item.
    pub async fn insert_prediction(
        pool: &PgPool,
        user_id: &str,
        vehicle_id: &str,
        prediction: &MaintenancePrediction,
    ) -> Result<MaintenanceRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO maintenance_records \
                 (user_id, vehicle_id, record_type, urgency, estimated_date, \
                  estimated_miles, confidence, reasoning, source, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MaintenanceRecord>(&query)
            .bind(user_id)
            .bind(vehicle_id)
            .bind(&prediction.record_type)
            .bind(&prediction.urgency)
            .bind(&prediction.estimated_date)
            .bind(prediction.estimated_miles)
            .bind(prediction.confidence)
            .bind(&prediction.reasoning)
            .bind(SOURCE_PREDICTION)
            .bind(STATUS_PREDICTED)
            .fetch_one(pool)
            .await
    }

    /// The vehicle's full maintenance history, newest first.
    pub async fn list_history(
        pool: &PgPool,
        user_id: &str,
        vehicle_id: &str,
    ) -> Result<Vec<MaintenanceRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM maintenance_records \
             WHERE user_id = $1 AND vehicle_id = $2 \
             ORDER BY date DESC NULLS LAST, id DESC"
        );
        sqlx::query_as::<_, MaintenanceRecord>(&query)
            .bind(user_id)
            .bind(vehicle_id)
            .fetch_all(pool)
            .await
    }
}
