//! Repository for the legacy `datapoints` table.

use sqlx::PgPool;

use crate::models::datapoint::Datapoint;

/// Column list for `datapoints` queries.
const COLUMNS: &str = "\
    id, user_id, vehicle_id, drive_id, timestamp, data, created_at, updated_at";

/// Provides reads and writes for per-sample datapoints.
pub struct DatapointRepo;

impl DatapointRepo {
    /// Record one sampled datapoint for a drive.
    pub async fn insert(
        pool: &PgPool,
        user_id: &str,
        vehicle_id: &str,
        drive_id: &str,
        timestamp: i64,
        data: &serde_json::Value,
    ) -> Result<Datapoint, sqlx::Error> {
        let query = format!(
            "INSERT INTO datapoints (user_id, vehicle_id, drive_id, timestamp, data) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Datapoint>(&query)
            .bind(user_id)
            .bind(vehicle_id)
            .bind(drive_id)
            .bind(timestamp)
            .bind(data)
            .fetch_one(pool)
            .await
    }

    /// All datapoints of one drive in time order.
    pub async fn list_for_drive(
        pool: &PgPool,
        user_id: &str,
        vehicle_id: &str,
        drive_id: &str,
    ) -> Result<Vec<Datapoint>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM datapoints \
             WHERE user_id = $1 AND vehicle_id = $2 AND drive_id = $3 \
             ORDER BY timestamp ASC"
        );
        sqlx::query_as::<_, Datapoint>(&query)
            .bind(user_id)
            .bind(vehicle_id)
            .bind(drive_id)
            .fetch_all(pool)
            .await
    }
}
