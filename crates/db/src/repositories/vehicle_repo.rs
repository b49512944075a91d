//! Repository for the `vehicles` table.

use driveline_core::docs::{VehicleDoc, VinDecoded};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::vehicle::Vehicle;

/// Column list for `vehicles` queries.
const COLUMNS: &str = "\
    id, user_id, year, make, model, trim, engine, current_odometer, \
    vin, vin_decoded, vin_decoded_at, vin_error, \
    baseline_data, baseline_updated_at, created_at, updated_at";

/// Provides lookups and pipeline writes for vehicles.
pub struct VehicleRepo;

impl VehicleRepo {
    /// Insert or replace the client-owned fields of a synced vehicle
    /// document. Pipeline-owned columns are left untouched on conflict.
    pub async fn upsert(
        pool: &PgPool,
        user_id: &str,
        id: &str,
        doc: &VehicleDoc,
    ) -> Result<Vehicle, sqlx::Error> {
        let query = format!(
            "INSERT INTO vehicles \
                 (id, user_id, year, make, model, trim, engine, current_odometer, vin) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (user_id, id) DO UPDATE SET \
                 year = EXCLUDED.year, \
                 make = EXCLUDED.make, \
                 model = EXCLUDED.model, \
                 trim = EXCLUDED.trim, \
                 engine = EXCLUDED.engine, \
                 current_odometer = EXCLUDED.current_odometer, \
                 vin = EXCLUDED.vin, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Vehicle>(&query)
            .bind(id)
            .bind(user_id)
            .bind(doc.year)
            .bind(&doc.make)
            .bind(&doc.model)
            .bind(&doc.trim)
            .bind(&doc.engine)
            .bind(doc.current_odometer)
            .bind(&doc.vin)
            .fetch_one(pool)
            .await
    }

    /// Fetch a single vehicle.
    pub async fn find(
        pool: &PgPool,
        user_id: &str,
        id: &str,
    ) -> Result<Option<Vehicle>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vehicles WHERE user_id = $1 AND id = $2");
        sqlx::query_as::<_, Vehicle>(&query)
            .bind(user_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All vehicles across all users, in stable order. Used by the
    /// scheduled sweeps.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Vehicle>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vehicles ORDER BY user_id, id");
        sqlx::query_as::<_, Vehicle>(&query).fetch_all(pool).await
    }

    /// Store a successful VIN decode and clear any previous decode error.
    pub async fn set_vin_decoded(
        pool: &PgPool,
        user_id: &str,
        id: &str,
        decoded: &VinDecoded,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE vehicles \
             SET vin_decoded = $3, vin_decoded_at = NOW(), vin_error = NULL, updated_at = NOW() \
             WHERE user_id = $1 AND id = $2",
        )
        .bind(user_id)
        .bind(id)
        .bind(Json(decoded))
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record a VIN decode failure.
    pub async fn set_vin_error(
        pool: &PgPool,
        user_id: &str,
        id: &str,
        error: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE vehicles SET vin_error = $3, updated_at = NOW() \
             WHERE user_id = $1 AND id = $2",
        )
        .bind(user_id)
        .bind(id)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Store a freshly computed performance baseline.
    pub async fn set_baseline(
        pool: &PgPool,
        user_id: &str,
        id: &str,
        baseline: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE vehicles \
             SET baseline_data = $3, baseline_updated_at = NOW(), updated_at = NOW() \
             WHERE user_id = $1 AND id = $2",
        )
        .bind(user_id)
        .bind(id)
        .bind(baseline)
        .execute(pool)
        .await?;
        Ok(())
    }
}
