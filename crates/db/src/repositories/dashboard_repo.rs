//! Repository for the `dashboards` table.

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::dashboard::{Dashboard, GeneratedDashboard};

/// Column list for `dashboards` queries.
const COLUMNS: &str = "\
    id, user_id, vehicle_id, name, description, widgets, source, \
    ai_job_id, created_at, updated_at";

/// Provides writes for AI-generated dashboards.
pub struct DashboardRepo;

impl DashboardRepo {
    /// Store a generated dashboard layout, minting its id.
    pub async fn insert_generated(
        pool: &PgPool,
        user_id: &str,
        vehicle_id: &str,
        ai_job_id: &str,
        layout: &GeneratedDashboard,
    ) -> Result<Dashboard, sqlx::Error> {
        let query = format!(
            "INSERT INTO dashboards \
                 (id, user_id, vehicle_id, name, description, widgets, ai_job_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Dashboard>(&query)
            .bind(Uuid::new_v4().to_string())
            .bind(user_id)
            .bind(vehicle_id)
            .bind(&layout.name)
            .bind(&layout.description)
            .bind(Json(&layout.widgets))
            .bind(ai_job_id)
            .fetch_one(pool)
            .await
    }

    /// All dashboards of one vehicle, oldest first.
    pub async fn list_for_vehicle(
        pool: &PgPool,
        user_id: &str,
        vehicle_id: &str,
    ) -> Result<Vec<Dashboard>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM dashboards \
             WHERE user_id = $1 AND vehicle_id = $2 \
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Dashboard>(&query)
            .bind(user_id)
            .bind(vehicle_id)
            .fetch_all(pool)
            .await
    }
}
