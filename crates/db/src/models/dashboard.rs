//! Dashboard entity models and DTOs.

use driveline_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `dashboards` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Dashboard {
    pub id: String,
    pub user_id: String,
    pub vehicle_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub widgets: serde_json::Value,
    pub source: String,
    pub ai_job_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Dashboard layout parsed from the model's JSON for a generation job.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratedDashboard {
    pub name: Option<String>,
    pub description: Option<String>,
    pub widgets: Vec<serde_json::Value>,
}
