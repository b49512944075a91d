//! AI job entity models and DTOs.

use driveline_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle states of an AI job. Maps to the `ai_job_status` enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "ai_job_status", rename_all = "snake_case")]
pub enum AiJobStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

/// A row from the `ai_jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AiJob {
    pub id: String,
    pub user_id: String,
    pub vehicle_id: String,
    pub job_type: String,
    pub params: Option<serde_json::Value>,
    pub status: AiJobStatus,
    pub progress: f64,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
    pub claimed_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for submitting a new job. The id is chosen by the submitter so that
/// clients can watch the row they created.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAiJob {
    pub id: String,
    pub user_id: String,
    pub vehicle_id: String,
    pub job_type: String,
    pub params: Option<serde_json::Value>,
}
