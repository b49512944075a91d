//! Legacy per-sample datapoint models.

use driveline_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `datapoints` table. `timestamp` is epoch milliseconds as
/// recorded by the client; `data` maps sensor names to sampled values.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Datapoint {
    pub id: DbId,
    pub user_id: String,
    pub vehicle_id: String,
    pub drive_id: String,
    pub timestamp: i64,
    pub data: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
