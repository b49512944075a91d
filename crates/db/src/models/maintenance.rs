//! Maintenance record entity models and DTOs.

use driveline_core::docs::MaintenanceEntry;
use driveline_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `maintenance_records` table. Covers both user-logged
/// history (`source = 'manual'`) and AI predictions (`source = 'ai_prediction'`).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MaintenanceRecord {
    pub id: DbId,
    pub user_id: String,
    pub vehicle_id: String,
    pub date: Option<String>,
    pub record_type: Option<String>,
    pub description: Option<String>,
    pub cost: Option<f64>,
    pub source: String,
    pub urgency: Option<String>,
    pub estimated_date: Option<String>,
    pub estimated_miles: Option<f64>,
    pub confidence: Option<f64>,
    pub reasoning: Option<String>,
    pub status: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MaintenanceRecord {
    /// Wire-shaped view of this row, as prompt builders expect it.
    pub fn to_entry(&self) -> MaintenanceEntry {
        MaintenanceEntry {
            date: self.date.clone(),
            record_type: self.record_type.clone(),
            description: self.description.clone(),
            cost: self.cost,
        }
    }
}

/// One predicted upcoming maintenance item, parsed from the model's JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaintenancePrediction {
    #[serde(rename = "type")]
    pub record_type: Option<String>,
    pub urgency: Option<String>,
    pub estimated_date: Option<String>,
    pub estimated_miles: Option<f64>,
    pub confidence: Option<f64>,
    pub reasoning: Option<String>,
}
