//! Vehicle entity models.

use driveline_core::docs::VehicleDoc;
use driveline_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `vehicles` table.
///
/// `vin_decoded` and `baseline_data` stay as raw JSON in the row; callers
/// that need typed access go through [`Vehicle::to_doc`].
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Vehicle {
    pub id: String,
    pub user_id: String,
    pub year: Option<i32>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub trim: Option<String>,
    pub engine: Option<String>,
    pub current_odometer: Option<f64>,
    pub vin: Option<String>,
    pub vin_decoded: Option<serde_json::Value>,
    pub vin_decoded_at: Option<Timestamp>,
    pub vin_error: Option<String>,
    pub baseline_data: Option<serde_json::Value>,
    pub baseline_updated_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Vehicle {
    /// Wire-shaped view of this row, as prompt builders expect it.
    pub fn to_doc(&self) -> VehicleDoc {
        VehicleDoc {
            year: self.year,
            make: self.make.clone(),
            model: self.model.clone(),
            trim: self.trim.clone(),
            engine: self.engine.clone(),
            current_odometer: self.current_odometer,
            vin: self.vin.clone(),
            vin_decoded: self
                .vin_decoded
                .clone()
                .and_then(|value| serde_json::from_value(value).ok()),
            vin_decoded_at: self.vin_decoded_at,
            vin_error: self.vin_error.clone(),
            baseline_data: self.baseline_data.clone(),
            baseline_updated_at: self.baseline_updated_at,
        }
    }
}
