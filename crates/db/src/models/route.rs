//! Route entity models and DTOs.

use driveline_core::aggregates::{DriveMetrics, RouteAggregates};
use driveline_core::docs::GpsEndpoints;
use driveline_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `routes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Route {
    pub id: String,
    pub user_id: String,
    pub vehicle_id: String,
    pub name: String,
    pub start_geohash: String,
    pub end_geohash: String,
    pub start_lat: f64,
    pub start_lng: f64,
    pub end_lat: f64,
    pub end_lng: f64,
    pub drive_count: i64,
    pub avg_mpg: Option<f64>,
    pub avg_duration_secs: Option<f64>,
    pub avg_peak_egt: Option<f64>,
    pub avg_peak_boost: Option<f64>,
    pub avg_peak_trans_temp: Option<f64>,
    pub best_mpg: Option<f64>,
    pub best_mpg_drive_id: Option<String>,
    pub worst_mpg: Option<f64>,
    pub worst_mpg_drive_id: Option<String>,
    pub last_drive_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for matching one drive against the vehicle's routes.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub user_id: String,
    pub vehicle_id: String,
    pub drive_id: String,
    pub start_geohash: String,
    pub end_geohash: String,
    pub endpoints: GpsEndpoints,
    pub metrics: DriveMetrics,
    pub started_at: Option<Timestamp>,
}

impl Route {
    /// The aggregate state folded so far, ready to absorb the next drive.
    pub fn aggregates(&self) -> RouteAggregates {
        RouteAggregates {
            drive_count: self.drive_count,
            avg_mpg: self.avg_mpg,
            avg_duration_secs: self.avg_duration_secs,
            avg_peak_egt: self.avg_peak_egt,
            avg_peak_boost: self.avg_peak_boost,
            avg_peak_trans_temp: self.avg_peak_trans_temp,
            best_mpg: self.best_mpg,
            best_mpg_drive_id: self.best_mpg_drive_id.clone(),
            worst_mpg: self.worst_mpg,
            worst_mpg_drive_id: self.worst_mpg_drive_id.clone(),
        }
    }
}
