//! Drive entity models and DTOs.

use driveline_core::docs::DriveDoc;
use driveline_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `drives` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Drive {
    pub id: String,
    pub user_id: String,
    pub vehicle_id: String,
    pub start_time: Option<Timestamp>,
    pub duration_seconds: Option<f64>,
    pub distance_miles: Option<f64>,
    pub average_mpg: Option<f64>,
    pub max_boost_psi: Option<f64>,
    pub max_egt_f: Option<f64>,
    pub max_trans_temp_f: Option<f64>,
    pub dpf_regen_occurred: Option<bool>,
    pub datapoint_count: Option<i64>,
    pub sensor_list: Vec<String>,
    pub parameter_stats: serde_json::Value,
    pub start_lat: Option<f64>,
    pub start_lng: Option<f64>,
    pub end_lat: Option<f64>,
    pub end_lng: Option<f64>,
    pub timeseries_uploaded: bool,
    pub timeseries_path: Option<String>,
    pub ai_summary: Option<String>,
    pub ai_anomalies: Vec<String>,
    pub ai_health_score: Option<f64>,
    pub ai_recommendations: Vec<String>,
    pub auto_tags: Vec<String>,
    pub ai_analyzed_at: Option<Timestamp>,
    pub ai_error: Option<String>,
    pub route_id: Option<String>,
    pub route_name: Option<String>,
    pub parquet_path: Option<String>,
    pub parquet_error: Option<String>,
    pub status: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Drive {
    /// Wire-shaped view of this row, as prompt builders expect it.
    pub fn to_doc(&self) -> DriveDoc {
        DriveDoc {
            start_time: self.start_time,
            duration_seconds: self.duration_seconds,
            distance_miles: self.distance_miles,
            average_mpg: self.average_mpg,
            max_boost_psi: self.max_boost_psi,
            max_egt_f: self.max_egt_f,
            max_trans_temp_f: self.max_trans_temp_f,
            dpf_regen_occurred: self.dpf_regen_occurred,
            datapoint_count: self.datapoint_count,
            sensor_list: self.sensor_list.clone(),
            parameter_stats: serde_json::from_value(self.parameter_stats.clone())
                .unwrap_or_default(),
            start_lat: self.start_lat,
            start_lng: self.start_lng,
            end_lat: self.end_lat,
            end_lng: self.end_lng,
            timeseries_uploaded: Some(self.timeseries_uploaded),
            timeseries_path: self.timeseries_path.clone(),
            ai_summary: self.ai_summary.clone(),
            ai_anomalies: self.ai_anomalies.clone(),
            ai_health_score: self.ai_health_score,
            ai_recommendations: self.ai_recommendations.clone(),
            auto_tags: self.auto_tags.clone(),
            ai_analyzed_at: self.ai_analyzed_at,
            ai_error: self.ai_error.clone(),
            route_id: self.route_id.clone(),
            route_name: self.route_name.clone(),
            parquet_path: self.parquet_path.clone(),
            parquet_error: self.parquet_error.clone(),
            status: self.status.clone(),
        }
    }
}

/// Analyzer verdict, parsed straight from the model's JSON response and
/// written back onto the drive row.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DriveAnalysis {
    pub summary: Option<String>,
    pub anomalies: Vec<String>,
    pub health_score: Option<f64>,
    pub recommendations: Vec<String>,
    pub auto_tags: Vec<String>,
}
