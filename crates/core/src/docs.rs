//! Wire-format document types shared across the pipeline.
//!
//! Drive and vehicle documents travel as camelCase JSON, both in change-feed
//! payloads and in job results. Every field is optional because clients sync
//! partial documents; the pipeline tolerates whatever subset is present.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::aggregates::DriveMetrics;
use crate::types::Timestamp;

/// Status a drive reaches once the analyzer has written its verdict.
pub const STATUS_ANALYSIS_COMPLETE: &str = "analysisComplete";

// ---------------------------------------------------------------------------
// Drive documents
// ---------------------------------------------------------------------------

/// Per-parameter aggregate computed on-device and synced with the drive doc.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParamAggregate {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
    pub count: Option<i64>,
}

/// A drive document as synced from the vehicle client.
///
/// The `averageMPG` field keeps its historical all-caps suffix on the wire,
/// so it needs an explicit rename.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DriveDoc {
    pub start_time: Option<Timestamp>,
    pub duration_seconds: Option<f64>,
    pub distance_miles: Option<f64>,
    #[serde(rename = "averageMPG")]
    pub average_mpg: Option<f64>,
    pub max_boost_psi: Option<f64>,
    pub max_egt_f: Option<f64>,
    pub max_trans_temp_f: Option<f64>,
    pub dpf_regen_occurred: Option<bool>,
    pub datapoint_count: Option<i64>,
    pub sensor_list: Vec<String>,
    pub parameter_stats: BTreeMap<String, ParamAggregate>,
    pub start_lat: Option<f64>,
    pub start_lng: Option<f64>,
    pub end_lat: Option<f64>,
    pub end_lng: Option<f64>,

    // Set by the client when the raw timeseries finishes uploading. All three
    // downstream components key off this flag.
    pub timeseries_uploaded: Option<bool>,
    pub timeseries_path: Option<String>,

    // Analyzer output.
    pub ai_summary: Option<String>,
    pub ai_anomalies: Vec<String>,
    pub ai_health_score: Option<f64>,
    pub ai_recommendations: Vec<String>,
    pub auto_tags: Vec<String>,
    pub ai_analyzed_at: Option<Timestamp>,
    pub ai_error: Option<String>,

    // Route matcher output.
    pub route_id: Option<String>,
    pub route_name: Option<String>,

    // Columnar converter output.
    pub parquet_path: Option<String>,
    pub parquet_error: Option<String>,

    pub status: Option<String>,
}

/// GPS endpoints of a drive, present only when all four coordinates are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsEndpoints {
    pub start_lat: f64,
    pub start_lng: f64,
    pub end_lat: f64,
    pub end_lng: f64,
}

impl DriveDoc {
    /// True once the client has finished uploading the raw timeseries blob.
    pub fn uploaded(&self) -> bool {
        self.timeseries_uploaded.unwrap_or(false)
    }

    /// The metrics a matched route aggregates from this drive.
    pub fn route_metrics(&self) -> DriveMetrics {
        DriveMetrics {
            mpg: self.average_mpg,
            duration_secs: self.duration_seconds,
            peak_egt: self.max_egt_f,
            peak_boost: self.max_boost_psi,
            peak_trans_temp: self.max_trans_temp_f,
        }
    }

    /// Both GPS endpoints, or `None` when any coordinate is missing.
    pub fn endpoints(&self) -> Option<GpsEndpoints> {
        Some(GpsEndpoints {
            start_lat: self.start_lat?,
            start_lng: self.start_lng?,
            end_lat: self.end_lat?,
            end_lng: self.end_lng?,
        })
    }

    /// Flatten the drive's stats into `(key, value)` lines for prompts:
    /// the headline counters first, then `avg_`/`min_`/`max_`/`count_`
    /// entries per parameter in name order, skipping absent values.
    pub fn flat_stats(&self) -> Vec<(String, String)> {
        let mut stats = vec![
            (
                "datapointCount".to_string(),
                self.datapoint_count.unwrap_or(0).to_string(),
            ),
            (
                "durationSeconds".to_string(),
                self.duration_seconds.unwrap_or(0.0).to_string(),
            ),
            (
                "distanceMiles".to_string(),
                self.distance_miles.unwrap_or(0.0).to_string(),
            ),
            ("sensorList".to_string(), self.sensor_list.join(",")),
        ];

        for (param, agg) in &self.parameter_stats {
            if let Some(avg) = agg.avg {
                stats.push((format!("avg_{param}"), avg.to_string()));
            }
            if let Some(min) = agg.min {
                stats.push((format!("min_{param}"), min.to_string()));
            }
            if let Some(max) = agg.max {
                stats.push((format!("max_{param}"), max.to_string()));
            }
            if let Some(count) = agg.count {
                stats.push((format!("count_{param}"), count.to_string()));
            }
        }

        stats
    }
}

// ---------------------------------------------------------------------------
// Vehicle documents
// ---------------------------------------------------------------------------

/// Decoded VIN attributes from the NHTSA vPIC service. All values arrive as
/// strings, model year included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VinDecoded {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<String>,
    pub engine_displacement: Option<String>,
    pub engine_cylinders: Option<String>,
    pub fuel_type: Option<String>,
    pub drive_type: Option<String>,
    pub body_class: Option<String>,
    pub gvwr: Option<String>,
    pub transmission_style: Option<String>,
    pub plant: Option<String>,
}

/// A vehicle document as synced from the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VehicleDoc {
    pub year: Option<i32>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub trim: Option<String>,
    pub engine: Option<String>,
    pub current_odometer: Option<f64>,
    pub vin: Option<String>,
    pub vin_decoded: Option<VinDecoded>,
    pub vin_decoded_at: Option<Timestamp>,
    pub vin_error: Option<String>,
    pub baseline_data: Option<JsonValue>,
    pub baseline_updated_at: Option<Timestamp>,
}

impl VehicleDoc {
    /// Human-readable description like "2022 Ram 2500 Laramie", falling back
    /// to "Unknown vehicle" when nothing is known.
    pub fn description(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(year) = self.year {
            parts.push(year.to_string());
        }
        for field in [&self.make, &self.model, &self.trim] {
            if let Some(value) = field {
                if !value.is_empty() {
                    parts.push(value.clone());
                }
            }
        }
        if parts.is_empty() {
            "Unknown vehicle".to_string()
        } else {
            parts.join(" ")
        }
    }
}

// ---------------------------------------------------------------------------
// Maintenance records
// ---------------------------------------------------------------------------

/// A maintenance log entry, either user-recorded or predicted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaintenanceEntry {
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub record_type: Option<String>,
    pub description: Option<String>,
    pub cost: Option<f64>,
}
