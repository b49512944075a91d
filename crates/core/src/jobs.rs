//! Typed AI job requests.
//!
//! Jobs arrive as a type string plus a free-form JSON parameter object.
//! Parsing turns that pair into a tagged union up front, so the runners
//! match exhaustively instead of probing a parameter bag, and malformed
//! parameters fail the job before any external call is made.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::types::Timestamp;
use crate::CoreError;

pub const TYPE_RANGE_ANALYSIS: &str = "range_analysis";
pub const TYPE_PREDICTIVE_MAINTENANCE: &str = "predictive_maintenance";
pub const TYPE_CUSTOM_QUERY: &str = "custom_query";
pub const TYPE_DASHBOARD_GENERATION: &str = "dashboard_generation";
pub const TYPE_EXPORT: &str = "export";

/// Types claimed by dedicated runners. The generic runner excludes these
/// when polling, so claiming and skipping never race.
pub const DEDICATED_TYPES: [&str; 2] = [TYPE_DASHBOARD_GENERATION, TYPE_EXPORT];

/// Progress checkpoints reported while a job runs. Values are fractions of
/// 1.0 and only ever move forward.
pub mod progress {
    pub const CLAIMED: f64 = 0.1;
    pub const ENTITIES_RESOLVED: f64 = 0.3;
    pub const ORACLE_INVOKED: f64 = 0.5;
    pub const DONE: f64 = 1.0;

    pub const DASHBOARD_CLAIMED: f64 = 0.2;
    pub const DASHBOARD_VEHICLE_RESOLVED: f64 = 0.5;

    pub const EXPORT_CLAIMED: f64 = 0.1;
    pub const EXPORT_STARTED: f64 = 0.3;
    pub const EXPORT_ROWS_READ: f64 = 0.6;
    pub const EXPORT_SERIALIZED: f64 = 0.8;
}

// ---------------------------------------------------------------------------
// Per-type parameters
// ---------------------------------------------------------------------------

/// Parameters for a time-window trend analysis. Both bounds are required
/// RFC 3339 timestamps; jobs without them fail at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeAnalysisParams {
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    #[serde(default)]
    pub focus: Option<String>,
}

/// Parameters for a free-form question about the vehicle. Older clients sent
/// the question under `prompt`, so both spellings are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomQueryParams {
    pub query: Option<String>,
    pub prompt: Option<String>,
}

impl CustomQueryParams {
    /// The effective question, falling back to a generic check-in.
    pub fn question(&self) -> &str {
        self.query
            .as_deref()
            .filter(|q| !q.is_empty())
            .or(self.prompt.as_deref().filter(|p| !p.is_empty()))
            .unwrap_or("How is my truck doing?")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardParams {
    pub prompt: Option<String>,
}

impl DashboardParams {
    pub fn prompt_or_default(&self) -> &str {
        self.prompt
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or("general monitoring")
    }
}

/// Output format for drive exports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Json => "application/json",
        }
    }

    pub fn as_str(self) -> &'static str {
        self.extension()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportParams {
    pub drive_ids: Vec<String>,
    pub format: ExportFormat,
}

// ---------------------------------------------------------------------------
// The tagged union
// ---------------------------------------------------------------------------

/// A fully parsed job request.
#[derive(Debug, Clone, PartialEq)]
pub enum JobRequest {
    RangeAnalysis(RangeAnalysisParams),
    PredictiveMaintenance,
    CustomQuery(CustomQueryParams),
    DashboardGeneration(DashboardParams),
    Export(ExportParams),
}

impl JobRequest {
    /// Parse a type string and raw parameter object. An absent or null
    /// parameter bag reads as `{}`; an unrecognized type or a bag that does
    /// not fit the type's parameter struct is an error.
    pub fn parse(job_type: &str, params: Option<&JsonValue>) -> Result<Self, CoreError> {
        let params = match params {
            None | Some(JsonValue::Null) => JsonValue::Object(Default::default()),
            Some(value) => value.clone(),
        };

        let invalid = |err: serde_json::Error| CoreError::InvalidJobParams {
            job_type: job_type.to_string(),
            message: err.to_string(),
        };

        match job_type {
            TYPE_RANGE_ANALYSIS => Ok(Self::RangeAnalysis(
                serde_json::from_value(params).map_err(invalid)?,
            )),
            TYPE_PREDICTIVE_MAINTENANCE => Ok(Self::PredictiveMaintenance),
            TYPE_CUSTOM_QUERY => Ok(Self::CustomQuery(
                serde_json::from_value(params).map_err(invalid)?,
            )),
            TYPE_DASHBOARD_GENERATION => Ok(Self::DashboardGeneration(
                serde_json::from_value(params).map_err(invalid)?,
            )),
            TYPE_EXPORT => Ok(Self::Export(
                serde_json::from_value(params).map_err(invalid)?,
            )),
            other => Err(CoreError::UnknownJobType(other.to_string())),
        }
    }

    pub fn job_type(&self) -> &'static str {
        match self {
            Self::RangeAnalysis(_) => TYPE_RANGE_ANALYSIS,
            Self::PredictiveMaintenance => TYPE_PREDICTIVE_MAINTENANCE,
            Self::CustomQuery(_) => TYPE_CUSTOM_QUERY,
            Self::DashboardGeneration(_) => TYPE_DASHBOARD_GENERATION,
            Self::Export(_) => TYPE_EXPORT,
        }
    }
}
