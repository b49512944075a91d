//! Prompt builders for the analysis oracle.
//!
//! Every prompt opens with the same system context and ends with the JSON
//! shape the model must answer in. Numeric fields render only when nonzero
//! so sparse drive docs produce short, readable summaries instead of rows
//! of zeros.

use crate::docs::{DriveDoc, MaintenanceEntry, VehicleDoc};
use crate::jobs::{CustomQueryParams, RangeAnalysisParams};

const SYSTEM_CONTEXT: &str = "You are an expert diesel engine analyst specialising in
the 6.7L Cummins turbo-diesel (2019-2026 Ram 2500/3500). You analyse OBD2 and
J1939 sensor data to detect anomalies, predict maintenance needs, and provide
clear recommendations. Always respond in valid JSON.";

const DRIVE_TAG_LIST: &str = r#"- "towing" (high sustained load >60%, low speed, high EGT)
- "highway" (avg speed >45 mph, low throttle variance)
- "city" (avg speed <35 mph, high idle %, frequent speed changes)
- "mountain" (sustained high load with altitude/GPS changes)
- "cold_start" (coolant temp <140F at drive start)
- "dpf_regen" (DPF regen detected during drive)
- "hard_driving" (frequent >80% throttle, high RPM variance)
- "efficient" (MPG in top 20% for this vehicle's baseline)"#;

const DRIVE_ANALYSIS_SHAPE: &str = r#"{
  "summary": "2-3 sentence plain-English summary of the drive",
  "anomalies": ["list of any anomalous readings or patterns"],
  "healthScore": 0-100,
  "recommendations": ["actionable recommendations if any"],
  "autoTags": ["tag1", "tag2"]
}"#;

const RANGE_ANALYSIS_SHAPE: &str = r#"{
  "summary": "Overall trend summary",
  "trends": ["identified trends"],
  "concerns": ["any concerning patterns"],
  "recommendations": ["actionable recommendations"],
  "healthScore": 0-100
}"#;

const MAINTENANCE_SHAPE: &str = r#"{
  "predictions": [
    {
      "type": "maintenance type (e.g. oil_change, fuel_filter, def_service)",
      "urgency": "low|medium|high|critical",
      "estimatedDate": "YYYY-MM-DD",
      "estimatedMiles": 0,
      "confidence": 0.0-1.0,
      "reasoning": "why this is predicted"
    }
  ],
  "summary": "overall maintenance outlook"
}"#;

const CUSTOM_QUERY_SHAPE: &str = r#"{
  "answer": "detailed answer to the user's question",
  "confidence": 0.0-1.0,
  "relatedMetrics": ["relevant sensor names"],
  "recommendations": ["if applicable"]
}"#;

const DASHBOARD_SHAPE: &str = r#"{
  "name": "dashboard name",
  "description": "what this dashboard monitors",
  "widgets": [
    {
      "type": "gauge|line_chart|stat_card|bar_chart",
      "title": "widget title",
      "parameter": "parameter_name",
      "position": {"row": 0, "col": 0},
      "size": {"rows": 1, "cols": 1},
      "thresholds": {"warning": 0, "critical": 0}
    }
  ]
}"#;

const BASELINE_SHAPE: &str = r#"{
  "baselines": {
    "parameterName": {"low": 0, "high": 0, "typical": 0},
    ...
  },
  "notes": "any observations about this vehicle's patterns"
}"#;

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// A nonzero value rendered for a prompt, or `None`. Zero reads as "not
/// recorded" in drive docs, so it is treated like absence.
fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

fn engine(vehicle: &VehicleDoc) -> &str {
    vehicle
        .engine
        .as_deref()
        .filter(|e| !e.is_empty())
        .unwrap_or("6.7L Cummins")
}

fn odometer(vehicle: &VehicleDoc) -> String {
    match nonzero(vehicle.current_odometer) {
        Some(miles) => miles.to_string(),
        None => "unknown".to_string(),
    }
}

/// One-line digest of a drive, listing only the fields it actually carries.
pub fn drive_summary(drive: &DriveDoc) -> String {
    let mut parts = Vec::new();
    if let Some(start) = drive.start_time {
        parts.push(format!("start={}", start.to_rfc3339()));
    }
    if let Some(duration) = nonzero(drive.duration_seconds) {
        parts.push(format!("duration={duration}s"));
    }
    if let Some(distance) = nonzero(drive.distance_miles) {
        parts.push(format!("dist={distance}mi"));
    }
    if let Some(mpg) = nonzero(drive.average_mpg) {
        parts.push(format!("mpg={mpg}"));
    }
    if let Some(boost) = nonzero(drive.max_boost_psi) {
        parts.push(format!("maxBoost={boost}psi"));
    }
    if let Some(egt) = nonzero(drive.max_egt_f) {
        parts.push(format!("maxEGT={egt}F"));
    }
    if drive.dpf_regen_occurred == Some(true) {
        parts.push("DPF_REGEN".to_string());
    }
    parts.join(", ")
}

fn drive_lines(drives: &[DriveDoc], limit: usize) -> String {
    drives
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, drive)| format!("  {}. {}", i + 1, drive_summary(drive)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn maintenance_lines(entries: &[MaintenanceEntry], limit: usize) -> String {
    entries
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, entry)| {
            let date = entry.date.as_deref().unwrap_or("?");
            let kind = entry
                .record_type
                .as_deref()
                .filter(|t| !t.is_empty())
                .or(entry.description.as_deref().filter(|d| !d.is_empty()))
                .unwrap_or("maintenance");
            let cost = match nonzero(entry.cost) {
                Some(cost) => format!("${cost}"),
                None => "no cost".to_string(),
            };
            format!("  {}. {date}: {kind} ({cost})", i + 1)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_stats(stats: &[(String, String)]) -> String {
    stats
        .iter()
        .map(|(key, value)| format!("  {key}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn or_none(lines: String) -> String {
    if lines.is_empty() {
        "  None".to_string()
    } else {
        lines
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Prompt for the per-drive analysis written back onto the drive doc.
pub fn drive_analysis(vehicle: &VehicleDoc, drive_id: &str, drive: &DriveDoc) -> String {
    let avg_mpg = match nonzero(drive.average_mpg) {
        Some(mpg) => mpg.to_string(),
        None => "N/A".to_string(),
    };
    format!(
        "{SYSTEM_CONTEXT}

Vehicle: {vehicle_desc}
Engine: {engine}
Odometer: {odometer} mi

Drive session {drive_id}:
  Duration: {duration}s
  Distance: {distance} mi
  Avg MPG: {avg_mpg}
  Datapoints: {datapoints}
  Sensors: {sensors}

Parameter Statistics:
{stats}

Also classify this drive with applicable tags from this list:
{DRIVE_TAG_LIST}

Analyse this drive and respond with JSON:
{DRIVE_ANALYSIS_SHAPE}",
        vehicle_desc = vehicle.description(),
        engine = engine(vehicle),
        odometer = odometer(vehicle),
        duration = drive.duration_seconds.unwrap_or(0.0),
        distance = drive.distance_miles.unwrap_or(0.0),
        datapoints = drive.datapoint_count.unwrap_or(0),
        sensors = drive.sensor_list.join(", "),
        stats = format_stats(&drive.flat_stats()),
    )
}

/// Prompt for a cross-drive trend analysis over a date window.
pub fn range_analysis(
    vehicle: &VehicleDoc,
    drives: &[DriveDoc],
    params: &RangeAnalysisParams,
) -> String {
    format!(
        "{SYSTEM_CONTEXT}

Vehicle: {vehicle_desc}
Engine: {engine}

Analyse {count} drives from {start} to {end}:
{lines}

Focus areas: {focus}

Respond with JSON:
{RANGE_ANALYSIS_SHAPE}",
        vehicle_desc = vehicle.description(),
        engine = engine(vehicle),
        count = drives.len(),
        start = params.start_date.to_rfc3339(),
        end = params.end_date.to_rfc3339(),
        lines = drive_lines(drives, drives.len()),
        focus = params
            .focus
            .as_deref()
            .filter(|f| !f.is_empty())
            .unwrap_or("general trends, fuel economy, engine health"),
    )
}

/// Prompt for maintenance predictions from recent drives plus history.
/// Both lists are capped at twenty lines to bound prompt size.
pub fn maintenance_prediction(
    vehicle: &VehicleDoc,
    drives: &[DriveDoc],
    maintenance: &[MaintenanceEntry],
) -> String {
    format!(
        "{SYSTEM_CONTEXT}

Vehicle: {vehicle_desc}
Engine: {engine}
Odometer: {odometer} mi

Recent drives:
{drives}

Maintenance history:
{maintenance}

Based on driving patterns and maintenance history, predict upcoming maintenance needs.
Respond with JSON:
{MAINTENANCE_SHAPE}",
        vehicle_desc = vehicle.description(),
        engine = engine(vehicle),
        odometer = odometer(vehicle),
        drives = or_none(drive_lines(drives, 20)),
        maintenance = or_none(maintenance_lines(maintenance, 20)),
    )
}

/// Prompt for a free-form user question over recent drives.
pub fn custom_query(
    vehicle: &VehicleDoc,
    drives: &[DriveDoc],
    params: &CustomQueryParams,
) -> String {
    format!(
        "{SYSTEM_CONTEXT}

Vehicle: {vehicle_desc}
Engine: {engine}

Recent drives:
{lines}

User question: \"{question}\"

Respond with JSON:
{CUSTOM_QUERY_SHAPE}",
        vehicle_desc = vehicle.description(),
        engine = engine(vehicle),
        lines = drive_lines(drives, 15),
        question = params.question(),
    )
}

/// Prompt asking for a dashboard layout from a natural-language request.
pub fn dashboard(vehicle: &VehicleDoc, prompt: &str) -> String {
    format!(
        "{SYSTEM_CONTEXT}

Vehicle: {vehicle_desc}
Engine: {engine}

The user wants a custom dashboard: \"{prompt}\"

Generate a dashboard configuration. Available widget types:
- gauge: circular gauge for a single parameter
- line_chart: time-series line chart
- stat_card: single big number with label
- bar_chart: bar chart comparison

Available parameters: rpm, speed, coolantTemp, boostPressure, egt, egtObd2,
oilTemp, oilPressure, engineLoad, transTemp, turboSpeed, fuelRate, fuelLevel,
batteryVoltage, dpfSootLoad, dpfTemp, defLevel, railPressure, ambientTemp,
instantMPG, estimatedGear, estimatedHP, estimatedTorque, accelPedalD,
demandTorque, actualTorque, commandedEgr, commandedThrottle, boostPressureCtrl,
vgtControlObd, turboInletPressure, turboInletTemp, chargeAirTemp,
intercoolerOutletTemp, exhaustBackpressure.

Respond with JSON:
{DASHBOARD_SHAPE}",
        vehicle_desc = vehicle.description(),
        engine = engine(vehicle),
    )
}

/// Prompt computing per-parameter normal operating ranges from the last
/// thirty drives.
pub fn baseline(vehicle: &VehicleDoc, drives: &[DriveDoc]) -> String {
    format!(
        "{SYSTEM_CONTEXT}

Vehicle: {vehicle_desc}
Engine: {engine}
Odometer: {odometer} mi

Last 30 days of drives:
{lines}

Compute baseline ranges for this vehicle's normal operating parameters.
These baselines will be used to detect anomalies in future drives.

Respond with JSON:
{BASELINE_SHAPE}",
        vehicle_desc = vehicle.description(),
        engine = engine(vehicle),
        odometer = odometer(vehicle),
        lines = drive_lines(drives, 30),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};

    fn vehicle() -> VehicleDoc {
        VehicleDoc {
            year: Some(2022),
            make: Some("Ram".to_string()),
            model: Some("2500".to_string()),
            current_odometer: Some(48_200.0),
            ..Default::default()
        }
    }

    fn drive(mpg: Option<f64>) -> DriveDoc {
        DriveDoc {
            duration_seconds: Some(1800.0),
            distance_miles: Some(22.4),
            average_mpg: mpg,
            max_egt_f: Some(1150.0),
            ..Default::default()
        }
    }

    // -- drive summary --

    #[test]
    fn summary_omits_zero_and_absent_fields() {
        let mut doc = drive(Some(17.2));
        doc.max_boost_psi = Some(0.0);

        let summary = drive_summary(&doc);
        assert_eq!(summary, "duration=1800s, dist=22.4mi, mpg=17.2, maxEGT=1150F");
    }

    #[test]
    fn summary_flags_dpf_regen() {
        let doc = DriveDoc {
            dpf_regen_occurred: Some(true),
            ..Default::default()
        };
        assert_eq!(drive_summary(&doc), "DPF_REGEN");
    }

    // -- builders --

    #[test]
    fn drive_analysis_carries_stats_and_tag_list() {
        let prompt = drive_analysis(&vehicle(), "d-42", &drive(None));

        assert!(prompt.starts_with("You are an expert diesel engine analyst"));
        assert!(prompt.contains("Vehicle: 2022 Ram 2500"));
        assert!(prompt.contains("Engine: 6.7L Cummins"));
        assert!(prompt.contains("Odometer: 48200 mi"));
        assert!(prompt.contains("Drive session d-42:"));
        // Zero MPG and absent MPG both render as N/A.
        assert!(prompt.contains("Avg MPG: N/A"));
        assert!(prompt.contains("  durationSeconds: 1800"));
        assert!(prompt.contains("- \"towing\""));
        assert!(prompt.contains("\"autoTags\""));
    }

    #[test]
    fn range_analysis_numbers_the_drives() {
        let params = RangeAnalysisParams {
            start_date: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
            focus: None,
        };
        let drives = vec![drive(Some(18.0)), drive(Some(19.5))];
        let prompt = range_analysis(&vehicle(), &drives, &params);

        assert!(prompt.contains("Analyse 2 drives from 2026-01-01T00:00:00+00:00"));
        assert!(prompt.contains("  1. duration=1800s"));
        assert!(prompt.contains("  2. duration=1800s"));
        assert!(prompt.contains("Focus areas: general trends, fuel economy, engine health"));
    }

    #[test]
    fn maintenance_lines_fall_back_through_kind_and_cost() {
        let entries = vec![
            MaintenanceEntry {
                date: Some("2026-01-15".to_string()),
                record_type: Some("oil_change".to_string()),
                cost: Some(89.5),
                ..Default::default()
            },
            MaintenanceEntry {
                description: Some("replaced DEF injector".to_string()),
                ..Default::default()
            },
        ];
        let prompt = maintenance_prediction(&vehicle(), &[], &entries);

        assert!(prompt.contains("  1. 2026-01-15: oil_change ($89.5)"));
        assert!(prompt.contains("  2. ?: replaced DEF injector (no cost)"));
        // No drives at all still renders a section.
        assert!(prompt.contains("Recent drives:\n  None"));
    }

    #[test]
    fn custom_query_quotes_the_question() {
        let params = CustomQueryParams {
            query: Some("Why is my EGT spiking?".to_string()),
            prompt: None,
        };
        let prompt = custom_query(&vehicle(), &[drive(Some(18.0))], &params);
        assert!(prompt.contains("User question: \"Why is my EGT spiking?\""));
    }

    #[test]
    fn prompt_drive_lists_are_capped() {
        let drives: Vec<DriveDoc> = (0..40).map(|_| drive(Some(18.0))).collect();

        let maintenance = maintenance_prediction(&vehicle(), &drives, &[]);
        assert!(maintenance.contains("  20. "));
        assert!(!maintenance.contains("  21. "));

        let baseline = baseline(&vehicle(), &drives);
        assert!(baseline.contains("  30. "));
        assert!(!baseline.contains("  31. "));
    }

    #[test]
    fn dashboard_embeds_the_request_and_widget_vocabulary() {
        let prompt = dashboard(&vehicle(), "tow haul gauges");
        assert!(prompt.contains("The user wants a custom dashboard: \"tow haul gauges\""));
        assert!(prompt.contains("- gauge: circular gauge for a single parameter"));
        assert!(prompt.contains("\"thresholds\": {\"warning\": 0, \"critical\": 0}"));
    }
}
