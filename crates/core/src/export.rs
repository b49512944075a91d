//! Row serialization for drive-data exports.
//!
//! Exports flatten one or more drives into row objects (drive id, timestamp,
//! then sensor values) and render them as CSV or pretty-printed JSON. The
//! CSV header comes from the first row; later rows may carry extra keys that
//! simply do not get a column, which mirrors how the data is consumed.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::CoreError;

/// One export row. Flattened values follow the fixed identity fields, so
/// JSON output reads `driveId`, `timestamp`, then sensors in name order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub drive_id: String,
    pub timestamp: i64,
    #[serde(flatten)]
    pub values: BTreeMap<String, JsonValue>,
}

/// Render rows as CSV. Headers are the first row's keys; a missing or null
/// value renders as the empty string; values containing a comma are wrapped
/// in double quotes. No rows renders as the empty string.
pub fn to_csv(rows: &[ExportRow]) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };

    let mut headers = vec!["driveId".to_string(), "timestamp".to_string()];
    headers.extend(first.values.keys().cloned());

    let mut lines = vec![headers.join(",")];
    for row in rows {
        let mut fields = vec![csv_field(&JsonValue::from(row.drive_id.clone()))];
        fields.push(row.timestamp.to_string());
        for key in &headers[2..] {
            let field = row
                .values
                .get(key)
                .map(csv_field)
                .unwrap_or_default();
            fields.push(field);
        }
        lines.push(fields.join(","));
    }
    lines.join("\n")
}

/// Render rows as a pretty-printed JSON array.
pub fn to_json(rows: &[ExportRow]) -> Result<String, CoreError> {
    Ok(serde_json::to_string_pretty(rows)?)
}

fn csv_field(value: &JsonValue) -> String {
    let text = match value {
        JsonValue::Null => return String::new(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    };
    if text.contains(',') {
        format!("\"{text}\"")
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(drive_id: &str, timestamp: i64, values: &[(&str, JsonValue)]) -> ExportRow {
        ExportRow {
            drive_id: drive_id.to_string(),
            timestamp,
            values: values
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    #[test]
    fn csv_of_no_rows_is_empty() {
        assert_eq!(to_csv(&[]), "");
    }

    #[test]
    fn csv_headers_come_from_the_first_row() {
        let rows = vec![
            row(
                "d-1",
                1000,
                &[("boostPressure", 12.5.into()), ("rpm", 800.0.into())],
            ),
            // Second row misses boostPressure and adds an unheadered key.
            row("d-1", 2000, &[("egt", 900.0.into()), ("rpm", 850.0.into())]),
        ];

        let csv = to_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "driveId,timestamp,boostPressure,rpm");
        assert_eq!(lines[1], "d-1,1000,12.5,800.0");
        assert_eq!(lines[2], "d-1,2000,,850.0");
    }

    #[test]
    fn csv_quotes_values_containing_commas() {
        let rows = vec![row(
            "d-1",
            1000,
            &[("note", JsonValue::from("idle, then tow"))],
        )];
        assert_eq!(to_csv(&rows).lines().nth(1).unwrap(), "d-1,1000,\"idle, then tow\"");
    }

    #[test]
    fn csv_renders_null_as_empty() {
        let rows = vec![row("d-1", 1000, &[("rpm", JsonValue::Null)])];
        assert_eq!(to_csv(&rows).lines().nth(1).unwrap(), "d-1,1000,");
    }

    #[test]
    fn json_output_is_a_pretty_array_with_identity_first() {
        let rows = vec![row("d-7", 5000, &[("rpm", 750.0.into())])];
        let json = to_json(&rows).unwrap();

        assert!(json.starts_with("[\n"));
        let parsed: JsonValue = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["driveId"], "d-7");
        assert_eq!(parsed[0]["timestamp"], 5000);
        assert_eq!(parsed[0]["rpm"], 750.0);
    }
}
