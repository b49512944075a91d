//! Column-oriented timeseries payloads.
//!
//! Vehicle clients upload one gzip-compressed JSON blob per drive: a row
//! count plus a map from parameter name to a dense value array, with a
//! parallel `timestamp` column of epoch milliseconds. This module decodes
//! the blob and expands it into rows for export.

use std::collections::BTreeMap;
use std::io::Read;

use flate2::read::GzDecoder;

use crate::CoreError;

/// Column name carrying epoch-millisecond timestamps.
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Decoded column-oriented payload. Missing `count` or `columns` read as
/// empty rather than failing, matching what lenient clients produce.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct TimeseriesPayload {
    pub count: usize,
    pub columns: BTreeMap<String, Vec<Option<f64>>>,
}

/// One expanded row: the timestamp plus every sensor value present at that
/// index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeseriesRow {
    pub timestamp: i64,
    pub values: BTreeMap<String, f64>,
}

/// Gunzip and parse a raw payload blob.
pub fn decode_payload(bytes: &[u8]) -> Result<TimeseriesPayload, CoreError> {
    let mut json = String::new();
    GzDecoder::new(bytes).read_to_string(&mut json)?;
    Ok(serde_json::from_str(&json)?)
}

impl TimeseriesPayload {
    /// Timestamp at `index`, defaulting to 0 when the column is short or the
    /// entry is null. Timestamps are epoch milliseconds, well inside f64's
    /// exact-integer range.
    pub fn timestamp_at(&self, index: usize) -> i64 {
        self.columns
            .get(TIMESTAMP_COLUMN)
            .and_then(|col| col.get(index).copied().flatten())
            .map(|ts| ts as i64)
            .unwrap_or(0)
    }

    /// Expand the columns into one row per index in `[0, count)`. A sensor
    /// appears in a row only when its array reaches that index with a
    /// non-null value; the timestamp column itself is not repeated as a
    /// sensor.
    pub fn rows(&self) -> impl Iterator<Item = TimeseriesRow> + '_ {
        (0..self.count).map(move |i| {
            let mut values = BTreeMap::new();
            for (key, col) in &self.columns {
                if key == TIMESTAMP_COLUMN {
                    continue;
                }
                if let Some(value) = col.get(i).copied().flatten() {
                    values.insert(key.clone(), value);
                }
            }
            TimeseriesRow {
                timestamp: self.timestamp_at(i),
                values,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;

    fn gzip(json: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(json.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn decodes_gzipped_columns() {
        let blob = gzip(
            r#"{"count": 2, "columns": {"timestamp": [1700000000000, 1700000001000], "rpm": [800.0, 1200.0]}}"#,
        );
        let payload = decode_payload(&blob).unwrap();

        assert_eq!(payload.count, 2);
        assert_eq!(payload.timestamp_at(0), 1_700_000_000_000);
        assert_eq!(payload.columns["rpm"][1], Some(1200.0));
    }

    #[test]
    fn missing_fields_read_as_empty() {
        let payload = decode_payload(&gzip("{}")).unwrap();
        assert_eq!(payload.count, 0);
        assert!(payload.columns.is_empty());
        assert_eq!(payload.rows().count(), 0);
    }

    #[test]
    fn corrupt_gzip_is_an_error() {
        assert!(decode_payload(b"not gzip at all").is_err());
    }

    #[test]
    fn rows_skip_null_and_short_columns() {
        let blob = gzip(
            r#"{
                "count": 3,
                "columns": {
                    "timestamp": [1000, 2000, 3000],
                    "rpm": [800.0, null, 950.0],
                    "boostPressure": [12.5]
                }
            }"#,
        );
        let payload = decode_payload(&blob).unwrap();
        let rows: Vec<TimeseriesRow> = payload.rows().collect();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].timestamp, 1000);
        assert_eq!(rows[0].values["rpm"], 800.0);
        assert_eq!(rows[0].values["boostPressure"], 12.5);
        // Null entry and exhausted column both drop out of the row.
        assert!(!rows[1].values.contains_key("rpm"));
        assert!(!rows[1].values.contains_key("boostPressure"));
        assert_eq!(rows[2].values["rpm"], 950.0);
    }

    #[test]
    fn short_timestamp_column_defaults_to_zero() {
        let blob = gzip(r#"{"count": 2, "columns": {"timestamp": [1000], "rpm": [1.0, 2.0]}}"#);
        let payload = decode_payload(&blob).unwrap();
        let rows: Vec<TimeseriesRow> = payload.rows().collect();

        assert_eq!(rows[1].timestamp, 0);
        assert_eq!(rows[1].values["rpm"], 2.0);
    }

    #[test]
    fn timestamp_is_not_repeated_as_a_sensor() {
        let blob = gzip(r#"{"count": 1, "columns": {"timestamp": [1000], "rpm": [700.0]}}"#);
        let payload = decode_payload(&blob).unwrap();
        let row = payload.rows().next().unwrap();

        assert!(!row.values.contains_key(TIMESTAMP_COLUMN));
        assert_eq!(row.values.len(), 1);
    }
}
