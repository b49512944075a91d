//! Columnar (Parquet) encoding of drive timeseries.
//!
//! One file per drive, fixed schema: three identity strings embedded in
//! every row plus the timestamp and the enumerated sensor columns. Identity
//! lives in the rows rather than the path so analytical engines can query
//! across drives without partition awareness.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use parquet::format::KeyValue;

use crate::timeseries::{TimeseriesPayload, TimeseriesRow, TIMESTAMP_COLUMN};
use crate::CoreError;

/// Bumped whenever a column is added to [`SENSOR_COLUMNS`]. Written into the
/// file footer so readers can tell vintages apart.
pub const SCHEMA_VERSION: &str = "1";

const SCHEMA_VERSION_KEY: &str = "schema_version";
const ROW_GROUP_SIZE: usize = 10_000;

/// Identity columns embedded in every row.
pub const IDENTITY_COLUMNS: [&str; 3] = ["userId", "vehicleId", "driveId"];

/// Every sensor parameter the schema knows. Input columns outside this list
/// are dropped (and reported) rather than failing the conversion; adding a
/// name here requires a [`SCHEMA_VERSION`] bump.
pub const SENSOR_COLUMNS: &[&str] = &[
    // OBD2 / J1939 sensor parameters
    "rpm",
    "speed",
    "coolantTemp",
    "intakeTemp",
    "maf",
    "throttlePos",
    "boostPressure",
    "egt",
    "egt2",
    "egt3",
    "egt4",
    "transTemp",
    "oilTemp",
    "oilPressure",
    "engineLoad",
    "turboSpeed",
    "vgtPosition",
    "egrPosition",
    "dpfSootLoad",
    "dpfRegenStatus",
    "dpfDiffPressure",
    "noxPreScr",
    "noxPostScr",
    "defLevel",
    "defTemp",
    "defDosingRate",
    "defQuality",
    "railPressure",
    "crankcasePressure",
    "coolantLevel",
    "intercoolerOutletTemp",
    "exhaustBackpressure",
    "fuelRate",
    "fuelLevel",
    "batteryVoltage",
    "ambientTemp",
    "barometric",
    "odometer",
    "engineHours",
    "gearRatio",
    // Diesel-specific OBD2
    "accelPedalD",
    "demandTorque",
    "actualTorque",
    "referenceTorque",
    "commandedEgr",
    "commandedThrottle",
    "boostPressureCtrl",
    "vgtControlObd",
    "turboInletPressure",
    "turboInletTemp",
    "chargeAirTemp",
    "egtObd2",
    "dpfTemp",
    "runtimeExtended",
    // GPS
    "lat",
    "lng",
    "altitude",
    "gpsSpeed",
    "heading",
    // Calculated
    "instantMPG",
    "estimatedGear",
    "estimatedHP",
    "estimatedTorque",
];

/// Who a file belongs to. Repeated in every row.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveIdentity {
    pub user_id: String,
    pub vehicle_id: String,
    pub drive_id: String,
}

/// Result of an encode: the serialized file plus what got left behind.
#[derive(Debug, Clone)]
pub struct EncodedColumnar {
    pub bytes: Vec<u8>,
    pub row_count: usize,
    /// Input columns absent from [`SENSOR_COLUMNS`], in name order. Callers
    /// are expected to log these.
    pub dropped_columns: Vec<String>,
}

/// The fixed file schema: identity strings, required timestamp, then every
/// sensor column as nullable Float64.
pub fn file_schema() -> Arc<Schema> {
    let mut fields = vec![
        Field::new("userId", DataType::Utf8, true),
        Field::new("vehicleId", DataType::Utf8, true),
        Field::new("driveId", DataType::Utf8, true),
        Field::new(TIMESTAMP_COLUMN, DataType::Int64, false),
    ];
    for name in SENSOR_COLUMNS {
        fields.push(Field::new(*name, DataType::Float64, true));
    }
    Arc::new(Schema::new(fields))
}

/// Encode a payload into a Snappy-compressed Parquet file in memory.
pub fn encode(
    payload: &TimeseriesPayload,
    identity: &DriveIdentity,
) -> Result<EncodedColumnar, CoreError> {
    let count = payload.count;
    let schema = file_schema();

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());
    for id in [&identity.user_id, &identity.vehicle_id, &identity.drive_id] {
        columns.push(Arc::new(StringArray::from(vec![id.as_str(); count])));
    }
    columns.push(Arc::new(Int64Array::from_iter_values(
        (0..count).map(|i| payload.timestamp_at(i)),
    )));
    for name in SENSOR_COLUMNS {
        let array: Float64Array = match payload.columns.get(*name) {
            Some(col) => (0..count).map(|i| col.get(i).copied().flatten()).collect(),
            None => (0..count).map(|_| None).collect(),
        };
        columns.push(Arc::new(array));
    }

    let dropped_columns: Vec<String> = payload
        .columns
        .keys()
        .filter(|key| key.as_str() != TIMESTAMP_COLUMN)
        .filter(|key| !SENSOR_COLUMNS.contains(&key.as_str()))
        .cloned()
        .collect();

    let batch = RecordBatch::try_new(schema.clone(), columns)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .set_max_row_group_size(ROW_GROUP_SIZE)
        .set_key_value_metadata(Some(vec![KeyValue::new(
            SCHEMA_VERSION_KEY.to_string(),
            SCHEMA_VERSION.to_string(),
        )]))
        .build();

    let mut bytes = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut bytes, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    Ok(EncodedColumnar {
        bytes,
        row_count: count,
        dropped_columns,
    })
}

/// Read an encoded file back into rows, skipping identity columns and null
/// sensor entries. Used by analytical readers and to verify conversions.
pub fn decode(bytes: Bytes) -> Result<Vec<TimeseriesRow>, CoreError> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(bytes)?.build()?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch?;
        let schema = batch.schema();

        let timestamps = batch
            .column(schema.index_of(TIMESTAMP_COLUMN)?)
            .as_any()
            .downcast_ref::<Int64Array>()
            .ok_or_else(|| CoreError::Columnar("timestamp column is not Int64".to_string()))?;

        let start = rows.len();
        for i in 0..batch.num_rows() {
            rows.push(TimeseriesRow {
                timestamp: timestamps.value(i),
                ..Default::default()
            });
        }

        for (index, field) in schema.fields().iter().enumerate() {
            let name = field.name().as_str();
            if name == TIMESTAMP_COLUMN || IDENTITY_COLUMNS.contains(&name) {
                continue;
            }
            let values = batch
                .column(index)
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| {
                    CoreError::Columnar(format!("sensor column {name} is not Float64"))
                })?;
            for i in 0..batch.num_rows() {
                if values.is_valid(i) {
                    rows[start + i].values.insert(name.to_string(), values.value(i));
                }
            }
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    fn payload(count: usize, columns: &[(&str, Vec<Option<f64>>)]) -> TimeseriesPayload {
        TimeseriesPayload {
            count,
            columns: columns
                .iter()
                .map(|(name, col)| (name.to_string(), col.clone()))
                .collect(),
        }
    }

    fn identity() -> DriveIdentity {
        DriveIdentity {
            user_id: "u-1".to_string(),
            vehicle_id: "v-1".to_string(),
            drive_id: "d-1".to_string(),
        }
    }

    #[test]
    fn encodes_sparse_columns_losslessly() {
        let payload = payload(
            3,
            &[
                ("timestamp", vec![Some(1000.0), Some(2000.0), Some(3000.0)]),
                ("boostPressure", vec![Some(12.0), None, Some(15.0)]),
                ("rpm", vec![Some(800.0), Some(900.0), Some(1000.0)]),
            ],
        );

        let encoded = encode(&payload, &identity()).unwrap();
        assert_eq!(encoded.row_count, 3);
        assert!(encoded.dropped_columns.is_empty());

        let rows = decode(Bytes::from(encoded.bytes)).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].timestamp, 1000);
        assert_eq!(rows[0].values["boostPressure"], 12.0);
        assert!(!rows[1].values.contains_key("boostPressure"));
        assert_eq!(rows[1].values["rpm"], 900.0);
        assert_eq!(rows[2].values["boostPressure"], 15.0);
    }

    #[test]
    fn unknown_columns_are_dropped_and_reported() {
        let payload = payload(
            2,
            &[
                ("timestamp", vec![Some(1.0), Some(2.0)]),
                ("rpm", vec![Some(700.0), Some(750.0)]),
                ("fluxCapacitor", vec![Some(88.0), Some(88.0)]),
            ],
        );

        let encoded = encode(&payload, &identity()).unwrap();
        assert_eq!(encoded.dropped_columns, vec!["fluxCapacitor"]);

        let rows = decode(Bytes::from(encoded.bytes)).unwrap();
        assert!(!rows[0].values.contains_key("fluxCapacitor"));
        assert_eq!(rows[0].values["rpm"], 700.0);
    }

    #[test]
    fn empty_payload_encodes_an_empty_file() {
        let encoded = encode(&TimeseriesPayload::default(), &identity()).unwrap();
        assert_eq!(encoded.row_count, 0);

        let rows = decode(Bytes::from(encoded.bytes)).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn missing_timestamps_default_to_zero() {
        let payload = payload(
            2,
            &[
                ("timestamp", vec![Some(5000.0)]),
                ("rpm", vec![Some(700.0), Some(750.0)]),
            ],
        );

        let encoded = encode(&payload, &identity()).unwrap();
        let rows = decode(Bytes::from(encoded.bytes)).unwrap();
        assert_eq!(rows[0].timestamp, 5000);
        assert_eq!(rows[1].timestamp, 0);
    }

    #[test]
    fn schema_version_lands_in_file_metadata() {
        let encoded = encode(&payload(1, &[("timestamp", vec![Some(1.0)])]), &identity()).unwrap();

        let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(encoded.bytes)).unwrap();
        let metadata = builder.metadata().file_metadata().key_value_metadata().unwrap();
        let entry = metadata
            .iter()
            .find(|kv| kv.key == SCHEMA_VERSION_KEY)
            .unwrap();
        assert_eq!(entry.value.as_deref(), Some(SCHEMA_VERSION));
    }

    #[test]
    fn identity_is_embedded_in_every_row() {
        let encoded = encode(
            &payload(2, &[("timestamp", vec![Some(1.0), Some(2.0)])]),
            &identity(),
        )
        .unwrap();

        let reader = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(encoded.bytes))
            .unwrap()
            .build()
            .unwrap();
        for batch in reader {
            let batch = batch.unwrap();
            let drive_ids = batch
                .column(batch.schema().index_of("driveId").unwrap())
                .as_any()
                .downcast_ref::<StringArray>()
                .unwrap()
                .clone();
            for i in 0..batch.num_rows() {
                assert_eq!(drive_ids.value(i), "d-1");
            }
        }
    }
}
