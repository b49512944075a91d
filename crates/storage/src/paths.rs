//! Deterministic blob keys.
//!
//! The key layout is part of the client contract: the mobile app
//! uploads timeseries payloads under the drive's key before flipping
//! `timeseriesUploaded`, and download links for Parquet and export
//! artifacts point back at the keys recorded on the owning rows.

/// Conventional key of a drive's raw timeseries payload.
///
/// Drives may carry an explicit `timeseriesPath` that overrides this;
/// the convention is the fallback for clients that upload without
/// recording one.
pub fn timeseries_key(user_id: &str, vehicle_id: &str, drive_id: &str) -> String {
    format!("drives/{user_id}/{vehicle_id}/{drive_id}/timeseries.json.gz")
}

/// Key of the columnar (Parquet) rendition of a drive.
pub fn parquet_key(user_id: &str, vehicle_id: &str, drive_id: &str) -> String {
    format!("parquet/{user_id}/{vehicle_id}/{drive_id}.parquet")
}

/// Key of a finished export artifact.
pub fn export_key(user_id: &str, vehicle_id: &str, job_id: &str, extension: &str) -> String {
    format!("exports/{user_id}/{vehicle_id}/{job_id}.{extension}")
}

// --- Tests ---

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_follow_the_client_layout() {
        assert_eq!(
            timeseries_key("u1", "v1", "d1"),
            "drives/u1/v1/d1/timeseries.json.gz"
        );
        assert_eq!(parquet_key("u1", "v1", "d1"), "parquet/u1/v1/d1.parquet");
        assert_eq!(export_key("u1", "v1", "job-7", "csv"), "exports/u1/v1/job-7.csv");
    }
}
