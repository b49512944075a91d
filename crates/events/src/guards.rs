//! Guard predicates deciding which pipeline components a transition fires.
//!
//! Pure functions over the two document snapshots. Each drive-side guard
//! requires the upload flag to have just flipped true and its component's
//! output marker to still be absent, so redelivery of an already handled
//! transition is a no-op.

use driveline_core::docs::{DriveDoc, VehicleDoc};

/// True at the moment the raw timeseries upload finished: the flag is set
/// now and was not set before. A missing before-snapshot (creation) counts
/// as not uploaded.
pub fn upload_completed(before: Option<&DriveDoc>, after: &DriveDoc) -> bool {
    !before.map_or(false, |doc| doc.uploaded()) && after.uploaded()
}

/// The analyzer runs on fresh uploads it has not yet summarised.
pub fn needs_analysis(before: Option<&DriveDoc>, after: &DriveDoc) -> bool {
    upload_completed(before, after) && after.ai_summary.is_none()
}

/// The route matcher runs on fresh uploads not yet assigned to a route.
pub fn needs_route_match(before: Option<&DriveDoc>, after: &DriveDoc) -> bool {
    upload_completed(before, after) && after.route_id.is_none()
}

/// The columnar converter runs on fresh uploads without a parquet copy.
pub fn needs_columnar(before: Option<&DriveDoc>, after: &DriveDoc) -> bool {
    upload_completed(before, after) && after.parquet_path.is_none()
}

/// The VIN decoder runs once per vehicle creation: a VIN is present and no
/// decode attempt, successful or failed, has been recorded yet.
pub fn needs_vin_decode(before: Option<&VehicleDoc>, after: &VehicleDoc) -> bool {
    before.is_none()
        && after.vin.as_deref().map_or(false, |vin| !vin.is_empty())
        && after.vin_decoded_at.is_none()
        && after.vin_error.is_none()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
