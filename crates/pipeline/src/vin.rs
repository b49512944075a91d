//! VIN decoding against the NHTSA vPIC service.
//!
//! Runs once per vehicle creation. The service returns a flat list of
//! `{Variable, Value}` pairs; the tracked subset is written onto the
//! vehicle as `vinDecoded`, and a failed fetch lands on `vinError`.

use driveline_core::docs::{VehicleDoc, VinDecoded};
use driveline_db::repositories::VehicleRepo;
use driveline_db::DbPool;
use serde::Deserialize;

use crate::error::PipelineError;

/// Default vPIC service root.
pub const DEFAULT_VPIC_BASE_URL: &str = "https://vpic.nhtsa.dot.gov";

/// Fills in factory specs for newly created vehicles carrying a VIN.
pub struct VinDecoder {
    pool: DbPool,
    client: reqwest::Client,
    base_url: String,
}

impl VinDecoder {
    /// Create a new decoder.
    ///
    /// * `base_url` - vPIC service root without a trailing slash.
    pub fn new(pool: DbPool, base_url: String) -> Self {
        Self {
            pool,
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Decode the vehicle's VIN and persist the result. A vehicle without
    /// a VIN is skipped; a decode failure is parked on `vinError`.
    pub async fn decode(
        &self,
        user_id: &str,
        vehicle_id: &str,
        vehicle: &VehicleDoc,
    ) -> Result<(), PipelineError> {
        let Some(vin) = vehicle.vin.as_deref().filter(|vin| !vin.is_empty()) else {
            return Ok(());
        };

        match self.fetch(vin).await {
            Ok(decoded) => {
                VehicleRepo::set_vin_decoded(&self.pool, user_id, vehicle_id, &decoded).await?;
                tracing::info!(
                    user_id,
                    vehicle_id,
                    vin,
                    make = ?decoded.make,
                    model = ?decoded.model,
                    "VIN decoded"
                );
            }
            Err(err) => {
                tracing::warn!(user_id, vehicle_id, vin, error = %err, "VIN decode failed");
                VehicleRepo::set_vin_error(&self.pool, user_id, vehicle_id, &err.to_string())
                    .await?;
            }
        }
        Ok(())
    }

    async fn fetch(&self, vin: &str) -> Result<VinDecoded, PipelineError> {
        let url = format!("{}/api/vehicles/decodevin/{}?format=json", self.base_url, vin);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let payload: VpicResponse = response.json().await?;
        Ok(payload.into_decoded())
    }
}

// ---- response parsing ----

#[derive(Debug, Deserialize)]
struct VpicResponse {
    #[serde(rename = "Results", default)]
    results: Vec<VpicEntry>,
}

/// One decoded variable. Both fields are nullable in the service's JSON.
#[derive(Debug, Deserialize)]
struct VpicEntry {
    #[serde(rename = "Variable")]
    variable: Option<String>,
    #[serde(rename = "Value")]
    value: Option<String>,
}

impl VpicResponse {
    /// Pick the tracked variables out of the flat result list. Empty and
    /// whitespace-only values are dropped; later duplicates win.
    fn into_decoded(self) -> VinDecoded {
        let mut decoded = VinDecoded::default();
        for entry in self.results {
            let Some(value) = entry
                .value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
            else {
                continue;
            };
            let slot = match entry.variable.as_deref() {
                Some("Make") => &mut decoded.make,
                Some("Model") => &mut decoded.model,
                Some("Model Year") => &mut decoded.year,
                Some("Displacement (L)") => &mut decoded.engine_displacement,
                Some("Engine Number of Cylinders") => &mut decoded.engine_cylinders,
                Some("Fuel Type - Primary") => &mut decoded.fuel_type,
                Some("Drive Type") => &mut decoded.drive_type,
                Some("Body Class") => &mut decoded.body_class,
                Some("Gross Vehicle Weight Rating From") => &mut decoded.gvwr,
                Some("Transmission Style") => &mut decoded.transmission_style,
                Some("Plant City") => &mut decoded.plant,
                _ => continue,
            };
            *slot = Some(value.to_string());
        }
        decoded
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
