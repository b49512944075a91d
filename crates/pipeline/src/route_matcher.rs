//! Geohash route matching.
//!
//! Keys each drive by the precision-5 geohash cells of its GPS endpoints
//! and folds it into the matching route, creating `Route #N` on first
//! sight. The transactional find-or-create and aggregate fold live in
//! [`RouteRepo::match_drive`]; this component only prepares the input.

use driveline_core::docs::DriveDoc;
use driveline_core::geohash::{self, ROUTE_PRECISION};
use driveline_db::models::route::RouteMatch;
use driveline_db::repositories::RouteRepo;
use driveline_db::DbPool;

use crate::error::PipelineError;

/// Assigns each freshly uploaded drive to a route.
pub struct RouteMatcher {
    pool: DbPool,
}

impl RouteMatcher {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Fold one drive into its route. A drive missing either GPS endpoint
    /// is skipped without touching the database.
    pub async fn match_drive(
        &self,
        user_id: &str,
        vehicle_id: &str,
        drive_id: &str,
        drive: &DriveDoc,
    ) -> Result<(), PipelineError> {
        let Some(endpoints) = drive.endpoints() else {
            tracing::debug!(user_id, vehicle_id, drive_id, "Drive has no GPS endpoints, skipping route match");
            return Ok(());
        };

        let input = RouteMatch {
            user_id: user_id.to_string(),
            vehicle_id: vehicle_id.to_string(),
            drive_id: drive_id.to_string(),
            start_geohash: geohash::encode(
                endpoints.start_lat,
                endpoints.start_lng,
                ROUTE_PRECISION,
            ),
            end_geohash: geohash::encode(endpoints.end_lat, endpoints.end_lng, ROUTE_PRECISION),
            endpoints,
            metrics: drive.route_metrics(),
            started_at: drive.start_time,
        };

        let route = RouteRepo::match_drive(&self.pool, &input).await?;
        tracing::info!(
            user_id,
            vehicle_id,
            drive_id,
            route_id = %route.id,
            route_name = %route.name,
            drive_count = route.drive_count,
            "Drive matched to route"
        );
        Ok(())
    }
}
