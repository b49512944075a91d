//! Repository for the `routes` table.
//!
//! Route matching is a single transaction: lock the candidate route row,
//! fold the drive into its aggregates (or insert a fresh route), then
//! stamp the drive with the route it landed on. There is deliberately no
//! unique constraint on the endpoint pair; the row lock serialises
//! concurrent matches against an existing route, and a lost race between
//! two first-ever matches is tolerated.

use driveline_core::aggregates::RouteAggregates;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::route::{Route, RouteMatch};

/// Column list for `routes` queries.
const COLUMNS: &str = "\
    id, user_id, vehicle_id, name, start_geohash, end_geohash, \
    start_lat, start_lng, end_lat, end_lng, \
    drive_count, avg_mpg, avg_duration_secs, avg_peak_egt, \
    avg_peak_boost, avg_peak_trans_temp, \
    best_mpg, best_mpg_drive_id, worst_mpg, worst_mpg_drive_id, \
    last_drive_at, created_at, updated_at";

/// Provides route matching and lookups.
pub struct RouteRepo;

impl RouteRepo {
    /// Match a drive against the vehicle's known routes by geohash
    /// endpoint pair, folding it into the matched route's aggregates or
    /// creating a new `Route #N`. The drive row is stamped with the
    /// route id and name in the same transaction.
    pub async fn match_drive(pool: &PgPool, input: &RouteMatch) -> Result<Route, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "SELECT {COLUMNS} FROM routes \
             WHERE user_id = $1 AND vehicle_id = $2 \
               AND start_geohash = $3 AND end_geohash = $4 \
             ORDER BY created_at ASC \
             LIMIT 1 \
             FOR UPDATE"
        );
        let existing = sqlx::query_as::<_, Route>(&query)
            .bind(&input.user_id)
            .bind(&input.vehicle_id)
            .bind(&input.start_geohash)
            .bind(&input.end_geohash)
            .fetch_optional(&mut *tx)
            .await?;

        let route = match existing {
            Some(route) => {
                let mut aggregates = route.aggregates();
                aggregates.fold_drive(&input.drive_id, input.metrics);

                let query = format!(
                    "UPDATE routes \
                     SET drive_count = $2, avg_mpg = $3, avg_duration_secs = $4, \
                         avg_peak_egt = $5, avg_peak_boost = $6, avg_peak_trans_temp = $7, \
                         best_mpg = $8, best_mpg_drive_id = $9, \
                         worst_mpg = $10, worst_mpg_drive_id = $11, \
                         last_drive_at = COALESCE($12, NOW()), updated_at = NOW() \
                     WHERE id = $1 \
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, Route>(&query)
                    .bind(&route.id)
                    .bind(aggregates.drive_count)
                    .bind(aggregates.avg_mpg)
                    .bind(aggregates.avg_duration_secs)
                    .bind(aggregates.avg_peak_egt)
                    .bind(aggregates.avg_peak_boost)
                    .bind(aggregates.avg_peak_trans_temp)
                    .bind(aggregates.best_mpg)
                    .bind(&aggregates.best_mpg_drive_id)
                    .bind(aggregates.worst_mpg)
                    .bind(&aggregates.worst_mpg_drive_id)
                    .bind(input.started_at)
                    .fetch_one(&mut *tx)
                    .await?
            }
            None => {
                let (count,): (i64,) =
                    sqlx::query_as("SELECT COUNT(*) FROM routes WHERE user_id = $1 AND vehicle_id = $2")
                        .bind(&input.user_id)
                        .bind(&input.vehicle_id)
                        .fetch_one(&mut *tx)
                        .await?;

                let aggregates = RouteAggregates::seed(&input.drive_id, input.metrics);
                let query = format!(
                    "INSERT INTO routes \
                         (id, user_id, vehicle_id, name, start_geohash, end_geohash, \
                          start_lat, start_lng, end_lat, end_lng, \
                          drive_count, avg_mpg, avg_duration_secs, avg_peak_egt, \
                          avg_peak_boost, avg_peak_trans_temp, \
                          best_mpg, best_mpg_drive_id, worst_mpg, worst_mpg_drive_id, \
                          last_drive_at) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, \
                             $14, $15, $16, $17, $18, $19, $20, COALESCE($21, NOW())) \
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, Route>(&query)
                    .bind(Uuid::new_v4().to_string())
                    .bind(&input.user_id)
                    .bind(&input.vehicle_id)
                    .bind(format!("Route #{}", count + 1))
                    .bind(&input.start_geohash)
                    .bind(&input.end_geohash)
                    .bind(input.endpoints.start_lat)
                    .bind(input.endpoints.start_lng)
                    .bind(input.endpoints.end_lat)
                    .bind(input.endpoints.end_lng)
                    .bind(aggregates.drive_count)
                    .bind(aggregates.avg_mpg)
                    .bind(aggregates.avg_duration_secs)
                    .bind(aggregates.avg_peak_egt)
                    .bind(aggregates.avg_peak_boost)
                    .bind(aggregates.avg_peak_trans_temp)
                    .bind(aggregates.best_mpg)
                    .bind(&aggregates.best_mpg_drive_id)
                    .bind(aggregates.worst_mpg)
                    .bind(&aggregates.worst_mpg_drive_id)
                    .bind(input.started_at)
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        sqlx::query(
            "UPDATE drives SET route_id = $4, route_name = $5, updated_at = NOW() \
             WHERE user_id = $1 AND vehicle_id = $2 AND id = $3",
        )
        .bind(&input.user_id)
        .bind(&input.vehicle_id)
        .bind(&input.drive_id)
        .bind(&route.id)
        .bind(&route.name)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(route)
    }

    /// Fetch a single route.
    pub async fn find(pool: &PgPool, id: &str) -> Result<Option<Route>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM routes WHERE id = $1");
        sqlx::query_as::<_, Route>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All routes of one vehicle, oldest first.
    pub async fn list_for_vehicle(
        pool: &PgPool,
        user_id: &str,
        vehicle_id: &str,
    ) -> Result<Vec<Route>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM routes \
             WHERE user_id = $1 AND vehicle_id = $2 \
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Route>(&query)
            .bind(user_id)
            .bind(vehicle_id)
            .fetch_all(pool)
            .await
    }
}
