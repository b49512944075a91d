//! Repository for the `drives` table.

use driveline_core::docs::{DriveDoc, STATUS_ANALYSIS_COMPLETE};
use driveline_core::types::Timestamp;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::drive::{Drive, DriveAnalysis};

/// Column list for `drives` queries.
const COLUMNS: &str = "\
    id, user_id, vehicle_id, start_time, duration_seconds, distance_miles, \
    average_mpg, max_boost_psi, max_egt_f, max_trans_temp_f, \
    dpf_regen_occurred, datapoint_count, sensor_list, parameter_stats, \
    start_lat, start_lng, end_lat, end_lng, \
    timeseries_uploaded, timeseries_path, \
    ai_summary, ai_anomalies, ai_health_score, ai_recommendations, \
    auto_tags, ai_analyzed_at, ai_error, \
    route_id, route_name, parquet_path, parquet_error, \
    status, created_at, updated_at";

/// Provides lookups and pipeline writes for drives.
pub struct DriveRepo;

impl DriveRepo {
    /// Insert or replace the client-owned fields of a synced drive
    /// document. Analyzer, route and parquet columns are left untouched
    /// on conflict; those go through the dedicated setters below.
    pub async fn upsert(
        pool: &PgPool,
        user_id: &str,
        vehicle_id: &str,
        id: &str,
        doc: &DriveDoc,
    ) -> Result<Drive, sqlx::Error> {
        let query = format!(
            "INSERT INTO drives \
                 (id, user_id, vehicle_id, start_time, duration_seconds, distance_miles, \
                  average_mpg, max_boost_psi, max_egt_f, max_trans_temp_f, \
                  dpf_regen_occurred, datapoint_count, sensor_list, parameter_stats, \
                  start_lat, start_lng, end_lat, end_lng, \
                  timeseries_uploaded, timeseries_path, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, \
                     $15, $16, $17, $18, $19, $20, $21) \
             ON CONFLICT (user_id, vehicle_id, id) DO UPDATE SET \
                 start_time = EXCLUDED.start_time, \
                 duration_seconds = EXCLUDED.duration_seconds, \
                 distance_miles = EXCLUDED.distance_miles, \
                 average_mpg = EXCLUDED.average_mpg, \
                 max_boost_psi = EXCLUDED.max_boost_psi, \
                 max_egt_f = EXCLUDED.max_egt_f, \
                 max_trans_temp_f = EXCLUDED.max_trans_temp_f, \
                 dpf_regen_occurred = EXCLUDED.dpf_regen_occurred, \
                 datapoint_count = EXCLUDED.datapoint_count, \
                 sensor_list = EXCLUDED.sensor_list, \
                 parameter_stats = EXCLUDED.parameter_stats, \
                 start_lat = EXCLUDED.start_lat, \
                 start_lng = EXCLUDED.start_lng, \
                 end_lat = EXCLUDED.end_lat, \
                 end_lng = EXCLUDED.end_lng, \
                 timeseries_uploaded = EXCLUDED.timeseries_uploaded, \
                 timeseries_path = EXCLUDED.timeseries_path, \
                 status = EXCLUDED.status, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Drive>(&query)
            .bind(id)
            .bind(user_id)
            .bind(vehicle_id)
            .bind(doc.start_time)
            .bind(doc.duration_seconds)
            .bind(doc.distance_miles)
            .bind(doc.average_mpg)
            .bind(doc.max_boost_psi)
            .bind(doc.max_egt_f)
            .bind(doc.max_trans_temp_f)
            .bind(doc.dpf_regen_occurred)
            .bind(doc.datapoint_count)
            .bind(&doc.sensor_list)
            .bind(Json(&doc.parameter_stats))
            .bind(doc.start_lat)
            .bind(doc.start_lng)
            .bind(doc.end_lat)
            .bind(doc.end_lng)
            .bind(doc.uploaded())
            .bind(&doc.timeseries_path)
            .bind(&doc.status)
            .fetch_one(pool)
            .await
    }

    /// Fetch a single drive.
    pub async fn find(
        pool: &PgPool,
        user_id: &str,
        vehicle_id: &str,
        id: &str,
    ) -> Result<Option<Drive>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM drives \
             WHERE user_id = $1 AND vehicle_id = $2 AND id = $3"
        );
        sqlx::query_as::<_, Drive>(&query)
            .bind(user_id)
            .bind(vehicle_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Drives for one vehicle whose start time falls in `[start, end]`,
    /// oldest first.
    pub async fn list_in_range(
        pool: &PgPool,
        user_id: &str,
        vehicle_id: &str,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<Drive>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM drives \
             WHERE user_id = $1 AND vehicle_id = $2 \
               AND start_time >= $3 AND start_time <= $4 \
             ORDER BY start_time ASC"
        );
        sqlx::query_as::<_, Drive>(&query)
            .bind(user_id)
            .bind(vehicle_id)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await
    }

    /// The vehicle's most recent drives, newest first.
    pub async fn list_recent(
        pool: &PgPool,
        user_id: &str,
        vehicle_id: &str,
        limit: i64,
    ) -> Result<Vec<Drive>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM drives \
             WHERE user_id = $1 AND vehicle_id = $2 \
             ORDER BY start_time DESC NULLS LAST \
             LIMIT $3"
        );
        sqlx::query_as::<_, Drive>(&query)
            .bind(user_id)
            .bind(vehicle_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Write the analyzer verdict and flip the drive to its analyzed
    /// status, clearing any previous analyzer error.
    pub async fn set_analysis(
        pool: &PgPool,
        user_id: &str,
        vehicle_id: &str,
        id: &str,
        analysis: &DriveAnalysis,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE drives \
             SET ai_summary = $4, ai_anomalies = $5, ai_health_score = $6, \
                 ai_recommendations = $7, auto_tags = $8, \
                 ai_analyzed_at = NOW(), ai_error = NULL, status = $9, \
                 updated_at = NOW() \
             WHERE user_id = $1 AND vehicle_id = $2 AND id = $3",
        )
        .bind(user_id)
        .bind(vehicle_id)
        .bind(id)
        .bind(&analysis.summary)
        .bind(&analysis.anomalies)
        .bind(analysis.health_score)
        .bind(&analysis.recommendations)
        .bind(&analysis.auto_tags)
        .bind(STATUS_ANALYSIS_COMPLETE)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record an analyzer failure without touching the drive's status.
    /// `aiSummary` stays absent, so a redelivered transition may retry.
    pub async fn set_analysis_error(
        pool: &PgPool,
        user_id: &str,
        vehicle_id: &str,
        id: &str,
        error: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE drives \
             SET ai_error = $4, ai_analyzed_at = NOW(), updated_at = NOW() \
             WHERE user_id = $1 AND vehicle_id = $2 AND id = $3",
        )
        .bind(user_id)
        .bind(vehicle_id)
        .bind(id)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record where the columnar copy of the drive landed.
    pub async fn set_parquet_path(
        pool: &PgPool,
        user_id: &str,
        vehicle_id: &str,
        id: &str,
        path: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE drives \
             SET parquet_path = $4, parquet_error = NULL, updated_at = NOW() \
             WHERE user_id = $1 AND vehicle_id = $2 AND id = $3",
        )
        .bind(user_id)
        .bind(vehicle_id)
        .bind(id)
        .bind(path)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record a columnar conversion failure.
    pub async fn set_parquet_error(
        pool: &PgPool,
        user_id: &str,
        vehicle_id: &str,
        id: &str,
        error: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE drives SET parquet_error = $4, updated_at = NOW() \
             WHERE user_id = $1 AND vehicle_id = $2 AND id = $3",
        )
        .bind(user_id)
        .bind(vehicle_id)
        .bind(id)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }
}
