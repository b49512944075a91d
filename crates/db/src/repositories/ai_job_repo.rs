//! Repository for the `ai_jobs` table.
//!
//! The table is both the job ledger clients watch and the queue workers
//! poll. Claims use `FOR UPDATE SKIP LOCKED` so concurrent workers never
//! double-dispatch a job.

use sqlx::PgPool;

use crate::models::ai_job::{AiJob, AiJobStatus, SubmitAiJob};

/// Column list for `ai_jobs` queries.
const COLUMNS: &str = "\
    id, user_id, vehicle_id, job_type, params, status, progress, \
    result, error, claimed_at, completed_at, created_at, updated_at";

/// Provides queue operations for AI jobs.
pub struct AiJobRepo;

impl AiJobRepo {
    /// Create a new pending job. Returns immediately with the job row.
    pub async fn submit(pool: &PgPool, input: &SubmitAiJob) -> Result<AiJob, sqlx::Error> {
        let query = format!(
            "INSERT INTO ai_jobs (id, user_id, vehicle_id, job_type, params) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AiJob>(&query)
            .bind(&input.id)
            .bind(&input.user_id)
            .bind(&input.vehicle_id)
            .bind(&input.job_type)
            .bind(&input.params)
            .fetch_one(pool)
            .await
    }

    /// Atomically claim the oldest pending job whose type is not in
    /// `excluded_types`, marking it processing at `initial_progress`.
    pub async fn claim_next(
        pool: &PgPool,
        excluded_types: &[&str],
        initial_progress: f64,
    ) -> Result<Option<AiJob>, sqlx::Error> {
        let query = format!(
            "UPDATE ai_jobs \
             SET status = $1, progress = $2, claimed_at = NOW(), updated_at = NOW() \
             WHERE (user_id, id) = ( \
                 SELECT user_id, id FROM ai_jobs \
                 WHERE status = $3 AND NOT (job_type = ANY($4)) \
                 ORDER BY created_at ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AiJob>(&query)
            .bind(AiJobStatus::Processing)
            .bind(initial_progress)
            .bind(AiJobStatus::Pending)
            .bind(excluded_types)
            .fetch_optional(pool)
            .await
    }

    /// Atomically claim the oldest pending job of exactly `job_type`,
    /// marking it processing at `initial_progress`.
    pub async fn claim_next_of_type(
        pool: &PgPool,
        job_type: &str,
        initial_progress: f64,
    ) -> Result<Option<AiJob>, sqlx::Error> {
        let query = format!(
            "UPDATE ai_jobs \
             SET status = $1, progress = $2, claimed_at = NOW(), updated_at = NOW() \
             WHERE (user_id, id) = ( \
                 SELECT user_id, id FROM ai_jobs \
                 WHERE status = $3 AND job_type = $4 \
                 ORDER BY created_at ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AiJob>(&query)
            .bind(AiJobStatus::Processing)
            .bind(initial_progress)
            .bind(AiJobStatus::Pending)
            .bind(job_type)
            .fetch_optional(pool)
            .await
    }

    /// Report a progress checkpoint.
    pub async fn set_progress(
        pool: &PgPool,
        user_id: &str,
        id: &str,
        progress: f64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE ai_jobs SET progress = $3, updated_at = NOW() \
             WHERE user_id = $1 AND id = $2",
        )
        .bind(user_id)
        .bind(id)
        .bind(progress)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark a job completed with its result payload and full progress.
    pub async fn complete(
        pool: &PgPool,
        user_id: &str,
        id: &str,
        result: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE ai_jobs \
             SET status = $3, result = $4, progress = 1.0, \
                 completed_at = NOW(), updated_at = NOW() \
             WHERE user_id = $1 AND id = $2",
        )
        .bind(user_id)
        .bind(id)
        .bind(AiJobStatus::Completed)
        .bind(result)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark a job failed, keeping whatever progress it reached.
    pub async fn fail(
        pool: &PgPool,
        user_id: &str,
        id: &str,
        error: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE ai_jobs \
             SET status = $3, error = $4, completed_at = NOW(), updated_at = NOW() \
             WHERE user_id = $1 AND id = $2",
        )
        .bind(user_id)
        .bind(id)
        .bind(AiJobStatus::Error)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Fetch a single job.
    pub async fn find(
        pool: &PgPool,
        user_id: &str,
        id: &str,
    ) -> Result<Option<AiJob>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ai_jobs WHERE user_id = $1 AND id = $2");
        sqlx::query_as::<_, AiJob>(&query)
            .bind(user_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
