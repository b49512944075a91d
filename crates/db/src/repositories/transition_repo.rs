//! Repository for the `document_transitions` outbox.

use sqlx::PgPool;

use crate::models::transition::{CreateTransition, DocumentTransition};

/// Column list for `document_transitions` queries.
const COLUMNS: &str = "\
    id, doc_type, user_id, vehicle_id, doc_id, before_doc, after_doc, \
    attempts, claimed_at, acked_at, created_at, updated_at";

/// Provides append, claim and ack operations for the transition outbox.
pub struct TransitionRepo;

impl TransitionRepo {
    /// Append a transition to the outbox.
    pub async fn append(
        pool: &PgPool,
        input: &CreateTransition,
    ) -> Result<DocumentTransition, sqlx::Error> {
        let query = format!(
            "INSERT INTO document_transitions \
                 (doc_type, user_id, vehicle_id, doc_id, before_doc, after_doc) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentTransition>(&query)
            .bind(input.doc_type)
            .bind(&input.user_id)
            .bind(&input.vehicle_id)
            .bind(&input.doc_id)
            .bind(&input.before_doc)
            .bind(&input.after_doc)
            .fetch_one(pool)
            .await
    }

    /// Atomically claim up to `limit` deliverable transitions: never
    /// acked, and either never claimed or claimed longer ago than the
    /// visibility timeout. Each claim bumps `attempts`.
    pub async fn claim_batch(
        pool: &PgPool,
        limit: i64,
        visibility_timeout_secs: f64,
    ) -> Result<Vec<DocumentTransition>, sqlx::Error> {
        let query = format!(
            "UPDATE document_transitions \
             SET claimed_at = NOW(), attempts = attempts + 1, updated_at = NOW() \
             WHERE id IN ( \
                 SELECT id FROM document_transitions \
                 WHERE acked_at IS NULL \
                   AND (claimed_at IS NULL \
                        OR claimed_at < NOW() - make_interval(secs => $2)) \
                 ORDER BY id ASC \
                 LIMIT $1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentTransition>(&query)
            .bind(limit)
            .bind(visibility_timeout_secs)
            .fetch_all(pool)
            .await
    }

    /// Acknowledge a transition so it is never redelivered.
    pub async fn ack(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE document_transitions SET acked_at = NOW(), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
