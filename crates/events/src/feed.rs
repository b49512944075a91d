//! Batched claim/ack lease over the transition outbox.

use driveline_core::types::DbId;
use driveline_db::repositories::TransitionRepo;
use driveline_db::DbPool;

use crate::envelope::TransitionEvent;

/// Polling feed over `document_transitions`.
///
/// A claim is a lease: a claimed transition that is not acked before the
/// visibility timeout elapses becomes claimable again, which is what makes
/// delivery at-least-once. Handlers must tolerate redelivery.
#[derive(Debug, Clone)]
pub struct TransitionFeed {
    batch_size: i64,
    visibility_timeout_secs: f64,
}

impl TransitionFeed {
    pub fn new(batch_size: i64, visibility_timeout_secs: f64) -> Self {
        Self {
            batch_size,
            visibility_timeout_secs,
        }
    }

    /// Claim the next batch of deliverable transitions, oldest first.
    pub async fn poll(&self, pool: &DbPool) -> Result<Vec<TransitionEvent>, sqlx::Error> {
        let rows =
            TransitionRepo::claim_batch(pool, self.batch_size, self.visibility_timeout_secs)
                .await?;
        Ok(rows.into_iter().map(TransitionEvent::from).collect())
    }

    /// Mark one transition fully handled so it is never redelivered.
    pub async fn ack(&self, pool: &DbPool, id: DbId) -> Result<(), sqlx::Error> {
        TransitionRepo::ack(pool, id).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
