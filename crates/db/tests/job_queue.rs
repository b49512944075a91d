//! Integration tests for the AI job queue:
//! - Claim routing between the shared runner and dedicated runners
//! - Exclusive claims under SKIP LOCKED
//! - Progress, completion and failure transitions

use driveline_core::jobs::{DEDICATED_TYPES, TYPE_EXPORT, TYPE_RANGE_ANALYSIS};
use driveline_db::models::ai_job::{AiJobStatus, SubmitAiJob};
use driveline_db::repositories::AiJobRepo;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn submission(id: &str, job_type: &str) -> SubmitAiJob {
    SubmitAiJob {
        id: id.to_string(),
        user_id: "u1".to_string(),
        vehicle_id: "v1".to_string(),
        job_type: job_type.to_string(),
        params: Some(json!({"prompt": "towing efficiency"})),
    }
}

// ---------------------------------------------------------------------------
// Test: Submission and claim routing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_starts_pending(pool: PgPool) {
    let job = AiJobRepo::submit(&pool, &submission("j1", TYPE_RANGE_ANALYSIS))
        .await
        .unwrap();
    assert_eq!(job.status, AiJobStatus::Pending);
    assert_eq!(job.progress, 0.0);
    assert!(job.claimed_at.is_none());
    assert_eq!(job.params.as_ref().unwrap()["prompt"], "towing efficiency");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_shared_claim_skips_dedicated_types(pool: PgPool) {
    // The export job is older, but the shared runner must never touch it
    AiJobRepo::submit(&pool, &submission("j-export", TYPE_EXPORT))
        .await
        .unwrap();
    AiJobRepo::submit(&pool, &submission("j-range", TYPE_RANGE_ANALYSIS))
        .await
        .unwrap();

    let claimed = AiJobRepo::claim_next(&pool, &DEDICATED_TYPES, 0.1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(claimed.id, "j-range");
    assert_eq!(claimed.status, AiJobStatus::Processing);
    assert_eq!(claimed.progress, 0.1);
    assert!(claimed.claimed_at.is_some());

    assert!(AiJobRepo::claim_next(&pool, &DEDICATED_TYPES, 0.1)
        .await
        .unwrap()
        .is_none());

    let claimed = AiJobRepo::claim_next_of_type(&pool, TYPE_EXPORT, 0.1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(claimed.id, "j-export");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_claims_are_exclusive(pool: PgPool) {
    AiJobRepo::submit(&pool, &submission("j1", TYPE_RANGE_ANALYSIS))
        .await
        .unwrap();

    assert!(AiJobRepo::claim_next(&pool, &DEDICATED_TYPES, 0.1)
        .await
        .unwrap()
        .is_some());
    assert!(AiJobRepo::claim_next(&pool, &DEDICATED_TYPES, 0.1)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_oldest_pending_claimed_first(pool: PgPool) {
    AiJobRepo::submit(&pool, &submission("j1", TYPE_RANGE_ANALYSIS))
        .await
        .unwrap();
    AiJobRepo::submit(&pool, &submission("j2", TYPE_RANGE_ANALYSIS))
        .await
        .unwrap();

    let first = AiJobRepo::claim_next(&pool, &DEDICATED_TYPES, 0.1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.id, "j1");
}

// ---------------------------------------------------------------------------
// Test: Lifecycle transitions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_complete_records_result_and_full_progress(pool: PgPool) {
    AiJobRepo::submit(&pool, &submission("j1", TYPE_RANGE_ANALYSIS))
        .await
        .unwrap();
    let job = AiJobRepo::claim_next(&pool, &DEDICATED_TYPES, 0.1)
        .await
        .unwrap()
        .unwrap();

    AiJobRepo::set_progress(&pool, &job.user_id, &job.id, 0.5)
        .await
        .unwrap();
    let job = AiJobRepo::find(&pool, "u1", "j1").await.unwrap().unwrap();
    assert_eq!(job.progress, 0.5);
    assert_eq!(job.status, AiJobStatus::Processing);

    AiJobRepo::complete(&pool, "u1", "j1", &json!({"summary": "steady month"}))
        .await
        .unwrap();
    let job = AiJobRepo::find(&pool, "u1", "j1").await.unwrap().unwrap();
    assert_eq!(job.status, AiJobStatus::Completed);
    assert_eq!(job.progress, 1.0);
    assert_eq!(job.result.as_ref().unwrap()["summary"], "steady month");
    assert!(job.completed_at.is_some());
    assert_eq!(job.error, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_fail_keeps_reached_progress(pool: PgPool) {
    AiJobRepo::submit(&pool, &submission("j1", TYPE_RANGE_ANALYSIS))
        .await
        .unwrap();
    let job = AiJobRepo::claim_next(&pool, &DEDICATED_TYPES, 0.1)
        .await
        .unwrap()
        .unwrap();
    AiJobRepo::set_progress(&pool, &job.user_id, &job.id, 0.3)
        .await
        .unwrap();

    AiJobRepo::fail(&pool, "u1", "j1", "model returned invalid JSON")
        .await
        .unwrap();
    let job = AiJobRepo::find(&pool, "u1", "j1").await.unwrap().unwrap();
    assert_eq!(job.status, AiJobStatus::Error);
    assert_eq!(job.error.as_deref(), Some("model returned invalid JSON"));
    assert_eq!(job.progress, 0.3);
    assert!(job.completed_at.is_some());
    assert_eq!(job.result, None);
}
