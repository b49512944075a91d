//! Document transition outbox models and DTOs.

use driveline_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Kind of document a transition describes. Maps to the `doc_type` enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "doc_type", rename_all = "lowercase")]
pub enum DocType {
    Drive,
    Vehicle,
}

/// A row from the `document_transitions` outbox.
///
/// `before_doc` is absent for creations; `after_doc` is absent for
/// deletions. Both hold the full camelCase wire document.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DocumentTransition {
    pub id: DbId,
    pub doc_type: DocType,
    pub user_id: String,
    pub vehicle_id: String,
    pub doc_id: String,
    pub before_doc: Option<serde_json::Value>,
    pub after_doc: Option<serde_json::Value>,
    pub attempts: i32,
    pub claimed_at: Option<Timestamp>,
    pub acked_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for appending a transition to the outbox, written in the same
/// transaction as the document change it records.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransition {
    pub doc_type: DocType,
    pub user_id: String,
    pub vehicle_id: String,
    pub doc_id: String,
    pub before_doc: Option<serde_json::Value>,
    pub after_doc: Option<serde_json::Value>,
}
