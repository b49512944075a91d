//! Typed envelopes over claimed outbox rows.
//!
//! A claimed `document_transitions` row carries raw before/after JSON.
//! [`TransitionEvent`] keeps the payloads raw and decodes them on demand
//! into the wire document types, so a malformed payload never blocks the
//! rest of a batch.

use driveline_core::docs::{DriveDoc, VehicleDoc};
use driveline_core::types::DbId;
use driveline_db::models::transition::{DocType, DocumentTransition};

/// One claimed transition, ready for guard evaluation.
#[derive(Debug, Clone)]
pub struct TransitionEvent {
    pub id: DbId,
    pub doc_type: DocType,
    pub user_id: String,
    pub vehicle_id: String,
    pub doc_id: String,
    pub attempts: i32,
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
}

/// A drive document change with both snapshots decoded. `before` is absent
/// for creations.
#[derive(Debug, Clone, Default)]
pub struct DriveChange {
    pub before: Option<DriveDoc>,
    pub after: DriveDoc,
}

/// A vehicle document change with both snapshots decoded.
#[derive(Debug, Clone, Default)]
pub struct VehicleChange {
    pub before: Option<VehicleDoc>,
    pub after: VehicleDoc,
}

impl From<DocumentTransition> for TransitionEvent {
    fn from(row: DocumentTransition) -> Self {
        Self {
            id: row.id,
            doc_type: row.doc_type,
            user_id: row.user_id,
            vehicle_id: row.vehicle_id,
            doc_id: row.doc_id,
            attempts: row.attempts,
            before: row.before_doc,
            after: row.after_doc,
        }
    }
}

impl TransitionEvent {
    /// Decode as a drive change. `None` for vehicle transitions, for
    /// deletions (no after snapshot), and for payloads that do not parse
    /// as drive documents.
    pub fn drive_change(&self) -> Option<DriveChange> {
        if self.doc_type != DocType::Drive {
            return None;
        }
        let after = serde_json::from_value(self.after.clone()?).ok()?;
        let before = self
            .before
            .as_ref()
            .and_then(|doc| serde_json::from_value(doc.clone()).ok());
        Some(DriveChange { before, after })
    }

    /// Decode as a vehicle change, under the same rules as
    /// [`drive_change`](Self::drive_change).
    pub fn vehicle_change(&self) -> Option<VehicleChange> {
        if self.doc_type != DocType::Vehicle {
            return None;
        }
        let after = serde_json::from_value(self.after.clone()?).ok()?;
        let before = self
            .before
            .as_ref()
            .and_then(|doc| serde_json::from_value(doc.clone()).ok());
        Some(VehicleChange { before, after })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
