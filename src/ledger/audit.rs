use serde::{Deserialize, Serialize};
use crate::ledger::entry::{EntryStatus, LedgerEntry};
use crate::types::ids::{AuditId, EntryId, UserId};
use crate::types::timestamp::Timestamp;

/// Ledger operation that produced an audit record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    CreditMissionReward,
    RequestWithdrawalDebit,
    PromoteToAvailable,
    UpdateEntryStatus,
}

/// Immutable record of a single ledger mutation, written in the same atomic
/// unit as the mutation it documents.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: AuditId,
    pub user_id: UserId,
    pub action: AuditAction,
    pub entry_id: EntryId,
    pub from: Option<EntryStatus>,
    pub to: EntryStatus,
    pub reason: String,
    pub created_at: Timestamp,
}

/// Action + human-readable reason attached to a store mutation.
#[derive(Clone, Debug)]
pub struct AuditNote {
    pub action: AuditAction,
    pub reason: String,
}

impl AuditNote {
    pub fn new(action: AuditAction, reason: impl Into<String>) -> Self {
        AuditNote {
            action,
            reason: reason.into(),
        }
    }
}

impl AuditRecord {
    /// Record for a freshly inserted entry.
    pub fn for_insert(entry: &LedgerEntry, note: &AuditNote) -> Self {
        AuditRecord {
            id: AuditId::new(),
            user_id: entry.user_id,
            action: note.action,
            entry_id: entry.id,
            from: None,
            to: entry.status,
            reason: note.reason.clone(),
            created_at: Timestamp::now(),
        }
    }

    /// Record for a status transition.
    pub fn for_transition(entry: &LedgerEntry, to: EntryStatus, note: &AuditNote) -> Self {
        AuditRecord {
            id: AuditId::new(),
            user_id: entry.user_id,
            action: note.action,
            entry_id: entry.id,
            from: Some(entry.status),
            to,
            reason: note.reason.clone(),
            created_at: Timestamp::now(),
        }
    }
}
