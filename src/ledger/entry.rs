use serde::{Deserialize, Serialize};
use crate::types::amount::Amount;
use crate::types::ids::{EntryId, UserId};
use crate::types::timestamp::Timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryType {
    Credit,
    Debit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    Pending,
    Available,
    Completed,
    Reversed,
    Failed,
}

impl EntryStatus {
    /// Terminal entries are immutable; no further transition is permitted.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EntryStatus::Pending)
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntryStatus::Pending => "PENDING",
            EntryStatus::Available => "AVAILABLE",
            EntryStatus::Completed => "COMPLETED",
            EntryStatus::Reversed => "REVERSED",
            EntryStatus::Failed => "FAILED",
        };
        write!(f, "{}", name)
    }
}

impl EntryType {
    /// Transition legality table.
    ///
    /// Credits: Pending -> Available (audit hold released) or
    /// Pending -> Reversed (fraud reversal).
    /// Debits: Pending -> Completed (provider confirmed),
    /// Pending -> Failed (provider rejected, hold released) or
    /// Pending -> Reversed (admin cancellation before submission).
    pub fn allows(&self, from: EntryStatus, to: EntryStatus) -> bool {
        use EntryStatus::*;
        matches!(
            (self, from, to),
            (EntryType::Credit, Pending, Available)
                | (EntryType::Credit, Pending, Reversed)
                | (EntryType::Debit, Pending, Completed)
                | (EntryType::Debit, Pending, Failed)
                | (EntryType::Debit, Pending, Reversed)
        )
    }
}

/// A single immutable record of a credit or debit affecting a user's balance.
/// Entries are append-only: created once, transitioned via the ledger service,
/// never deleted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub user_id: UserId,
    pub entry_type: EntryType,
    pub status: EntryStatus,
    pub amount: Amount,
    pub description: String,
    pub reference_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl LedgerEntry {
    fn new(
        user_id: UserId,
        entry_type: EntryType,
        amount: Amount,
        description: String,
        reference_id: Option<String>,
    ) -> Self {
        let now = Timestamp::now();
        LedgerEntry {
            id: EntryId::new(),
            user_id,
            entry_type,
            status: EntryStatus::Pending,
            amount,
            description,
            reference_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn credit(
        user_id: UserId,
        amount: Amount,
        description: String,
        reference_id: Option<String>,
    ) -> Self {
        LedgerEntry::new(user_id, EntryType::Credit, amount, description, reference_id)
    }

    pub fn debit(
        user_id: UserId,
        amount: Amount,
        description: String,
        reference_id: Option<String>,
    ) -> Self {
        LedgerEntry::new(user_id, EntryType::Debit, amount, description, reference_id)
    }
}
