use crate::error::Result;
use crate::ledger::audit::AuditNote;
use crate::ledger::entry::{EntryStatus, EntryType, LedgerEntry};
use crate::types::ids::{EntryId, UserId};

/// Query filter for [`EntryStore::list_by_user`].
#[derive(Clone, Copy, Debug, Default)]
pub struct EntryFilter {
    pub entry_type: Option<EntryType>,
    pub status: Option<EntryStatus>,
}

impl EntryFilter {
    pub fn any() -> Self {
        EntryFilter::default()
    }

    pub fn of(entry_type: EntryType, status: EntryStatus) -> Self {
        EntryFilter {
            entry_type: Some(entry_type),
            status: Some(status),
        }
    }

    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        self.entry_type.map_or(true, |t| entry.entry_type == t)
            && self.status.map_or(true, |s| entry.status == s)
    }
}

/// Append-only persistence of ledger entries.
///
/// Implementations must make each mutation and its audit record one atomic
/// unit: either both commit or neither does. The per-user version counter is
/// the compare-and-set guard for optimistic balance checks; it advances on
/// every mutation touching that user's entries.
pub trait EntryStore: Send + Sync {
    /// Append a new entry. Fails with `DuplicateEntry` if the id is already
    /// present, or if another entry of the same type already holds the same
    /// reference (same calendar day for credits, any day for debits). When
    /// `expected_version` is given, fails with `Conflict` if the user's
    /// ledger has advanced past that version.
    fn insert(
        &self,
        entry: LedgerEntry,
        expected_version: Option<u64>,
        note: AuditNote,
    ) -> Result<LedgerEntry>;

    fn get(&self, id: &EntryId) -> Result<LedgerEntry>;

    /// Entries for a user, ordered by `created_at` ascending.
    fn list_by_user(&self, user_id: UserId, filter: &EntryFilter) -> Vec<LedgerEntry>;

    fn user_version(&self, user_id: UserId) -> u64;

    fn users(&self) -> Vec<UserId>;

    /// Atomic compare-and-set on status. Fails with `Conflict` if the current
    /// status does not match `expected`, preventing lost updates under
    /// concurrent settlement. The audit record commits with the transition.
    fn transition(
        &self,
        id: &EntryId,
        to: EntryStatus,
        expected: EntryStatus,
        note: AuditNote,
    ) -> Result<LedgerEntry>;
}
