use std::sync::RwLock;
use dashmap::DashMap;
use crate::error::{Error, Result};
use crate::interfaces::audit_log::AuditLog;
use crate::interfaces::entry_store::{EntryFilter, EntryStore};
use crate::ledger::audit::{AuditNote, AuditRecord};
use crate::ledger::entry::{EntryStatus, EntryType, LedgerEntry};
use crate::types::ids::{EntryId, UserId};
use crate::types::timestamp::Timestamp;

#[derive(Default)]
struct UserIndex {
    version: u64,
    entry_ids: Vec<EntryId>,
}

/// In-memory transactional entry store with the audit log in the same engine,
/// so a mutation and its audit record commit together.
///
/// Lock order is always: user index guard, then entries, then audit. The user
/// index guard is what makes check-then-insert atomic per user.
pub struct MemoryLedgerStore {
    entries: DashMap<EntryId, LedgerEntry>,
    users: DashMap<UserId, UserIndex>,
    audit: RwLock<Vec<AuditRecord>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        MemoryLedgerStore {
            entries: DashMap::new(),
            users: DashMap::new(),
            audit: RwLock::new(Vec::new()),
        }
    }

    fn append_audit(&self, record: AuditRecord) -> Result<()> {
        let mut log = self
            .audit
            .write()
            .map_err(|_| Error::AuditUnavailable("audit log lock poisoned".to_string()))?;
        log.push(record);
        crate::observability::metrics::AUDIT_RECORDS_WRITTEN.inc();
        Ok(())
    }

    /// Duplicate detection under the user index guard. Credits: one
    /// non-reversed entry per (reference, calendar day). Debits: one entry per
    /// reference regardless of day or status, so a withdrawal retried across
    /// midnight still cannot double-pay.
    fn find_duplicate(&self, index: &UserIndex, candidate: &LedgerEntry) -> Option<EntryId> {
        let reference = candidate.reference_id.as_deref()?;
        for id in &index.entry_ids {
            let existing = match self.entries.get(id) {
                Some(e) => e,
                None => continue,
            };
            if existing.entry_type != candidate.entry_type
                || existing.reference_id.as_deref() != Some(reference)
            {
                continue;
            }
            let duplicate = match candidate.entry_type {
                EntryType::Credit => {
                    existing.status != EntryStatus::Reversed
                        && existing.created_at.day() == candidate.created_at.day()
                }
                EntryType::Debit => true,
            };
            if duplicate {
                return Some(existing.id);
            }
        }
        None
    }
}

impl Default for MemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryStore for MemoryLedgerStore {
    fn insert(
        &self,
        entry: LedgerEntry,
        expected_version: Option<u64>,
        note: AuditNote,
    ) -> Result<LedgerEntry> {
        let mut index = self.users.entry(entry.user_id).or_default();

        if let Some(expected) = expected_version {
            if index.version != expected {
                return Err(Error::Conflict(format!(
                    "ledger for user {} advanced past version {}",
                    entry.user_id, expected
                )));
            }
        }
        if self.entries.contains_key(&entry.id) {
            return Err(Error::DuplicateEntry { existing: entry.id });
        }
        if let Some(existing) = self.find_duplicate(&index, &entry) {
            return Err(Error::DuplicateEntry { existing });
        }

        // Audit first: if the log is unavailable the mutation must not commit.
        self.append_audit(AuditRecord::for_insert(&entry, &note))?;

        index.version += 1;
        index.entry_ids.push(entry.id);
        self.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    fn get(&self, id: &EntryId) -> Result<LedgerEntry> {
        self.entries
            .get(id)
            .map(|e| e.clone())
            .ok_or(Error::EntryNotFound(*id))
    }

    fn list_by_user(&self, user_id: UserId, filter: &EntryFilter) -> Vec<LedgerEntry> {
        let index = match self.users.get(&user_id) {
            Some(index) => index,
            None => return Vec::new(),
        };
        let mut entries: Vec<LedgerEntry> = index
            .entry_ids
            .iter()
            .filter_map(|id| self.entries.get(id).map(|e| e.clone()))
            .filter(|e| filter.matches(e))
            .collect();
        entries.sort_by_key(|e| e.created_at);
        entries
    }

    fn user_version(&self, user_id: UserId) -> u64 {
        self.users.get(&user_id).map(|i| i.version).unwrap_or(0)
    }

    fn users(&self) -> Vec<UserId> {
        self.users.iter().map(|entry| *entry.key()).collect()
    }

    fn transition(
        &self,
        id: &EntryId,
        to: EntryStatus,
        expected: EntryStatus,
        note: AuditNote,
    ) -> Result<LedgerEntry> {
        let user_id = {
            let entry = self.entries.get(id).ok_or(Error::EntryNotFound(*id))?;
            entry.user_id
        };
        let mut index = self.users.get_mut(&user_id).ok_or(Error::EntryNotFound(*id))?;
        let mut entry = self.entries.get_mut(id).ok_or(Error::EntryNotFound(*id))?;

        if entry.status != expected {
            return Err(Error::Conflict(format!(
                "entry {} is {}, expected {}",
                id, entry.status, expected
            )));
        }

        self.append_audit(AuditRecord::for_transition(&entry, to, &note))?;

        entry.status = to;
        entry.updated_at = Timestamp::now();
        index.version += 1;
        Ok(entry.clone())
    }
}

impl AuditLog for MemoryLedgerStore {
    fn append(&self, record: AuditRecord) -> Result<()> {
        self.append_audit(record)
    }

    fn query_by_entry(&self, entry_id: &EntryId) -> Vec<AuditRecord> {
        match self.audit.read() {
            Ok(log) => log.iter().filter(|r| r.entry_id == *entry_id).cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    fn query_by_user(&self, user_id: UserId) -> Vec<AuditRecord> {
        match self.audit.read() {
            Ok(log) => log.iter().filter(|r| r.user_id == user_id).cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    fn export_json(&self) -> Result<String> {
        let log = self
            .audit
            .read()
            .map_err(|_| Error::AuditUnavailable("audit log lock poisoned".to_string()))?;
        serde_json::to_string_pretty(&*log)
            .map_err(|e| Error::AuditUnavailable(e.to_string()))
    }
}
