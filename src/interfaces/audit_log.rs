use crate::error::Result;
use crate::ledger::audit::AuditRecord;
use crate::types::ids::{EntryId, UserId};

/// Write-only compliance record. `append` fails only on storage
/// unavailability, in which case the enclosing ledger mutation must also
/// fail; audit records are never silently lost.
pub trait AuditLog: Send + Sync {
    fn append(&self, record: AuditRecord) -> Result<()>;

    fn query_by_entry(&self, entry_id: &EntryId) -> Vec<AuditRecord>;

    fn query_by_user(&self, user_id: UserId) -> Vec<AuditRecord>;

    /// Full export for support/compliance tooling. Not a hot path.
    fn export_json(&self) -> Result<String>;
}
