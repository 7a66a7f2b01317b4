use rust_decimal::Decimal;
use crate::error::{Error, InvariantViolation, Result};
use crate::interfaces::audit_log::AuditLog;
use crate::interfaces::entry_store::{EntryFilter, EntryStore};
use crate::ledger::balance::BalanceCalculator;

pub struct InvariantChecks;

impl InvariantChecks {
    /// Check that no user's available balance is negative
    pub fn check_no_negative_available<S: EntryStore>(store: &S) -> Result<()> {
        for user_id in store.users() {
            let entries = store.list_by_user(user_id, &EntryFilter::any());
            let balance = BalanceCalculator::compute(&entries);
            if balance.available < Decimal::ZERO {
                return Err(Error::InvariantViolation(InvariantViolation {
                    invariant: "no_negative_available",
                    details: format!(
                        "user {} has negative available balance: {}",
                        user_id, balance.available
                    ),
                }));
            }
        }
        Ok(())
    }

    /// Check that every entry that left PENDING has audit coverage, and that
    /// every audit record references an entry that exists
    pub fn check_audit_coverage<S: EntryStore + AuditLog>(store: &S) -> Result<()> {
        for user_id in store.users() {
            for entry in store.list_by_user(user_id, &EntryFilter::any()) {
                if entry.status.is_terminal() && store.query_by_entry(&entry.id).len() < 2 {
                    return Err(Error::InvariantViolation(InvariantViolation {
                        invariant: "audit_coverage",
                        details: format!(
                            "terminal entry {} lacks a transition audit record",
                            entry.id
                        ),
                    }));
                }
            }
            for record in store.query_by_user(user_id) {
                if store.get(&record.entry_id).is_err() {
                    return Err(Error::InvariantViolation(InvariantViolation {
                        invariant: "audit_coverage",
                        details: format!(
                            "audit record {} references missing entry {}",
                            record.id, record.entry_id
                        ),
                    }));
                }
            }
        }
        Ok(())
    }
}
