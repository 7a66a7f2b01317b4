use rust_decimal::Decimal;
use crate::ledger::entry::{EntryStatus, EntryType, LedgerEntry};
use crate::types::amount::Balance;

/// Derives balances from entries. Pure: no side effects, no cached counters.
pub struct BalanceCalculator;

impl BalanceCalculator {
    /// available = credits(AVAILABLE) - debits(status not FAILED/REVERSED);
    /// non-terminal debits count as already deducted, so a pending hold
    /// blocks double-spending immediately.
    /// pending = credits(PENDING); total_paid = debits(COMPLETED).
    pub fn compute(entries: &[LedgerEntry]) -> Balance {
        let mut available = Decimal::ZERO;
        let mut pending = Decimal::ZERO;
        let mut total_paid = Decimal::ZERO;

        for entry in entries {
            match entry.entry_type {
                EntryType::Credit => match entry.status {
                    EntryStatus::Available => available += entry.amount.value(),
                    EntryStatus::Pending => pending += entry.amount.value(),
                    _ => {}
                },
                EntryType::Debit => {
                    match entry.status {
                        EntryStatus::Failed | EntryStatus::Reversed => {}
                        _ => available -= entry.amount.value(),
                    }
                    if entry.status == EntryStatus::Completed {
                        total_paid += entry.amount.value();
                    }
                }
            }
        }

        Balance {
            available,
            pending,
            total_paid,
        }
    }
}
