//! Ledger and balance-accounting core for a micro-task rewards platform.
//!
//! Credits (mission rewards) and debits (withdrawal holds) are append-only
//! [`ledger::entry::LedgerEntry`] records; balances are always derived from
//! entries. The [`ledger::service::LedgerService`] owns every mutation, each
//! committed atomically with its audit record, and the
//! [`payout::orchestrator::PayoutOrchestrator`] settles withdrawals against
//! the external PIX payment provider with exactly-once semantics.

pub mod config;
pub mod error;
pub mod interfaces;
pub mod invariants;
pub mod ledger;
pub mod observability;
pub mod payout;
pub mod rewards;
pub mod types;
pub mod utils;

pub use error::{Error, Result};
pub use ledger::service::LedgerService;
pub use ledger::store::MemoryLedgerStore;
pub use payout::orchestrator::PayoutOrchestrator;
