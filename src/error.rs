use rust_decimal::Decimal;
use thiserror::Error;
use crate::ledger::entry::{EntryStatus, EntryType};
use crate::types::ids::EntryId;

#[derive(Error, Debug)]
pub enum Error {
    // Ledger Errors
    #[error("Invalid amount: {0} (must be strictly positive)")]
    InvalidAmount(Decimal),

    #[error("Insufficient balance: requested={requested}, available={available}")]
    InsufficientBalance {
        requested: Decimal,
        available: Decimal,
    },

    #[error("Duplicate entry, existing id: {existing}")]
    DuplicateEntry {
        existing: EntryId,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid transition for {entry_type:?} entry: {from:?} -> {to:?}")]
    InvalidTransition {
        entry_type: EntryType,
        from: EntryStatus,
        to: EntryStatus,
    },

    #[error("Entry not found: {0}")]
    EntryNotFound(EntryId),

    // Payout Errors
    #[error("Payment provider error: {message} (retryable: {retryable})")]
    Provider {
        message: String,
        retryable: bool,
    },

    #[error("PIX key missing")]
    PixKeyMissing,

    #[error("Cipher error: {0}")]
    Cipher(String),

    // Audit Errors
    #[error("Audit log unavailable: {0}")]
    AuditUnavailable(String),

    // Invariant Errors
    #[error("Invariant violation: {0}")]
    InvariantViolation(InvariantViolation),

    // System Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone)]
pub struct InvariantViolation {
    pub invariant: &'static str,
    pub details: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.details)
    }
}
