use tracing::Span;
use tracing_subscriber::EnvFilter;
use crate::types::ids::EntryId;

/// Install the global JSON subscriber. Safe to call more than once; later
/// calls are no-ops.
pub fn init_subscriber() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .try_init();
}

pub fn trace_ledger_mutation(entry_id: &EntryId) -> Span {
    tracing::info_span!(
        "ledger_mutation",
        entry_id = ?entry_id,
    )
}

pub fn trace_payout(entry_id: &EntryId) -> Span {
    tracing::info_span!(
        "payout",
        entry_id = ?entry_id,
    )
}
