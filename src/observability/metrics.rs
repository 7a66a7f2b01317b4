use lazy_static::lazy_static;
use prometheus::{
    Counter, Histogram, HistogramOpts, IntGauge, Registry,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Ledger metrics
    pub static ref CREDITS_RECORDED: Counter = Counter::new(
        "ledger_credits_recorded_total",
        "Total number of credit entries recorded"
    ).unwrap();

    pub static ref DEBIT_HOLDS_CREATED: Counter = Counter::new(
        "ledger_debit_holds_created_total",
        "Total number of withdrawal debit holds created"
    ).unwrap();

    pub static ref AUDIT_RECORDS_WRITTEN: Counter = Counter::new(
        "ledger_audit_records_written_total",
        "Total number of audit records written"
    ).unwrap();

    // Payout metrics
    pub static ref WITHDRAWALS_COMPLETED: Counter = Counter::new(
        "payout_withdrawals_completed_total",
        "Total number of withdrawals confirmed by the provider"
    ).unwrap();

    pub static ref WITHDRAWALS_FAILED: Counter = Counter::new(
        "payout_withdrawals_failed_total",
        "Total number of withdrawals rejected by the provider"
    ).unwrap();

    pub static ref PENDING_RECONCILIATIONS: IntGauge = IntGauge::new(
        "payout_pending_reconciliations",
        "Withdrawals awaiting provider reconciliation"
    ).unwrap();

    // Latency metrics
    pub static ref PAYOUT_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "payout_latency_seconds",
            "Provider call latency per withdrawal"
        ).buckets(vec![0.05, 0.1, 0.5, 1.0, 5.0, 10.0])
    ).unwrap();
}

pub fn register_metrics() {
    REGISTRY.register(Box::new(CREDITS_RECORDED.clone())).unwrap();
    REGISTRY.register(Box::new(DEBIT_HOLDS_CREATED.clone())).unwrap();
    REGISTRY.register(Box::new(AUDIT_RECORDS_WRITTEN.clone())).unwrap();
    REGISTRY.register(Box::new(WITHDRAWALS_COMPLETED.clone())).unwrap();
    REGISTRY.register(Box::new(WITHDRAWALS_FAILED.clone())).unwrap();
    REGISTRY.register(Box::new(PENDING_RECONCILIATIONS.clone())).unwrap();
    REGISTRY.register(Box::new(PAYOUT_LATENCY.clone())).unwrap();
}
