use std::time::Duration;
use serde::{Deserialize, Serialize};

pub mod loader;

/// When a PENDING credit becomes eligible for promotion to AVAILABLE.
/// Manual means promotion only ever happens through an explicit
/// `promote_to_available` call (e.g. after manual review).
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum HoldPolicy {
    Manual,
    AfterMillis { hold_ms: u64 },
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LedgerConfig {
    /// Bound on optimistic retries when a withdrawal insert keeps losing the
    /// version race.
    pub max_insert_retries: u32,
    pub hold: HoldPolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            max_insert_retries: 5,
            hold: HoldPolicy::Manual,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PayoutConfig {
    pub provider_timeout_ms: u64,
    pub reconcile_interval_ms: u64,
}

impl PayoutConfig {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_millis(self.reconcile_interval_ms)
    }
}

impl Default for PayoutConfig {
    fn default() -> Self {
        PayoutConfig {
            provider_timeout_ms: 10_000,
            reconcile_interval_ms: 30_000,
        }
    }
}

/// Payment provider connection settings. `api_key` deliberately has no
/// default: configuration fails closed when no credential is supplied.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: String,
}
