use async_trait::async_trait;
use crate::error::Result;
use crate::interfaces::key_cipher::{PixKeyType, SecretPixKey};
use crate::types::amount::Amount;

/// Provider-side view of a transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransferState {
    /// Accepted but not yet settled; resolve via `query_transfer`.
    Processing,
    Confirmed,
    Rejected { reason: String },
}

/// Outbound PIX transfer. Holds the decrypted key, so the request must not
/// outlive the provider call and must never be logged or persisted.
#[derive(Debug)]
pub struct TransferRequest {
    pub amount: Amount,
    pub pix_key: SecretPixKey,
    pub pix_key_type: PixKeyType,
    pub description: String,
    /// Idempotency reference, bound to the debit entry id. Retries with the
    /// same reference are provider-side no-ops, not double payouts.
    pub reference: String,
}

#[derive(Clone, Debug)]
pub struct TransferReceipt {
    pub provider_transaction_id: String,
    pub state: TransferState,
}

/// External payment capability. The only component permitted to block on
/// network I/O; callers wrap it in a bounded timeout.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn initiate_transfer(&self, request: TransferRequest) -> Result<TransferReceipt>;

    /// Resolve the true outcome of a transfer whose result was not known
    /// synchronously, looked up by idempotency reference.
    async fn query_transfer(&self, reference: &str) -> Result<TransferState>;
}
