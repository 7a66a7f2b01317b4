use std::sync::Arc;
use dashmap::DashSet;
use rust_decimal::Decimal;
use tracing::{info, warn, Instrument};
use crate::config::PayoutConfig;
use crate::error::{Error, Result};
use crate::interfaces::entry_store::EntryStore;
use crate::interfaces::key_cipher::{EncryptedPixKey, PixKeyCipher, PixKeyType};
use crate::interfaces::payment_provider::{PaymentProvider, TransferRequest, TransferState};
use crate::ledger::entry::{EntryStatus, LedgerEntry};
use crate::ledger::service::LedgerService;
use crate::observability::metrics;
use crate::observability::tracing::trace_payout;
use crate::types::ids::{EntryId, UserId};
use crate::utils::task_supervisor::TaskSupervisor;

/// Drives a withdrawal from hold to settlement, calling the external payment
/// capability exactly once per logical request.
///
/// The decrypted PIX key exists only while the provider request is being
/// built and sent; it is never persisted or logged. When the provider outcome
/// is unknown (timeout, transport failure), the debit stays PENDING and the
/// reconciliation poll resolves it — no guessing.
pub struct PayoutOrchestrator<S, P, C>
where
    S: EntryStore,
    P: PaymentProvider,
    C: PixKeyCipher,
{
    ledger: Arc<LedgerService<S>>,
    provider: Arc<P>,
    cipher: C,
    config: PayoutConfig,
    /// Entries claimed for provider submission. Admin cancellation is only
    /// allowed before an entry lands here.
    in_flight: DashSet<EntryId>,
    /// Entries whose provider outcome is unknown.
    reconcile_queue: DashSet<EntryId>,
}

impl<S, P, C> PayoutOrchestrator<S, P, C>
where
    S: EntryStore,
    P: PaymentProvider,
    C: PixKeyCipher,
{
    pub fn new(
        ledger: Arc<LedgerService<S>>,
        provider: Arc<P>,
        cipher: C,
        config: PayoutConfig,
    ) -> Self {
        PayoutOrchestrator {
            ledger,
            provider,
            cipher,
            config,
            in_flight: DashSet::new(),
            reconcile_queue: DashSet::new(),
        }
    }

    pub async fn execute_withdrawal(
        &self,
        user_id: UserId,
        amount: Decimal,
        encrypted_pix_key: &EncryptedPixKey,
        pix_key_type: PixKeyType,
        idempotency_key: &str,
    ) -> Result<LedgerEntry> {
        if encrypted_pix_key.is_empty() {
            return Err(Error::PixKeyMissing);
        }

        let entry = self
            .ledger
            .request_withdrawal_debit(user_id, amount, idempotency_key)?;
        if entry.status.is_terminal() {
            // Retry of an already settled request.
            return Ok(entry);
        }
        if !self.in_flight.insert(entry.id) {
            // Another caller is already processing this hold.
            return Ok(entry);
        }

        let pix_key = match self.cipher.decrypt(encrypted_pix_key) {
            Ok(key) => key,
            Err(e) => {
                self.in_flight.remove(&entry.id);
                self.ledger.update_entry_status(
                    entry.id,
                    EntryStatus::Failed,
                    format!("pix key decryption failed: {}", e),
                )?;
                metrics::WITHDRAWALS_FAILED.inc();
                return Err(e);
            }
        };

        let request = TransferRequest {
            amount: entry.amount,
            pix_key,
            pix_key_type,
            description: entry.description.clone(),
            reference: entry.id.to_string(),
        };

        let timer = metrics::PAYOUT_LATENCY.start_timer();
        let outcome = tokio::time::timeout(
            self.config.provider_timeout(),
            self.provider.initiate_transfer(request),
        )
        .instrument(trace_payout(&entry.id))
        .await;
        timer.observe_duration();

        match outcome {
            Ok(Ok(receipt)) => match receipt.state {
                TransferState::Confirmed => self.settle_completed(
                    entry.id,
                    format!("provider confirmed transfer {}", receipt.provider_transaction_id),
                ),
                TransferState::Rejected { reason } => self.settle_failed(entry.id, reason),
                TransferState::Processing => {
                    self.schedule_reconciliation(entry.id);
                    self.ledger.get_entry(entry.id)
                }
            },
            Ok(Err(Error::Provider {
                message,
                retryable: false,
            })) => self.settle_failed(entry.id, message),
            Ok(Err(e)) => {
                // Retryable failure: outcome unknown, do not guess.
                warn!(entry_id = %entry.id, error = %e, "provider call failed, scheduling reconciliation");
                self.schedule_reconciliation(entry.id);
                self.ledger.get_entry(entry.id)
            }
            Err(_) => {
                warn!(entry_id = %entry.id, "provider call timed out, scheduling reconciliation");
                self.schedule_reconciliation(entry.id);
                self.ledger.get_entry(entry.id)
            }
        }
    }

    /// Admin cancellation of a pending hold. Refused once the provider call
    /// has been issued; from then on the system waits for confirmation or
    /// reconciliation.
    pub fn cancel_withdrawal(&self, entry_id: EntryId, reason: impl Into<String>) -> Result<LedgerEntry> {
        if self.in_flight.contains(&entry_id) {
            return Err(Error::Conflict(format!(
                "withdrawal {} already submitted to the provider",
                entry_id
            )));
        }
        self.ledger
            .update_entry_status(entry_id, EntryStatus::Reversed, reason.into())
    }

    /// Query the provider for every unresolved withdrawal and settle the ones
    /// with a definitive outcome. Safe to run concurrently with settlement:
    /// the store's compare-and-set makes each transition happen exactly once.
    /// Returns the number of entries settled.
    pub async fn reconcile_pending(&self) -> usize {
        let unresolved: Vec<EntryId> = self.reconcile_queue.iter().map(|r| *r.key()).collect();
        let mut settled = 0;

        for entry_id in unresolved {
            let state = match self.provider.query_transfer(&entry_id.to_string()).await {
                Ok(state) => state,
                Err(e) => {
                    warn!(entry_id = %entry_id, error = %e, "reconciliation query failed");
                    continue;
                }
            };
            let result = match state {
                TransferState::Confirmed => self
                    .settle_completed(entry_id, "provider confirmed on reconciliation".to_string()),
                TransferState::Rejected { reason } => self.settle_failed(entry_id, reason),
                TransferState::Processing => continue,
            };
            match result {
                Ok(_) => settled += 1,
                // Someone else settled it first; the transfer is resolved.
                Err(Error::Conflict(_)) | Err(Error::InvalidTransition { .. }) => {
                    self.forget(entry_id);
                }
                Err(e) => {
                    warn!(entry_id = %entry_id, error = %e, "reconciliation settlement failed");
                }
            }
        }
        settled
    }

    /// Run `reconcile_pending` on an interval under the task supervisor.
    pub fn spawn_reconciliation(self: &Arc<Self>, supervisor: &mut TaskSupervisor)
    where
        S: 'static,
        P: 'static,
        C: 'static,
    {
        let orchestrator = Arc::clone(self);
        let interval = orchestrator.config.reconcile_interval();
        supervisor.spawn("payout_reconciliation", async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                orchestrator.reconcile_pending().await;
            }
        });
    }

    pub fn pending_reconciliations(&self) -> usize {
        self.reconcile_queue.len()
    }

    fn settle_completed(&self, entry_id: EntryId, reason: String) -> Result<LedgerEntry> {
        let updated = self
            .ledger
            .update_entry_status(entry_id, EntryStatus::Completed, reason)?;
        self.forget(entry_id);
        metrics::WITHDRAWALS_COMPLETED.inc();
        info!(entry_id = %entry_id, "withdrawal completed");
        Ok(updated)
    }

    fn settle_failed(&self, entry_id: EntryId, reason: String) -> Result<LedgerEntry> {
        let updated = self
            .ledger
            .update_entry_status(entry_id, EntryStatus::Failed, reason)?;
        self.forget(entry_id);
        metrics::WITHDRAWALS_FAILED.inc();
        info!(entry_id = %entry_id, "withdrawal failed, hold released");
        Ok(updated)
    }

    fn schedule_reconciliation(&self, entry_id: EntryId) {
        self.reconcile_queue.insert(entry_id);
        metrics::PENDING_RECONCILIATIONS.set(self.reconcile_queue.len() as i64);
    }

    fn forget(&self, entry_id: EntryId) {
        self.in_flight.remove(&entry_id);
        self.reconcile_queue.remove(&entry_id);
        metrics::PENDING_RECONCILIATIONS.set(self.reconcile_queue.len() as i64);
    }
}
