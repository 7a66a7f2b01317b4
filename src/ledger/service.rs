use std::sync::Arc;
use rust_decimal::Decimal;
use tracing::{debug, error, info};
use crate::config::{HoldPolicy, LedgerConfig};
use crate::error::{Error, Result};
use crate::interfaces::entry_store::{EntryFilter, EntryStore};
use crate::ledger::audit::{AuditAction, AuditNote};
use crate::ledger::balance::BalanceCalculator;
use crate::ledger::entry::{EntryStatus, EntryType, LedgerEntry};
use crate::observability::metrics;
use crate::observability::tracing::trace_ledger_mutation;
use crate::types::amount::{Amount, Balance};
use crate::types::ids::{EntryId, UserId};
use crate::types::timestamp::Timestamp;

/// The only component permitted to create or transition ledger entries.
/// Every mutation commits together with its audit record; balances are always
/// derived from entries, never adjusted in place.
pub struct LedgerService<S: EntryStore> {
    store: Arc<S>,
    config: LedgerConfig,
}

impl<S: EntryStore> LedgerService<S> {
    pub fn new(store: Arc<S>, config: LedgerConfig) -> Self {
        LedgerService { store, config }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Record a mission reward as a PENDING credit. Promotion to AVAILABLE is
    /// a separate, explicit step. Re-crediting the same mission on the same
    /// calendar day returns the existing entry instead of double-crediting.
    pub fn credit_mission_reward(
        &self,
        user_id: UserId,
        amount: Decimal,
        mission_id: &str,
    ) -> Result<LedgerEntry> {
        let amount = Amount::new(amount)?;
        let entry = LedgerEntry::credit(
            user_id,
            amount,
            format!("Mission reward: {}", mission_id),
            Some(mission_id.to_string()),
        );
        let _span = trace_ledger_mutation(&entry.id).entered();
        let note = AuditNote::new(
            AuditAction::CreditMissionReward,
            format!("mission {} completed", mission_id),
        );

        match self.store.insert(entry, None, note) {
            Ok(entry) => {
                metrics::CREDITS_RECORDED.inc();
                info!(user_id = %user_id, amount = %amount, mission_id, "mission reward credited");
                Ok(entry)
            }
            Err(Error::DuplicateEntry { existing }) => {
                debug!(user_id = %user_id, mission_id, "mission already credited today");
                self.store.get(&existing)
            }
            Err(e) => Err(e),
        }
    }

    /// Release the audit hold on a credit: PENDING -> AVAILABLE.
    pub fn promote_to_available(&self, entry_id: EntryId) -> Result<LedgerEntry> {
        self.transition_checked(
            entry_id,
            EntryStatus::Available,
            AuditAction::PromoteToAvailable,
            "audit hold released".to_string(),
        )
    }

    /// Promote every pending credit of a user whose configured hold has
    /// elapsed. A no-op under `HoldPolicy::Manual`.
    pub fn promote_matured(&self, user_id: UserId) -> Result<Vec<LedgerEntry>> {
        let hold_ms = match self.config.hold {
            HoldPolicy::Manual => return Ok(Vec::new()),
            HoldPolicy::AfterMillis { hold_ms } => hold_ms,
        };
        let now = Timestamp::now();
        let pending = self
            .store
            .list_by_user(user_id, &EntryFilter::of(EntryType::Credit, EntryStatus::Pending));

        let mut promoted = Vec::new();
        for entry in pending {
            if now.millis_since(entry.created_at) >= hold_ms {
                promoted.push(self.promote_to_available(entry.id)?);
            }
        }
        Ok(promoted)
    }

    /// Place a hold on funds for a withdrawal: checks the available balance
    /// and inserts a PENDING debit in one optimistic-retry loop, so two
    /// concurrent requests against the same balance cannot both succeed.
    /// Replaying the same idempotency key returns the existing debit, even
    /// when that debit consumed the whole balance; replaying it with a
    /// different amount is a caller bug and conflicts.
    pub fn request_withdrawal_debit(
        &self,
        user_id: UserId,
        amount: Decimal,
        idempotency_key: &str,
    ) -> Result<LedgerEntry> {
        let amount = Amount::new(amount)?;

        for _ in 0..self.config.max_insert_retries {
            // Replay detection must run before any balance math: the existing
            // hold may have consumed the funds the retry is asking for.
            if let Some(existing) = self.replayed_debit(user_id, idempotency_key, amount)? {
                return Ok(existing);
            }

            let version = self.store.user_version(user_id);
            let balance = self.get_balance(user_id);
            if balance.available < amount.value() {
                return Err(Error::InsufficientBalance {
                    requested: amount.value(),
                    available: balance.available,
                });
            }

            let entry = LedgerEntry::debit(
                user_id,
                amount,
                "PIX withdrawal".to_string(),
                Some(idempotency_key.to_string()),
            );
            let note = AuditNote::new(
                AuditAction::RequestWithdrawalDebit,
                format!("hold for withdrawal {}", idempotency_key),
            );

            match self.store.insert(entry, Some(version), note) {
                Ok(entry) => {
                    metrics::DEBIT_HOLDS_CREATED.inc();
                    info!(user_id = %user_id, amount = %amount, entry_id = %entry.id, "withdrawal hold created");
                    return Ok(entry);
                }
                // Lost the version race; recompute the balance and try again.
                Err(Error::Conflict(_)) => continue,
                // A concurrent request with the same key landed first.
                Err(Error::DuplicateEntry { .. }) => {
                    if let Some(existing) = self.replayed_debit(user_id, idempotency_key, amount)? {
                        return Ok(existing);
                    }
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(Error::Conflict(format!(
            "withdrawal for user {} still conflicting after {} attempts",
            user_id, self.config.max_insert_retries
        )))
    }

    /// Audited status transition, validated against the entry state machine.
    pub fn update_entry_status(
        &self,
        entry_id: EntryId,
        new_status: EntryStatus,
        reason: impl Into<String>,
    ) -> Result<LedgerEntry> {
        self.transition_checked(entry_id, new_status, AuditAction::UpdateEntryStatus, reason.into())
    }

    pub fn get_balance(&self, user_id: UserId) -> Balance {
        let entries = self.store.list_by_user(user_id, &EntryFilter::any());
        BalanceCalculator::compute(&entries)
    }

    pub fn get_entry(&self, entry_id: EntryId) -> Result<LedgerEntry> {
        self.store.get(&entry_id)
    }

    /// Existing debit for this idempotency key, whatever its status. A retry
    /// carrying a different amount is rejected instead of being passed off as
    /// a successful replay.
    fn replayed_debit(
        &self,
        user_id: UserId,
        idempotency_key: &str,
        amount: Amount,
    ) -> Result<Option<LedgerEntry>> {
        let debits = self.store.list_by_user(
            user_id,
            &EntryFilter {
                entry_type: Some(EntryType::Debit),
                status: None,
            },
        );
        let Some(existing) = debits
            .into_iter()
            .find(|e| e.reference_id.as_deref() == Some(idempotency_key))
        else {
            return Ok(None);
        };

        if existing.amount != amount {
            return Err(Error::Conflict(format!(
                "withdrawal {} already holds {}, retried with {}",
                idempotency_key, existing.amount, amount
            )));
        }
        debug!(user_id = %user_id, idempotency_key, "withdrawal already requested");
        Ok(Some(existing))
    }

    fn transition_checked(
        &self,
        entry_id: EntryId,
        new_status: EntryStatus,
        action: AuditAction,
        reason: String,
    ) -> Result<LedgerEntry> {
        let _span = trace_ledger_mutation(&entry_id).entered();
        let entry = self.store.get(&entry_id)?;

        if !entry.entry_type.allows(entry.status, new_status) {
            // Illegal transitions are logic errors, never silently ignored.
            error!(
                entry_id = %entry_id,
                from = %entry.status,
                to = %new_status,
                "illegal ledger transition attempted"
            );
            return Err(Error::InvalidTransition {
                entry_type: entry.entry_type,
                from: entry.status,
                to: new_status,
            });
        }

        let note = AuditNote::new(action, reason);
        let updated = self.store.transition(&entry_id, new_status, entry.status, note)?;
        info!(entry_id = %entry_id, from = %entry.status, to = %new_status, "ledger entry transitioned");
        Ok(updated)
    }
}
