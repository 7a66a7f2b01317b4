//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use rust_decimal::Decimal;
use rewards_ledger::config::{LedgerConfig, PayoutConfig};
use rewards_ledger::error::{Error, Result};
use rewards_ledger::interfaces::key_cipher::{EncryptedPixKey, PixKeyCipher};
use rewards_ledger::interfaces::payment_provider::{
    PaymentProvider, TransferReceipt, TransferRequest, TransferState,
};
use rewards_ledger::ledger::service::LedgerService;
use rewards_ledger::ledger::store::MemoryLedgerStore;
use rewards_ledger::payout::pix::AesGcmPixKeyCipher;
use rewards_ledger::types::ids::UserId;

pub const TEST_PIX_KEY: &str = "user@example.com";

/// What the scripted provider does on `initiate_transfer`.
#[derive(Clone)]
pub enum InitiateBehavior {
    Confirm,
    Processing,
    Reject(String),
    RetryableError,
    NonRetryableError(String),
    /// Never answers; lets the orchestrator's timeout fire.
    Hang,
}

/// Hand-rolled provider fake with scripted, inspectable behavior.
pub struct ScriptedProvider {
    initiate: Mutex<InitiateBehavior>,
    query: Mutex<TransferState>,
    pub initiate_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
    pub seen_pix_keys: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(initiate: InitiateBehavior) -> Self {
        ScriptedProvider {
            initiate: Mutex::new(initiate),
            query: Mutex::new(TransferState::Processing),
            initiate_calls: AtomicUsize::new(0),
            query_calls: AtomicUsize::new(0),
            seen_pix_keys: Mutex::new(Vec::new()),
        }
    }

    pub fn set_initiate(&self, behavior: InitiateBehavior) {
        *self.initiate.lock().unwrap() = behavior;
    }

    pub fn set_query(&self, state: TransferState) {
        *self.query.lock().unwrap() = state;
    }

    pub fn initiate_call_count(&self) -> usize {
        self.initiate_calls.load(Ordering::SeqCst)
    }

    pub fn query_call_count(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentProvider for ScriptedProvider {
    async fn initiate_transfer(&self, request: TransferRequest) -> Result<TransferReceipt> {
        self.initiate_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_pix_keys
            .lock()
            .unwrap()
            .push(request.pix_key.expose().to_string());

        let behavior = self.initiate.lock().unwrap().clone();
        match behavior {
            InitiateBehavior::Confirm => Ok(TransferReceipt {
                provider_transaction_id: format!("tx-{}", request.reference),
                state: TransferState::Confirmed,
            }),
            InitiateBehavior::Processing => Ok(TransferReceipt {
                provider_transaction_id: format!("tx-{}", request.reference),
                state: TransferState::Processing,
            }),
            InitiateBehavior::Reject(reason) => Ok(TransferReceipt {
                provider_transaction_id: format!("tx-{}", request.reference),
                state: TransferState::Rejected { reason },
            }),
            InitiateBehavior::RetryableError => Err(Error::Provider {
                message: "gateway timeout".to_string(),
                retryable: true,
            }),
            InitiateBehavior::NonRetryableError(message) => Err(Error::Provider {
                message,
                retryable: false,
            }),
            InitiateBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(Error::Provider {
                    message: "unreachable".to_string(),
                    retryable: true,
                })
            }
        }
    }

    async fn query_transfer(&self, _reference: &str) -> Result<TransferState> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.query.lock().unwrap().clone())
    }
}

pub fn test_cipher() -> AesGcmPixKeyCipher {
    AesGcmPixKeyCipher::new([42u8; 32])
}

pub fn encrypted_test_key() -> EncryptedPixKey {
    test_cipher().encrypt(TEST_PIX_KEY).unwrap()
}

/// Short timeouts so the Hang behavior resolves quickly.
pub fn fast_payout_config() -> PayoutConfig {
    PayoutConfig {
        provider_timeout_ms: 50,
        reconcile_interval_ms: 10,
    }
}

pub fn new_service() -> (Arc<MemoryLedgerStore>, Arc<LedgerService<MemoryLedgerStore>>) {
    let store = Arc::new(MemoryLedgerStore::new());
    let service = Arc::new(LedgerService::new(Arc::clone(&store), LedgerConfig::default()));
    (store, service)
}

/// Service with a user whose available balance is already `amount`.
pub fn funded_service(
    amount: Decimal,
) -> (
    Arc<MemoryLedgerStore>,
    Arc<LedgerService<MemoryLedgerStore>>,
    UserId,
) {
    let (store, service) = new_service();
    let user = UserId::new();
    let credit = service
        .credit_mission_reward(user, amount, "mission-funding")
        .unwrap();
    service.promote_to_available(credit.id).unwrap();
    (store, service, user)
}
