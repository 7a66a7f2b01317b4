pub mod audit_log;
pub mod entry_store;
pub mod key_cipher;
pub mod payment_provider;
