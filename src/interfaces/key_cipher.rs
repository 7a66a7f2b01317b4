use serde::{Deserialize, Serialize};
use zeroize::Zeroize;
use crate::error::Result;

/// PIX key kinds accepted by the payment provider. `Evp` is the provider's
/// random-key type and the default when callers do not specify one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PixKeyType {
    Cpf,
    Email,
    Phone,
    Evp,
}

impl std::fmt::Display for PixKeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PixKeyType::Cpf => "CPF",
            PixKeyType::Email => "EMAIL",
            PixKeyType::Phone => "PHONE",
            PixKeyType::Evp => "EVP",
        };
        write!(f, "{}", name)
    }
}

/// PIX key as stored: base64 of nonce followed by AES-GCM ciphertext.
/// Only ever decrypted inside the payout orchestrator's provider-call step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPixKey(String);

impl EncryptedPixKey {
    pub fn new(ciphertext: impl Into<String>) -> Self {
        EncryptedPixKey(ciphertext.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Decrypted PIX key. Lives only for the duration of provider request
/// construction; zeroed on drop, redacted in Debug output, never logged.
pub struct SecretPixKey(String);

impl SecretPixKey {
    pub fn new(plaintext: String) -> Self {
        SecretPixKey(plaintext)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Drop for SecretPixKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for SecretPixKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretPixKey(<redacted>)")
    }
}

/// Symmetric encryption capability for PIX keys at rest.
pub trait PixKeyCipher: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> Result<EncryptedPixKey>;

    fn decrypt(&self, ciphertext: &EncryptedPixKey) -> Result<SecretPixKey>;
}
