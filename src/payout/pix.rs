use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;
use crate::error::{Error, Result};
use crate::interfaces::key_cipher::{EncryptedPixKey, PixKeyCipher, SecretPixKey};

const NONCE_LEN: usize = 12;

/// AES-256-GCM cipher for PIX keys at rest. Wire format is
/// base64(nonce || ciphertext), matching what the dashboard stores.
///
/// There is no default key: construction fails closed when key material is
/// absent or the wrong size.
pub struct AesGcmPixKeyCipher {
    key: [u8; 32],
}

impl AesGcmPixKeyCipher {
    pub fn new(key: [u8; 32]) -> Self {
        AesGcmPixKeyCipher { key }
    }

    pub fn from_key_bytes(bytes: &[u8]) -> Result<Self> {
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|_| Error::Cipher(format!(
                "key material must be exactly 32 bytes, got {}",
                bytes.len()
            )))?;
        Ok(AesGcmPixKeyCipher { key })
    }

    pub fn from_key_base64(encoded: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| Error::Cipher(format!("key material is not valid base64: {}", e)))?;
        Self::from_key_bytes(&bytes)
    }

    fn cipher(&self) -> Result<Aes256Gcm> {
        Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| Error::Cipher(format!("key init failed: {}", e)))
    }
}

impl Drop for AesGcmPixKeyCipher {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl PixKeyCipher for AesGcmPixKeyCipher {
    fn encrypt(&self, plaintext: &str) -> Result<EncryptedPixKey> {
        let cipher = self.cipher()?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| Error::Cipher(format!("encrypt failed: {}", e)))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);
        Ok(EncryptedPixKey::new(BASE64.encode(blob)))
    }

    fn decrypt(&self, ciphertext: &EncryptedPixKey) -> Result<SecretPixKey> {
        let blob = BASE64
            .decode(ciphertext.as_str())
            .map_err(|e| Error::Cipher(format!("ciphertext is not valid base64: {}", e)))?;
        if blob.len() < NONCE_LEN {
            return Err(Error::Cipher("ciphertext too short".to_string()));
        }
        let (nonce_bytes, payload) = blob.split_at(NONCE_LEN);

        let cipher = self.cipher()?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), payload)
            .map_err(|e| Error::Cipher(format!("decrypt failed: {}", e)))?;

        String::from_utf8(plaintext)
            .map(SecretPixKey::new)
            .map_err(|_| Error::Cipher("decrypted key is not valid UTF-8".to_string()))
    }
}
