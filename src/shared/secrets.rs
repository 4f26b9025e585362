//! Symmetric encryption of the stored SMTP password.
//!
//! Key = SHA-256(auth_salt || secure_auth_salt). Each value gets a fresh random
//! 16-byte IV; the stored blob is base64(IV || ciphertext+tag).

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::AesGcm;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};

use crate::domain::DomainError;

/// AES-256-GCM with a 16-byte IV.
type Cipher = AesGcm<Aes256, U16>;

const IV_LEN: usize = 16;

#[derive(Clone)]
pub struct PasswordCipher {
    key: [u8; 32],
}

impl std::fmt::Debug for PasswordCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordCipher(..)")
    }
}

impl PasswordCipher {
    /// Derive the key from the two site salts.
    pub fn from_salts(auth_salt: &str, secure_auth_salt: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(auth_salt.as_bytes());
        hasher.update(secure_auth_salt.as_bytes());
        Self {
            key: hasher.finalize().into(),
        }
    }

    fn cipher(&self) -> Cipher {
        Cipher::new(GenericArray::from_slice(&self.key))
    }

    /// Encrypt a password. The empty password stays empty.
    pub fn encrypt(&self, plain: &str) -> Result<String, DomainError> {
        if plain.is_empty() {
            return Ok(String::new());
        }
        let iv: [u8; IV_LEN] = rand::random();
        let sealed = self
            .cipher()
            .encrypt(GenericArray::from_slice(&iv), plain.as_bytes())
            .map_err(|e| DomainError::Crypto(format!("encrypt failed: {}", e)))?;
        let mut blob = Vec::with_capacity(IV_LEN + sealed.len());
        blob.extend_from_slice(&iv);
        blob.extend_from_slice(&sealed);
        Ok(STANDARD.encode(blob))
    }

    /// Decrypt a stored blob. The empty string decrypts to the empty string.
    pub fn decrypt(&self, blob: &str) -> Result<String, DomainError> {
        let blob = blob.trim();
        if blob.is_empty() {
            return Ok(String::new());
        }
        let raw = STANDARD
            .decode(blob)
            .map_err(|e| DomainError::Crypto(format!("not base64: {}", e)))?;
        if raw.len() <= IV_LEN {
            return Err(DomainError::Crypto("ciphertext too short".into()));
        }
        let (iv, sealed) = raw.split_at(IV_LEN);
        let plain = self
            .cipher()
            .decrypt(GenericArray::from_slice(iv), sealed)
            .map_err(|_| DomainError::Crypto("decryption failed (wrong salts?)".into()))?;
        String::from_utf8(plain).map_err(|e| DomainError::Crypto(e.to_string()))
    }
}
