//! Symmetric encryption for stored certificate passwords.
//!
//! Values are sealed with AES-256-GCM under a fresh random nonce and stored
//! as `nonce:ciphertext`, both base64.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose, Engine as _};

use crate::errors::{AppError, AppResult};

const NONCE_LEN: usize = 12;

/// AES-256-GCM cipher bound to the configured key
#[derive(Clone)]
pub struct SecretCipher {
    cipher: Aes256Gcm,
}

impl SecretCipher {
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: Aes256Gcm::new(key.into()),
        }
    }

    pub fn encrypt(&self, plaintext: &str) -> AppResult<String> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| AppError::internal(format!("Encryption failed: {}", e)))?;

        Ok(format!(
            "{}:{}",
            general_purpose::STANDARD.encode(nonce),
            general_purpose::STANDARD.encode(ciphertext)
        ))
    }

    pub fn decrypt(&self, sealed: &str) -> AppResult<String> {
        let (nonce_b64, data_b64) = sealed
            .split_once(':')
            .ok_or_else(|| AppError::internal("Malformed encrypted value"))?;

        let nonce_bytes = general_purpose::STANDARD
            .decode(nonce_b64)
            .map_err(|e| AppError::internal(format!("Invalid nonce encoding: {}", e)))?;
        if nonce_bytes.len() != NONCE_LEN {
            return Err(AppError::internal("Invalid nonce length"));
        }
        let ciphertext = general_purpose::STANDARD
            .decode(data_b64)
            .map_err(|e| AppError::internal(format!("Invalid ciphertext encoding: {}", e)))?;

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
            .map_err(|e| AppError::internal(format!("Decryption failed: {}", e)))?;

        String::from_utf8(plaintext)
            .map_err(|e| AppError::internal(format!("Decrypted value is not UTF-8: {}", e)))
    }
}

impl std::fmt::Debug for SecretCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretCipher([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt() {
        let cipher = SecretCipher::new(&[1u8; 32]);
        let sealed = cipher.encrypt("pfx-senha-123").unwrap();

        assert!(!sealed.contains("pfx-senha-123"));
        assert_eq!(cipher.decrypt(&sealed).unwrap(), "pfx-senha-123");
    }

    #[test]
    fn test_nonce_is_random() {
        let cipher = SecretCipher::new(&[1u8; 32]);
        assert_ne!(cipher.encrypt("same").unwrap(), cipher.encrypt("same").unwrap());
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = SecretCipher::new(&[1u8; 32]).encrypt("secret").unwrap();
        assert!(SecretCipher::new(&[2u8; 32]).decrypt(&sealed).is_err());
    }

    #[test]
    fn test_tampered_ciphertext_rejected() {
        let cipher = SecretCipher::new(&[1u8; 32]);
        let sealed = cipher.encrypt("pfx-senha-123").unwrap();
        let (nonce, data) = sealed.split_once(':').unwrap();

        let mut bytes = general_purpose::STANDARD.decode(data).unwrap();
        bytes[0] ^= 0x01;
        let tampered = format!("{}:{}", nonce, general_purpose::STANDARD.encode(&bytes));
        assert!(cipher.decrypt(&tampered).is_err());

        let mut nonce_bytes = general_purpose::STANDARD.decode(nonce).unwrap();
        nonce_bytes[NONCE_LEN - 1] ^= 0x80;
        let moved = format!("{}:{}", general_purpose::STANDARD.encode(&nonce_bytes), data);
        assert!(cipher.decrypt(&moved).is_err());
    }

    #[test]
    fn test_malformed_input() {
        let cipher = SecretCipher::new(&[1u8; 32]);
        assert!(cipher.decrypt("no-separator").is_err());
        assert!(cipher.decrypt("AAAA:BBBB").is_err());
    }
}
