use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sha2::{Digest, Sha256};
use thiserror::Error;

const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("invalid base64 blob: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("ciphertext too short")]
    Truncated,

    #[error("encryption failed")]
    Encrypt,

    #[error("decryption failed")]
    Decrypt,

    #[error("decrypted key is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Symmetric storage for wallet private keys.
///
/// The AES-256-GCM key is the SHA-256 digest of the configured secret.
/// Stored blobs are `base64(nonce || ciphertext)`.
#[derive(Clone)]
pub struct KeyVault {
    cipher: Aes256Gcm,
}

impl KeyVault {
    pub fn new(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let key = Key::<Aes256Gcm>::from_slice(digest.as_slice());
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, VaultError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| VaultError::Encrypt)?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(blob))
    }

    pub fn decrypt(&self, blob: &str) -> Result<String, VaultError> {
        let bytes = BASE64.decode(blob)?;
        if bytes.len() <= NONCE_LEN {
            return Err(VaultError::Truncated);
        }

        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| VaultError::Decrypt)?;

        Ok(String::from_utf8(plaintext)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrypts_what_it_encrypted() {
        let vault = KeyVault::new("local-dev-secret");
        let blob = vault.encrypt("5KQwrPbwdL6PhXujxW37FSSQZ1JiwsST").unwrap();

        assert_ne!(blob, "5KQwrPbwdL6PhXujxW37FSSQZ1JiwsST");
        assert_eq!(vault.decrypt(&blob).unwrap(), "5KQwrPbwdL6PhXujxW37FSSQZ1JiwsST");
    }

    #[test]
    fn test_nonce_differs_per_call() {
        let vault = KeyVault::new("local-dev-secret");
        assert_ne!(vault.encrypt("same").unwrap(), vault.encrypt("same").unwrap());
    }

    #[test]
    fn test_wrong_secret_fails() {
        let blob = KeyVault::new("one").encrypt("secret key").unwrap();
        assert!(matches!(
            KeyVault::new("two").decrypt(&blob),
            Err(VaultError::Decrypt)
        ));
    }

    #[test]
    fn test_garbage_blob_is_rejected() {
        let vault = KeyVault::new("local-dev-secret");
        assert!(matches!(vault.decrypt("not base64!"), Err(VaultError::Encoding(_))));
        assert!(matches!(vault.decrypt("AAAA"), Err(VaultError::Truncated)));
    }
}
