//! Vault errors.

use deskpilot_protocols::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Encryption failed: {0}")]
    Encrypt(String),

    /// The blob is corrupt, truncated, or was written by another installation.
    #[error("Decryption failed: {0}")]
    Decrypt(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrypt_display() {
        let err = VaultError::Decrypt("authentication tag mismatch".to_string());
        assert!(err.to_string().contains("Decryption failed"));
    }

    #[test]
    fn test_store_from() {
        let err: VaultError = StoreError::Storage("locked".to_string()).into();
        assert!(matches!(err, VaultError::Store(_)));
        assert!(err.to_string().contains("locked"));
    }
}
