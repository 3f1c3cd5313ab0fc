//! AES-256-GCM encryption with a PBKDF2-derived key.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;
use std::fmt;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::VaultError;
use crate::fingerprint::Fingerprint;

/// Lowest PBKDF2 iteration count the vault accepts.
pub const MIN_ITERATIONS: u32 = 100_000;

const SALT: &[u8] = b"deskpilot-vault-salt-v1";
const NONCE_SIZE: usize = 12;
const KEY_SIZE: usize = 32;

/// Encrypts and decrypts small secrets.
///
/// The key is derived once, on a blocking thread, the first time it is
/// needed and then cached for the life of the vault.
pub struct Vault {
    fingerprint: Fingerprint,
    iterations: u32,
    key: OnceCell<[u8; KEY_SIZE]>,
}

impl Vault {
    pub fn new(fingerprint: Fingerprint) -> Self {
        Self::with_iterations(fingerprint, MIN_ITERATIONS)
    }

    /// Iteration counts below [`MIN_ITERATIONS`] are raised to it.
    pub fn with_iterations(fingerprint: Fingerprint, iterations: u32) -> Self {
        Self {
            fingerprint,
            iterations: iterations.max(MIN_ITERATIONS),
            key: OnceCell::new(),
        }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Encrypt `plaintext` to base64(nonce || ciphertext).
    ///
    /// A fresh nonce is drawn on every call, so equal inputs give
    /// different blobs.
    pub async fn encrypt(&self, plaintext: &str) -> Result<String, VaultError> {
        let key = self.key().await?;
        let cipher =
            Aes256Gcm::new_from_slice(key).map_err(|e| VaultError::Encrypt(e.to_string()))?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| VaultError::Encrypt(e.to_string()))?;

        let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(blob))
    }

    /// Decrypt a blob produced by [`Vault::encrypt`].
    pub async fn decrypt(&self, blob: &str) -> Result<String, VaultError> {
        let bytes = BASE64
            .decode(blob.trim())
            .map_err(|e| VaultError::Decrypt(format!("invalid base64: {}", e)))?;
        if bytes.len() <= NONCE_SIZE {
            return Err(VaultError::Decrypt("blob is too short".to_string()));
        }
        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_SIZE);

        let key = self.key().await?;
        let cipher =
            Aes256Gcm::new_from_slice(key).map_err(|e| VaultError::Decrypt(e.to_string()))?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| VaultError::Decrypt("authentication failed".to_string()))?;

        String::from_utf8(plaintext).map_err(|e| VaultError::Decrypt(e.to_string()))
    }

    async fn key(&self) -> Result<&[u8; KEY_SIZE], VaultError> {
        self.key
            .get_or_try_init(|| {
                let passphrase = self.fingerprint.as_bytes().to_vec();
                let iterations = self.iterations;
                async move {
                    let key = tokio::task::spawn_blocking(move || {
                        derive_key(&passphrase, iterations)
                    })
                    .await
                    .map_err(|e| VaultError::KeyDerivation(e.to_string()))?;
                    debug!("Derived vault key ({} iterations)", iterations);
                    Ok::<_, VaultError>(key)
                }
            })
            .await
    }
}

impl fmt::Debug for Vault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vault")
            .field("iterations", &self.iterations)
            .field("key_ready", &self.key.initialized())
            .finish()
    }
}

fn derive_key(passphrase: &[u8], iterations: u32) -> [u8; KEY_SIZE] {
    let mut key = [0u8; KEY_SIZE];
    pbkdf2::pbkdf2_hmac::<Sha256>(passphrase, SALT, iterations, &mut key);
    key
}
