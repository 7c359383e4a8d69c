use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use once_cell::sync::OnceCell;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Password worker failed: {0}")]
    Worker(String),
}

/// Argon2id password hashing.
///
/// Stored values are PHC strings (`$argon2id$v=19$m=...`) carrying their own salt
/// and cost parameters, so hashes produced under older settings keep verifying.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    // Hash checked when the account does not exist, keeps login timing uniform.
    dummy: Arc<OnceCell<String>>,
}

impl CredentialHasher {
    pub fn new() -> Self {
        Self::from_argon2(Argon2::default())
    }

    /// Build with explicit cost: memory in KiB and number of passes.
    pub fn with_cost(memory_kib: u32, iterations: u32) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, Params::DEFAULT_P_COST, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
        Ok(Self::from_argon2(Argon2::new(Algorithm::Argon2id, Version::V0x13, params)))
    }

    fn from_argon2(argon2: Argon2<'static>) -> Self {
        Self {
            argon2,
            dummy: Arc::new(OnceCell::new()),
        }
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    /// Malformed stored values verify as `false`.
    pub fn verify(&self, plaintext: &str, stored: &str) -> bool {
        match PasswordHash::new(stored) {
            Ok(parsed) => self.argon2.verify_password(plaintext.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }

    /// Spend the same work as a real verification against a throwaway hash.
    pub fn verify_dummy(&self, plaintext: &str) -> bool {
        let dummy = self
            .dummy
            .get_or_init(|| self.hash("incident-api-dummy-password").unwrap_or_default());
        self.verify(plaintext, dummy);
        false
    }

    /// `hash` on the blocking pool.
    pub async fn hash_blocking(&self, plaintext: String) -> Result<String, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| PasswordError::Worker(e.to_string()))?
    }

    /// `verify` on the blocking pool. `None` checks against the dummy hash and always fails.
    pub async fn verify_blocking(
        &self,
        plaintext: String,
        stored: Option<String>,
    ) -> Result<bool, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || match stored {
            Some(stored) => hasher.verify(&plaintext, &stored),
            None => hasher.verify_dummy(&plaintext),
        })
        .await
        .map_err(|e| PasswordError::Worker(e.to_string()))
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher").finish_non_exhaustive()
    }
}
