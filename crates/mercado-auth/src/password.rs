//! Salted password hashing
//!
//! Credentials are derived with PBKDF2-HMAC-SHA512 over a fresh random salt.
//! Both salt and hash are stored hex-encoded, and the hex text of the salt
//! is what feeds the derivation.

use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha512;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tokio::sync::Semaphore;

use crate::error::AuthError;

/// Random salt length in bytes (before hex encoding)
pub const SALT_LEN: usize = 32;
/// Derived hash length in bytes (before hex encoding)
pub const HASH_LEN: usize = 64;
/// PBKDF2 work factor
pub const PBKDF2_ITERATIONS: u32 = 10_000;

/// Salt and derived hash, both hex-encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub salt: String,
    pub hash: String,
}

/// Hash a password with a freshly generated salt
pub fn hash_password(password: &str) -> PasswordHash {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let salt = hex::encode(salt);
    let hash = hex::encode(derive(password, &salt));
    PasswordHash { salt, hash }
}

/// Verify a password against a stored salt and hash
///
/// The comparison runs in constant time. A malformed `expected_hash`
/// never verifies.
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let Ok(expected) = hex::decode(expected_hash) else {
        return false;
    };
    let actual = derive(password, salt);
    actual.as_slice().ct_eq(expected.as_slice()).into()
}

fn derive(password: &str, salt: &str) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha512>(password.as_bytes(), salt.as_bytes(), PBKDF2_ITERATIONS, &mut out);
    out
}

/// Runs hashing on the blocking thread pool with bounded concurrency
#[derive(Clone)]
pub struct PasswordHasher {
    permits: Arc<Semaphore>,
}

impl PasswordHasher {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub async fn hash(&self, password: &str) -> Result<PasswordHash, AuthError> {
        let password = password.to_string();
        self.run(move || hash_password(&password)).await
    }

    pub async fn verify(
        &self,
        password: &str,
        salt: &str,
        expected_hash: &str,
    ) -> Result<bool, AuthError> {
        let (password, salt, expected_hash) = (
            password.to_string(),
            salt.to_string(),
            expected_hash.to_string(),
        );
        self.run(move || verify_password(&password, &salt, &expected_hash))
            .await
    }

    async fn run<T, F>(&self, f: F) -> Result<T, AuthError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        // The permit moves into the job so it outlives a dropped caller
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| AuthError::Worker(e.to_string()))?;

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            f()
        })
        .await
        .map_err(|e| AuthError::Worker(e.to_string()))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(4)
    }
}
