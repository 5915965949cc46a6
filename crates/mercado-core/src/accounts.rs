//! Seller registration and login

use mercado_auth::{AuthError, IssuedToken, JwtManager, PasswordHasher, Role};
use mercado_db::{CredentialStore, NewSeller};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::CoreError;

/// Maximum allowed seller name length
const MAX_NAME_LENGTH: usize = 64;
/// Maximum allowed password length (prevent DoS with very large passwords)
const MAX_PASSWORD_LENGTH: usize = 256;

/// Verified against when the seller does not exist, so that unknown names
/// cost the same derivation as wrong passwords
const DUMMY_SALT: &str = "timing_attack_prevention";
const DUMMY_HASH: &str = "00000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000";

pub struct AccountService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    jwt: Arc<JwtManager>,
}

impl AccountService {
    pub fn new(store: Arc<dyn CredentialStore>, hasher: PasswordHasher, jwt: Arc<JwtManager>) -> Self {
        Self { store, hasher, jwt }
    }

    /// Register a seller and return their first session token
    pub async fn register(&self, name: &str, password: &str) -> Result<IssuedToken, CoreError> {
        validate_name(name)?;
        validate_password(password)?;

        debug!("Registering seller: {}", name);

        let hashed = self.hasher.hash(password).await?;
        self.store
            .insert_credential(NewSeller {
                name: name.to_string(),
                salt: hashed.salt,
                password_hash: hashed.hash,
            })
            .await?;

        info!("Registered seller {}", name);

        Ok(self.jwt.issue(name, Role::Seller.claims())?)
    }

    /// Check a seller's password and issue a session token
    ///
    /// Input that could never have been registered is reported as invalid
    /// credentials rather than a validation error.
    pub async fn login(&self, name: &str, password: &str) -> Result<IssuedToken, CoreError> {
        if validate_name(name).is_err() || validate_password(password).is_err() {
            metrics::counter!("mercado_logins_total", "outcome" => "failure").increment(1);
            return Err(AuthError::InvalidCredentials.into());
        }

        debug!("Login attempt for seller: {}", name);

        let seller = self.store.find_credential(name).await?;

        // Always derive, even for unknown names
        let (salt, hash) = match &seller {
            Some(s) => (s.salt.as_str(), s.password_hash.as_str()),
            None => (DUMMY_SALT, DUMMY_HASH),
        };
        let password_valid = self.hasher.verify(password, salt, hash).await?;

        if seller.is_none() || !password_valid {
            metrics::counter!("mercado_logins_total", "outcome" => "failure").increment(1);
            return Err(AuthError::InvalidCredentials.into());
        }

        metrics::counter!("mercado_logins_total", "outcome" => "success").increment(1);
        info!("Seller {} logged in successfully", name);

        Ok(self.jwt.issue(name, Role::Seller.claims())?)
    }
}

/// Validate seller name format and length
fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.is_empty() {
        return Err(CoreError::Validation("Name cannot be empty".to_string()));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Name exceeds maximum length of {} characters",
            MAX_NAME_LENGTH
        )));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(CoreError::Validation(
            "Name can only contain alphanumeric characters, underscores, and hyphens".to_string(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), CoreError> {
    if password.is_empty() {
        return Err(CoreError::Validation("Password cannot be empty".to_string()));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}
