//! JWT token management

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::AuthError;

/// Claim names owned by the token service
const RESERVED_CLAIMS: [&str; 3] = ["sub", "iat", "exp"];

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject (seller or admin name)
    pub sub: String,
    /// Additional attributes supplied at issuance
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Read a string attribute from the extra claims
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

/// A signed token and its lifetime in seconds
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

/// JWT manager for token generation and validation
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

impl JwtManager {
    /// Create a new JWT manager
    pub fn new(secret: &str, token_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            token_ttl,
        }
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Issue a token for `subject` with the configured lifetime
    pub fn issue(&self, subject: &str, extra: Map<String, Value>) -> Result<IssuedToken, AuthError> {
        self.issue_with_ttl(subject, extra, self.token_ttl)
    }

    /// Issue a token for `subject` valid for `ttl`
    ///
    /// Everything in `extra` is embedded verbatim and is readable by anyone
    /// holding the token; never pass secrets here.
    pub fn issue_with_ttl(
        &self,
        subject: &str,
        extra: Map<String, Value>,
        ttl: Duration,
    ) -> Result<IssuedToken, AuthError> {
        if let Some(key) = RESERVED_CLAIMS.iter().find(|k| extra.contains_key(**k)) {
            return Err(AuthError::ReservedClaim(key.to_string()));
        }

        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            extra,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        debug!("Issuing token for: {}", subject);

        Ok(IssuedToken {
            token: self.sign(&claims)?,
            expires_in: ttl.num_seconds(),
        })
    }

    /// Sign claims as-is
    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(AuthError::Jwt)
    }

    /// Validate a JWT token and return claims
    ///
    /// The signature is checked before any claim is trusted.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken,
                }
            })?;

        let now = Utc::now().timestamp();
        if token_data.claims.exp < now {
            return Err(AuthError::TokenExpired);
        }

        Ok(token_data.claims)
    }
}
