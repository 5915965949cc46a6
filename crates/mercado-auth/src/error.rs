//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing token")]
    MissingToken,

    #[error("Invalid authorization header format")]
    InvalidAuthHeader,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid admin credentials")]
    InvalidAdminCredentials,

    #[error("Only the product owner can modify or delete it")]
    NotResourceOwner,

    #[error("Claim '{0}' is reserved")]
    ReservedClaim(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Hashing worker error: {0}")]
    Worker(String),
}

impl AuthError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::ReservedClaim(_) | AuthError::Jwt(_) | AuthError::Worker(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Short machine-readable reason, used as a metrics label
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::InvalidToken => "invalid_token",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::InvalidAdminCredentials => "invalid_admin_credentials",
            AuthError::NotResourceOwner => "not_resource_owner",
            AuthError::ReservedClaim(_) => "reserved_claim",
            AuthError::Jwt(_) => "jwt",
            AuthError::Worker(_) => "worker",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Authentication internal error: {}", self);
            "Internal error".to_string()
        } else {
            self.to_string()
        };

        let body = axum::Json(json!({
            "code": self.reason().to_uppercase(),
            "message": message
        }));

        (status, body).into_response()
    }
}
