//! API error types

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mercado_auth::AuthError;
use mercado_core::CoreError;
use mercado_db::DbError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Auth(e) | ApiError::Core(CoreError::Auth(e)) => return e.into_response(),
            ApiError::BadRequest(msg) | ApiError::Core(CoreError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
            }
            ApiError::Core(CoreError::NotFound(msg)) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::Core(CoreError::Database(DbError::Duplicate(msg))) => {
                (StatusCode::CONFLICT, "CONFLICT", msg)
            }
            ApiError::Core(CoreError::Database(e)) => {
                error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Internal error".to_string(),
                )
            }
        };

        let body = axum::Json(json!({
            "code": code,
            "message": message
        }));

        (status, body).into_response()
    }
}
