//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] mercado_db::DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] mercado_auth::AuthError),

    #[error("{0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}
