//! Mercado Authentication and Authorization
//!
//! This crate provides salted password hashing, JWT session tokens, and
//! the request gates that guard seller and administrator endpoints.

pub mod admin;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use admin::AdminCredentials;
pub use error::AuthError;
pub use jwt::{Claims, IssuedToken, JwtManager};
pub use middleware::{
    extract_bearer_token, require_admin, require_token, AdminGate, AuthUser, Role, TokenGate,
};
pub use password::{hash_password, verify_password, PasswordHash, PasswordHasher};
