//! Mercado Database Layer
//!
//! This crate provides the persistence layer for the marketplace,
//! using SQLite via sqlx for sellers and the product catalog.

pub mod error;
pub mod filter;
pub mod models;
pub mod repository;
pub mod store;
pub mod utils;

pub use error::DbError;
pub use filter::{FilterCondition, ProductFilter};
pub use models::*;
pub use repository::Database;
pub use store::{CatalogStore, CredentialStore};
