//! Mercado Core Business Logic
//!
//! This crate provides the catalog and account services: listing filters,
//! product ownership checks, and seller registration and login.

pub mod accounts;
pub mod catalog;
pub mod error;
pub mod filter;

pub use accounts::AccountService;
pub use catalog::{CatalogService, ProductDraft};
pub use error::CoreError;
pub use filter::{build_filter, FilterParams};
