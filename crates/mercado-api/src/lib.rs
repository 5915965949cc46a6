//! Mercado REST API
//!
//! This crate provides the Axum-based HTTP API for the marketplace:
//! credential endpoints, the product catalog, health, and metrics.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
