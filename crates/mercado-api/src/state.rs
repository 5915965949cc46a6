//! Application state

use mercado_auth::{AdminCredentials, AdminGate, JwtManager, PasswordHasher, TokenGate};
use mercado_core::{AccountService, CatalogService};
use mercado_db::Database;
use std::sync::Arc;

/// Prometheus handle rendered by the metrics endpoint
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub accounts: Arc<AccountService>,
    pub token_gate: Arc<TokenGate>,
    pub admin_gate: Arc<AdminGate>,
}

impl AppState {
    pub fn new(
        db: Database,
        jwt: Arc<JwtManager>,
        admin: AdminCredentials,
        hasher: PasswordHasher,
    ) -> Self {
        let db = Arc::new(db);

        Self {
            catalog: Arc::new(CatalogService::new(db.clone())),
            accounts: Arc::new(AccountService::new(db, hasher, jwt.clone())),
            token_gate: Arc::new(TokenGate::new(jwt.clone())),
            admin_gate: Arc::new(AdminGate::new(jwt, admin)),
        }
    }
}
