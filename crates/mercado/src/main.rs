//! Mercado - marketplace catalog API with seller and administrator access

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

use config::{Config, LoggingConfig};
use mercado_api::{create_router, AppState};
use mercado_auth::{AdminCredentials, JwtManager, PasswordHasher};
use mercado_db::Database;

/// Mercado - marketplace catalog API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "MERCADO_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "MERCADO_PORT")]
    port: Option<u16>,

    /// Token signing secret
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    /// Administrator name
    #[arg(long, env = "ADMIN_NAME")]
    admin_name: Option<String>,

    /// Administrator password
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)?;
    config.apply_overrides(args.secret_key, args.admin_name, args.admin_password);

    init_logging(&config.logging);
    config.validate()?;

    info!("Starting Mercado v{}", env!("CARGO_PKG_VERSION"));

    let metrics_handle = Arc::new(PrometheusBuilder::new().install_recorder()?);

    // Create data directory
    if let Some(parent) = Path::new(&config.database.path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let db_url = format!("sqlite:{}?mode=rwc", config.database.path);
    let db = Database::new(&db_url).await?;

    // Secrets are fixed for the lifetime of the process
    let jwt = Arc::new(JwtManager::new(
        &config.auth.secret_key,
        chrono::Duration::hours(config.auth.token_ttl_hours),
    ));
    let admin = AdminCredentials::new(
        config.auth.admin_name.clone(),
        config.auth.admin_password.clone(),
    );
    let hasher = PasswordHasher::new(config.hashing.max_concurrent);

    let state = AppState::new(db, jwt, admin, hasher);

    let app = create_router(state, Some(metrics_handle)).layer(TraceLayer::new_for_http());

    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
