//! Administrator and seller credential routes

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::post,
    Json, Router,
};
use mercado_auth::require_admin;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{CredentialsRequest, TokenResponse};

/// POST /admin
async fn admin_login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(request) = payload?;

    let issued = state.admin_gate.login(&request.name, &request.password)?;

    info!("Administrator logged in");
    Ok(Json(issued.into()))
}

/// POST /register (admin token required)
async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let Json(request) = payload?;

    let issued = state
        .accounts
        .register(&request.name, &request.password)
        .await?;

    Ok((StatusCode::CREATED, Json(issued.into())))
}

/// POST /login (admin token required)
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(request) = payload?;

    let issued = state.accounts.login(&request.name, &request.password).await?;

    Ok(Json(issued.into()))
}

/// Create credential routes
pub fn routes(state: &AppState) -> Router<AppState> {
    let admin_only = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route_layer(from_fn_with_state(state.admin_gate.clone(), require_admin));

    Router::new()
        .route("/admin", post(admin_login))
        .merge(admin_only)
}
