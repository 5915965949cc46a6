//! Product catalog routes

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, Request, State,
    },
    http::StatusCode,
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::{get, post, put},
    Extension, Json, Router,
};
use mercado_auth::{require_token, AuthUser};
use mercado_core::FilterParams;
use mercado_db::Product;

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{CreateProductRequest, UpdateProductRequest};

/// Only the owner of the product in the path may continue
///
/// Runs after `require_token`, which attaches the [`AuthUser`].
async fn require_owner(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(user): Extension<AuthUser>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    state.catalog.ensure_owner(&id, &user).await?;
    Ok(next.run(request).await)
}

/// GET /products?search=&priceAtMost=&priceAtLeast=
async fn list_products(
    State(state): State<AppState>,
    query: Result<Query<FilterParams>, QueryRejection>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let Query(params) = query?;

    Ok(Json(state.catalog.list(&params).await?))
}

/// POST /product
async fn create_product(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let Json(request) = payload?;

    let product = state.catalog.create(&user, request.into()).await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /product/{id} (owner only)
async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = payload?;

    state.catalog.update(&id, request.into()).await?;

    Ok(StatusCode::CREATED)
}

/// DELETE /product/{id} (owner only)
async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete(&id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Create product routes
pub fn routes(state: &AppState) -> Router<AppState> {
    let owner_only = Router::new()
        .route("/product/{id}", put(update_product).delete(delete_product))
        .route_layer(from_fn_with_state(state.clone(), require_owner));

    Router::new()
        .route("/products", get(list_products))
        .route("/product", post(create_product))
        .merge(owner_only)
        .route_layer(from_fn_with_state(state.token_gate.clone(), require_token))
}
