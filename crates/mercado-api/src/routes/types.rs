//! Request and response bodies

use mercado_auth::IssuedToken;
use mercado_core::ProductDraft;
use mercado_db::ProductUpdate;
use serde::{Deserialize, Serialize};

/// Name/password pair for admin login, seller registration and seller login
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub name: String,
    pub password: String,
}

/// Issued session token
#[derive(Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_in: i64,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            expires_in: issued.expires_in,
        }
    }
}

/// Create product request; the owner comes from the token
#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub price: f64,
}

impl From<CreateProductRequest> for ProductDraft {
    fn from(request: CreateProductRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            price: request.price,
        }
    }
}

/// Update product request; absent fields are left untouched
#[derive(Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}

impl From<UpdateProductRequest> for ProductUpdate {
    fn from(request: UpdateProductRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            price: request.price,
        }
    }
}
