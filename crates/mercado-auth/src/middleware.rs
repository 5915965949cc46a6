//! Request gates and their Axum middleware
//!
//! Each gate turns request headers into an [`AuthUser`] or rejects the
//! request with an [`AuthError`]. The middleware functions wrap the gates
//! so they can be chained with `route_layer`; the first rejection ends the
//! request.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::admin::AdminCredentials;
use crate::error::AuthError;
use crate::jwt::{Claims, IssuedToken, JwtManager};

/// Claim carrying the caller's trust tier
pub const ROLE_CLAIM: &str = "role";

const BEARER_SCHEME: &str = "Bearer";

/// Trust tier of an authenticated caller
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Seller,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Seller => "seller",
            Role::Admin => "admin",
        }
    }

    /// Extra claims announcing this role
    pub fn claims(&self) -> Map<String, Value> {
        let mut extra = Map::new();
        extra.insert(ROLE_CLAIM.to_string(), Value::from(self.as_str()));
        extra
    }
}

#[derive(Debug, Clone)]
pub struct ParseRoleError(String);

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid role: {}", self.0)
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seller" => Ok(Role::Seller),
            "admin" => Ok(Role::Admin),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

/// Authenticated caller information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub name: String,
    pub role: Role,
}

impl AuthUser {
    /// Create from JWT claims; tokens without a recognised role are sellers
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            name: claims.sub.clone(),
            role: claims
                .get_str(ROLE_CLAIM)
                .and_then(|r| r.parse().ok())
                .unwrap_or(Role::Seller),
        }
    }
}

/// Extract the bearer token from the authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    // Scheme names are case-insensitive
    let token = match header.split_at_checked(BEARER_SCHEME.len()) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => rest,
        _ => return Err(AuthError::InvalidAuthHeader),
    };

    if token.trim().is_empty() {
        return Err(AuthError::MissingToken);
    }
    if !token.starts_with(' ') {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok(token.trim())
}

/// Admits any caller holding a valid, unexpired token
pub struct TokenGate {
    jwt: Arc<JwtManager>,
}

impl TokenGate {
    pub fn new(jwt: Arc<JwtManager>) -> Self {
        Self { jwt }
    }

    pub fn admit(&self, headers: &HeaderMap) -> Result<AuthUser, AuthError> {
        let token = extract_bearer_token(headers)?;
        let claims = self.jwt.validate_token(token)?;
        Ok(AuthUser::from_claims(&claims))
    }
}

/// Issues administrator tokens and admits only their holders
pub struct AdminGate {
    jwt: Arc<JwtManager>,
    credentials: AdminCredentials,
}

impl AdminGate {
    pub fn new(jwt: Arc<JwtManager>, credentials: AdminCredentials) -> Self {
        Self { jwt, credentials }
    }

    /// Exchange the static administrator credentials for a token
    pub fn login(&self, name: &str, password: &str) -> Result<IssuedToken, AuthError> {
        if !self.credentials.matches(name, password) {
            return Err(AuthError::InvalidAdminCredentials);
        }
        self.jwt.issue(self.credentials.name(), Role::Admin.claims())
    }

    /// Admit a request carrying a valid administrator token
    pub fn admit(&self, headers: &HeaderMap) -> Result<AuthUser, AuthError> {
        let token = extract_bearer_token(headers)?;
        let claims = self.jwt.validate_token(token)?;
        let user = AuthUser::from_claims(&claims);

        if user.role != Role::Admin || user.name != self.credentials.name() {
            return Err(AuthError::InvalidAdminCredentials);
        }

        Ok(user)
    }
}

fn reject(error: AuthError) -> AuthError {
    debug!("Request rejected: {}", error.reason());
    metrics::counter!("mercado_auth_rejections_total", "reason" => error.reason()).increment(1);
    error
}

/// Require a valid token; attaches the [`AuthUser`] to request extensions
pub async fn require_token(
    State(gate): State<Arc<TokenGate>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = gate.admit(request.headers()).map_err(reject)?;

    debug!("Authenticated: {} ({})", user.name, user.role.as_str());

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Require an administrator token; attaches the [`AuthUser`] to request extensions
pub async fn require_admin(
    State(gate): State<Arc<AdminGate>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = gate.admit(request.headers()).map_err(reject)?;

    debug!("Authenticated admin: {}", user.name);

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{HeaderValue, Request, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Extension, Router,
    };
    use chrono::Duration;
    use tower::ServiceExt;

    fn jwt() -> Arc<JwtManager> {
        Arc::new(JwtManager::new("test-secret-key", Duration::hours(1)))
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc")).unwrap(), "abc");
        assert_eq!(extract_bearer_token(&headers("bearer abc")).unwrap(), "abc");
        assert_eq!(extract_bearer_token(&headers("BEARER abc")).unwrap(), "abc");
        assert!(matches!(
            extract_bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingToken)
        ));
        assert!(matches!(
            extract_bearer_token(&headers("Bearer ")),
            Err(AuthError::MissingToken)
        ));
        assert!(matches!(
            extract_bearer_token(&headers("Basic abc")),
            Err(AuthError::InvalidAuthHeader)
        ));
        assert!(matches!(
            extract_bearer_token(&headers("Bearerabc")),
            Err(AuthError::InvalidAuthHeader)
        ));
    }

    #[test]
    fn test_token_gate() {
        let jwt = jwt();
        let gate = TokenGate::new(jwt.clone());
        let token = jwt.issue("alice", Role::Seller.claims()).unwrap().token;

        let user = gate.admit(&headers(&format!("Bearer {}", token))).unwrap();
        assert_eq!(user.name, "alice");
        assert_eq!(user.role, Role::Seller);

        assert!(matches!(
            gate.admit(&headers("Bearer garbage")),
            Err(AuthError::InvalidToken)
        ));

        let expired = jwt
            .issue_with_ttl("alice", Map::new(), Duration::seconds(-60))
            .unwrap()
            .token;
        assert!(matches!(
            gate.admit(&headers(&format!("Bearer {}", expired))),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_admin_gate_login() {
        let jwt = jwt();
        let gate = AdminGate::new(jwt.clone(), AdminCredentials::new("root", "hunter2"));

        let issued = gate.login("root", "hunter2").unwrap();
        let claims = jwt.validate_token(&issued.token).unwrap();
        assert_eq!(claims.sub, "root");
        assert_eq!(claims.get_str(ROLE_CLAIM), Some("admin"));
        assert!(!claims.extra.contains_key("password"));

        for (name, password) in [("ROOT", "hunter2"), ("root", "HUNTER2"), ("root", "")] {
            assert!(matches!(
                gate.login(name, password),
                Err(AuthError::InvalidAdminCredentials)
            ));
        }
    }

    #[test]
    fn test_admin_gate_rejects_seller_tokens() {
        let jwt = jwt();
        let gate = AdminGate::new(jwt.clone(), AdminCredentials::new("root", "hunter2"));

        let admin = gate.login("root", "hunter2").unwrap().token;
        assert!(gate.admit(&headers(&format!("Bearer {}", admin))).is_ok());

        // A seller that happens to share the admin name is still a seller
        let seller = jwt.issue("root", Role::Seller.claims()).unwrap().token;
        assert!(matches!(
            gate.admit(&headers(&format!("Bearer {}", seller))),
            Err(AuthError::InvalidAdminCredentials)
        ));

        let other_admin = jwt.issue("mallory", Role::Admin.claims()).unwrap().token;
        assert!(matches!(
            gate.admit(&headers(&format!("Bearer {}", other_admin))),
            Err(AuthError::InvalidAdminCredentials)
        ));
    }

    async fn whoami(Extension(user): Extension<AuthUser>) -> String {
        user.name
    }

    #[tokio::test]
    async fn test_require_token_middleware() {
        let jwt = jwt();
        let gate = Arc::new(TokenGate::new(jwt.clone()));
        let app = Router::new()
            .route("/me", get(whoami))
            .route_layer(from_fn_with_state(gate, require_token));

        let response = app
            .clone()
            .oneshot(Request::get("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let token = jwt.issue("alice", Role::Seller.claims()).unwrap().token;
        let response = app
            .oneshot(
                Request::get("/me")
                    .header(AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"alice");
    }
}
