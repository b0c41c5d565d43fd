//! Authentication middleware for Axum
//!
//! Accepts `Authorization: Bearer <jwt | api key>` or `X-API-Key: <api key>`
//! and stores the resolved [`AuthenticatedUser`] in request extensions.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::common::{domain_error, error_response};
use crate::application::identity::{AuthMethod, IdentityService};
use crate::domain::{Actor, User, UserRole};
use crate::infrastructure::database::repositories::{ApiKeyRepository, UserRepository};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Authentication state
#[derive(Clone)]
pub struct AuthState {
    pub identity: Arc<IdentityService<UserRepository, ApiKeyRepository>>,
}

/// Authenticated user information (either from JWT or API key)
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub username: String,
    pub team_id: String,
    pub role: UserRole,
    pub auth_method: AuthMethod,
}

impl AuthenticatedUser {
    pub fn new(user: User, auth_method: AuthMethod) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            team_id: user.team_id,
            role: user.role,
            auth_method,
        }
    }

    /// The policy view of this caller.
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.user_id.clone(),
            team_id: self.team_id.clone(),
            role: self.role,
        }
    }
}

/// Extract the presented credential, preferring `X-API-Key`.
fn extract_credential(request: &Request<Body>) -> Option<String> {
    let headers = request.headers();

    if let Some(key) = headers.get(API_KEY_HEADER).and_then(|h| h.to_str().ok()) {
        return Some(key.trim().to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

/// Authentication middleware - requires a valid JWT or API key
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(credential) = extract_credential(&request) else {
        return error_response(StatusCode::UNAUTHORIZED, "Missing authentication token")
            .into_response();
    };

    match auth_state.identity.authenticate(&credential).await {
        Ok((user, method)) => {
            debug!(user_id = %user.id, ?method, "Request authenticated");
            request
                .extensions_mut()
                .insert(AuthenticatedUser::new(user, method));
            next.run(request).await
        }
        Err(e) => domain_error(e).into_response(),
    }
}

/// Member-only middleware - must be layered inside `auth_middleware`
pub async fn member_middleware(request: Request<Body>, next: Next) -> Response {
    match request.extensions().get::<AuthenticatedUser>() {
        Some(user) if user.role.is_member() => next.run(request).await,
        Some(_) => error_response(StatusCode::FORBIDDEN, "Insufficient permissions").into_response(),
        None => {
            error_response(StatusCode::UNAUTHORIZED, "Missing authentication token").into_response()
        }
    }
}
