//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::common::{ApiResponse, PaginationMeta, SuccessResponse};
use super::middleware::{auth_middleware, member_middleware, AuthState};
use super::modules::request_id::request_id_middleware;
use super::modules::{api_keys, auth, health};
use crate::application::api_keys::ApiKeyService;
use crate::application::identity::IdentityService;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::database::repositories::{ApiKeyRepository, UserRepository};
use crate::shared::PaginationLimits;

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some("JWT from auth.login, or an API key"))
                        .build(),
                ),
            );
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        api_keys::create_api_key,
        api_keys::list_api_keys,
        api_keys::delete_api_key,
    ),
    components(
        schemas(
            ApiResponse<String>,
            SuccessResponse,
            PaginationMeta,
            health::HealthResponse,
            health::ComponentHealth,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            api_keys::CreateApiKeyRequest,
            api_keys::DeleteApiKeyRequest,
            api_keys::ApiKeyView,
            api_keys::CreatedApiKeyResponse,
            api_keys::ApiKeyListResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check"),
        (name = "Authentication", description = "Password login issuing a JWT"),
        (name = "API Keys", description = "Create, list and delete personal API keys"),
    ),
    info(
        title = "API Keys Service",
        version = "1.0.0",
        description = "API key lifecycle management"
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(
    db: DatabaseConnection,
    jwt_config: JwtConfig,
    pagination: PaginationLimits,
) -> Router {
    let users = Arc::new(UserRepository::new(db.clone()));
    let keys = Arc::new(ApiKeyRepository::new(db.clone()));

    let auth_state = AuthState {
        identity: Arc::new(IdentityService::new(users, keys.clone(), jwt_config)),
    };

    let api_key_state = api_keys::ApiKeyHandlerState {
        service: Arc::new(ApiKeyService::new(keys)),
        pagination,
    };

    let health_state = health::HealthState {
        db,
        started_at: Arc::new(Instant::now()),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public
    let auth_routes = Router::new()
        .route("/api/auth.login", post(auth::login))
        .with_state(auth_state.clone());

    // Authenticated members only; the auth layer is outermost
    let api_key_routes = Router::new()
        .route("/api/apiKeys.create", post(api_keys::create_api_key))
        .route("/api/apiKeys.list", post(api_keys::list_api_keys))
        .route("/api/apiKeys.delete", post(api_keys::delete_api_key))
        .layer(middleware::from_fn(member_middleware))
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .with_state(api_key_state);

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health_state);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .merge(auth_routes)
        .merge(api_key_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
