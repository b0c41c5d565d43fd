//! API key management handlers
//!
//! Authentication and the member gate run as middleware; by the time a
//! handler runs the caller is known and the body has been validated.

use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    Extension, Json,
};

use super::dto::{
    ApiKeyListResponse, ApiKeyView, CreateApiKeyRequest, CreatedApiKeyResponse,
    DeleteApiKeyRequest,
};
use crate::application::api_keys::ApiKeyService;
use crate::infrastructure::database::repositories::ApiKeyRepository;
use crate::interfaces::http::common::{
    domain_error, ApiError, ApiResponse, PaginationMeta, PaginationQuery, SuccessResponse,
    ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::shared::PaginationLimits;

pub const LIST_PATH: &str = "/api/apiKeys.list";

/// API key handler state
#[derive(Clone)]
pub struct ApiKeyHandlerState {
    pub service: Arc<ApiKeyService<ApiKeyRepository>>,
    pub pagination: PaginationLimits,
}

impl FromRef<ApiKeyHandlerState> for PaginationLimits {
    fn from_ref(state: &ApiKeyHandlerState) -> Self {
        state.pagination
    }
}

#[utoipa::path(
    post,
    path = "/api/apiKeys.create",
    tag = "API Keys",
    security(("bearer_auth" = []), ("api_key" = [])),
    request_body = CreateApiKeyRequest,
    responses(
        (status = 200, description = "API key created", body = CreatedApiKeyResponse),
        (status = 401, description = "Not authenticated", body = ApiResponse<String>),
        (status = 403, description = "Not allowed to create keys", body = ApiResponse<String>),
        (status = 422, description = "Validation error", body = ApiResponse<String>)
    )
)]
pub async fn create_api_key(
    State(state): State<ApiKeyHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateApiKeyRequest>,
) -> Result<Json<CreatedApiKeyResponse>, ApiError> {
    let created = state
        .service
        .create(&user.actor(), &request.name)
        .await
        .map_err(domain_error)?;

    Ok(Json(CreatedApiKeyResponse {
        success: true,
        data: ApiKeyView::from(created.api_key),
        secret: created.secret,
    }))
}

#[utoipa::path(
    post,
    path = "/api/apiKeys.list",
    tag = "API Keys",
    security(("bearer_auth" = []), ("api_key" = [])),
    params(crate::interfaces::http::common::pagination::PaginationParams),
    responses(
        (status = 200, description = "Caller's API keys, newest first", body = ApiKeyListResponse),
        (status = 400, description = "Invalid pagination", body = ApiResponse<String>),
        (status = 401, description = "Not authenticated", body = ApiResponse<String>)
    )
)]
pub async fn list_api_keys(
    State(state): State<ApiKeyHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    PaginationQuery(pagination): PaginationQuery,
) -> Result<Json<ApiKeyListResponse>, ApiError> {
    let keys = state
        .service
        .list(&user.actor(), pagination)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiKeyListResponse {
        success: true,
        pagination: PaginationMeta::new(LIST_PATH, pagination),
        data: keys.into_iter().map(ApiKeyView::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/apiKeys.delete",
    tag = "API Keys",
    security(("bearer_auth" = []), ("api_key" = [])),
    request_body = DeleteApiKeyRequest,
    responses(
        (status = 200, description = "API key deleted", body = SuccessResponse),
        (status = 403, description = "Not allowed to delete this key", body = ApiResponse<String>),
        (status = 404, description = "API key not found", body = ApiResponse<String>)
    )
)]
pub async fn delete_api_key(
    State(state): State<ApiKeyHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<DeleteApiKeyRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .service
        .delete(&user.actor(), &request.id)
        .await
        .map_err(domain_error)?;

    Ok(Json(SuccessResponse::ok()))
}
