//! API Key DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::domain::ApiKey;
use crate::interfaces::http::common::PaginationMeta;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({ "name": "CI deploy" }))]
pub struct CreateApiKeyRequest {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DeleteApiKeyRequest {
    #[validate(custom(function = "validate_uuid"))]
    pub id: String,
}

fn validate_uuid(value: &str) -> Result<(), ValidationError> {
    uuid::Uuid::parse_str(value).map(|_| ()).map_err(|_| {
        let mut err = ValidationError::new("uuid");
        err.message = Some("id must be a valid UUID".into());
        err
    })
}

/// Externally presented API key. Carries identifying metadata only;
/// neither the secret nor its hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyView {
    pub id: String,
    pub name: String,
    /// Last four characters of the secret
    pub last4: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_active_at: Option<DateTime<Utc>>,
}

impl From<ApiKey> for ApiKeyView {
    fn from(k: ApiKey) -> Self {
        Self {
            id: k.id,
            name: k.name,
            last4: k.last4,
            user_id: k.user_id,
            created_at: k.created_at,
            updated_at: k.updated_at,
            last_active_at: k.last_active_at,
        }
    }
}

/// Response to `apiKeys.create`. `secret` is shown once and cannot be
/// retrieved again.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedApiKeyResponse {
    pub success: bool,
    pub data: ApiKeyView,
    pub secret: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiKeyListResponse {
    pub success: bool,
    pub pagination: PaginationMeta,
    pub data: Vec<ApiKeyView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_never_serializes_secret_material() {
        let now = Utc::now();
        let view = ApiKeyView::from(ApiKey {
            id: "id-1".into(),
            name: "ci".into(),
            secret_hash: "deadbeefhash".into(),
            last4: "beef".into(),
            user_id: "u1".into(),
            created_at: now,
            updated_at: now,
            last_active_at: None,
        });

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["last4"], "beef");
        assert!(json.get("secretHash").is_none());
        assert!(!json.to_string().contains("deadbeefhash"));
    }
}
