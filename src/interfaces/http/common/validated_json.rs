//! Validated JSON extractor for Axum
//!
//! `ValidatedJson<T>` works like `axum::Json<T>`, but additionally runs
//! `validator::Validate::validate()` on the deserialized value. Field
//! validation failures are a 422 listing each offending field.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use validator::Validate;

use super::error_response;

pub struct ValidatedJson<T>(pub T);

/// Error type for `ValidatedJson` extraction failures.
pub enum ValidatedJsonRejection {
    JsonError(JsonRejection),
    ValidationError(validator::ValidationErrors),
}

impl ValidatedJsonRejection {
    fn message(&self) -> String {
        match self {
            Self::JsonError(rejection) => format!("Invalid JSON: {}", rejection.body_text()),
            Self::ValidationError(errors) => {
                let mut field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errs)| {
                        errs.iter().map(move |e| {
                            let msg = e
                                .message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string());
                            format!("{}: {}", field, msg)
                        })
                    })
                    .collect();
                field_errors.sort();

                if field_errors.is_empty() {
                    "Validation failed".to_string()
                } else {
                    field_errors.join("; ")
                }
            }
        }
    }
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        let status = match &self {
            // 400 for syntax errors, 422 for well-formed JSON of the wrong shape
            Self::JsonError(rejection) => rejection.status(),
            Self::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        error_response(status, self.message()).into_response()
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: axum::extract::Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::JsonError)?;

        value
            .validate()
            .map_err(ValidatedJsonRejection::ValidationError)?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::post;
    use axum::Router;
    use tower::ServiceExt;

    use crate::interfaces::http::modules::api_keys::dto::{
        CreateApiKeyRequest, DeleteApiKeyRequest,
    };

    async fn create(ValidatedJson(body): ValidatedJson<CreateApiKeyRequest>) -> String {
        body.name
    }

    async fn delete(ValidatedJson(body): ValidatedJson<DeleteApiKeyRequest>) -> String {
        body.id
    }

    fn app() -> Router {
        Router::new()
            .route("/create", post(create))
            .route("/delete", post(delete))
    }

    async fn send(uri: &str, body: &'static str) -> StatusCode {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        app().oneshot(req).await.unwrap().status()
    }

    #[tokio::test]
    async fn valid_body_returns_ok() {
        assert_eq!(send("/create", r#"{"name":"CI"}"#).await, StatusCode::OK);
        assert_eq!(
            send("/delete", r#"{"id":"7d0e4a4e-8f0a-4c1e-9d55-3a2f1b6c9e01"}"#).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn invalid_json_returns_400() {
        assert_eq!(send("/create", "not json").await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_field_is_rejected() {
        assert_eq!(
            send("/delete", "{}").await,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn validation_failure_returns_422() {
        assert_eq!(
            send("/create", r#"{"name":""}"#).await,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            send("/delete", r#"{"id":"not-a-uuid"}"#).await,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
