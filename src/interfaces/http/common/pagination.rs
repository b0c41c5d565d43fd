//! `offset` / `limit` query extraction

use axum::extract::{FromRef, FromRequestParts, Query};
use axum::http::request::Parts;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{domain_error, error_response, ApiError};
use crate::shared::{Pagination, PaginationLimits};

/// Raw pagination query parameters. Kept as strings so that non-numeric
/// input produces a pagination-specific message.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Number of records to skip. Default: 0
    #[param(value_type = Option<u64>)]
    pub offset: Option<String>,
    /// Page size. Default and maximum come from configuration
    #[param(value_type = Option<u64>)]
    pub limit: Option<String>,
}

/// Validated pagination window taken from the query string.
#[derive(Debug, Clone, Copy)]
pub struct PaginationQuery(pub Pagination);

impl<S> FromRequestParts<S> for PaginationQuery
where
    PaginationLimits: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PaginationParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.body_text()))?;

        let limits = PaginationLimits::from_ref(state);
        Pagination::parse(params.offset.as_deref(), params.limit.as_deref(), &limits)
            .map(PaginationQuery)
            .map_err(domain_error)
    }
}

/// Pagination echoed back to the client, with a ready-made link to the
/// next window.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub offset: u64,
    pub limit: u64,
    pub next_path: String,
}

impl PaginationMeta {
    pub fn new(path: &str, pagination: Pagination) -> Self {
        let next = pagination.next();
        Self {
            offset: pagination.offset,
            limit: pagination.limit,
            next_path: format!("{}?offset={}&limit={}", path, next.offset, next.limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_path_points_at_following_window() {
        let meta = PaginationMeta::new("/api/apiKeys.list", Pagination::new(4, 2));
        assert_eq!(meta.offset, 4);
        assert_eq!(meta.limit, 2);
        assert_eq!(meta.next_path, "/api/apiKeys.list?offset=6&limit=2");
    }
}
