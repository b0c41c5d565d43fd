use async_trait::async_trait;

use super::{ApiKey, CreateApiKeyDto, LockedApiKey};
use crate::domain::DomainResult;
use crate::shared::Pagination;

#[async_trait]
pub trait ApiKeyRepositoryInterface: Send + Sync {
    async fn create_api_key(&self, dto: CreateApiKeyDto) -> DomainResult<ApiKey>;

    /// Keys owned by `user_id`, newest first, restricted to the given window.
    async fn list_api_keys_for_user(
        &self,
        user_id: &str,
        pagination: Pagination,
    ) -> DomainResult<Vec<ApiKey>>;

    async fn find_by_secret_hash(&self, secret_hash: &str) -> DomainResult<Option<ApiKey>>;

    /// Within one transaction: load `id` under an exclusive row lock
    /// (`NotFound` if absent), run `guard` against it, then delete the row.
    /// An error from `guard` rolls the transaction back.
    async fn delete_api_key_locked(
        &self,
        id: &str,
        guard: &(dyn for<'k> Fn(&'k LockedApiKey) -> DomainResult<()> + Send + Sync),
    ) -> DomainResult<()>;

    async fn touch_last_active(&self, id: &str) -> DomainResult<()>;
}
