use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;

use crate::domain::{
    ApiKey, ApiKeyRepositoryInterface, CreateApiKeyDto, DomainError, DomainResult, LockedApiKey,
};
use crate::infrastructure::database::entities::{api_key, user};
use crate::shared::Pagination;

pub struct ApiKeyRepository {
    db: DatabaseConnection,
}

impl ApiKeyRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn api_key_model_to_domain(model: api_key::Model) -> ApiKey {
    ApiKey {
        id: model.id,
        name: model.name,
        secret_hash: model.secret_hash,
        last4: model.last4,
        user_id: model.user_id,
        created_at: model.created_at,
        updated_at: model.updated_at,
        last_active_at: model.last_active_at,
    }
}

#[async_trait]
impl ApiKeyRepositoryInterface for ApiKeyRepository {
    async fn create_api_key(&self, dto: CreateApiKeyDto) -> DomainResult<ApiKey> {
        let now = Utc::now();

        let new_key = api_key::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(dto.name),
            secret_hash: Set(dto.secret_hash),
            last4: Set(dto.last4),
            user_id: Set(dto.user_id),
            created_at: Set(now),
            updated_at: Set(now),
            last_active_at: Set(None),
        };

        let model = new_key.insert(&self.db).await.map_err(|e| {
            if e.to_string().contains("UNIQUE") || e.to_string().contains("duplicate") {
                DomainError::Conflict("API key secret collision".to_string())
            } else {
                DomainError::from(e)
            }
        })?;

        Ok(api_key_model_to_domain(model))
    }

    async fn list_api_keys_for_user(
        &self,
        user_id: &str,
        pagination: Pagination,
    ) -> DomainResult<Vec<ApiKey>> {
        // `id` breaks ties between keys created within the same instant
        let models = api_key::Entity::find()
            .filter(api_key::Column::UserId.eq(user_id))
            .order_by_desc(api_key::Column::CreatedAt)
            .order_by_desc(api_key::Column::Id)
            .offset(pagination.offset)
            .limit(pagination.limit)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(api_key_model_to_domain).collect())
    }

    async fn find_by_secret_hash(&self, secret_hash: &str) -> DomainResult<Option<ApiKey>> {
        let model = api_key::Entity::find()
            .filter(api_key::Column::SecretHash.eq(secret_hash))
            .one(&self.db)
            .await?;

        Ok(model.map(api_key_model_to_domain))
    }

    async fn delete_api_key_locked(
        &self,
        id: &str,
        guard: &(dyn for<'k> Fn(&'k LockedApiKey) -> DomainResult<()> + Send + Sync),
    ) -> DomainResult<()> {
        // Dropping `txn` without commit rolls back and releases the lock
        let txn = self.db.begin().await?;

        // SQLite ignores FOR UPDATE. A no-op write as the first statement
        // takes the database write lock, so a concurrent delete waits on the
        // busy timeout and then sees the committed result.
        if self.db.get_database_backend() == DbBackend::Sqlite {
            let claimed = api_key::Entity::update_many()
                .col_expr(api_key::Column::Id, Expr::col(api_key::Column::Id).into())
                .filter(api_key::Column::Id.eq(id))
                .exec(&txn)
                .await?;
            if claimed.rows_affected == 0 {
                return Err(DomainError::not_found("ApiKey", id));
            }
        }

        let model = api_key::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| DomainError::not_found("ApiKey", id))?;

        let owner_team_id = user::Entity::find_by_id(model.user_id.clone())
            .one(&txn)
            .await?
            .map(|owner| owner.team_id);

        let locked = LockedApiKey {
            key: api_key_model_to_domain(model),
            owner_team_id,
        };
        guard(&locked)?;

        let result = api_key::Entity::delete_by_id(id).exec(&txn).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("ApiKey", id));
        }

        txn.commit().await?;
        debug!(api_key_id = %id, "API key row deleted");
        Ok(())
    }

    async fn touch_last_active(&self, id: &str) -> DomainResult<()> {
        api_key::Entity::update_many()
            .filter(api_key::Column::Id.eq(id))
            .col_expr(api_key::Column::LastActiveAt, Expr::value(Utc::now()))
            .exec(&self.db)
            .await?;

        Ok(())
    }
}
