//! API key lifecycle: create, list, delete.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{
    authorize, Action, Actor, ApiKey, ApiKeyRepositoryInterface, CreateApiKeyDto, DomainError,
    DomainResult, Resource,
};
use crate::infrastructure::crypto::api_key::generate_api_key;
use crate::shared::Pagination;

/// A freshly created key together with its one-time plaintext secret.
#[derive(Debug, Clone)]
pub struct CreatedApiKey {
    pub api_key: ApiKey,
    pub secret: String,
}

pub struct ApiKeyService<R: ApiKeyRepositoryInterface> {
    repo: Arc<R>,
}

impl<R: ApiKeyRepositoryInterface> ApiKeyService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Issue a new key owned by `actor`.
    pub async fn create(&self, actor: &Actor, name: &str) -> DomainResult<CreatedApiKey> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::Validation("name is required".into()));
        }

        authorize(actor, Action::CreateApiKey, &Resource::Team { id: &actor.team_id })
            .inspect_err(|_| warn!(user_id = %actor.user_id, "API key creation denied"))?;

        let generated = generate_api_key();
        let api_key = self
            .repo
            .create_api_key(CreateApiKeyDto {
                name: name.to_string(),
                user_id: actor.user_id.clone(),
                secret_hash: generated.secret_hash,
                last4: generated.last4,
            })
            .await?;

        info!(user_id = %actor.user_id, api_key_id = %api_key.id, "API key created");
        Ok(CreatedApiKey {
            api_key,
            secret: generated.secret,
        })
    }

    /// The actor's own keys, newest first. Scoping is done by the query
    /// filter; there is no separate policy check.
    pub async fn list(&self, actor: &Actor, pagination: Pagination) -> DomainResult<Vec<ApiKey>> {
        self.repo
            .list_api_keys_for_user(&actor.user_id, pagination)
            .await
    }

    /// Delete `id` if it exists and `actor` may delete that specific key.
    pub async fn delete(&self, actor: &Actor, id: &str) -> DomainResult<()> {
        let guard = |locked: &crate::domain::LockedApiKey| {
            let resource = Resource::ApiKey {
                key: &locked.key,
                owner_team_id: locked.owner_team_id.as_deref(),
            };
            authorize(actor, Action::Delete, &resource).inspect_err(|_| {
                warn!(user_id = %actor.user_id, api_key_id = %locked.key.id, "API key deletion denied")
            })
        };

        self.repo.delete_api_key_locked(id, &guard).await?;

        info!(user_id = %actor.user_id, api_key_id = %id, "API key deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::infrastructure::crypto::api_key::hash_api_key;
    use crate::infrastructure::database::repositories::ApiKeyRepository;
    use crate::test_support::{count_keys, insert_key_at, seed_user, setup_db};
    use chrono::{Duration, Utc};
    use sea_orm::DatabaseConnection;

    fn actor(user_id: &str, team_id: &str, role: UserRole) -> Actor {
        Actor {
            user_id: user_id.to_string(),
            team_id: team_id.to_string(),
            role,
        }
    }

    fn service(db: &DatabaseConnection) -> ApiKeyService<ApiKeyRepository> {
        ApiKeyService::new(Arc::new(ApiKeyRepository::new(db.clone())))
    }

    #[tokio::test]
    async fn created_key_is_first_in_listing() {
        let db = setup_db().await;
        let alice = seed_user(&db, "team-a", "alice", UserRole::Member).await;
        insert_key_at(&db, &alice, "older", Utc::now() - Duration::hours(1)).await;
        let svc = service(&db);
        let me = actor(&alice, "team-a", UserRole::Member);

        let created = svc.create(&me, "  fresh  ").await.unwrap();
        assert_eq!(created.api_key.name, "fresh");
        assert_eq!(created.api_key.user_id, alice);
        assert_eq!(created.api_key.secret_hash, hash_api_key(&created.secret));
        assert!(created.secret.ends_with(&created.api_key.last4));

        let keys = svc.list(&me, Pagination::new(0, 25)).await.unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].id, created.api_key.id);
    }

    #[tokio::test]
    async fn viewer_cannot_create() {
        let db = setup_db().await;
        let viewer = seed_user(&db, "team-a", "vera", UserRole::Viewer).await;
        let svc = service(&db);

        let err = svc
            .create(&actor(&viewer, "team-a", UserRole::Viewer), "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert_eq!(count_keys(&db).await, 0);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let db = setup_db().await;
        let alice = seed_user(&db, "team-a", "alice", UserRole::Member).await;
        let svc = service(&db);

        let err = svc
            .create(&actor(&alice, "team-a", UserRole::Member), "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn list_never_returns_other_users_keys() {
        let db = setup_db().await;
        let alice = seed_user(&db, "team-a", "alice", UserRole::Member).await;
        let bob = seed_user(&db, "team-a", "bob", UserRole::Admin).await;
        insert_key_at(&db, &alice, "alice-key", Utc::now()).await;
        let svc = service(&db);

        let keys = svc
            .list(&actor(&bob, "team-a", UserRole::Admin), Pagination::new(0, 25))
            .await
            .unwrap();
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn delete_own_key() {
        let db = setup_db().await;
        let alice = seed_user(&db, "team-a", "alice", UserRole::Member).await;
        let key_id = insert_key_at(&db, &alice, "k", Utc::now()).await;
        let svc = service(&db);

        svc.delete(&actor(&alice, "team-a", UserRole::Member), &key_id)
            .await
            .unwrap();
        assert_eq!(count_keys(&db).await, 0);
    }

    #[tokio::test]
    async fn delete_missing_key_changes_nothing() {
        let db = setup_db().await;
        let alice = seed_user(&db, "team-a", "alice", UserRole::Member).await;
        insert_key_at(&db, &alice, "k", Utc::now()).await;
        let svc = service(&db);

        let err = svc
            .delete(
                &actor(&alice, "team-a", UserRole::Member),
                &uuid::Uuid::new_v4().to_string(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert_eq!(count_keys(&db).await, 1);
    }

    #[tokio::test]
    async fn delete_other_users_key_is_forbidden_and_keeps_row() {
        let db = setup_db().await;
        let alice = seed_user(&db, "team-a", "alice", UserRole::Member).await;
        let mallory = seed_user(&db, "team-a", "mallory", UserRole::Member).await;
        let key_id = insert_key_at(&db, &alice, "k", Utc::now()).await;
        let svc = service(&db);

        let err = svc
            .delete(&actor(&mallory, "team-a", UserRole::Member), &key_id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert_eq!(count_keys(&db).await, 1);
    }

    #[tokio::test]
    async fn team_admin_may_delete_members_key() {
        let db = setup_db().await;
        let alice = seed_user(&db, "team-a", "alice", UserRole::Member).await;
        let admin = seed_user(&db, "team-a", "root", UserRole::Admin).await;
        let outsider = seed_user(&db, "team-b", "other-root", UserRole::Admin).await;
        let key_id = insert_key_at(&db, &alice, "k", Utc::now()).await;
        let svc = service(&db);

        let err = svc
            .delete(&actor(&outsider, "team-b", UserRole::Admin), &key_id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        svc.delete(&actor(&admin, "team-a", UserRole::Admin), &key_id)
            .await
            .unwrap();
        assert_eq!(count_keys(&db).await, 0);
    }
}
