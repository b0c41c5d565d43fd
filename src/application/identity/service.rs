//! Identity: login and credential resolution
//!
//! Resolves a presented credential (JWT or API key) to an active user.
//! HTTP middleware is a thin wrapper around [`IdentityService`].

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{
    ApiKeyRepositoryInterface, DomainError, DomainResult, User, UserRepositoryInterface,
};
use crate::infrastructure::crypto::api_key::{hash_api_key, is_api_key_format};
use crate::infrastructure::crypto::jwt::{create_token, verify_token, JwtConfig};
use crate::infrastructure::crypto::password::verify_password;

/// Authentication result returned after a successful login
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

/// How the caller was authenticated
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthMethod {
    Jwt,
    ApiKey { key_id: String },
}

pub struct IdentityService<U: UserRepositoryInterface, K: ApiKeyRepositoryInterface> {
    users: Arc<U>,
    api_keys: Arc<K>,
    jwt_config: JwtConfig,
}

impl<U, K> IdentityService<U, K>
where
    U: UserRepositoryInterface + 'static,
    K: ApiKeyRepositoryInterface + 'static,
{
    pub fn new(users: Arc<U>, api_keys: Arc<K>, jwt_config: JwtConfig) -> Self {
        Self {
            users,
            api_keys,
            jwt_config,
        }
    }

    /// Authenticate by username + password and issue a JWT.
    pub async fn login(&self, username: &str, password: &str) -> DomainResult<AuthResult> {
        let Some(user) = self.users.get_user_by_username(username).await? else {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        };

        if !user.is_active {
            return Err(DomainError::Unauthorized("Account is disabled".into()));
        }

        let valid = verify_password(password, &user.password_hash).unwrap_or(false);
        if !valid {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        }

        let token = create_token(&user.id, &user.username, &self.jwt_config)
            .map_err(|e| DomainError::Storage(format!("Failed to create token: {}", e)))?;

        Ok(AuthResult {
            token,
            token_type: "Bearer".into(),
            expires_in: self.jwt_config.expiration_hours * 3600,
            user,
        })
    }

    /// Resolve a bearer credential, which is either an API key or a JWT.
    pub async fn authenticate(&self, credential: &str) -> DomainResult<(User, AuthMethod)> {
        if is_api_key_format(credential) {
            self.authenticate_api_key(credential).await
        } else {
            self.authenticate_jwt(credential).await
        }
    }

    async fn authenticate_jwt(&self, token: &str) -> DomainResult<(User, AuthMethod)> {
        let claims = verify_token(token, &self.jwt_config).map_err(|e| {
            debug!("JWT rejected: {}", e);
            DomainError::Unauthorized("Invalid authentication token".into())
        })?;
        if claims.is_expired() {
            return Err(DomainError::Unauthorized("Token has expired".into()));
        }

        let user = self.active_user(&claims.sub).await?;
        Ok((user, AuthMethod::Jwt))
    }

    async fn authenticate_api_key(&self, secret: &str) -> DomainResult<(User, AuthMethod)> {
        let key = self
            .api_keys
            .find_by_secret_hash(&hash_api_key(secret))
            .await?
            .ok_or_else(|| DomainError::Unauthorized("Invalid API key".into()))?;

        let user = self.active_user(&key.user_id).await?;

        // Update last-active timestamp (fire and forget)
        let api_keys = Arc::clone(&self.api_keys);
        let key_id = key.id.clone();
        tokio::spawn(async move {
            if let Err(e) = api_keys.touch_last_active(&key_id).await {
                warn!(api_key_id = %key_id, "Failed to record API key usage: {}", e);
            }
        });

        Ok((user, AuthMethod::ApiKey { key_id: key.id }))
    }

    async fn active_user(&self, user_id: &str) -> DomainResult<User> {
        match self.users.get_user_by_id(user_id).await? {
            Some(user) if user.is_active => Ok(user),
            Some(_) => Err(DomainError::Unauthorized("Account is disabled".into())),
            None => Err(DomainError::Unauthorized("User no longer exists".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CreateApiKeyDto, UserRole};
    use crate::infrastructure::crypto::api_key::generate_api_key;
    use crate::infrastructure::crypto::password::hash_password;
    use crate::infrastructure::database::repositories::{ApiKeyRepository, UserRepository};
    use crate::test_support::{seed_user, seed_user_with_password_hash, setup_db};
    use sea_orm::DatabaseConnection;

    fn identity(db: &DatabaseConnection) -> IdentityService<UserRepository, ApiKeyRepository> {
        IdentityService::new(
            Arc::new(UserRepository::new(db.clone())),
            Arc::new(ApiKeyRepository::new(db.clone())),
            JwtConfig::default(),
        )
    }

    #[tokio::test]
    async fn login_issues_token_that_authenticates() {
        let db = setup_db().await;
        let hash = hash_password("correct horse").unwrap();
        let id = seed_user_with_password_hash(&db, "t", "alice", UserRole::Member, &hash).await;
        let svc = identity(&db);

        assert!(matches!(
            svc.login("alice", "wrong").await,
            Err(DomainError::Unauthorized(_))
        ));

        let auth = svc.login("alice", "correct horse").await.unwrap();
        let (user, method) = svc.authenticate(&auth.token).await.unwrap();
        assert_eq!(user.id, id);
        assert_eq!(method, AuthMethod::Jwt);
    }

    #[tokio::test]
    async fn api_key_secret_authenticates_its_owner() {
        let db = setup_db().await;
        let owner = seed_user(&db, "t", "bot-owner", UserRole::Member).await;
        let generated = generate_api_key();
        let key = ApiKeyRepository::new(db.clone())
            .create_api_key(CreateApiKeyDto {
                name: "bot".into(),
                user_id: owner.clone(),
                secret_hash: generated.secret_hash.clone(),
                last4: generated.last4.clone(),
            })
            .await
            .unwrap();

        let (user, method) = identity(&db).authenticate(&generated.secret).await.unwrap();
        assert_eq!(user.id, owner);
        assert_eq!(method, AuthMethod::ApiKey { key_id: key.id });
    }

    #[tokio::test]
    async fn unknown_credentials_are_unauthorized() {
        let db = setup_db().await;
        let svc = identity(&db);

        let unknown_key = generate_api_key().secret;
        assert!(matches!(
            svc.authenticate(&unknown_key).await,
            Err(DomainError::Unauthorized(_))
        ));
        assert!(matches!(
            svc.authenticate("not.a.jwt").await,
            Err(DomainError::Unauthorized(_))
        ));
    }
}
