pub mod api_key;
pub mod policy;
pub mod user;

// Re-export commonly used types
pub use api_key::{ApiKey, ApiKeyRepositoryInterface, CreateApiKeyDto, LockedApiKey};
pub use policy::{authorize, can, Action, Actor, Resource, ResourceKind};
pub use user::{User, UserRepositoryInterface, UserRole};

// Re-export DomainError from shared for convenience
pub use crate::shared::errors::{DomainError, DomainResult};
