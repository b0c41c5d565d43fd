//! ApiKey aggregate
//!
//! Lifecycle is `nonexistent -> active -> deleted`; there is no
//! reactivation and only deletion takes a row lock.

pub mod model;
pub mod repository;

mod dto_create;

pub use dto_create::CreateApiKeyDto;
pub use model::{ApiKey, LockedApiKey};
pub use repository::ApiKeyRepositoryInterface;
