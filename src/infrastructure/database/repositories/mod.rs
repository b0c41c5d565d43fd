//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories.

pub mod api_key_repository;
pub mod user_repository;

pub use api_key_repository::ApiKeyRepository;
pub use user_repository::UserRepository;
