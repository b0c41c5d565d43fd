//! Application use cases

pub mod api_keys;
pub mod identity;

pub use api_keys::{ApiKeyService, CreatedApiKey};
pub use identity::{AuthMethod, AuthResult, IdentityService};
