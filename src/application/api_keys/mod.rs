pub mod service;

pub use service::{ApiKeyService, CreatedApiKey};
