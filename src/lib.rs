//! # API Keys Service
//!
//! Lifecycle management for personal API keys: create, list and delete,
//! with authorization decided by a static policy table.
//!
//! ## Architecture
//!
//! - **domain**: entities, repository traits and the authorization policy
//! - **application**: use cases (API key lifecycle, identity)
//! - **infrastructure**: database (SeaORM) and crypto
//! - **interfaces**: HTTP API with Swagger documentation
//! - **server**: runtime lifecycle and tracing setup

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

#[cfg(test)]
mod test_support;

pub use config::{default_config_path, AppConfig, ConfigError};
pub use infrastructure::{init_database, DatabaseConfig};
pub use interfaces::http::create_api_router;
