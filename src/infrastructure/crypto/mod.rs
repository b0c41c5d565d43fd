//! Secrets: API key generation, JWT and password hashing

pub mod api_key;
pub mod jwt;
pub mod password;
