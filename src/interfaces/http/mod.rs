//! HTTP API
//!
//! - `common`: response envelope, error mapping, extractors
//! - `middleware`: authentication (JWT or API key) and the member gate
//! - `modules`: handlers and DTOs per resource
//! - `router`: route table and Swagger documentation

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiDoc};
