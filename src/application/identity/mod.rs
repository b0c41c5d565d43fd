//! Identity: password login and credential resolution

pub mod service;

pub use service::{AuthMethod, AuthResult, IdentityService};
