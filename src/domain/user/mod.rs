//! User aggregate
//!
//! Users are owned by the identity collaborator; this crate only reads
//! them to resolve the authenticated actor.

pub mod model;
pub mod repository;

pub use model::{User, UserRole};
pub use repository::UserRepositoryInterface;
