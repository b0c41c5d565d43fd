//! Database entities module

pub mod api_key;
pub mod team;
pub mod user;

pub use api_key::Entity as ApiKey;
pub use team::Entity as Team;
pub use user::Entity as User;
