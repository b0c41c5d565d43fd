//! Shared fixtures for database-backed tests.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use sea_orm_migration::MigratorTrait;

use crate::domain::UserRole;
use crate::infrastructure::database::entities::{api_key, team, user};
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::database::repositories::user_repository::domain_role_to_entity;
use crate::infrastructure::{init_database, DatabaseConfig};

/// Fresh, migrated in-memory database.
pub async fn setup_db() -> DatabaseConnection {
    let db = init_database(&DatabaseConfig::in_memory())
        .await
        .expect("connect in-memory sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

/// Fresh, migrated SQLite database file at `path` with the default pool size.
pub async fn setup_file_db(path: &std::path::Path) -> DatabaseConnection {
    let config = DatabaseConfig::sqlite(&path.to_string_lossy());
    let db = init_database(&config).await.expect("connect sqlite file");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

/// Remove a database file created by [`setup_file_db`] along with its WAL files.
pub fn remove_db_file(path: &std::path::Path) {
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
    }
}

/// Insert a user (creating `team_id` on first use) and return its id.
pub async fn seed_user(
    db: &DatabaseConnection,
    team_id: &str,
    username: &str,
    role: UserRole,
) -> String {
    seed_user_with_password_hash(db, team_id, username, role, "not-a-real-hash").await
}

pub async fn seed_user_with_password_hash(
    db: &DatabaseConnection,
    team_id: &str,
    username: &str,
    role: UserRole,
    password_hash: &str,
) -> String {
    let now = Utc::now();

    if team::Entity::find_by_id(team_id)
        .one(db)
        .await
        .expect("query team")
        .is_none()
    {
        team::ActiveModel {
            id: Set(team_id.to_string()),
            name: Set(format!("Team {}", team_id)),
            created_at: Set(now),
        }
        .insert(db)
        .await
        .expect("insert team");
    }

    let id = uuid::Uuid::new_v4().to_string();
    user::ActiveModel {
        id: Set(id.clone()),
        team_id: Set(team_id.to_string()),
        username: Set(username.to_string()),
        email: Set(format!("{}@example.com", username)),
        password_hash: Set(password_hash.to_string()),
        role: Set(domain_role_to_entity(role)),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("insert user");

    id
}

/// Insert a key with an explicit creation time and return its id.
pub async fn insert_key_at(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
    created_at: DateTime<Utc>,
) -> String {
    let id = uuid::Uuid::new_v4().to_string();
    api_key::ActiveModel {
        id: Set(id.clone()),
        name: Set(name.to_string()),
        secret_hash: Set(format!("hash-{}", id)),
        last4: Set("0000".to_string()),
        user_id: Set(user_id.to_string()),
        created_at: Set(created_at),
        updated_at: Set(created_at),
        last_active_at: Set(None),
    }
    .insert(db)
    .await
    .expect("insert api key");

    id
}

pub async fn count_keys(db: &DatabaseConnection) -> u64 {
    use sea_orm::PaginatorTrait;
    api_key::Entity::find().count(db).await.expect("count keys")
}
