//! Server runtime
//!
//! [`ServerHandle`] owns the whole lifecycle: database connection,
//! migrations, admin seeding, the REST API listener, and graceful shutdown.

use std::net::SocketAddr;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::config::{AdminConfig, AppConfig};
use crate::domain::{DomainError, DomainResult, UserRole};
use crate::infrastructure::crypto::password::hash_password;
use crate::infrastructure::database::entities::{team, user};
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::database::repositories::user_repository::domain_role_to_entity;
use crate::infrastructure::init_database;
use crate::interfaces::http::create_api_router;
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Options for starting the service.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Seed a team and admin user when no users exist (default: true).
    pub create_default_admin: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            create_default_admin: true,
        }
    }
}

/// Handle to a running service.
///
/// ```rust,no_run
/// use apikeys_service::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.shutdown_signal().wait().await;
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Address the REST API is bound to.
    pub local_addr: SocketAddr,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let config = opts.config;
        config.validate()?;

        info!("Starting API keys service...");

        let db = init_database(&config.database_config()).await?;

        if opts.auto_migrate {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");
        }

        if opts.create_default_admin {
            if let Err(e) = create_default_admin(&db, &config.admin).await {
                error!("Failed to create default admin: {}", e);
            }
        }

        let jwt_config = config.jwt_config();
        info!(
            "JWT configured with {}h token expiration",
            jwt_config.expiration_hours
        );

        let router = create_api_router(db.clone(), jwt_config, config.pagination_limits());

        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);
        let listener = tokio::net::TcpListener::bind(config.server.address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_shutdown = shutdown.signal();
        let api_server = axum::serve(listener, router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            config,
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Trigger shutdown on SIGINT / SIGTERM.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait until shutdown is triggered, drain the API server (bounded by
    /// `server.shutdown_timeout`) and close the database.
    pub async fn wait(self) {
        let Self {
            shutdown,
            api_task,
            db,
            ..
        } = self;

        let completed = shutdown
            .shutdown_with_cleanup(|| async move {
                if let Err(e) = api_task.await {
                    error!("REST API task panicked: {}", e);
                }
            })
            .await;
        if !completed {
            warn!("In-flight requests were still running at shutdown");
        }

        if let Err(e) = db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }

        info!("API keys service stopped");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Seed a team and an admin user when the users table is empty.
///
/// Returns `true` if the admin was created.
pub async fn create_default_admin(
    db: &DatabaseConnection,
    admin: &AdminConfig,
) -> DomainResult<bool> {
    if user::Entity::find().count(db).await? > 0 {
        return Ok(false);
    }

    info!("Creating default team and admin user...");

    let password_hash = hash_password(&admin.password)
        .map_err(|e| DomainError::Storage(format!("Failed to hash admin password: {}", e)))?;
    let now = Utc::now();
    let team_id = uuid::Uuid::new_v4().to_string();

    let txn = db.begin().await?;

    team::ActiveModel {
        id: Set(team_id.clone()),
        name: Set(admin.team_name.clone()),
        created_at: Set(now),
    }
    .insert(&txn)
    .await?;

    user::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        team_id: Set(team_id),
        username: Set(admin.username.clone()),
        email: Set(admin.email.clone()),
        password_hash: Set(password_hash),
        role: Set(domain_role_to_entity(UserRole::Admin)),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(username = %admin.username, "Default admin created");
    warn!("Change the default admin password immediately");
    Ok(true)
}

/// Initialize tracing from the logging config. `RUST_LOG` overrides the
/// configured level. Call once, before [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use crate::test_support::setup_db;

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config.server.shutdown_timeout = 5;
        config.database.url = "sqlite::memory:".to_string();
        config.database.max_connections = 1;
        config
    }

    #[tokio::test]
    async fn default_admin_is_seeded_once() {
        let db = setup_db().await;
        let admin = AdminConfig {
            password: "pw".to_string(),
            ..AdminConfig::default()
        };

        assert!(create_default_admin(&db, &admin).await.unwrap());
        assert!(!create_default_admin(&db, &admin).await.unwrap());

        let users = user::Entity::find().all(&db).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, user::UserRole::Admin);
        assert_eq!(team::Entity::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn serves_health_and_shuts_down() {
        let handle = ServerHandle::start(ServerOptions {
            config: test_config(),
            auto_migrate: true,
            create_default_admin: false,
        })
        .await
        .unwrap();
        assert!(handle.is_running());

        let mut stream = tokio::net::TcpStream::connect(handle.local_addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"), "{}", response);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn invalid_config_refuses_to_start() {
        let mut config = test_config();
        config.pagination.default_limit = 0;

        let result = ServerHandle::start(ServerOptions {
            config,
            auto_migrate: false,
            create_default_admin: false,
        })
        .await;
        assert!(result.is_err());
    }
}
