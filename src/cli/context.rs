//! Shared command context: configuration, pool, and wired services.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{
    all_embedded_migrations, create_pool, verify_connection, Migrator, PoolConfig,
    SqliteSessionRepository, SqliteSettingsRepository, SqliteTaskRepository,
};
use crate::domain::models::config::Config;
use crate::domain::ports::TaskRepository;
use crate::infrastructure::config::ConfigLoader;
use crate::services::{Broadcaster, SessionService, UserLocks};

pub struct CliContext {
    pub config: Config,
    pub pool: SqlitePool,
    pub service: Arc<SessionService>,
    pub tasks: Arc<dyn TaskRepository>,
}

impl CliContext {
    /// Load config, open the database, run pending migrations, and wire the
    /// service graph.
    pub async fn init() -> Result<Self> {
        let config = ConfigLoader::load()?;

        let database_url = format!("sqlite://{}", config.database.path);
        let pool = create_pool(
            &database_url,
            Some(PoolConfig {
                max_connections: config.database.max_connections,
                ..PoolConfig::default()
            }),
        )
        .await
        .context("Failed to open database")?;

        verify_connection(&pool)
            .await
            .context("Database connection check failed")?;

        Migrator::new(pool.clone())
            .run_embedded_migrations(all_embedded_migrations())
            .await
            .context("Failed to run migrations")?;

        Ok(Self::wire(config, pool))
    }

    /// Wire the service graph over an existing pool.
    pub fn wire(config: Config, pool: SqlitePool) -> Self {
        let sessions = Arc::new(SqliteSessionRepository::new(pool.clone()));
        let tasks: Arc<dyn TaskRepository> = Arc::new(SqliteTaskRepository::new(pool.clone()));
        let settings = Arc::new(SqliteSettingsRepository::new(pool.clone()));
        let locks = Arc::new(UserLocks::new(Duration::from_millis(config.lock_wait_ms)));
        let broadcaster = Arc::new(Broadcaster::default());

        let service = Arc::new(SessionService::new(
            sessions,
            Arc::clone(&tasks),
            settings,
            locks,
            broadcaster,
        ));

        Self {
            config,
            pool,
            service,
            tasks,
        }
    }

    /// The user the invocation acts as: `--user` wins, then the configured
    /// default.
    pub fn resolve_user(&self, flag: Option<Uuid>) -> Result<Uuid> {
        flag.or(self.config.default_user).context(
            "No user given. Pass --user <uuid> or set default_user in .focusflow/config.yaml",
        )
    }
}
