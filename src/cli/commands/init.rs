use std::path::Path;

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::adapters::sqlite::{all_embedded_migrations, create_pool, Migrator, PoolConfig};
use crate::domain::models::config::Config;

const CONFIG_DIR: &str = ".focusflow";
const CONFIG_FILE: &str = ".focusflow/config.yaml";

/// Handle init command
pub async fn handle_init(force: bool, json: bool) -> Result<()> {
    let config_path = Path::new(CONFIG_FILE);
    let already_initialized = config_path.exists();

    if already_initialized && !force {
        anyhow::bail!("Already initialized. Use --force to reinitialize.");
    }

    std::fs::create_dir_all(CONFIG_DIR).context("Failed to create .focusflow directory")?;

    let default_user = Uuid::new_v4();
    std::fs::write(config_path, config_template(default_user))
        .context("Failed to write config file")?;

    let config = Config::default();
    let database_url = format!("sqlite://{}", config.database.path);
    let pool = create_pool(&database_url, Some(PoolConfig::default()))
        .await
        .context("Failed to create database")?;

    let applied = Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .context("Failed to run migrations")?;

    if json {
        let output = serde_json::json!({
            "config": CONFIG_FILE,
            "database": config.database.path,
            "migrations_applied": applied,
            "default_user": default_user,
            "reinitialized": already_initialized,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("FocusFlow initialized!");
        println!("  Config: {CONFIG_FILE}");
        println!("  Database: {}", config.database.path);
        println!("  Migrations applied: {applied}");
        println!("  Default user: {default_user}");
    }

    Ok(())
}

fn config_template(default_user: Uuid) -> String {
    format!(
        r"# FocusFlow configuration
# Overrides: .focusflow/local.yaml, then FOCUSFLOW_* environment variables.

default_user: {default_user}

database:
  path: .focusflow/focusflow.db
  max_connections: 5

logging:
  level: info
  format: pretty

# Milliseconds a command waits for the per-user lock before failing busy.
lock_wait_ms: 5000
"
    )
}
