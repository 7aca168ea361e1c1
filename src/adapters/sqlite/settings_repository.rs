//! SQLite implementation of the SettingsRepository.
//!
//! Settings live in a single JSON column; missing rows and missing fields
//! both fall back to serde defaults.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::PomodoroSettings;
use crate::domain::ports::SettingsRepository;

#[derive(Clone)]
pub struct SqliteSettingsRepository {
    pool: SqlitePool,
}

impl SqliteSettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for SqliteSettingsRepository {
    async fn get(&self, user_id: Uuid) -> DomainResult<PomodoroSettings> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT settings FROM user_settings WHERE user_id = ?")
                .bind(user_id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((json,)) => Ok(serde_json::from_str(&json)?),
            None => Ok(PomodoroSettings::default()),
        }
    }

    async fn set(&self, user_id: Uuid, settings: &PomodoroSettings) -> DomainResult<()> {
        let json = serde_json::to_string(settings)?;
        sqlx::query(
            "INSERT INTO user_settings (user_id, settings, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET settings = excluded.settings,
             updated_at = excluded.updated_at",
        )
        .bind(user_id.to_string())
        .bind(&json)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{all_embedded_migrations, create_test_pool, Migrator};

    async fn setup_test_repo() -> SqliteSettingsRepository {
        let pool = create_test_pool().await.unwrap();
        let migrator = Migrator::new(pool.clone());
        migrator
            .run_embedded_migrations(all_embedded_migrations())
            .await
            .unwrap();
        SqliteSettingsRepository::new(pool)
    }

    #[tokio::test]
    async fn test_defaults_when_absent() {
        let repo = setup_test_repo().await;
        let settings = repo.get(Uuid::new_v4()).await.unwrap();
        assert_eq!(settings, PomodoroSettings::default());
    }

    #[tokio::test]
    async fn test_set_and_get_round_trip() {
        let repo = setup_test_repo().await;
        let user = Uuid::new_v4();

        let mut settings = PomodoroSettings {
            focus_minutes: 50,
            auto_start_focus: false,
            ..PomodoroSettings::default()
        };
        repo.set(user, &settings).await.unwrap();

        assert_eq!(repo.get(user).await.unwrap(), settings);

        // Upsert overwrites
        settings.long_break_every = 3;
        repo.set(user, &settings).await.unwrap();
        assert_eq!(repo.get(user).await.unwrap().long_break_every, 3);
    }
}
