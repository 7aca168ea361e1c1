use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::PomodoroSettings;

/// Repository port for per-user settings.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Settings for a user; defaults when none are stored.
    async fn get(&self, user_id: Uuid) -> DomainResult<PomodoroSettings>;

    /// Upsert a user's settings.
    async fn set(&self, user_id: Uuid, settings: &PomodoroSettings) -> DomainResult<()>;
}
