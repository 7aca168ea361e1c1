use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Pause, Session};

/// Repository port for session and pause persistence.
///
/// Sessions are returned with their pause history loaded. Multi-statement
/// writes (`complete`) run inside a single transaction so a failure midway
/// leaves prior state untouched.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert a new session.
    async fn create(&self, session: &Session) -> DomainResult<()>;

    /// Get a session by id, with pauses.
    async fn get(&self, id: Uuid) -> DomainResult<Option<Session>>;

    /// The user's open (non-completed) session of any kind, if one exists.
    async fn find_active(&self, user_id: Uuid) -> DomainResult<Option<Session>>;

    /// The user's open session for a specific task.
    async fn find_active_for_task(
        &self,
        user_id: Uuid,
        task_id: Uuid,
    ) -> DomainResult<Option<Session>>;

    /// All sessions recorded against a task, oldest first.
    async fn list_for_task(&self, user_id: Uuid, task_id: Uuid) -> DomainResult<Vec<Session>>;

    /// Number of completed focus sessions recorded against a task.
    async fn count_completed_focus(&self, task_id: Uuid) -> DomainResult<i64>;

    /// Sum of `actual_duration_seconds` over a task's completed focus
    /// sessions.
    async fn sum_focus_seconds(&self, task_id: Uuid) -> DomainResult<i64>;

    /// Record a new pause.
    async fn create_pause(&self, pause: &Pause) -> DomainResult<()>;

    /// Close a pause by setting `resumed_at`.
    async fn close_pause(&self, pause_id: Uuid, resumed_at: DateTime<Utc>) -> DomainResult<()>;

    /// Atomically complete a session: close any dangling pause at `ended_at`,
    /// set `ended_at`, freeze `actual_duration_seconds`, and flip `completed`.
    /// Fails with `AlreadyCompleted` if the session is already done.
    async fn complete(
        &self,
        session_id: Uuid,
        ended_at: DateTime<Utc>,
        actual_duration_seconds: i64,
    ) -> DomainResult<()>;
}
