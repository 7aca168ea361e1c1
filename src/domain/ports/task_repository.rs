use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Task, TaskStatus};

/// Repository port for the task collaborator.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a new task.
    async fn create(&self, task: &Task) -> DomainResult<()>;

    /// Get a task by id.
    async fn get(&self, id: Uuid) -> DomainResult<Option<Task>>;

    /// Get a task only if it belongs to the given user.
    async fn get_owned(&self, id: Uuid, owner_id: Uuid) -> DomainResult<Option<Task>>;

    /// Update an existing task.
    async fn update(&self, task: &Task) -> DomainResult<()>;

    /// List a user's tasks, optionally filtered by status, newest first.
    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        status: Option<TaskStatus>,
    ) -> DomainResult<Vec<Task>>;
}
