//! Focus/break chaining after non-manual session completions.
//!
//! Invoked synchronously after a completion commit so ordering relative to
//! the broadcast is deterministic. Manual completions bypass this entirely.

use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::fsm::SessionState;
use crate::domain::models::{BreakType, Session};
use crate::domain::ports::{SessionRepository, SettingsRepository, TaskRepository};
use crate::services::broadcaster::{Broadcaster, SessionNotice};

/// Decides and creates the next session in the chain.
pub struct FlowOrchestrator {
    sessions: Arc<dyn SessionRepository>,
    tasks: Arc<dyn TaskRepository>,
    settings: Arc<dyn SettingsRepository>,
    broadcaster: Arc<Broadcaster>,
}

impl FlowOrchestrator {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        tasks: Arc<dyn TaskRepository>,
        settings: Arc<dyn SettingsRepository>,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        Self {
            sessions,
            tasks,
            settings,
            broadcaster,
        }
    }

    /// React to a committed, non-manual completion. Returns the chained
    /// session, if one was created.
    #[instrument(skip(self, completed), fields(session_id = %completed.id, is_break = completed.is_break))]
    pub async fn handle_completion(&self, completed: &Session) -> DomainResult<Option<Session>> {
        // Task-less sessions have nothing to chain against.
        let Some(task_id) = completed.task_id else {
            debug!("completed session has no task; chain stops");
            return Ok(None);
        };

        if self.task_is_complete(task_id).await? {
            debug!(%task_id, "task already completed; chain stops");
            return Ok(None);
        }

        if completed.is_break {
            self.chain_focus(completed, task_id).await
        } else {
            self.chain_break(completed, task_id).await
        }
    }

    async fn task_is_complete(&self, task_id: Uuid) -> DomainResult<bool> {
        Ok(self
            .tasks
            .get(task_id)
            .await?
            .is_some_and(|t| t.is_completed()))
    }

    /// Focus finished: every Nth completed focus earns a long break.
    async fn chain_break(&self, completed: &Session, task_id: Uuid) -> DomainResult<Option<Session>> {
        let settings = self.settings.get(completed.user_id).await?;
        let completed_focus = self.sessions.count_completed_focus(task_id).await?;

        let every = i64::from(settings.long_break_every.max(1));
        let break_type = if completed_focus % every == 0 {
            BreakType::Long
        } else {
            BreakType::Short
        };

        let session = Session::new_break(
            completed.user_id,
            Some(task_id),
            break_type,
            settings.break_minutes(break_type),
        );
        self.sessions.create(&session).await?;

        debug!(
            %task_id,
            completed_focus,
            break_type = break_type.as_str(),
            "chained break session"
        );
        self.broadcaster.publish_session(&session, false).await;
        Ok(Some(session))
    }

    /// Break finished: start the next focus, unless the user opted out.
    async fn chain_focus(&self, completed: &Session, task_id: Uuid) -> DomainResult<Option<Session>> {
        let settings = self.settings.get(completed.user_id).await?;

        if !settings.auto_start_focus {
            self.broadcaster
                .publish(
                    completed.user_id,
                    SessionNotice::ReadyForFocus {
                        task_id: Some(task_id),
                        fsm_state: SessionState::Idle,
                    },
                )
                .await;
            return Ok(None);
        }

        let session = Session::new_focus(completed.user_id, task_id, settings.focus_minutes);
        self.sessions.create(&session).await?;

        debug!(%task_id, "chained focus session");
        self.broadcaster.publish_session(&session, false).await;
        Ok(Some(session))
    }
}
