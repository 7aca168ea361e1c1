//! Session lifecycle service.
//!
//! Every mutation runs under the owning user's lock, validates the requested
//! event against the derived FSM state, persists through the repositories,
//! hands non-manual completions to the orchestrator, and publishes the
//! resulting snapshot. Read paths reuse the same lock because lazy expiry
//! can turn a read into a completion.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::fsm::{derive_state, SessionEvent, SessionState};
use crate::domain::models::{BreakType, Pause, PomodoroSettings, Session, Task, TaskStatus};
use crate::domain::ports::{SessionRepository, SettingsRepository, TaskRepository};
use crate::domain::timing;
use crate::services::broadcaster::{build_snapshot, Broadcaster, SessionNotice, SessionSnapshot};
use crate::services::flow_orchestrator::FlowOrchestrator;
use crate::services::user_locks::UserLocks;

/// Read-endpoint view of a user's active session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSessionView {
    pub active: bool,
    pub fsm_state: SessionState,
    pub session_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub is_break: bool,
    pub is_running: bool,
    pub completed: bool,
    pub duration_minutes: u32,
    pub total_duration_seconds: i64,
    pub elapsed_seconds: i64,
    pub remaining_seconds: i64,
    pub paused_seconds: i64,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
}

impl ActiveSessionView {
    fn idle() -> Self {
        Self {
            active: false,
            fsm_state: SessionState::Idle,
            session_id: None,
            task_id: None,
            is_break: false,
            is_running: false,
            completed: false,
            duration_minutes: 0,
            total_duration_seconds: 0,
            elapsed_seconds: 0,
            remaining_seconds: 0,
            paused_seconds: 0,
            started_at: None,
            ended_at: None,
        }
    }

    fn from_session(session: &Session) -> Self {
        let now = Utc::now();
        Self {
            active: true,
            fsm_state: derive_state(Some(session)),
            session_id: Some(session.id),
            task_id: session.task_id,
            is_break: session.is_break,
            is_running: session.is_running(),
            completed: session.completed,
            duration_minutes: session.duration_minutes,
            total_duration_seconds: session.total_duration_seconds(),
            elapsed_seconds: timing::elapsed_seconds(session, now),
            remaining_seconds: timing::remaining_seconds(session, now),
            paused_seconds: timing::paused_seconds(session, now),
            started_at: Some(session.started_at.to_rfc3339()),
            ended_at: session.ended_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Heartbeat response for polling clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heartbeat {
    pub active: bool,
    pub fsm_state: SessionState,
    pub snapshot: Option<SessionSnapshot>,
}

/// Coordinates session mutations, lazy expiry, chaining, and fan-out.
pub struct SessionService {
    sessions: Arc<dyn SessionRepository>,
    tasks: Arc<dyn TaskRepository>,
    settings: Arc<dyn SettingsRepository>,
    locks: Arc<UserLocks>,
    broadcaster: Arc<Broadcaster>,
    orchestrator: FlowOrchestrator,
}

impl SessionService {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        tasks: Arc<dyn TaskRepository>,
        settings: Arc<dyn SettingsRepository>,
        locks: Arc<UserLocks>,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        let orchestrator = FlowOrchestrator::new(
            Arc::clone(&sessions),
            Arc::clone(&tasks),
            Arc::clone(&settings),
            Arc::clone(&broadcaster),
        );
        Self {
            sessions,
            tasks,
            settings,
            locks,
            broadcaster,
            orchestrator,
        }
    }

    pub fn broadcaster(&self) -> Arc<Broadcaster> {
        Arc::clone(&self.broadcaster)
    }

    /// Start a focus session for a task.
    ///
    /// Idempotent: an already-open session for the user is returned as-is
    /// (and re-broadcast) instead of creating a duplicate row.
    #[instrument(skip(self), err)]
    pub async fn start_focus(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        duration_override: Option<u32>,
    ) -> DomainResult<Session> {
        let _guard = self.locks.acquire(user_id).await?;

        let mut task = self
            .tasks
            .get_owned(task_id, user_id)
            .await?
            .ok_or(DomainError::TaskNotFound(task_id))?;

        if let Some(active) = self.active_after_expiry(user_id).await? {
            debug!(session_id = %active.id, "start is a no-op; returning existing session");
            self.broadcaster.publish_session(&active, false).await;
            return Ok(active);
        }

        let duration = match duration_override {
            Some(minutes) => minutes,
            None => self.settings.get(user_id).await?.focus_minutes,
        };

        let session = Session::new_focus(user_id, task_id, duration);
        self.sessions.create(&session).await?;

        task.status = TaskStatus::InProgress;
        task.started_at = task.started_at.or(Some(session.started_at));
        self.tasks.update(&task).await?;

        self.broadcaster.publish_session(&session, false).await;
        Ok(session)
    }

    /// Start a standalone break session.
    ///
    /// Breaks are not idempotent across kinds: any open session is a
    /// conflict, surfaced with its id so the caller can reconcile.
    #[instrument(skip(self), err)]
    pub async fn start_break(
        &self,
        user_id: Uuid,
        break_type: BreakType,
        duration_override: Option<u32>,
    ) -> DomainResult<Session> {
        let _guard = self.locks.acquire(user_id).await?;

        if let Some(active) = self.active_after_expiry(user_id).await? {
            return Err(DomainError::ActiveSessionExists(active.id));
        }

        let duration = match duration_override {
            Some(minutes) => minutes,
            None => self.settings.get(user_id).await?.break_minutes(break_type),
        };

        let session = Session::new_break(user_id, None, break_type, duration);
        self.sessions.create(&session).await?;
        self.broadcaster.publish_session(&session, false).await;
        Ok(session)
    }

    /// Pause the active session on a task.
    #[instrument(skip(self), err)]
    pub async fn pause(&self, user_id: Uuid, task_id: Uuid) -> DomainResult<Session> {
        let _guard = self.locks.acquire(user_id).await?;

        let mut task = self
            .tasks
            .get_owned(task_id, user_id)
            .await?
            .ok_or(DomainError::TaskNotFound(task_id))?;

        let mut session = self
            .require_session_event(user_id, task_id, SessionEvent::Pause)
            .await?;

        let pause = Pause::new(session.id, Utc::now());
        self.sessions.create_pause(&pause).await?;
        session.pauses.push(pause);

        task.status = TaskStatus::Paused;
        self.tasks.update(&task).await?;

        self.broadcaster.publish_session(&session, false).await;
        Ok(session)
    }

    /// Resume the paused session on a task.
    #[instrument(skip(self), err)]
    pub async fn resume(&self, user_id: Uuid, task_id: Uuid) -> DomainResult<Session> {
        let _guard = self.locks.acquire(user_id).await?;

        let mut task = self
            .tasks
            .get_owned(task_id, user_id)
            .await?
            .ok_or(DomainError::TaskNotFound(task_id))?;

        let mut session = self
            .require_session_event(user_id, task_id, SessionEvent::Resume)
            .await?;

        let resumed_at = Utc::now();
        let pause_id = session
            .ongoing_pause()
            .map(|p| p.id)
            .ok_or(DomainError::SessionNotFound(session.id))?;
        self.sessions.close_pause(pause_id, resumed_at).await?;
        if let Some(pause) = session.pauses.iter_mut().find(|p| p.id == pause_id) {
            pause.resumed_at = Some(resumed_at);
        }

        task.status = TaskStatus::InProgress;
        self.tasks.update(&task).await?;

        self.broadcaster.publish_session(&session, false).await;
        Ok(session)
    }

    /// Manually complete the active session on a task and close the task.
    ///
    /// Manual completions bypass auto-chaining; the broadcast is forced to
    /// the terminal state.
    #[instrument(skip(self), err)]
    pub async fn complete_task(&self, user_id: Uuid, task_id: Uuid) -> DomainResult<Task> {
        let _guard = self.locks.acquire(user_id).await?;

        let mut task = self
            .tasks
            .get_owned(task_id, user_id)
            .await?
            .ok_or(DomainError::TaskNotFound(task_id))?;

        let mut session = self
            .require_session_event(user_id, task_id, SessionEvent::Complete)
            .await?;

        self.complete_session(&mut session, true).await?;

        task.total_focus_seconds = self.sessions.sum_focus_seconds(task_id).await?;
        task.status = TaskStatus::Completed;
        task.ended_at = session.ended_at;
        self.tasks.update(&task).await?;

        self.broadcaster.publish_session(&session, true).await;
        Ok(task)
    }

    /// The user's active session, optionally scoped to a task, after lazy
    /// expiry has been applied.
    #[instrument(skip(self), err)]
    pub async fn get_active(
        &self,
        user_id: Uuid,
        task_id: Option<Uuid>,
    ) -> DomainResult<ActiveSessionView> {
        let _guard = self.locks.acquire(user_id).await?;

        let session = match task_id {
            Some(task_id) => {
                if self.tasks.get_owned(task_id, user_id).await?.is_none() {
                    return Err(DomainError::TaskNotFound(task_id));
                }
                self.sessions.find_active_for_task(user_id, task_id).await?
            }
            None => self.sessions.find_active(user_id).await?,
        };

        match session {
            Some(session) => {
                let session = self.reconcile_expired(session).await?;
                Ok(ActiveSessionView::from_session(&session))
            }
            None => Ok(ActiveSessionView::idle()),
        }
    }

    /// Heartbeat read path for polling observers; applies lazy expiry.
    #[instrument(skip(self), err)]
    pub async fn heartbeat(&self, user_id: Uuid) -> DomainResult<Heartbeat> {
        let _guard = self.locks.acquire(user_id).await?;

        match self.sessions.find_active(user_id).await? {
            Some(session) => {
                let session = self.reconcile_expired(session).await?;
                let snapshot = build_snapshot(&session, Utc::now(), false);
                Ok(Heartbeat {
                    active: true,
                    fsm_state: snapshot.fsm_state,
                    snapshot: Some(snapshot),
                })
            }
            None => Ok(Heartbeat {
                active: false,
                fsm_state: SessionState::Idle,
                snapshot: None,
            }),
        }
    }

    /// Full session history for a task, oldest first.
    #[instrument(skip(self), err)]
    pub async fn task_sessions(&self, user_id: Uuid, task_id: Uuid) -> DomainResult<Vec<Session>> {
        if self.tasks.get_owned(task_id, user_id).await?.is_none() {
            return Err(DomainError::TaskNotFound(task_id));
        }
        self.sessions.list_for_task(user_id, task_id).await
    }

    /// Subscribe to the user's topic; late joiners receive the current
    /// active snapshot immediately alongside the receiver.
    pub async fn subscribe(
        &self,
        user_id: Uuid,
    ) -> DomainResult<(
        Option<SessionSnapshot>,
        tokio::sync::broadcast::Receiver<SessionNotice>,
    )> {
        let receiver = self.broadcaster.subscribe(user_id).await;
        let heartbeat = self.heartbeat(user_id).await?;
        Ok((heartbeat.snapshot, receiver))
    }

    pub async fn get_settings(&self, user_id: Uuid) -> DomainResult<PomodoroSettings> {
        self.settings.get(user_id).await
    }

    pub async fn update_settings(
        &self,
        user_id: Uuid,
        settings: &PomodoroSettings,
    ) -> DomainResult<()> {
        self.settings.set(user_id, settings).await
    }

    /// The user's open session after expiring it if its time ran out.
    /// Expiry chains, so the returned session may be a freshly created one.
    async fn active_after_expiry(&self, user_id: Uuid) -> DomainResult<Option<Session>> {
        let Some(session) = self.sessions.find_active(user_id).await? else {
            return Ok(None);
        };
        self.reconcile_expired(session).await?;
        self.sessions.find_active(user_id).await
    }

    /// Lazy expiry: an open session whose remaining time reached zero is
    /// completed (non-manual, so chaining runs). Callers must hold the user
    /// lock.
    async fn reconcile_expired(&self, mut session: Session) -> DomainResult<Session> {
        if session.completed {
            return Ok(session);
        }
        if timing::remaining_seconds(&session, Utc::now()) > 0 {
            return Ok(session);
        }

        debug!(session_id = %session.id, "session expired; completing on read");
        self.complete_session(&mut session, false).await?;
        Ok(session)
    }

    /// Close any ongoing pause, freeze the actual duration, and mark the
    /// session completed in one atomic store operation. Non-manual
    /// completions hand off to the orchestrator afterwards.
    async fn complete_session(&self, session: &mut Session, manual: bool) -> DomainResult<()> {
        if session.completed {
            return Err(DomainError::AlreadyCompleted(session.id));
        }

        let ended_at = Utc::now();
        for pause in &mut session.pauses {
            if pause.resumed_at.is_none() {
                pause.resumed_at = Some(ended_at);
            }
        }
        session.ended_at = Some(ended_at);

        let actual = timing::elapsed_seconds(session, ended_at);
        self.sessions.complete(session.id, ended_at, actual).await?;

        session.completed = true;
        session.actual_duration_seconds = Some(actual);

        if !manual {
            self.orchestrator.handle_completion(session).await?;
        }
        Ok(())
    }

    /// Fetch the task's open session and gate the requested event on its
    /// derived state. No session derives `IDLE`, which rejects everything
    /// except `START_FOCUS`.
    async fn require_session_event(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        event: SessionEvent,
    ) -> DomainResult<Session> {
        let session = self.sessions.find_active_for_task(user_id, task_id).await?;
        derive_state(session.as_ref()).require(event)?;
        session.ok_or(DomainError::SessionNotFound(task_id))
    }
}
