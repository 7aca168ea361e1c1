//! End-to-end session lifecycle tests over an in-memory database.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use uuid::Uuid;

use focusflow::adapters::sqlite::{
    all_embedded_migrations, create_test_pool, Migrator, SqliteSessionRepository,
    SqliteSettingsRepository, SqliteTaskRepository,
};
use focusflow::domain::errors::DomainError;
use focusflow::domain::fsm::SessionState;
use focusflow::domain::models::{BreakType, Session, Task, TaskStatus};
use focusflow::domain::ports::{SessionRepository, TaskRepository};
use focusflow::services::{Broadcaster, SessionNotice, SessionService, UserLocks};

struct Harness {
    service: Arc<SessionService>,
    sessions: Arc<dyn SessionRepository>,
    tasks: Arc<dyn TaskRepository>,
}

async fn harness() -> Harness {
    let pool = create_test_pool().await.unwrap();
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .unwrap();

    let sessions: Arc<dyn SessionRepository> = Arc::new(SqliteSessionRepository::new(pool.clone()));
    let tasks: Arc<dyn TaskRepository> = Arc::new(SqliteTaskRepository::new(pool.clone()));
    let settings = Arc::new(SqliteSettingsRepository::new(pool.clone()));
    let locks = Arc::new(UserLocks::new(StdDuration::from_secs(1)));
    let broadcaster = Arc::new(Broadcaster::default());

    let service = Arc::new(SessionService::new(
        Arc::clone(&sessions),
        Arc::clone(&tasks),
        settings,
        locks,
        broadcaster,
    ));

    Harness {
        service,
        sessions,
        tasks,
    }
}

async fn make_task(h: &Harness, user_id: Uuid) -> Task {
    let task = Task::new(user_id, "Write report");
    h.tasks.create(&task).await.unwrap();
    task
}

/// Insert a focus session whose planned time already ran out.
async fn insert_expired_focus(h: &Harness, user_id: Uuid, task_id: Uuid) -> Session {
    let mut session = Session::new_focus(user_id, task_id, 25);
    session.started_at = Utc::now() - Duration::minutes(30);
    session.created_at = session.started_at;
    h.sessions.create(&session).await.unwrap();
    session
}

#[tokio::test]
async fn test_start_focus_is_idempotent() {
    let h = harness().await;
    let user = Uuid::new_v4();
    let task = make_task(&h, user).await;

    let first = h.service.start_focus(user, task.id, None).await.unwrap();
    let second = h.service.start_focus(user, task.id, None).await.unwrap();
    assert_eq!(first.id, second.id);

    let history = h.sessions.list_for_task(user, task.id).await.unwrap();
    assert_eq!(history.len(), 1);

    let task = h.tasks.get(task.id).await.unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::InProgress);
    assert!(task.started_at.is_some());
}

#[tokio::test]
async fn test_start_rejects_unknown_task() {
    let h = harness().await;
    let err = h
        .service
        .start_focus(Uuid::new_v4(), Uuid::new_v4(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::TaskNotFound(_)));
}

#[tokio::test]
async fn test_double_pause_is_rejected() {
    let h = harness().await;
    let user = Uuid::new_v4();
    let task = make_task(&h, user).await;

    h.service.start_focus(user, task.id, None).await.unwrap();
    let paused = h.service.pause(user, task.id).await.unwrap();
    assert!(paused.has_ongoing_pause());

    let err = h.service.pause(user, task.id).await.unwrap_err();
    match err {
        DomainError::InvalidTransition { state, event } => {
            assert_eq!(state, "FOCUS_PAUSED");
            assert_eq!(event, "PAUSE");
        }
        other => panic!("unexpected error: {other}"),
    }

    // Still exactly one pause interval on record
    let session = h.sessions.get(paused.id).await.unwrap().unwrap();
    assert_eq!(session.pauses.len(), 1);

    let task = h.tasks.get(task.id).await.unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Paused);
}

#[tokio::test]
async fn test_pause_resume_round_trip() {
    let h = harness().await;
    let user = Uuid::new_v4();
    let task = make_task(&h, user).await;

    h.service.start_focus(user, task.id, None).await.unwrap();
    h.service.pause(user, task.id).await.unwrap();
    let resumed = h.service.resume(user, task.id).await.unwrap();

    assert!(!resumed.has_ongoing_pause());
    assert!(resumed.is_running());

    // Resume without a pause is illegal
    let err = h.service.resume(user, task.id).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_complete_while_paused_excludes_paused_time() {
    let h = harness().await;
    let user = Uuid::new_v4();
    let task = make_task(&h, user).await;

    // Started 10 minutes ago, paused for the last 4 of them.
    let mut session = Session::new_focus(user, task.id, 25);
    session.started_at = Utc::now() - Duration::minutes(10);
    session.created_at = session.started_at;
    h.sessions.create(&session).await.unwrap();

    let pause = focusflow::domain::models::Pause::new(session.id, Utc::now() - Duration::minutes(4));
    h.sessions.create_pause(&pause).await.unwrap();

    let completed_task = h.service.complete_task(user, task.id).await.unwrap();
    assert_eq!(completed_task.status, TaskStatus::Completed);
    assert!(completed_task.ended_at.is_some());

    let session = h.sessions.get(session.id).await.unwrap().unwrap();
    assert!(session.completed);
    assert!(!session.has_ongoing_pause(), "completion closes dangling pauses");

    let actual = session.actual_duration_seconds.unwrap();
    assert!(
        (actual - 360).abs() <= 2,
        "expected ~360s of focused time, got {actual}"
    );
    assert_eq!(completed_task.total_focus_seconds, actual);
}

#[tokio::test]
async fn test_completing_terminated_session_is_rejected() {
    let h = harness().await;
    let user = Uuid::new_v4();
    let task = make_task(&h, user).await;

    h.service.start_focus(user, task.id, None).await.unwrap();
    h.service.complete_task(user, task.id).await.unwrap();

    // The session is gone from the active set, so the gate reports IDLE.
    let err = h.service.complete_task(user, task.id).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_break_start_conflicts_with_active_session() {
    let h = harness().await;
    let user = Uuid::new_v4();
    let task = make_task(&h, user).await;

    let focus = h.service.start_focus(user, task.id, None).await.unwrap();
    let err = h
        .service
        .start_break(user, BreakType::Short, None)
        .await
        .unwrap_err();
    match err {
        DomainError::ActiveSessionExists(id) => assert_eq!(id, focus.id),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_concurrent_starts_yield_one_session() {
    let h = harness().await;
    let user = Uuid::new_v4();
    let task = make_task(&h, user).await;

    let (a, b) = tokio::join!(
        h.service.start_focus(user, task.id, None),
        h.service.start_focus(user, task.id, None)
    );
    let a = a.unwrap();
    let b = b.unwrap();
    assert_eq!(a.id, b.id);

    let history = h.sessions.list_for_task(user, task.id).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_expiry_on_heartbeat_chains_breaks() {
    let h = harness().await;
    let user = Uuid::new_v4();
    let task = make_task(&h, user).await;

    // Default cadence: every 4th completed focus earns a long break.
    for round in 1..=4_i64 {
        insert_expired_focus(&h, user, task.id).await;

        let heartbeat = h.service.heartbeat(user).await.unwrap();
        assert!(heartbeat.active);
        assert_eq!(heartbeat.fsm_state, SessionState::Terminated);

        let chained = h.sessions.find_active(user).await.unwrap().unwrap();
        assert!(chained.is_break);
        let expected = if round == 4 {
            BreakType::Long
        } else {
            BreakType::Short
        };
        assert_eq!(chained.break_type, Some(expected), "round {round}");

        // Close the break directly so the next round starts clean.
        h.sessions
            .complete(chained.id, Utc::now(), 0)
            .await
            .unwrap();
    }

    assert_eq!(h.sessions.count_completed_focus(task.id).await.unwrap(), 4);
}

#[tokio::test]
async fn test_expired_break_chains_focus() {
    let h = harness().await;
    let user = Uuid::new_v4();
    let task = make_task(&h, user).await;

    let mut brk = Session::new_break(user, Some(task.id), BreakType::Short, 5);
    brk.started_at = Utc::now() - Duration::minutes(10);
    brk.created_at = brk.started_at;
    h.sessions.create(&brk).await.unwrap();

    h.service.heartbeat(user).await.unwrap();

    let chained = h.sessions.find_active(user).await.unwrap().unwrap();
    assert!(!chained.is_break);
    assert_eq!(chained.task_id, Some(task.id));
}

#[tokio::test]
async fn test_ready_for_focus_when_auto_start_disabled() {
    let h = harness().await;
    let user = Uuid::new_v4();
    let task = make_task(&h, user).await;

    let mut settings = h.service.get_settings(user).await.unwrap();
    settings.auto_start_focus = false;
    h.service.update_settings(user, &settings).await.unwrap();

    let mut rx = h.service.broadcaster().subscribe(user).await;

    let mut brk = Session::new_break(user, Some(task.id), BreakType::Short, 5);
    brk.started_at = Utc::now() - Duration::minutes(10);
    brk.created_at = brk.started_at;
    h.sessions.create(&brk).await.unwrap();

    h.service.heartbeat(user).await.unwrap();

    assert!(h.sessions.find_active(user).await.unwrap().is_none());
    match rx.try_recv().unwrap() {
        SessionNotice::ReadyForFocus { task_id, fsm_state } => {
            assert_eq!(task_id, Some(task.id));
            assert_eq!(fsm_state, SessionState::Idle);
        }
        other => panic!("unexpected notice: {other:?}"),
    }
}

#[tokio::test]
async fn test_taskless_break_expiry_stops_the_chain() {
    let h = harness().await;
    let user = Uuid::new_v4();

    let mut brk = Session::new_break(user, None, BreakType::Short, 5);
    brk.started_at = Utc::now() - Duration::minutes(10);
    brk.created_at = brk.started_at;
    h.sessions.create(&brk).await.unwrap();

    h.service.heartbeat(user).await.unwrap();

    assert!(h.sessions.find_active(user).await.unwrap().is_none());
    let settled = h.sessions.get(brk.id).await.unwrap().unwrap();
    assert!(settled.completed);
}

#[tokio::test]
async fn test_manual_completion_broadcasts_terminated() {
    let h = harness().await;
    let user = Uuid::new_v4();
    let task = make_task(&h, user).await;

    let mut rx = h.service.broadcaster().subscribe(user).await;

    h.service.start_focus(user, task.id, None).await.unwrap();
    h.service.complete_task(user, task.id).await.unwrap();

    let SessionNotice::SessionUpdate(running) = rx.try_recv().unwrap() else {
        panic!("expected a session update");
    };
    assert_eq!(running.fsm_state, SessionState::FocusRunning);

    let SessionNotice::SessionUpdate(terminated) = rx.try_recv().unwrap() else {
        panic!("expected a session update");
    };
    assert_eq!(terminated.fsm_state, SessionState::Terminated);
    assert!(terminated.ended);
    assert!(terminated.allowed_actions.is_empty());

    // No chained session after a manual completion
    assert!(rx.try_recv().is_err());
    assert!(h.sessions.find_active(user).await.unwrap().is_none());
}

#[tokio::test]
async fn test_status_reports_idle_without_session() {
    let h = harness().await;
    let view = h.service.get_active(Uuid::new_v4(), None).await.unwrap();
    assert!(!view.active);
    assert_eq!(view.fsm_state, SessionState::Idle);
}

#[tokio::test]
async fn test_users_are_isolated() {
    let h = harness().await;
    let user_a = Uuid::new_v4();
    let user_b = Uuid::new_v4();
    let task_a = make_task(&h, user_a).await;
    let task_b = make_task(&h, user_b).await;

    h.service.start_focus(user_a, task_a.id, None).await.unwrap();
    // User B's session is unaffected by A's
    let b = h.service.start_focus(user_b, task_b.id, None).await.unwrap();
    assert_eq!(b.task_id, Some(task_b.id));

    // B cannot act on A's task
    let err = h.service.pause(user_b, task_a.id).await.unwrap_err();
    assert!(matches!(err, DomainError::TaskNotFound(_)));
}
