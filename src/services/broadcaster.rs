//! Per-user event fan-out for session state changes.
//!
//! After every mutation the authoritative snapshot is published to the owning
//! user's topic. Delivery is at-least-once: a lagged receiver resyncs by
//! pulling a fresh snapshot through the heartbeat read path, and new
//! subscribers are handed the current snapshot on connect by the service.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::domain::fsm::{derive_state, SessionState};
use crate::domain::models::Session;
use crate::domain::timing;

/// Snapshot of a session published after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub fsm_state: SessionState,
    pub allowed_actions: Vec<String>,
    pub task_id: Option<Uuid>,
    pub session_id: Uuid,
    pub is_break: bool,
    pub remaining_seconds: i64,
    pub elapsed_seconds: i64,
    pub total_duration_seconds: i64,
    pub paused_seconds: i64,
    pub started_at: String,
    pub ended: bool,
}

/// Notification sent on a user's topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionNotice {
    #[serde(rename = "SESSION_UPDATE")]
    SessionUpdate(SessionSnapshot),
    /// Break finished and auto-start of focus is disabled; no session exists.
    #[serde(rename = "READY_FOR_FOCUS")]
    ReadyForFocus {
        task_id: Option<Uuid>,
        fsm_state: SessionState,
    },
}

/// Build the snapshot payload for a session as of `now`.
///
/// A manual completion forces `TERMINATED`/`ended` regardless of the derived
/// value, since the underlying session may already have been superseded.
pub fn build_snapshot(session: &Session, now: DateTime<Utc>, force_terminated: bool) -> SessionSnapshot {
    let fsm_state = if force_terminated {
        SessionState::Terminated
    } else {
        derive_state(Some(session))
    };

    SessionSnapshot {
        fsm_state,
        allowed_actions: fsm_state
            .allowed_events()
            .iter()
            .map(|e| e.as_str().to_string())
            .collect(),
        task_id: session.task_id,
        session_id: session.id,
        is_break: session.is_break,
        remaining_seconds: timing::remaining_seconds(session, now),
        elapsed_seconds: timing::elapsed_seconds(session, now),
        total_duration_seconds: session.total_duration_seconds(),
        paused_seconds: timing::paused_seconds(session, now),
        started_at: session.started_at.to_rfc3339(),
        ended: force_terminated || session.completed,
    }
}

/// Per-user broadcast topics.
pub struct Broadcaster {
    topics: RwLock<HashMap<Uuid, broadcast::Sender<SessionNotice>>>,
    channel_capacity: usize,
}

impl Broadcaster {
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            channel_capacity,
        }
    }

    async fn sender(&self, user_id: Uuid) -> broadcast::Sender<SessionNotice> {
        if let Some(sender) = self.topics.read().await.get(&user_id) {
            return sender.clone();
        }
        let mut topics = self.topics.write().await;
        topics
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(self.channel_capacity).0)
            .clone()
    }

    /// Publish a notice to a user's topic. Send errors (no subscribers) are
    /// ignored.
    pub async fn publish(&self, user_id: Uuid, notice: SessionNotice) {
        let sender = self.sender(user_id).await;
        let _ = sender.send(notice);
    }

    /// Publish the authoritative snapshot for a session.
    pub async fn publish_session(&self, session: &Session, manual_completion: bool) {
        let snapshot = build_snapshot(session, Utc::now(), manual_completion);
        tracing::debug!(
            user_id = %session.user_id,
            session_id = %session.id,
            state = snapshot.fsm_state.as_str(),
            "broadcasting session update"
        );
        self.publish(session.user_id, SessionNotice::SessionUpdate(snapshot))
            .await;
    }

    /// Subscribe to a user's topic.
    pub async fn subscribe(&self, user_id: Uuid) -> broadcast::Receiver<SessionNotice> {
        self.sender(user_id).await.subscribe()
    }

    /// Number of live subscribers on a user's topic.
    pub async fn subscriber_count(&self, user_id: Uuid) -> usize {
        self.topics
            .read()
            .await
            .get(&user_id)
            .map_or(0, broadcast::Sender::receiver_count)
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

pub type SharedBroadcaster = Arc<Broadcaster>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{BreakType, Pause};
    use chrono::Duration;

    #[test]
    fn test_snapshot_shape_running_focus() {
        let session = Session::new_focus(Uuid::new_v4(), Uuid::new_v4(), 25);
        let now = session.started_at + Duration::seconds(60);
        let snap = build_snapshot(&session, now, false);

        assert_eq!(snap.fsm_state, SessionState::FocusRunning);
        assert_eq!(snap.allowed_actions, vec!["PAUSE", "COMPLETE"]);
        assert_eq!(snap.total_duration_seconds, 1500);
        assert_eq!(snap.elapsed_seconds, 60);
        assert_eq!(snap.remaining_seconds, 1440);
        assert_eq!(snap.paused_seconds, 0);
        assert!(!snap.ended);
    }

    #[test]
    fn test_snapshot_counts_ongoing_pause() {
        let mut session = Session::new_break(Uuid::new_v4(), None, BreakType::Short, 5);
        session
            .pauses
            .push(Pause::new(session.id, session.started_at + Duration::seconds(30)));
        let now = session.started_at + Duration::seconds(90);

        let snap = build_snapshot(&session, now, false);
        assert_eq!(snap.fsm_state, SessionState::BreakPaused);
        assert_eq!(snap.allowed_actions, vec!["RESUME"]);
        assert_eq!(snap.paused_seconds, 60);
        assert_eq!(snap.elapsed_seconds, 30);
    }

    #[test]
    fn test_manual_completion_forces_terminated() {
        let session = Session::new_focus(Uuid::new_v4(), Uuid::new_v4(), 25);
        let snap = build_snapshot(&session, Utc::now(), true);
        assert_eq!(snap.fsm_state, SessionState::Terminated);
        assert!(snap.ended);
        assert!(snap.allowed_actions.is_empty());
    }

    #[test]
    fn test_notice_wire_format() {
        let session = Session::new_focus(Uuid::new_v4(), Uuid::new_v4(), 25);
        let notice = SessionNotice::SessionUpdate(build_snapshot(&session, Utc::now(), false));
        let json = serde_json::to_value(&notice).unwrap();

        assert_eq!(json["type"], "SESSION_UPDATE");
        assert_eq!(json["fsm_state"], "FOCUS_RUNNING");
        assert!(json["allowed_actions"].is_array());

        let ready = SessionNotice::ReadyForFocus {
            task_id: session.task_id,
            fsm_state: SessionState::Idle,
        };
        let json = serde_json::to_value(&ready).unwrap();
        assert_eq!(json["type"], "READY_FOR_FOCUS");
        assert_eq!(json["fsm_state"], "IDLE");
    }

    #[tokio::test]
    async fn test_publish_reaches_only_that_users_topic() {
        let broadcaster = Broadcaster::default();
        let user_a = Uuid::new_v4();
        let user_b = Uuid::new_v4();

        let mut rx_a = broadcaster.subscribe(user_a).await;
        let mut rx_b = broadcaster.subscribe(user_b).await;
        assert_eq!(broadcaster.subscriber_count(user_a).await, 1);

        let session = Session::new_focus(user_a, Uuid::new_v4(), 25);
        broadcaster.publish_session(&session, false).await;

        let notice = rx_a.recv().await.unwrap();
        assert!(matches!(notice, SessionNotice::SessionUpdate(_)));
        assert!(rx_b.try_recv().is_err());
    }
}
