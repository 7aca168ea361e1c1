//! Session and Pause domain models.
//!
//! A session is one contiguous attempt at focused work or a break. Pauses
//! record intervals during which a session does not accrue elapsed time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of break session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakType {
    Short,
    Long,
}

impl BreakType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Long => "long",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "short" => Some(Self::Short),
            "long" => Some(Self::Long),
            _ => None,
        }
    }
}

/// One interval during which a session was not accruing elapsed time.
///
/// `resumed_at` is null while the pause is ongoing and is set exactly once,
/// either on resume or forcibly when the session completes while paused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pause {
    pub id: Uuid,
    pub session_id: Uuid,
    pub paused_at: DateTime<Utc>,
    pub resumed_at: Option<DateTime<Utc>>,
}

impl Pause {
    pub fn new(session_id: Uuid, paused_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            paused_at,
            resumed_at: None,
        }
    }

    /// Whether the pause is still open.
    pub fn is_ongoing(&self) -> bool {
        self.resumed_at.is_none()
    }

    /// Closed duration in seconds; zero while ongoing.
    pub fn duration_seconds(&self) -> i64 {
        self.resumed_at
            .map_or(0, |resumed| (resumed - self.paused_at).num_seconds().max(0))
    }
}

/// One focus or break session owned by a single user.
///
/// `started_at` is immutable after creation; `ended_at`, `completed`, and
/// `actual_duration_seconds` are set exactly once at completion. Sessions are
/// history records and are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Associated task, if any (breaks chained from a task carry it too)
    pub task_id: Option<Uuid>,
    /// Break flag
    pub is_break: bool,
    /// Break kind, set only when `is_break`
    pub break_type: Option<BreakType>,
    /// Planned length in minutes
    pub duration_minutes: u32,
    /// Focused wall-clock seconds, frozen at completion
    pub actual_duration_seconds: Option<i64>,
    /// Monotonic false -> true, never reverts
    pub completed: bool,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Pause history, loaded alongside the row
    pub pauses: Vec<Pause>,
}

impl Session {
    /// Create a new focus session for a task.
    pub fn new_focus(user_id: Uuid, task_id: Uuid, duration_minutes: u32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            task_id: Some(task_id),
            is_break: false,
            break_type: None,
            duration_minutes,
            actual_duration_seconds: None,
            completed: false,
            started_at: now,
            ended_at: None,
            created_at: now,
            pauses: Vec::new(),
        }
    }

    /// Create a new break session, optionally tied to a task.
    pub fn new_break(
        user_id: Uuid,
        task_id: Option<Uuid>,
        break_type: BreakType,
        duration_minutes: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            task_id,
            is_break: true,
            break_type: Some(break_type),
            duration_minutes,
            actual_duration_seconds: None,
            completed: false,
            started_at: now,
            ended_at: None,
            created_at: now,
            pauses: Vec::new(),
        }
    }

    /// The single ongoing pause, if one exists.
    ///
    /// The store guarantees at most one pause per session has
    /// `resumed_at = null`; the most recent one wins if that is ever violated.
    pub fn ongoing_pause(&self) -> Option<&Pause> {
        self.pauses.iter().rev().find(|p| p.is_ongoing())
    }

    pub fn has_ongoing_pause(&self) -> bool {
        self.ongoing_pause().is_some()
    }

    /// Running means not paused and not completed.
    pub fn is_running(&self) -> bool {
        !self.completed && !self.has_ongoing_pause()
    }

    /// Planned length in seconds.
    pub fn total_duration_seconds(&self) -> i64 {
        i64::from(self.duration_minutes) * 60
    }
}
