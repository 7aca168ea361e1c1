//! Session lifecycle state machine.
//!
//! The state is never stored; it is derived from a session's `completed`
//! flag, its break flag, and whether an ongoing pause exists. The transition
//! table below is the single source of truth consulted before any mutation.

use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Session;

/// Derived lifecycle phase of a session (or `Idle` when none exists).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Idle,
    FocusRunning,
    FocusPaused,
    BreakRunning,
    BreakPaused,
    /// Completed; absorbing.
    Terminated,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::FocusRunning => "FOCUS_RUNNING",
            Self::FocusPaused => "FOCUS_PAUSED",
            Self::BreakRunning => "BREAK_RUNNING",
            Self::BreakPaused => "BREAK_PAUSED",
            Self::Terminated => "TERMINATED",
        }
    }

    /// Events legal in this state.
    pub fn allowed_events(&self) -> &'static [SessionEvent] {
        match self {
            Self::Idle => &[SessionEvent::StartFocus],
            Self::FocusRunning | Self::BreakRunning => {
                &[SessionEvent::Pause, SessionEvent::Complete]
            }
            Self::FocusPaused => &[SessionEvent::Resume, SessionEvent::Complete],
            Self::BreakPaused => &[SessionEvent::Resume],
            Self::Terminated => &[],
        }
    }

    pub fn can_transition(&self, event: SessionEvent) -> bool {
        self.allowed_events().contains(&event)
    }

    /// Enforce the transition table; callers must not apply side effects
    /// before this check.
    pub fn require(&self, event: SessionEvent) -> DomainResult<()> {
        if self.can_transition(event) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                state: self.as_str().to_string(),
                event: event.as_str().to_string(),
            })
        }
    }
}

/// Requested lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionEvent {
    StartFocus,
    Pause,
    Resume,
    Complete,
}

impl SessionEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StartFocus => "START_FOCUS",
            Self::Pause => "PAUSE",
            Self::Resume => "RESUME",
            Self::Complete => "COMPLETE",
        }
    }
}

/// Derive the state of an optional session.
pub fn derive_state(session: Option<&Session>) -> SessionState {
    let Some(session) = session else {
        return SessionState::Idle;
    };

    if session.completed {
        return SessionState::Terminated;
    }

    match (session.is_break, session.has_ongoing_pause()) {
        (true, true) => SessionState::BreakPaused,
        (true, false) => SessionState::BreakRunning,
        (false, true) => SessionState::FocusPaused,
        (false, false) => SessionState::FocusRunning,
    }
}
