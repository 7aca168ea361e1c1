//! Per-user pomodoro settings bag.
//!
//! Stored as a JSON document per user; serde defaults apply whenever a user
//! has no stored settings or an older document is missing fields.

use serde::{Deserialize, Serialize};

/// Per-user session preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PomodoroSettings {
    #[serde(default = "default_focus_minutes")]
    pub focus_minutes: u32,

    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: u32,

    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u32,

    /// Every Nth completed focus session earns a long break.
    #[serde(default = "default_long_break_every")]
    pub long_break_every: u32,

    #[serde(default = "default_true")]
    pub auto_start_breaks: bool,

    #[serde(default = "default_true")]
    pub auto_start_focus: bool,

    #[serde(default = "default_sound")]
    pub sound: String,

    #[serde(default = "default_true")]
    pub notifications: bool,
}

const fn default_focus_minutes() -> u32 {
    25
}

const fn default_short_break_minutes() -> u32 {
    5
}

const fn default_long_break_minutes() -> u32 {
    15
}

const fn default_long_break_every() -> u32 {
    4
}

const fn default_true() -> bool {
    true
}

fn default_sound() -> String {
    "bell".to_string()
}

impl Default for PomodoroSettings {
    fn default() -> Self {
        Self {
            focus_minutes: default_focus_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            long_break_every: default_long_break_every(),
            auto_start_breaks: true,
            auto_start_focus: true,
            sound: default_sound(),
            notifications: true,
        }
    }
}

impl PomodoroSettings {
    /// Break duration in minutes for the given kind.
    pub fn break_minutes(&self, break_type: crate::domain::models::BreakType) -> u32 {
        match break_type {
            crate::domain::models::BreakType::Short => self.short_break_minutes,
            crate::domain::models::BreakType::Long => self.long_break_minutes,
        }
    }
}
