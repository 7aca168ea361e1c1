//! FocusFlow - Pomodoro session tracker
//!
//! FocusFlow tracks focus and break sessions against tasks: a derived finite
//! state machine over at most one open session per user, wall-clock time
//! accounting with pause intervals, focus/break chaining driven by per-user
//! settings, and per-user event fan-out.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure business logic and domain models
//! - **Adapter Layer** (`adapters`): SQLite implementations of the ports
//! - **Service Layer** (`services`): Session lifecycle coordination
//! - **Infrastructure Layer** (`infrastructure`): Configuration loading
//! - **CLI Layer** (`cli`): Command-line interface

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::fsm::{derive_state, SessionEvent, SessionState};
pub use domain::models::{
    BreakType, Config, DatabaseConfig, LoggingConfig, Pause, PomodoroSettings, Session, Task,
    TaskPriority, TaskStatus,
};
pub use domain::ports::{SessionRepository, SettingsRepository, TaskRepository};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{Broadcaster, SessionNotice, SessionService, SessionSnapshot, UserLocks};
