//! Domain models.

pub mod config;
pub mod session;
pub mod settings;
pub mod task;

pub use config::{Config, DatabaseConfig, LoggingConfig};
pub use session::{BreakType, Pause, Session};
pub use settings::PomodoroSettings;
pub use task::{Task, TaskPriority, TaskStatus};
