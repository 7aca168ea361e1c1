//! Persistence ports (hexagonal boundaries).

pub mod session_repository;
pub mod settings_repository;
pub mod task_repository;

pub use session_repository::SessionRepository;
pub use settings_repository::SettingsRepository;
pub use task_repository::TaskRepository;
