//! Application services orchestrating domain logic over the ports.

pub mod broadcaster;
pub mod flow_orchestrator;
pub mod session_service;
pub mod user_locks;

pub use broadcaster::{Broadcaster, SessionNotice, SessionSnapshot, SharedBroadcaster};
pub use flow_orchestrator::FlowOrchestrator;
pub use session_service::{ActiveSessionView, Heartbeat, SessionService};
pub use user_locks::UserLocks;
