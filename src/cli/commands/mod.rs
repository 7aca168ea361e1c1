//! Command handlers, one module per command family.

pub mod init;
pub mod session;
pub mod settings;
pub mod task;
