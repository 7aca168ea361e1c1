//! Infrastructure concerns: configuration and process-level wiring.

pub mod config;
