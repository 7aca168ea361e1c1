//! Domain layer: pure models, the session state machine, time accounting,
//! and the persistence ports.

pub mod errors;
pub mod fsm;
pub mod models;
pub mod ports;
pub mod timing;
