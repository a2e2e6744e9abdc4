//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod alarms;
pub mod persistence;
pub mod ticker;

// Re-export main functions
pub use alarms::alarm_task;
pub use persistence::persistence_task;
pub use ticker::{catch_up_since, ticker_task};
