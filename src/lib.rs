//! Chain Timers - A multi-timer scheduler service
//!
//! This library manages independent and grouped countdown/alarm timers:
//! a pure tick engine advances them over wall-clock time, chains
//! sequential timers within a group and starts groups on schedule, while
//! the surrounding service persists state and exposes it over HTTP.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod state;
pub mod storage;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use engine::{apply, Command, TimerEvent, Transition};
pub use error::{AppError, Result};
pub use state::{AppState, TimerSnapshot};
pub use storage::SnapshotStorage;
pub use utils::signals::shutdown_signal;
