//! Utility functions module
//!
//! Wall-clock math, display formatting and signal handling.

pub mod clock;
pub mod format;
pub mod signals;

// Re-export main functions
pub use clock::{local_now, next_occurrence, remaining_until, EpochMs, LocalTime, TimeOfDay};
pub use format::format_remaining;
pub use signals::shutdown_signal;
