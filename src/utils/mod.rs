//! Utility functions and helpers
//!
//! Stamp generation, the monotonic clock, atomic file writes, content
//! truncation and size formatting.

pub mod atomic;
pub mod size;
pub mod stamp;
pub mod time;
pub mod truncate;

pub use atomic::{atomic_write, atomic_write_with};
pub use size::format_size;
pub use time::MonotonicClock;
pub use truncate::truncate_content;
