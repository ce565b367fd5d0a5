//! Foundational low-level utilities shared across Rho crates.
//!
//! Provides the atomic file-replacement helper used by pack reconstruction
//! and the Unix-time helpers used for branch naming and event logging.

pub mod atomic_io;
pub mod time_utils;

pub use atomic_io::write_text_atomic;
pub use time_utils::{current_unix_timestamp, current_unix_timestamp_ms};
