// src/storage/mod.rs

//! Persistence for the watch bot.
//!
//! Runtime state lives in memory for the life of the process. The one
//! exception is the append-only error log.

mod error_log;

// Re-export for convenience
pub use error_log::ErrorLog;
