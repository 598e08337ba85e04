// src/models/mod.rs

//! Domain models for the watch bot.
//!
//! Configuration, grid/world identifiers, population snapshots, and the
//! shared runtime state live here.

mod config;
mod grid;
mod snapshot;
mod state;

// Re-export all public types
pub use config::{Config, FeedsConfig, HttpConfig, LoggingConfig, WatchConfig};
pub use grid::{World, normalize_grid_name};
pub use snapshot::{GridRecord, GridStatus, GridsFeed, PlayerRecord, Snapshot};
pub use state::{MIN_INTERVAL_SECS, MIN_SURGE_THRESHOLD, WatchOverview, WatchState};
