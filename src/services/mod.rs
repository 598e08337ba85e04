// src/services/mod.rs

//! Service layer for the watch bot.
//!
//! Business logic that talks to the outside world lives here; today that
//! is the population feed client (`FeedClient`).

mod feed;

pub use feed::{FeedClient, SnapshotSource};
