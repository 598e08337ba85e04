// src/watch/mod.rs

//! The polling watch loop and its per-tick report policy.

mod controller;
mod diff;
mod policy;

pub use controller::Watcher;
pub use diff::population_delta;
pub use policy::evaluate_channel;
