// src/commands/mod.rs

//! The chat command surface.
//!
//! `registry` declares every command and its argument shape; `dispatch`
//! routes incoming messages through that table and executes them.

mod dispatch;
mod registry;

pub use dispatch::Dispatcher;
pub use registry::{COMMANDS, CommandKind, CommandSpec, find, help_text};
