// src/gateway/mod.rs

//! Chat platform abstraction.
//!
//! The bot never talks to a chat service directly; it goes through
//! [`ChatGateway`], which covers what the watch loop and the command
//! handlers need: channel listing and create/delete by name, plus message
//! delivery. [`ConsoleGateway`] backs interactive runs, [`MemoryGateway`]
//! backs tests.

pub mod console;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use console::ConsoleGateway;
pub use memory::MemoryGateway;

/// A message addressed to one chat channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Destination channel name
    pub channel: String,

    /// Message body
    pub text: String,

    /// Broadcast-attention marker; gateways render it their own way
    /// (`@everyone` on platforms that support it)
    pub attention: bool,
}

impl OutboundMessage {
    /// A routine message without the attention marker.
    pub fn plain(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            text: text.into(),
            attention: false,
        }
    }

    /// An alert carrying the broadcast-attention marker.
    pub fn attention(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            text: text.into(),
            attention: true,
        }
    }
}

/// An inbound chat message as the platform reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Who sent it
    pub sender: String,

    /// Channel it arrived on; replies go back here
    pub channel: String,

    /// Raw message text
    pub text: String,
}

impl IncomingMessage {
    pub fn new(
        sender: impl Into<String>,
        channel: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            channel: channel.into(),
            text: text.into(),
        }
    }
}

/// Trait for chat platform backends.
///
/// Channel names are matched case-insensitively throughout; delivery is
/// at-least-one-attempt with no stronger guarantee.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Names of the channels the watch loop reports into.
    async fn channels(&self) -> Result<Vec<String>>;

    /// Whether a channel with this name exists.
    async fn channel_exists(&self, name: &str) -> Result<bool>;

    /// Create a channel with this name.
    async fn create_channel(&self, name: &str) -> Result<()>;

    /// Delete the channel with this name.
    async fn delete_channel(&self, name: &str) -> Result<()>;

    /// Deliver one message.
    async fn send(&self, message: &OutboundMessage) -> Result<()>;
}
