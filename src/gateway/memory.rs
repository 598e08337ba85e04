// src/gateway/memory.rs

//! Recording gateway used by tests.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{AppError, Result};
use crate::gateway::{ChatGateway, OutboundMessage};

/// In-memory gateway that records every delivered message.
///
/// `fail_channel` makes sends to one channel error, for exercising
/// delivery-failure paths.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    channels: Mutex<Vec<String>>,
    sent: Mutex<Vec<OutboundMessage>>,
    fail_channel: Mutex<Option<String>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channels(names: &[&str]) -> Self {
        Self {
            channels: Mutex::new(names.iter().map(|n| n.to_string()).collect()),
            ..Self::default()
        }
    }

    /// Everything delivered so far, in send order.
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().clone()
    }

    /// Message bodies delivered to one channel, in send order.
    pub fn sent_to(&self, channel: &str) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter(|m| m.channel.eq_ignore_ascii_case(channel))
            .map(|m| m.text.clone())
            .collect()
    }

    /// Make sends to `channel` fail until cleared with `None`.
    pub fn set_fail_channel(&self, channel: Option<&str>) {
        *self.fail_channel.lock() = channel.map(str::to_string);
    }
}

#[async_trait]
impl ChatGateway for MemoryGateway {
    async fn channels(&self) -> Result<Vec<String>> {
        Ok(self.channels.lock().clone())
    }

    async fn channel_exists(&self, name: &str) -> Result<bool> {
        Ok(self
            .channels
            .lock()
            .iter()
            .any(|c| c.eq_ignore_ascii_case(name)))
    }

    async fn create_channel(&self, name: &str) -> Result<()> {
        self.channels.lock().push(name.to_string());
        Ok(())
    }

    async fn delete_channel(&self, name: &str) -> Result<()> {
        let mut channels = self.channels.lock();
        let before = channels.len();
        channels.retain(|c| !c.eq_ignore_ascii_case(name));
        if channels.len() == before {
            return Err(AppError::gateway(format!("no channel named '{name}'")));
        }
        Ok(())
    }

    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        if let Some(fail) = self.fail_channel.lock().as_deref() {
            if message.channel.eq_ignore_ascii_case(fail) {
                return Err(AppError::gateway(format!(
                    "send to '{}' refused",
                    message.channel
                )));
            }
        }
        self.sent.lock().push(message.clone());
        Ok(())
    }
}
