// src/gateway/console.rs

//! Console-backed gateway for interactive runs.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{AppError, Result};
use crate::gateway::{ChatGateway, OutboundMessage};

/// Gateway that prints outbound traffic to stdout and keeps its channel
/// list in memory. Commands typed on stdin stand in for chat messages.
#[derive(Debug, Default)]
pub struct ConsoleGateway {
    channels: Mutex<Vec<String>>,
}

impl ConsoleGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a pre-populated channel list.
    pub fn with_channels(names: &[&str]) -> Self {
        Self {
            channels: Mutex::new(names.iter().map(|n| n.to_string()).collect()),
        }
    }
}

#[async_trait]
impl ChatGateway for ConsoleGateway {
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
        log::info!("Channel created: {name}");
        Ok(())
    }

    async fn delete_channel(&self, name: &str) -> Result<()> {
        let mut channels = self.channels.lock();
        let before = channels.len();
        channels.retain(|c| !c.eq_ignore_ascii_case(name));
        if channels.len() == before {
            return Err(AppError::gateway(format!("no channel named '{name}'")));
        }
        log::info!("Channel deleted: {name}");
        Ok(())
    }

    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        if message.attention {
            println!("[{}] @everyone {}", message.channel, message.text);
        } else {
            println!("[{}] {}", message.channel, message.text);
        }
        Ok(())
    }
}
