// src/watch/controller.rs

//! The watch loop task.
//!
//! Spawned by `/start`; runs fetch → evaluate → send ticks, sleeping the
//! configured interval in between, until `/stop` clears the running flag
//! or a newer `/start` opens a fresh session. Liveness is observed only at
//! the top of each iteration, so sleeps and in-flight fetches finish
//! undisturbed.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::gateway::{ChatGateway, OutboundMessage};
use crate::models::WatchState;
use crate::services::SnapshotSource;
use crate::storage::ErrorLog;
use crate::utils::report_stamp;
use crate::watch::policy::evaluate_channel;

/// Drives the watch ticks for one `/start`.
pub struct Watcher {
    state: Arc<WatchState>,
    gateway: Arc<dyn ChatGateway>,
    source: Arc<dyn SnapshotSource>,
    error_log: ErrorLog,
    /// Channel the start command arrived on; failure notices go here.
    origin: String,
    /// Session this loop serves; a newer `/start` retires it.
    generation: u64,
}

impl Watcher {
    pub fn new(
        state: Arc<WatchState>,
        gateway: Arc<dyn ChatGateway>,
        source: Arc<dyn SnapshotSource>,
        error_log: ErrorLog,
        origin: impl Into<String>,
        generation: u64,
    ) -> Self {
        Self {
            state,
            gateway,
            source,
            error_log,
            origin: origin.into(),
            generation,
        }
    }

    /// Run ticks while this session stays live.
    ///
    /// No tick error ends the loop; failures are reported and the next
    /// tick proceeds after the interval sleep.
    pub async fn run(self) {
        log::info!("Watch loop started");
        while self.live() {
            if let Err(error) = self.tick().await {
                self.report_failure(&error).await;
            }
            // Re-read each pass so /set interval applies at the next sleep.
            let interval = self.state.interval_secs();
            tokio::time::sleep(Duration::from_secs(interval)).await;
        }
        log::info!("Watch loop stopped");
    }

    /// Whether this loop is still the current session. A `/stop` clears the
    /// running flag; a later `/start` bumps the generation past ours. Either
    /// way the loop must exit rather than tick alongside a successor.
    fn live(&self) -> bool {
        self.state.is_running() && self.state.generation() == self.generation
    }

    /// One fetch → evaluate → send pass over every destination channel.
    async fn tick(&self) -> Result<()> {
        let world = self.state.world();
        let blacklist = self.state.blacklist();
        let snapshot = self.source.fetch(world, &blacklist).await?;
        log::debug!("Fetched {} grids for {world}", snapshot.len());

        let stamp = report_stamp();
        let channels = self.gateway.channels().await?;

        for channel in &channels {
            // Evaluate under the lock, send after releasing it.
            let messages = {
                let mut guard = self.state.lock();
                let inner = &mut *guard;
                evaluate_channel(
                    channel,
                    &stamp,
                    &snapshot,
                    inner.last_snapshot.as_ref(),
                    inner.surge_threshold,
                    &mut inner.alerted_servers,
                )
            };
            for message in &messages {
                self.gateway.send(message).await?;
            }
        }

        self.state.set_last_snapshot(snapshot);
        Ok(())
    }

    /// Route a tick failure. Fetch problems only warrant a retry notice;
    /// anything else is appended to the error log as well, tagged with the
    /// watched world.
    async fn report_failure(&self, error: &AppError) {
        log::warn!("Tick failed: {error}");
        let text = if error.is_fetch_failure() {
            match error {
                AppError::EmptyFeed => "[ERROR] Feed returned an empty body. Will retry.",
                _ => "[ERROR] Feed request failed. The server may be down. Will retry.",
            }
        } else {
            let entry = AppError::watch(self.state.world().as_str(), error);
            if let Err(log_error) = self.error_log.append(&entry.to_string()).await {
                log::warn!("Error log append failed: {log_error}");
            }
            "[ERROR] Watch continues. If this repeats, /stop the watch."
        };

        let notice = OutboundMessage::plain(&self.origin, text);
        if let Err(send_error) = self.gateway.send(&notice).await {
            log::warn!("Failure notice delivery failed: {send_error}");
        }
    }
}
