// src/services/feed.rs

//! Population feed client.
//!
//! Fetches the per-world grid population JSON and turns it into a
//! [`Snapshot`] scored against the current blacklist.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{Config, GridsFeed, Snapshot, World};
use crate::utils::http::create_async_client;

/// Trait for snapshot sources.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch current populations for `world`, matching players against
    /// `blacklist` while building the snapshot.
    async fn fetch(&self, world: World, blacklist: &[String]) -> Result<Snapshot>;
}

/// HTTP-backed snapshot source.
pub struct FeedClient {
    config: Arc<Config>,
    client: Client,
}

impl FeedClient {
    /// Create a new feed client with the given configuration.
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let client = create_async_client(&config.http)?;
        Ok(Self { config, client })
    }

    /// Decode a feed body into a snapshot.
    fn parse_feed(body: &str, blacklist: &[String]) -> Result<Snapshot> {
        if body.trim().is_empty() {
            return Err(AppError::EmptyFeed);
        }
        let feed: GridsFeed = serde_json::from_str(body)?;
        Ok(Snapshot::from_feed(&feed, blacklist))
    }
}

#[async_trait]
impl SnapshotSource for FeedClient {
    async fn fetch(&self, world: World, blacklist: &[String]) -> Result<Snapshot> {
        let url = self.config.feeds.url_for(world);
        log::debug!("Fetching {world} feed from {url}");
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Self::parse_feed(&body, blacklist)
    }
}
