// src/commands/dispatch.rs

//! Serialized command dispatch.
//!
//! One dispatcher instance consumes the inbound message queue; handlers
//! never run concurrently with each other. That serialization is what
//! makes the start command's running-flag guard race-free.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::commands::registry::{self, CommandKind, CommandSpec};
use crate::error::{AppError, Result};
use crate::gateway::{ChatGateway, IncomingMessage, OutboundMessage};
use crate::models::{MIN_INTERVAL_SECS, MIN_SURGE_THRESHOLD, WatchState, World, normalize_grid_name};
use crate::services::SnapshotSource;
use crate::storage::ErrorLog;
use crate::watch::Watcher;

const GRID_NAME_PROBLEM: &str = "Set a server name from A1 to O15.";

/// Routes incoming chat messages to command handlers.
pub struct Dispatcher {
    state: Arc<WatchState>,
    gateway: Arc<dyn ChatGateway>,
    source: Arc<dyn SnapshotSource>,
    error_log: ErrorLog,
}

impl Dispatcher {
    pub fn new(
        state: Arc<WatchState>,
        gateway: Arc<dyn ChatGateway>,
        source: Arc<dyn SnapshotSource>,
        error_log: ErrorLog,
    ) -> Self {
        Self {
            state,
            gateway,
            source,
            error_log,
        }
    }

    /// Consume the inbox until it closes, handling one message at a time.
    pub async fn run(self, mut inbox: mpsc::Receiver<IncomingMessage>) {
        while let Some(message) = inbox.recv().await {
            if let Err(error) = self.handle(&message).await {
                log::error!("Command '{}' failed: {error}", message.text);
            }
        }
        log::info!("Command inbox closed");
    }

    /// Handle one incoming message. Text without the `/` prefix is ignored.
    pub async fn handle(&self, message: &IncomingMessage) -> Result<()> {
        if !message.text.starts_with('/') {
            return Ok(());
        }

        let Some(spec) = registry::find(&message.text) else {
            log::debug!("No command matches '{}'", message.text);
            return self
                .reply(
                    message,
                    &format!("Invalid command.\n{}", registry::help_spec().usage),
                )
                .await;
        };

        if spec.is_help_request(&message.text) {
            return self.reply(message, spec.usage).await;
        }

        if !spec.is_valid(&message.text) {
            log::debug!("{} rejected: bad shape", spec.token);
            return self
                .reply(message, &format!("Invalid command.\n{}", spec.usage))
                .await;
        }

        let args = if spec.takes_args {
            spec.args(&message.text)
        } else {
            ""
        };

        if let Some(problem) = self.validate(spec, args).await? {
            log::debug!("{} rejected: {problem}", spec.token);
            return self
                .reply(message, &format!("{problem}\n{}", spec.usage))
                .await;
        }

        self.execute(spec, message, args).await?;
        log::info!("{} called.", spec.token);
        Ok(())
    }

    /// Per-command validation beyond argument shape. Returns the problem
    /// text to echo back, or `None` when the command may execute.
    async fn validate(&self, spec: &CommandSpec, args: &str) -> Result<Option<String>> {
        let problem = match spec.kind {
            CommandKind::Start => self
                .state
                .is_running()
                .then(|| "Watch already running. Continuing.".to_string()),
            CommandKind::AddServer => match normalize_grid_name(args) {
                None => Some(GRID_NAME_PROBLEM.to_string()),
                Some(name) => self
                    .gateway
                    .channel_exists(&name)
                    .await?
                    .then(|| "That server is already watched.".to_string()),
            },
            CommandKind::DelServer => match normalize_grid_name(args) {
                None => Some(GRID_NAME_PROBLEM.to_string()),
                Some(name) => (!self.gateway.channel_exists(&name).await?)
                    .then(|| "That server is not being watched.".to_string()),
            },
            CommandKind::SetWorld => args
                .parse::<World>()
                .is_err()
                .then(|| "Set NA or EU.".to_string()),
            CommandKind::SetInterval => args
                .parse::<u64>()
                .is_err()
                .then(|| "Set the interval as a number.".to_string()),
            CommandKind::SetSurgeThreshold => args
                .parse::<u32>()
                .is_err()
                .then(|| "Set the increase count as a number.".to_string()),
            _ => None,
        };
        Ok(problem)
    }

    async fn execute(
        &self,
        spec: &CommandSpec,
        message: &IncomingMessage,
        args: &str,
    ) -> Result<()> {
        match spec.kind {
            CommandKind::Start => {
                self.reply(message, "Watch started.").await?;
                let generation = self.state.begin();
                let watcher = Watcher::new(
                    Arc::clone(&self.state),
                    Arc::clone(&self.gateway),
                    Arc::clone(&self.source),
                    self.error_log.clone(),
                    message.channel.clone(),
                    generation,
                );
                tokio::spawn(watcher.run());
            }
            CommandKind::Stop => {
                self.state.halt();
                self.reply(message, "Watch stopped.").await?;
            }
            CommandKind::AddBlacklist => {
                let text = if self.state.add_blacklist(args) {
                    "Added to the blacklist."
                } else {
                    "Already on the blacklist."
                };
                self.reply(message, text).await?;
            }
            CommandKind::DelBlacklist => {
                let text = if self.state.remove_blacklist(args) {
                    "Removed from the blacklist."
                } else {
                    "Not on the blacklist."
                };
                self.reply(message, text).await?;
            }
            CommandKind::ListBlacklist => {
                let text = format!("Blacklist: [{}]", self.state.blacklist().join(", "));
                self.reply(message, &text).await?;
            }
            CommandKind::AddServer => {
                let name = self.grid_name(args)?;
                self.gateway.create_channel(&name).await?;
                let text = format!("{name} channel added. Watch reports will go there.");
                self.reply(message, &text).await?;
            }
            CommandKind::DelServer => {
                let name = self.grid_name(args)?;
                self.gateway.delete_channel(&name).await?;
                self.reply(message, &format!("{name} channel deleted.")).await?;
            }
            CommandKind::Status => {
                let overview = self.state.overview();
                let text = format!(
                    "Watch state:{}\nWatch world:{}\nInterval (seconds):{}\nAlert population increase:{}\nBlacklist:[{}]\nServers with blacklist targets:[{}]",
                    if overview.running {
                        "watching"
                    } else {
                        "not watching"
                    },
                    overview.world,
                    overview.interval_secs,
                    overview.surge_threshold,
                    overview.blacklist.join(", "),
                    overview.alerted_servers.join(", "),
                );
                self.reply(message, &text).await?;
            }
            CommandKind::SetWorld => {
                let world: World = args.parse()?;
                self.state.set_world(world);
                self.reply(message, &format!("Watch world set to {world}."))
                    .await?;
            }
            CommandKind::SetInterval => {
                let requested: u64 = args
                    .parse()
                    .map_err(|_| AppError::validation("interval must be numeric"))?;
                if requested < MIN_INTERVAL_SECS {
                    self.reply(
                        message,
                        "Given value is under 30 seconds. Setting 30 seconds.",
                    )
                    .await?;
                }
                let stored = self.state.set_interval_secs(requested);
                self.reply(message, &format!("Watch interval set to {stored} seconds."))
                    .await?;
            }
            CommandKind::SetSurgeThreshold => {
                let requested: u32 = args
                    .parse()
                    .map_err(|_| AppError::validation("player count must be numeric"))?;
                let requested = i64::from(requested);
                if requested < MIN_SURGE_THRESHOLD {
                    self.reply(message, "Given value is under 3 players. Setting 3 players.")
                        .await?;
                }
                let stored = self.state.set_surge_threshold(requested);
                self.reply(
                    message,
                    &format!("Alert population increase set to {stored} players."),
                )
                .await?;
            }
            CommandKind::FuckYeah => {
                self.reply(message, "Fuck YEAH !!").await?;
                self.reply(
                    message,
                    "https://www.youtube.com/watch?v=IhnUgAaea4M&feature=youtu.be&t=8",
                )
                .await?;
            }
            CommandKind::Help => {
                self.reply(message, &registry::help_text()).await?;
            }
        }
        Ok(())
    }

    /// Canonical grid name for validated server arguments.
    fn grid_name(&self, args: &str) -> Result<String> {
        normalize_grid_name(args)
            .ok_or_else(|| AppError::validation(format!("'{args}' is not a grid name")))
    }

    async fn reply(&self, message: &IncomingMessage, text: &str) -> Result<()> {
        self.gateway
            .send(&OutboundMessage::plain(&message.channel, text))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use parking_lot::Mutex;
    use tempfile::TempDir;

    use super::*;
    use crate::gateway::MemoryGateway;
    use crate::models::{GridStatus, Snapshot, WatchConfig};

    /// Source whose fetch never completes. Keeps spawned watch loops inert
    /// so command handling can be asserted in isolation.
    struct PendingSource;

    #[async_trait::async_trait]
    impl SnapshotSource for PendingSource {
        async fn fetch(&self, _world: World, _blacklist: &[String]) -> Result<Snapshot> {
            std::future::pending().await
        }
    }

    struct Fixture {
        state: Arc<WatchState>,
        gateway: Arc<MemoryGateway>,
        dispatcher: Dispatcher,
        _tmp: TempDir,
    }

    fn fixture() -> Fixture {
        let state = Arc::new(WatchState::new(&WatchConfig::default()));
        let gateway = Arc::new(MemoryGateway::new());
        let tmp = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(
            Arc::clone(&state),
            Arc::clone(&gateway) as Arc<dyn ChatGateway>,
            Arc::new(PendingSource),
            ErrorLog::new(tmp.path().join("errors.log")),
        );
        Fixture {
            state,
            gateway,
            dispatcher,
            _tmp: tmp,
        }
    }

    impl Fixture {
        async fn send(&self, text: &str) {
            self.dispatcher
                .handle(&IncomingMessage::new("tester", "console", text))
                .await
                .unwrap();
        }

        fn replies(&self) -> Vec<String> {
            self.gateway.sent_to("console")
        }
    }

    #[tokio::test]
    async fn plain_chatter_is_ignored() {
        let fx = fixture();
        fx.send("hello there").await;
        assert!(fx.replies().is_empty());
    }

    #[tokio::test]
    async fn unknown_command_points_at_help() {
        let fx = fixture();
        fx.send("/xyz").await;
        assert_eq!(
            fx.replies(),
            vec!["Invalid command.\n/? : show help. Type e.g. /start /? for one command's help."]
        );
    }

    #[tokio::test]
    async fn start_is_guarded_against_reentry() {
        let fx = fixture();
        fx.send("/start").await;
        assert!(fx.state.is_running());

        fx.send("/start").await;
        assert_eq!(
            fx.replies(),
            vec![
                "Watch started.".to_string(),
                "Watch already running. Continuing.\n/start : start the watch.".to_string(),
            ]
        );

        fx.send("/stop").await;
        assert!(!fx.state.is_running());
        assert_eq!(fx.replies()[2], "Watch stopped.");
    }

    #[tokio::test]
    async fn stop_start_cycle_keeps_snapshot_and_alert_state() {
        /// Pops queued fetch results; parks when the queue runs dry so the
        /// spawned loop idles between commands.
        struct QueuedSource {
            queue: Mutex<VecDeque<Result<Snapshot>>>,
        }

        #[async_trait::async_trait]
        impl SnapshotSource for QueuedSource {
            async fn fetch(&self, _world: World, _blacklist: &[String]) -> Result<Snapshot> {
                let next = self.queue.lock().pop_front();
                match next {
                    Some(result) => result,
                    None => std::future::pending().await,
                }
            }
        }

        fn grid(population: usize, matches: &[&str]) -> Snapshot {
            let mut snapshot = Snapshot::default();
            snapshot.insert_for_test(
                "B7",
                GridStatus {
                    population,
                    blacklist_matches: matches.iter().map(|m| m.to_string()).collect(),
                },
            );
            snapshot
        }

        let state = Arc::new(WatchState::new(&WatchConfig::default()));
        state.lock().interval_secs = 0;
        let gateway = Arc::new(MemoryGateway::with_channels(&["B7"]));
        let source = Arc::new(QueuedSource {
            queue: Mutex::new(VecDeque::from([Ok(grid(5, &["EvilDoer42"]))])),
        });
        let tmp = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(
            Arc::clone(&state),
            Arc::clone(&gateway) as Arc<dyn ChatGateway>,
            Arc::clone(&source) as Arc<dyn SnapshotSource>,
            ErrorLog::new(tmp.path().join("errors.log")),
        );

        dispatcher
            .handle(&IncomingMessage::new("tester", "console", "/start"))
            .await
            .unwrap();
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        // Tick 1: routine report plus the blacklist entry alert.
        assert_eq!(gateway.sent_to("B7").len(), 2);

        dispatcher
            .handle(&IncomingMessage::new("tester", "console", "/stop"))
            .await
            .unwrap();
        {
            let inner = state.lock();
            assert!(inner.last_snapshot.is_some());
            assert!(inner.alerted_servers.contains("B7"));
        }

        source.queue.lock().push_back(Ok(grid(20, &[])));
        dispatcher
            .handle(&IncomingMessage::new("tester", "console", "/start"))
            .await
            .unwrap();
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }

        // The new session diffs against the snapshot retained across the
        // stop, and the clear notice shows the alert flag survived too.
        let reports = gateway.sent_to("B7");
        assert_eq!(reports.len(), 5);
        assert_eq!(reports[3], "Population surge. threshold:3 delta:15");
        assert_eq!(reports[4], "Blacklist targets are gone.");
    }

    #[tokio::test]
    async fn status_reflects_running_state() {
        let fx = fixture();
        fx.send("/status").await;
        fx.send("/start").await;
        fx.send("/status").await;

        let replies = fx.replies();
        assert!(replies[0].starts_with("Watch state:not watching\n"));
        assert!(replies[2].starts_with("Watch state:watching\n"));
        assert!(replies[0].contains("Watch world:NA"));
        assert!(replies[0].contains("Interval (seconds):60"));
        assert!(replies[0].contains("Alert population increase:3"));
        assert!(replies[0].contains("Blacklist:[]"));
        assert!(replies[0].contains("Servers with blacklist targets:[]"));
    }

    #[tokio::test]
    async fn blacklist_add_list_remove_cycle() {
        let fx = fixture();
        fx.send("/add bl John").await;
        fx.send("/add bl john").await;
        fx.send("/list bl").await;
        fx.send("/dl bl JOHN").await;
        fx.send("/dl bl John").await;
        fx.send("/list bl").await;

        assert_eq!(
            fx.replies(),
            vec![
                "Added to the blacklist.".to_string(),
                "Already on the blacklist.".to_string(),
                "Blacklist: [John]".to_string(),
                "Removed from the blacklist.".to_string(),
                "Not on the blacklist.".to_string(),
                "Blacklist: []".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn bare_add_bl_echoes_usage() {
        let fx = fixture();
        fx.send("/add bl").await;
        assert_eq!(
            fx.replies(),
            vec!["Invalid command.\n/add bl [player name] : add a player to the blacklist."]
        );
    }

    #[tokio::test]
    async fn add_server_validates_and_uppercases() {
        let fx = fixture();
        fx.send("/add server b7").await;
        assert!(fx.gateway.channel_exists("B7").await.unwrap());

        fx.send("/add server B7").await;
        fx.send("/add server q9").await;

        let replies = fx.replies();
        assert_eq!(replies[0], "B7 channel added. Watch reports will go there.");
        assert!(replies[1].starts_with("That server is already watched.\n"));
        assert!(replies[2].starts_with("Set a server name from A1 to O15.\n"));
    }

    #[tokio::test]
    async fn del_server_validates_and_deletes() {
        let fx = fixture();
        fx.send("/add server A10").await;
        fx.send("/del server a10").await;
        assert!(!fx.gateway.channel_exists("A10").await.unwrap());

        fx.send("/del server A10").await;

        let replies = fx.replies();
        assert_eq!(replies[1], "A10 channel deleted.");
        assert!(replies[2].starts_with("That server is not being watched.\n"));
    }

    #[tokio::test]
    async fn set_world_is_strict() {
        let fx = fixture();
        fx.send("/set world EU").await;
        assert_eq!(fx.state.world(), World::Eu);

        fx.send("/set world eu").await;

        let replies = fx.replies();
        assert_eq!(replies[0], "Watch world set to EU.");
        assert!(replies[1].starts_with("Set NA or EU.\n"));
        assert_eq!(fx.state.world(), World::Eu);
    }

    #[tokio::test]
    async fn set_interval_clamps_with_notice() {
        let fx = fixture();
        fx.send("/set interval 10").await;
        fx.send("/set interval 90").await;
        fx.send("/set interval soon").await;

        assert_eq!(
            fx.replies(),
            vec![
                "Given value is under 30 seconds. Setting 30 seconds.".to_string(),
                "Watch interval set to 30 seconds.".to_string(),
                "Watch interval set to 90 seconds.".to_string(),
                "Set the interval as a number.\n/set interval : set the polling interval in seconds."
                    .to_string(),
            ]
        );
        assert_eq!(fx.state.interval_secs(), 90);
    }

    #[tokio::test]
    async fn set_player_count_clamps_with_notice() {
        let fx = fixture();
        fx.send("/set player_count 1").await;
        fx.send("/set player_count 8").await;
        fx.send("/set player_count lots").await;

        let replies = fx.replies();
        assert_eq!(
            replies[0],
            "Given value is under 3 players. Setting 3 players."
        );
        assert_eq!(replies[1], "Alert population increase set to 3 players.");
        assert_eq!(replies[2], "Alert population increase set to 8 players.");
        assert!(replies[3].starts_with("Set the increase count as a number.\n"));
        assert_eq!(fx.state.surge_threshold(), 8);
    }

    #[tokio::test]
    async fn fuck_replies_twice() {
        let fx = fixture();
        fx.send("/fuck this game").await;
        assert_eq!(
            fx.replies(),
            vec![
                "Fuck YEAH !!".to_string(),
                "https://www.youtube.com/watch?v=IhnUgAaea4M&feature=youtu.be&t=8".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn per_command_help_precedes_validation() {
        let fx = fixture();
        fx.send("/start").await;
        fx.send("/start /?").await;

        let replies = fx.replies();
        assert_eq!(replies[1], "/start : start the watch.");
    }

    #[tokio::test]
    async fn global_help_lists_all_commands() {
        let fx = fixture();
        fx.send("/?").await;
        let replies = fx.replies();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].lines().count(), registry::COMMANDS.len());
        assert!(replies[0].contains("/dl bl [player name]"));
    }
}
