// src/models/state.rs

//! Shared runtime state for the watch loop and command handlers.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard};

use crate::models::config::WatchConfig;
use crate::models::grid::World;
use crate::models::snapshot::Snapshot;

/// Floor for `/set interval`; faster polling hammers the feed.
pub const MIN_INTERVAL_SECS: u64 = 30;

/// Floor for `/set player_count`; tiny thresholds alert on noise.
pub const MIN_SURGE_THRESHOLD: i64 = 3;

/// Mutable fields behind the state lock.
///
/// The watch loop and command handlers borrow fields disjointly through
/// [`WatchState::lock`]; everything else goes through the accessor methods.
#[derive(Debug)]
pub(crate) struct WatchInner {
    pub(crate) world: World,
    pub(crate) interval_secs: u64,
    pub(crate) surge_threshold: i64,
    pub(crate) blacklist: Vec<String>,
    pub(crate) last_snapshot: Option<Snapshot>,
    pub(crate) alerted_servers: HashSet<String>,
}

/// Process-wide watch state, one per bot.
///
/// The running flag and session generation are atomic so the watch task can
/// observe `/stop` and newer `/start`s without taking the lock. The lock is
/// never held across an await point.
#[derive(Debug)]
pub struct WatchState {
    running: AtomicBool,
    generation: AtomicU64,
    inner: Mutex<WatchInner>,
}

impl WatchState {
    pub fn new(config: &WatchConfig) -> Self {
        Self {
            running: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            inner: Mutex::new(WatchInner {
                world: config.world,
                interval_secs: config.interval_secs.max(MIN_INTERVAL_SECS),
                surge_threshold: config.surge_threshold.max(MIN_SURGE_THRESHOLD),
                blacklist: Vec::new(),
                last_snapshot: None,
                alerted_servers: HashSet::new(),
            }),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Mark the watch as running and open a new session. Returns the session
    /// generation; a loop holding an older generation exits at its next
    /// iteration check instead of rejoining. Callers check `is_running`
    /// first; command dispatch is serialized, so the two steps cannot
    /// interleave.
    pub fn begin(&self) -> u64 {
        self.running.store(true, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Mark the watch as stopped. The loop exits at its next iteration check.
    /// Snapshot and alert state are left in place for the next session.
    pub fn halt(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Generation handed out by the most recent [`begin`](Self::begin).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn world(&self) -> World {
        self.inner.lock().world
    }

    pub fn set_world(&self, world: World) {
        self.inner.lock().world = world;
    }

    pub fn interval_secs(&self) -> u64 {
        self.inner.lock().interval_secs
    }

    /// Set the polling interval, clamped to [`MIN_INTERVAL_SECS`].
    /// Returns the value actually stored.
    pub fn set_interval_secs(&self, secs: u64) -> u64 {
        let clamped = secs.max(MIN_INTERVAL_SECS);
        self.inner.lock().interval_secs = clamped;
        clamped
    }

    pub fn surge_threshold(&self) -> i64 {
        self.inner.lock().surge_threshold
    }

    /// Set the surge threshold, clamped to [`MIN_SURGE_THRESHOLD`].
    /// Returns the value actually stored.
    pub fn set_surge_threshold(&self, count: i64) -> i64 {
        let clamped = count.max(MIN_SURGE_THRESHOLD);
        self.inner.lock().surge_threshold = clamped;
        clamped
    }

    pub fn blacklist(&self) -> Vec<String> {
        self.inner.lock().blacklist.clone()
    }

    /// Add a blacklist entry. Membership is case-insensitive; returns false
    /// when an equivalent entry is already present.
    pub fn add_blacklist(&self, name: &str) -> bool {
        let mut inner = self.inner.lock();
        if inner
            .blacklist
            .iter()
            .any(|entry| entry.eq_ignore_ascii_case(name))
        {
            return false;
        }
        inner.blacklist.push(name.to_string());
        true
    }

    /// Remove a blacklist entry, case-insensitively. Returns false when no
    /// equivalent entry exists.
    pub fn remove_blacklist(&self, name: &str) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.blacklist.len();
        inner
            .blacklist
            .retain(|entry| !entry.eq_ignore_ascii_case(name));
        inner.blacklist.len() != before
    }

    pub fn set_last_snapshot(&self, snapshot: Snapshot) {
        self.inner.lock().last_snapshot = Some(snapshot);
    }

    /// Point-in-time copy of the state for `/status`.
    pub fn overview(&self) -> WatchOverview {
        let inner = self.inner.lock();
        let mut alerted: Vec<String> = inner.alerted_servers.iter().cloned().collect();
        alerted.sort();
        WatchOverview {
            running: self.is_running(),
            world: inner.world,
            interval_secs: inner.interval_secs,
            surge_threshold: inner.surge_threshold,
            blacklist: inner.blacklist.clone(),
            alerted_servers: alerted,
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, WatchInner> {
        self.inner.lock()
    }
}

/// Snapshot of the watch state for status reporting.
#[derive(Debug, Clone)]
pub struct WatchOverview {
    pub running: bool,
    pub world: World,
    pub interval_secs: u64,
    pub surge_threshold: i64,
    pub blacklist: Vec<String>,
    pub alerted_servers: Vec<String>,
}
