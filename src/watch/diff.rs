// src/watch/diff.rs

//! Population delta between consecutive snapshots.

use crate::models::Snapshot;

/// Population change for one server between two ticks.
///
/// Zero when there is no previous snapshot or the server is missing from
/// either side; otherwise current minus previous, negative when players
/// left the grid.
pub fn population_delta(previous: Option<&Snapshot>, current: &Snapshot, server: &str) -> i64 {
    let Some(previous) = previous else {
        return 0;
    };
    let (Some(prev), Some(curr)) = (previous.get(server), current.get(server)) else {
        return 0;
    };
    curr.population as i64 - prev.population as i64
}
