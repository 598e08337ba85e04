// src/models/snapshot.rs

//! Per-tick grid population snapshots built from the feed payload.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Raw feed payload: the full grid list for one world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridsFeed {
    #[serde(default)]
    pub grids: Vec<GridRecord>,
}

/// One grid entry as the feed reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridRecord {
    /// Grid name as named by the feed (e.g., "B7")
    pub grid: String,

    /// Players currently on the grid
    #[serde(default)]
    pub players: Vec<PlayerRecord>,
}

/// A single player on a grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
}

/// Derived per-grid status for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridStatus {
    /// Player head count on the grid
    pub population: usize,

    /// Player names that matched some blacklist entry, entry-major order.
    /// A name matched by several entries is listed once per matching entry.
    pub blacklist_matches: Vec<String>,
}

/// Immutable population snapshot keyed by grid name as the feed spells it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    grids: HashMap<String, GridStatus>,
}

impl Snapshot {
    /// Build a snapshot from a decoded feed and the current blacklist.
    ///
    /// Matching is a case-insensitive substring test of each blacklist entry
    /// against each player name.
    pub fn from_feed(feed: &GridsFeed, blacklist: &[String]) -> Self {
        let mut grids = HashMap::with_capacity(feed.grids.len());
        for record in &feed.grids {
            let mut matches = Vec::new();
            for entry in blacklist {
                let needle = entry.to_uppercase();
                for player in &record.players {
                    if player.name.to_uppercase().contains(&needle) {
                        matches.push(player.name.clone());
                    }
                }
            }
            grids.insert(
                record.grid.clone(),
                GridStatus {
                    population: record.players.len(),
                    blacklist_matches: matches,
                },
            );
        }
        Self { grids }
    }

    pub fn get(&self, grid: &str) -> Option<&GridStatus> {
        self.grids.get(grid)
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    pub fn grid_names(&self) -> impl Iterator<Item = &str> {
        self.grids.keys().map(String::as_str)
    }

    /// Total players across all grids.
    pub fn total_population(&self) -> usize {
        self.grids.values().map(|s| s.population).sum()
    }

    #[cfg(test)]
    pub fn insert_for_test(&mut self, grid: &str, status: GridStatus) {
        self.grids.insert(grid.to_string(), status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(grids: &[(&str, &[&str])]) -> GridsFeed {
        GridsFeed {
            grids: grids
                .iter()
                .map(|(grid, players)| GridRecord {
                    grid: grid.to_string(),
                    players: players
                        .iter()
                        .map(|name| PlayerRecord {
                            name: name.to_string(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn population_counts_players() {
        let snapshot = Snapshot::from_feed(&feed(&[("B7", &["a", "b", "c"]), ("C2", &[])]), &[]);
        assert_eq!(snapshot.get("B7").unwrap().population, 3);
        assert_eq!(snapshot.get("C2").unwrap().population, 0);
        assert_eq!(snapshot.total_population(), 3);
    }

    #[test]
    fn blacklist_match_ignores_case_and_matches_substrings() {
        let snapshot = Snapshot::from_feed(
            &feed(&[("B7", &["EvilDoer42", "Friendly"])]),
            &["eviL".to_string()],
        );
        assert_eq!(
            snapshot.get("B7").unwrap().blacklist_matches,
            vec!["EvilDoer42".to_string()]
        );
    }

    #[test]
    fn overlapping_entries_list_the_player_once_per_entry() {
        let snapshot = Snapshot::from_feed(
            &feed(&[("B7", &["EvilDoer42"])]),
            &["evil".to_string(), "doer".to_string()],
        );
        assert_eq!(
            snapshot.get("B7").unwrap().blacklist_matches,
            vec!["EvilDoer42".to_string(), "EvilDoer42".to_string()]
        );
    }

    #[test]
    fn matches_follow_blacklist_entry_order() {
        let snapshot = Snapshot::from_feed(
            &feed(&[("B7", &["AlphaOne", "BetaTwo"])]),
            &["beta".to_string(), "alpha".to_string()],
        );
        assert_eq!(
            snapshot.get("B7").unwrap().blacklist_matches,
            vec!["BetaTwo".to_string(), "AlphaOne".to_string()]
        );
    }

    #[test]
    fn decodes_feed_json() {
        let body = r#"{
            "grids": [
                {"grid": "A1", "players": [{"name": "Pathfinder"}]},
                {"grid": "M12"}
            ]
        }"#;
        let feed: GridsFeed = serde_json::from_str(body).unwrap();
        let snapshot = Snapshot::from_feed(&feed, &[]);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("A1").unwrap().population, 1);
        assert_eq!(snapshot.get("M12").unwrap().population, 0);
    }
}
