// src/models/grid.rs

//! Grid identifiers and watchable worlds.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

static GRID_NAME: OnceLock<Regex> = OnceLock::new();

/// Pattern for valid grid names: columns A-O, rows 1-15.
fn grid_name_pattern() -> &'static Regex {
    GRID_NAME.get_or_init(|| {
        Regex::new(r"^[A-O](1[0-5]|[1-9])$").expect("grid name pattern is valid")
    })
}

/// Normalize a grid name to its canonical uppercase form.
///
/// Returns `None` when the input does not name a grid on the A1-O15 map.
pub fn normalize_grid_name(name: &str) -> Option<String> {
    let upper = name.to_uppercase();
    grid_name_pattern().is_match(&upper).then_some(upper)
}

/// A watchable game world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum World {
    Na,
    Eu,
}

impl World {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Na => "NA",
            Self::Eu => "EU",
        }
    }
}

impl fmt::Display for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for World {
    type Err = AppError;

    /// Strict parse; only the exact tokens `NA` and `EU` are worlds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NA" => Ok(Self::Na),
            "EU" => Ok(Self::Eu),
            other => Err(AppError::validation(format!("unknown world '{other}'"))),
        }
    }
}
