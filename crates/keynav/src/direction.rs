//! Directions and the key map

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Navigation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown direction {0:?} (expected up, down, left or right)")]
pub struct ParseDirectionError(String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseDirectionError(s.to_string()))
    }
}

/// Key identifier (`KeyboardEvent.key`) to direction lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    keys: HashMap<String, Direction>,
}

impl KeyMap {
    /// Arrow keys plus vi-style `h`/`j`/`k`/`l`
    const BUILTIN: [(&'static str, Direction); 8] = [
        ("ArrowUp", Direction::Up),
        ("ArrowDown", Direction::Down),
        ("ArrowLeft", Direction::Left),
        ("ArrowRight", Direction::Right),
        ("k", Direction::Up),
        ("j", Direction::Down),
        ("h", Direction::Left),
        ("l", Direction::Right),
    ];

    /// Map with no bindings
    pub fn empty() -> Self {
        Self { keys: HashMap::new() }
    }

    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Direction)>,
        K: Into<String>,
    {
        Self { keys: entries.into_iter().map(|(k, d)| (k.into(), d)).collect() }
    }

    /// Add or replace a binding
    pub fn bind(&mut self, key: impl Into<String>, direction: Direction) {
        self.keys.insert(key.into(), direction);
    }

    /// Direction for a key, `None` for keys navigation ignores.
    /// Lookup is exact: "K" (shifted) is not "k".
    pub fn resolve(&self, key: &str) -> Option<Direction> {
        self.keys.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Bindings sorted by key, for display
    pub fn entries(&self) -> Vec<(&str, Direction)> {
        let mut entries: Vec<_> = self.keys.iter().map(|(k, d)| (k.as_str(), *d)).collect();
        entries.sort();
        entries
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::from_entries(Self::BUILTIN)
    }
}
