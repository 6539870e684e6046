//! Configuration
//!
//! A JSON file layered over the built-in key map and site table:
//!
//! ```json
//! {
//!   "keys": { "w": "up", "s": "down" },
//!   "patterns": [
//!     { "url": "^https://lobste\\.rs/", "container": ".story", "link": "a.u-url" }
//!   ],
//!   "outline": { "item": "2px solid orange", "target": "none" },
//!   "scroll": "nearest"
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use keynav_dom::ScrollLogicalPosition;
use serde::{Deserialize, Serialize};

use crate::{Direction, KeyMap, OutlineStyle, PatternError, PatternTable, SitePattern};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("site pattern {index}: {source}")]
    Pattern {
        index: usize,
        #[source]
        source: PatternError,
    },
}

/// A site pattern as written in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternSpec {
    /// Regex tested against the location href
    pub url: String,
    /// Item selector
    pub container: String,
    /// Focus target selector, matched within (or against) each item
    pub link: String,
}

/// `scrollIntoView` block alignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBlock {
    Start,
    #[default]
    Center,
    End,
    Nearest,
}

impl From<ScrollBlock> for ScrollLogicalPosition {
    fn from(block: ScrollBlock) -> Self {
        match block {
            ScrollBlock::Start => ScrollLogicalPosition::Start,
            ScrollBlock::Center => ScrollLogicalPosition::Center,
            ScrollBlock::End => ScrollLogicalPosition::End,
            ScrollBlock::Nearest => ScrollLogicalPosition::Nearest,
        }
    }
}

/// Raw configuration. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Extra key bindings, overriding built-ins with the same key
    pub keys: BTreeMap<String, Direction>,
    /// Drop the built-in bindings and use only `keys`
    pub replace_builtin_keys: bool,
    /// Extra site patterns, appended after the built-in table
    pub patterns: Vec<PatternSpec>,
    /// Drop the built-in site table and use only `patterns`
    pub replace_builtin_patterns: bool,
    pub outline: OutlineStyle,
    pub scroll: ScrollBlock,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loading config: {}", path.display());
        Self::from_json_str(&text)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compile every pattern and merge with the built-ins. Pattern indices
    /// in errors count from the first entry of `patterns`.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        let mut keymap = if self.replace_builtin_keys { KeyMap::empty() } else { KeyMap::default() };
        for (key, direction) in &self.keys {
            keymap.bind(key.as_str(), *direction);
        }

        let mut patterns = if self.replace_builtin_patterns {
            PatternTable::default()
        } else {
            PatternTable::builtin()
        };
        for (index, spec) in self.patterns.iter().enumerate() {
            let pattern = SitePattern::new(&spec.url, &spec.container, &spec.link)
                .map_err(|source| ConfigError::Pattern { index, source })?;
            patterns.push(pattern);
        }

        tracing::debug!(keys = keymap.len(), patterns = patterns.len(), "resolved config");
        Ok(ResolvedConfig {
            keymap,
            patterns,
            outline: self.outline.clone(),
            scroll: self.scroll.into(),
        })
    }
}

/// Compiled configuration, ready for a session
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub keymap: KeyMap,
    pub patterns: PatternTable,
    pub outline: OutlineStyle,
    pub scroll: ScrollLogicalPosition,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            keymap: KeyMap::default(),
            patterns: PatternTable::builtin(),
            outline: OutlineStyle::default(),
            scroll: ScrollLogicalPosition::Center,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_builtin() {
        let resolved = Config::from_json_str("{}").unwrap().resolve().unwrap();
        assert_eq!(resolved.keymap, KeyMap::default());
        assert_eq!(resolved.patterns.len(), PatternTable::builtin().len());
        assert_eq!(resolved.outline, OutlineStyle::default());
        assert_eq!(resolved.scroll, ScrollLogicalPosition::Center);
    }

    #[test]
    fn test_layering() {
        let config = Config::from_json_str(
            r#"{
                "keys": { "w": "up", "j": "up" },
                "patterns": [{ "url": "^https://lobste\\.rs/", "container": ".story", "link": "a.u-url" }],
                "outline": { "item": "2px solid orange" },
                "scroll": "nearest"
            }"#,
        )
        .unwrap();
        let resolved = config.resolve().unwrap();

        assert_eq!(resolved.keymap.resolve("w"), Some(Direction::Up));
        assert_eq!(resolved.keymap.resolve("j"), Some(Direction::Up));
        assert_eq!(resolved.keymap.resolve("ArrowDown"), Some(Direction::Down));
        assert_eq!(resolved.patterns.len(), PatternTable::builtin().len() + 1);
        assert_eq!(resolved.patterns.matching("https://lobste.rs/").len(), 1);
        assert_eq!(resolved.outline.item, "2px solid orange");
        assert_eq!(resolved.outline.target, "none");
        assert_eq!(resolved.scroll, ScrollLogicalPosition::Nearest);
    }

    #[test]
    fn test_replace_builtins() {
        let config = Config::from_json_str(
            r#"{
                "keys": { "s": "down" },
                "replace_builtin_keys": true,
                "patterns": [{ "url": "list", "container": "li", "link": "a" }],
                "replace_builtin_patterns": true
            }"#,
        )
        .unwrap();
        let resolved = config.resolve().unwrap();

        assert_eq!(resolved.keymap.len(), 1);
        assert_eq!(resolved.keymap.resolve("ArrowDown"), None);
        assert_eq!(resolved.patterns.len(), 1);
        assert!(resolved.patterns.matching("https://news.ycombinator.com/").is_empty());
    }

    #[test]
    fn test_bad_pattern_names_index() {
        let config = Config::from_json_str(
            r#"{ "patterns": [
                { "url": "ok", "container": "li", "link": "a" },
                { "url": "ok", "container": "li >", "link": "a" }
            ] }"#,
        )
        .unwrap();
        match config.resolve() {
            Err(ConfigError::Pattern { index, source: PatternError::Selector { selector, .. } }) => {
                assert_eq!(index, 1);
                assert_eq!(selector, "li >");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_fields_and_directions() {
        assert!(matches!(Config::from_json_str(r#"{ "kyes": {} }"#), Err(ConfigError::Json(_))));
        assert!(matches!(Config::from_json_str(r#"{ "keys": { "w": "north" } }"#), Err(ConfigError::Json(_))));
        assert!(matches!(Config::from_json_str(r#"{ "scroll": "middle" }"#), Err(ConfigError::Json(_))));
    }
}
