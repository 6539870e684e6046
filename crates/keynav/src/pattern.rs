//! Site patterns: which pages get navigation, and what counts as an item

use keynav_css::{SelectorError, SelectorList};
use regex::Regex;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("invalid URL pattern {pattern:?}: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid selector {selector:?}: {source}")]
    Selector {
        selector: String,
        #[source]
        source: SelectorError,
    },
}

/// One site: a URL regex plus the item and focus-target selectors
#[derive(Debug, Clone)]
pub struct SitePattern {
    url: Regex,
    item: SelectorList,
    focus_target: SelectorList,
}

fn parse_selector(selector: &str) -> Result<SelectorList, PatternError> {
    SelectorList::parse(selector).map_err(|source| PatternError::Selector {
        selector: selector.to_string(),
        source,
    })
}

impl SitePattern {
    /// Compile a pattern. `url` is an unanchored regex tested against the
    /// full location href; `item` selects navigable items and
    /// `focus_target` the element inside (or equal to) an item that
    /// receives focus.
    pub fn new(url: &str, item: &str, focus_target: &str) -> Result<Self, PatternError> {
        let url = Regex::new(url).map_err(|source| PatternError::Regex {
            pattern: url.to_string(),
            source,
        })?;
        Ok(Self {
            url,
            item: parse_selector(item)?,
            focus_target: parse_selector(focus_target)?,
        })
    }

    pub fn matches(&self, href: &str) -> bool {
        self.url.is_match(href)
    }

    pub fn url_pattern(&self) -> &str {
        self.url.as_str()
    }

    pub fn item_selector(&self) -> &SelectorList {
        &self.item
    }

    pub fn focus_target_selector(&self) -> &SelectorList {
        &self.focus_target
    }
}

/// Ordered set of site patterns. Order is cosmetic: every matching
/// pattern applies independently.
#[derive(Debug, Clone, Default)]
pub struct PatternTable {
    patterns: Vec<SitePattern>,
}

impl PatternTable {
    /// (url, item, focus target), ordered by URL
    const BUILTIN: &'static [(&'static str, &'static str, &'static str)] = &[
        ("^https://automaton-media.com/$", ".td-pb-span8 .td-block-span12", ".entry-title a"),
        ("^https://news.ycombinator.com/", "tr.athing", ".title a"),
        ("^https://store.steampowered.com/wishlist/id/", ".wishlist_row", ".title"),
        ("^https://www.4gamer.net/", "h2", "a"),
        ("^https://www.amazon.co.jp/s\\?", "[data-component-type='s-search-result']", "h2 a"),
        ("^https://www.gamespark.jp/", "main .news-list .link", ".link"),
        ("^https://www.google.com/search\\?", "#search .MjjYud", "a[jsname='UWckNb']"),
        ("^https://www.youtube.com/$", "ytd-rich-item-renderer", "#video-title-link"),
        (
            "^https://www.youtube.com/(@|results\\?)",
            "ytd-video-renderer, ytd-rich-item-renderer, ytd-grid-video-renderer",
            "#video-title",
        ),
    ];

    pub fn new(patterns: Vec<SitePattern>) -> Self {
        Self { patterns }
    }

    /// The built-in site table
    pub fn builtin() -> Self {
        let patterns = Self::BUILTIN
            .iter()
            .filter_map(|(url, item, target)| match SitePattern::new(url, item, target) {
                Ok(pattern) => Some(pattern),
                Err(err) => {
                    tracing::error!(%err, "built-in site pattern rejected");
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    pub fn push(&mut self, pattern: SitePattern) {
        self.patterns.push(pattern);
    }

    pub fn get(&self, index: usize) -> Option<&SitePattern> {
        self.patterns.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SitePattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Indices of every pattern matching `location`.
    ///
    /// The location is normalised the way `location.href` is (so
    /// `https://host` is tested as `https://host/`); strings that do not
    /// parse as URLs are tested verbatim.
    pub fn matching(&self, location: &str) -> Vec<usize> {
        let href = match Url::parse(location) {
            Ok(url) => url.to_string(),
            Err(err) => {
                tracing::debug!(location, %err, "location is not a URL, matching verbatim");
                location.to_string()
            }
        };
        self.patterns
            .iter()
            .enumerate()
            .filter(|(_, p)| p.matches(&href))
            .map(|(i, _)| i)
            .collect()
    }
}
