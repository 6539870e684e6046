//! Navigation Session Controller
//!
//! Owns the key map, the site pattern table and the focus effector, and
//! manages one capture-phase keydown listener per site pattern matching the
//! document location. Whoever observes navigation calls [`NavigationSession::start`],
//! [`NavigationSession::stop`] or [`NavigationSession::navigate`]; nothing
//! subscribes implicitly.

use keynav_dom::{KeyboardEvent, ListenerId};

use crate::config::ResolvedConfig;
use crate::{
    active_item, locate, select, Direction, FocusEffector, FocusHost, KeyMap, ListenerHost,
    PatternTable, SitePattern,
};

/// Why a keystroke was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Focus is in a text field or content-editable region
    Editing,
    /// Alt, Ctrl, Meta or Shift held
    Modifier,
    /// Key has no direction
    UnmappedKey,
    /// No item in that direction
    NoCandidate,
    /// The chosen item's focus target is missing or refused focus
    NoFocusTarget,
    /// No navigation listener saw the event
    NotInstalled,
}

/// Result of one keydown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome<N> {
    /// Focus moved; the event was consumed
    Moved { direction: Direction, item: N, target: N },
    /// The event passed through untouched
    Ignored(IgnoreReason),
}

impl<N> KeyOutcome<N> {
    pub fn is_consumed(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Installed {
    pattern: usize,
    listener: ListenerId,
}

#[derive(Debug)]
pub struct NavigationSession<N> {
    keymap: KeyMap,
    patterns: PatternTable,
    effector: FocusEffector<N>,
    installed: Vec<Installed>,
}

/// Session over the in-tree document model
pub type DocumentSession = NavigationSession<keynav_dom::NodeId>;

impl<N: Copy + Eq + std::fmt::Debug> NavigationSession<N> {
    pub fn new(config: ResolvedConfig) -> Self {
        Self {
            keymap: config.keymap,
            patterns: config.patterns,
            effector: FocusEffector::new(config.outline, config.scroll),
            installed: Vec::new(),
        }
    }

    /// Built-in key map and site table
    pub fn with_defaults() -> Self {
        Self::new(ResolvedConfig::default())
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    pub fn patterns(&self) -> &PatternTable {
        &self.patterns
    }

    pub fn effector(&self) -> &FocusEffector<N> {
        &self.effector
    }

    /// Install a keydown listener for every pattern matching the current
    /// location, replacing any installed earlier. Returns how many were
    /// installed.
    pub fn start<H>(&mut self, host: &mut H) -> usize
    where
        H: ListenerHost<Node = N>,
    {
        if !self.installed.is_empty() {
            self.stop(host);
        }

        let location = host.location().to_string();
        for pattern in self.patterns.matching(&location) {
            let listener = host.add_keydown_listener();
            tracing::debug!(
                %location,
                pattern = self.patterns.get(pattern).map(SitePattern::url_pattern),
                ?listener,
                "installed keydown listener"
            );
            self.installed.push(Installed { pattern, listener });
        }
        if self.installed.is_empty() {
            tracing::debug!(%location, "no site pattern matches");
        }
        self.installed.len()
    }

    /// Remove every listener this session installed
    pub fn stop<H>(&mut self, host: &mut H)
    where
        H: ListenerHost<Node = N>,
    {
        for entry in self.installed.drain(..) {
            if !host.remove_listener(entry.listener) {
                tracing::warn!(listener = ?entry.listener, "keydown listener was already gone");
            }
            tracing::debug!(listener = ?entry.listener, "removed keydown listener");
        }
    }

    /// Client-side navigation: move to `url` and reinstall for it
    pub fn navigate<H>(&mut self, host: &mut H, url: &str) -> usize
    where
        H: ListenerHost<Node = N>,
    {
        host.set_location(url);
        self.start(host)
    }

    /// `(pattern index, listener)` for each installed listener
    pub fn installed(&self) -> Vec<(usize, ListenerId)> {
        self.installed.iter().map(|i| (i.pattern, i.listener)).collect()
    }

    pub fn is_installed(&self) -> bool {
        !self.installed.is_empty()
    }

    /// Deliver a keydown through the host's listeners.
    ///
    /// Page listeners run too, in registration order after the capture-phase
    /// navigation listeners; a move stops immediate propagation so they never
    /// see a consumed key.
    pub fn dispatch_keydown<H>(&mut self, host: &mut H, event: &mut KeyboardEvent) -> KeyOutcome<N>
    where
        H: ListenerHost<Node = N>,
    {
        let mut outcome = KeyOutcome::Ignored(IgnoreReason::NotInstalled);
        let Self { keymap, patterns, effector, installed } = self;

        host.dispatch_keydown(
            event,
            &mut |host: &mut H, listener: ListenerId, event: &mut KeyboardEvent| {
                let Some(entry) = installed.iter().find(|i| i.listener == listener) else {
                    return;
                };
                let Some(pattern) = patterns.get(entry.pattern) else {
                    return;
                };
                outcome = handle_key(host, keymap, pattern, effector, event);
            },
        );

        tracing::debug!(key = %event.key, ?outcome, "keydown handled");
        outcome
    }
}

impl<N: Copy + Eq + std::fmt::Debug> Default for NavigationSession<N> {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// One navigation listener's reaction to a keystroke
fn handle_key<H: FocusHost>(
    host: &mut H,
    keymap: &KeyMap,
    pattern: &SitePattern,
    effector: &mut FocusEffector<H::Node>,
    event: &mut KeyboardEvent,
) -> KeyOutcome<H::Node> {
    if host.active_element().is_some_and(|node| host.is_text_entry(node)) {
        return KeyOutcome::Ignored(IgnoreReason::Editing);
    }
    if event.modifiers.any() {
        return KeyOutcome::Ignored(IgnoreReason::Modifier);
    }
    let Some(direction) = keymap.resolve(&event.key) else {
        return KeyOutcome::Ignored(IgnoreReason::UnmappedKey);
    };

    let item_selector = pattern.item_selector();
    let target_selector = pattern.focus_target_selector();
    let candidates = locate(host, item_selector, target_selector);
    let active = active_item(host, item_selector);

    let Some(item) = select(host, active, direction, &candidates) else {
        return KeyOutcome::Ignored(IgnoreReason::NoCandidate);
    };
    let Some(target) = effector.apply(host, item, target_selector) else {
        return KeyOutcome::Ignored(IgnoreReason::NoFocusTarget);
    };

    event.prevent_default();
    event.stop_immediate_propagation();
    KeyOutcome::Moved { direction, item, target }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keynav_dom::{DOMRect, Document, EventTarget, EventType, KeyModifiers, NodeId};

    fn list_config() -> ResolvedConfig {
        let patterns = PatternTable::new(vec![
            SitePattern::new("^https://list\\.test/", "li", "a").unwrap(),
        ]);
        ResolvedConfig { patterns, ..ResolvedConfig::default() }
    }

    /// Three stacked list items, 100px tall
    fn list_page(url: &str) -> (Document, Vec<NodeId>) {
        let mut doc = Document::new(url);
        let body = doc.body();
        let ul = doc.append_element(body, "ul", &[]);
        let mut links = Vec::new();
        for i in 0..3 {
            let li = doc.append_element(ul, "li", &[]);
            doc.set_layout_rect(li, DOMRect::from_xywh(0.0, 100.0 * i as f64, 400.0, 100.0));
            links.push(doc.append_element(li, "a", &[("href", "#")]));
        }
        (doc, links)
    }

    fn keydown_listeners(doc: &Document) -> usize {
        doc.listener_count(EventTarget::Document, EventType::KeyDown)
    }

    #[test]
    fn test_start_installs_per_matching_pattern() {
        let (mut doc, _) = list_page("https://list.test/items");
        let mut session = NavigationSession::new(list_config());

        assert_eq!(session.start(&mut doc), 1);
        assert_eq!(keydown_listeners(&doc), 1);
        // restarting does not stack listeners
        assert_eq!(session.start(&mut doc), 1);
        assert_eq!(keydown_listeners(&doc), 1);

        session.stop(&mut doc);
        assert_eq!(keydown_listeners(&doc), 0);
        assert!(!session.is_installed());
    }

    #[test]
    fn test_unmatched_location_installs_nothing() {
        let (mut doc, _) = list_page("https://other.test/");
        let mut session = NavigationSession::new(list_config());

        assert_eq!(session.start(&mut doc), 0);
        let outcome = session.dispatch_keydown(&mut doc, &mut KeyboardEvent::new("j"));
        assert_eq!(outcome, KeyOutcome::Ignored(IgnoreReason::NotInstalled));
    }

    #[test]
    fn test_first_key_focuses_first_item() {
        let (mut doc, links) = list_page("https://list.test/");
        let mut session = NavigationSession::new(list_config());
        session.start(&mut doc);

        let mut event = KeyboardEvent::new("k");
        let outcome = session.dispatch_keydown(&mut doc, &mut event);
        assert!(matches!(outcome, KeyOutcome::Moved { target, .. } if target == links[0]));
        assert!(event.default_prevented());
        assert!(event.propagation_stopped());
    }

    #[test]
    fn test_down_then_bottom_edge() {
        let (mut doc, links) = list_page("https://list.test/");
        let mut session = NavigationSession::new(list_config());
        session.start(&mut doc);

        for expected in [links[0], links[1], links[2]] {
            let outcome = session.dispatch_keydown(&mut doc, &mut KeyboardEvent::new("j"));
            assert!(matches!(outcome, KeyOutcome::Moved { direction: Direction::Down, target, .. } if target == expected));
        }
        let mut event = KeyboardEvent::new("j");
        let outcome = session.dispatch_keydown(&mut doc, &mut event);
        assert_eq!(outcome, KeyOutcome::Ignored(IgnoreReason::NoCandidate));
        assert!(!event.default_prevented());
        assert_eq!(doc.active_element(), Some(links[2]));
    }

    #[test]
    fn test_ignored_keys_pass_through() {
        let (mut doc, _) = list_page("https://list.test/");
        let mut session = NavigationSession::new(list_config());
        session.start(&mut doc);

        let mut enter = KeyboardEvent::new("Enter");
        assert_eq!(session.dispatch_keydown(&mut doc, &mut enter), KeyOutcome::Ignored(IgnoreReason::UnmappedKey));
        assert!(!enter.default_prevented());

        let shift = KeyModifiers::from_flags(true, false, false, false);
        let mut shifted = KeyboardEvent::with_modifiers("J", shift);
        assert_eq!(session.dispatch_keydown(&mut doc, &mut shifted), KeyOutcome::Ignored(IgnoreReason::Modifier));

        let ctrl = KeyModifiers::from_flags(false, true, false, false);
        let mut ctrl_j = KeyboardEvent::with_modifiers("j", ctrl);
        assert_eq!(session.dispatch_keydown(&mut doc, &mut ctrl_j), KeyOutcome::Ignored(IgnoreReason::Modifier));
        assert_eq!(doc.active_element(), None);
    }

    #[test]
    fn test_navigate_reinstalls_for_new_location() {
        let (mut doc, _) = list_page("https://other.test/");
        let mut session = NavigationSession::new(list_config());
        assert_eq!(session.start(&mut doc), 0);

        assert_eq!(session.navigate(&mut doc, "https://list.test/page/2"), 1);
        assert_eq!(doc.url(), "https://list.test/page/2");
        assert_eq!(keydown_listeners(&doc), 1);

        assert_eq!(session.navigate(&mut doc, "https://other.test/"), 0);
        assert_eq!(keydown_listeners(&doc), 0);
    }

    #[test]
    fn test_outcome_consumed() {
        let moved: KeyOutcome<usize> = KeyOutcome::Moved { direction: Direction::Up, item: 1, target: 2 };
        assert!(moved.is_consumed());
        assert!(!KeyOutcome::<usize>::Ignored(IgnoreReason::Editing).is_consumed());
    }
}
