//! DOM Events
//!
//! Keyboard events and the listener registry. Listeners are plain data: a
//! listener either carries an action the document runs itself on dispatch
//! (`ClearStyle`) or is handed back to the embedder (`Host`).

use crate::NodeId;

/// Event types the document dispatches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    KeyDown,
    Focus,
    Blur,
}

/// Where a listener is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Document,
    Node(NodeId),
}

/// Listener registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u32);

/// addEventListener options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    pub capture: bool,
    pub once: bool,
}

impl ListenerOptions {
    pub fn capture() -> Self {
        Self { capture: true, once: false }
    }

    pub fn once() -> Self {
        Self { capture: false, once: true }
    }
}

/// What happens when a listener fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerAction {
    /// Handled by the embedder that registered it
    Host,
    /// Remove the named inline style property from each node
    ClearStyle(Vec<(NodeId, String)>),
}

/// Event listener registration
#[derive(Debug, Clone)]
pub struct Listener {
    pub id: ListenerId,
    pub target: EventTarget,
    pub event_type: EventType,
    pub options: ListenerOptions,
    pub action: ListenerAction,
}

/// All listeners attached to one document
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next_id: u32,
    listeners: Vec<Listener>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add event listener
    pub fn add(
        &mut self,
        target: EventTarget,
        event_type: EventType,
        options: ListenerOptions,
        action: ListenerAction,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener { id, target, event_type, options, action });
        id
    }

    /// Remove event listener; false if it was already gone
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    /// Look up a live listener
    pub fn get(&self, id: ListenerId) -> Option<&Listener> {
        self.listeners.iter().find(|l| l.id == id)
    }

    /// Number of listeners for a target and type
    pub fn count(&self, target: EventTarget, event_type: EventType) -> usize {
        self.listeners
            .iter()
            .filter(|l| l.target == target && l.event_type == event_type)
            .count()
    }

    /// Total live listeners
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Listener ids for a target and type, capture listeners first, each
    /// group in registration order
    pub fn matching(&self, target: EventTarget, event_type: EventType) -> Vec<ListenerId> {
        let (capture, bubble): (Vec<&Listener>, Vec<&Listener>) = self
            .listeners
            .iter()
            .filter(|l| l.target == target && l.event_type == event_type)
            .partition(|l| l.options.capture);
        capture.into_iter().chain(bubble).map(|l| l.id).collect()
    }

    /// Take a listener for firing: `once` listeners are detached before
    /// they run, so a listener fires at most one time
    pub fn begin_fire(&mut self, id: ListenerId) -> Option<Listener> {
        let idx = self.listeners.iter().position(|l| l.id == id)?;
        if self.listeners[idx].options.once {
            Some(self.listeners.remove(idx))
        } else {
            Some(self.listeners[idx].clone())
        }
    }
}

/// Keyboard modifier flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyModifiers {
    pub fn from_flags(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Self {
        Self { shift, ctrl, alt, meta }
    }

    /// Any modifier held
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// keydown event
#[derive(Debug, Clone)]
pub struct KeyboardEvent {
    /// `KeyboardEvent.key` value, e.g. "ArrowUp" or "k"
    pub key: String,
    pub modifiers: KeyModifiers,
    pub cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
}

impl KeyboardEvent {
    pub fn new(key: &str) -> Self {
        Self::with_modifiers(key, KeyModifiers::default())
    }

    pub fn with_modifiers(key: &str, modifiers: KeyModifiers) -> Self {
        Self {
            key: key.to_string(),
            modifiers,
            cancelable: true,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
        }
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation, including to later listeners on the same target
    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub fn immediate_propagation_stopped(&self) -> bool {
        self.immediate_propagation_stopped
    }
}
