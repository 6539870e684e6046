//! keynav DOM - Document Object Model
//!
//! Arena-based document tree with the pieces spatial navigation reads and
//! writes: live layout boxes, viewport scroll, inline style, focus and
//! event listeners.

mod node;
mod tree;
mod document;
mod geometry;
mod events;

pub use node::{Node, NodeData, ElementData, Attribute};
pub use tree::{DomTree, Children, Descendants};
pub use document::Document;
pub use geometry::{DOMRect, Viewport, ScrollLogicalPosition};
pub use events::{
    EventTarget, EventType, KeyModifiers, KeyboardEvent, Listener, ListenerAction, ListenerId,
    ListenerOptions, ListenerRegistry,
};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check this is not the sentinel
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
