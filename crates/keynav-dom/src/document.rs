//! Document - High-level document API

use crate::{
    DOMRect, DomTree, ElementData, EventTarget, EventType, KeyboardEvent, ListenerAction,
    ListenerId, ListenerOptions, ListenerRegistry, NodeId, ScrollLogicalPosition, Viewport,
};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL
    url: String,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
    viewport: Viewport,
    active_element: Option<NodeId>,
    listeners: ListenerRegistry,
}

impl Document {
    /// Create a new document with html/head/body in place
    pub fn new(url: &str) -> Self {
        let mut doc = Self::empty(url);

        let html = doc.tree.create_element("html");
        let head = doc.tree.create_element("head");
        let body = doc.tree.create_element("body");
        let root = doc.tree.root();
        doc.tree.append_child(root, html);
        doc.tree.append_child(html, head);
        doc.tree.append_child(html, body);

        doc.html_element = html;
        doc.head_element = head;
        doc.body_element = body;
        doc
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
            viewport: Viewport::default(),
            active_element: None,
            listeners: ListenerRegistry::new(),
        }
    }

    /// Locate html/head/body after the tree was built externally
    pub fn finalize(&mut self) {
        let root = self.tree.root();
        let find = |tree: &DomTree, parent: NodeId, tag: &str| {
            tree.children(parent)
                .find(|(_, node)| node.as_element().is_some_and(|e| e.tag == tag))
                .map(|(id, _)| id)
                .unwrap_or(NodeId::NONE)
        };
        self.html_element = find(&self.tree, root, "html");
        if self.html_element.is_valid() {
            self.head_element = find(&self.tree, self.html_element, "head");
            self.body_element = find(&self.tree, self.html_element, "body");
        }
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Replace the URL without reloading (history.pushState and friends)
    pub fn set_url(&mut self, url: &str) {
        self.url = url.to_string();
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    // === Tree building ===

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.tree.create_text(content)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.tree.append_child(parent, child);
    }

    /// Create an element with attributes and append it to `parent`
    pub fn append_element(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = self.tree.create_element(tag);
        if let Some(elem) = self.tree.element_mut(id) {
            for (name, value) in attrs {
                elem.set_attr(name, value);
            }
        }
        self.tree.append_child(parent, id);
        id
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.tree.element(id)
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.tree.element(id).map(|e| e.tag.as_str())
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.tree.element(id).and_then(|e| e.get_attr(name))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(elem) = self.tree.element_mut(id) {
            elem.set_attr(name, value);
        }
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements().find(|n| {
            self.tree.element(*n).and_then(|e| e.id.as_deref()) == Some(id)
        })
    }

    /// All elements in document order
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.tree
            .descendants(self.tree.root())
            .filter(|id| self.tree.element(*id).is_some())
    }

    // === Geometry ===

    /// Record the border box of an element in page coordinates
    pub fn set_layout_rect(&mut self, id: NodeId, rect: DOMRect) {
        if let Some(elem) = self.tree.element_mut(id) {
            elem.layout = Some(rect);
        }
    }

    pub fn layout_rect(&self, id: NodeId) -> Option<DOMRect> {
        self.tree.element(id).and_then(|e| e.layout)
    }

    /// getBoundingClientRect: the layout box in viewport coordinates, or an
    /// all-zero rect for elements that have no box
    pub fn bounding_client_rect(&self, id: NodeId) -> DOMRect {
        match self.layout_rect(id) {
            Some(rect) => self.viewport.to_client(rect),
            None => DOMRect::new(),
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Element.scrollIntoView({ block })
    pub fn scroll_into_view(&mut self, id: NodeId, block: ScrollLogicalPosition) {
        if let Some(rect) = self.layout_rect(id) {
            self.viewport.scroll_into_view(rect, block);
            tracing::trace!(?id, scroll_y = self.viewport.scroll_y, "scrolled into view");
        }
    }

    // === Inline style ===

    pub fn style_property(&self, id: NodeId, name: &str) -> Option<&str> {
        self.tree.element(id).and_then(|e| e.style_property(name))
    }

    /// `el.style[name] = value`; an empty value removes the declaration
    pub fn set_style_property(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(elem) = self.tree.element_mut(id) {
            elem.set_style_property(name, value);
        }
    }

    // === Focus ===

    /// Currently focused element
    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    /// Whether `focus()` on this element does anything
    pub fn is_focusable(&self, id: NodeId) -> bool {
        let Some(elem) = self.tree.element(id) else {
            return false;
        };
        if elem.has_attr("tabindex") || self.is_content_editable(id) {
            return true;
        }
        match elem.tag.as_str() {
            "a" | "area" => elem.has_attr("href"),
            "input" => {
                !elem.has_attr("disabled")
                    && !elem.get_attr("type").is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
            }
            "button" | "select" | "textarea" => !elem.has_attr("disabled"),
            _ => false,
        }
    }

    /// isContentEditable, honouring inheritance and "false" opt-outs
    pub fn is_content_editable(&self, id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(node) = cur {
            if let Some(value) = self.get_attribute(node, "contenteditable") {
                match value.to_ascii_lowercase().as_str() {
                    "" | "true" | "plaintext-only" => return true,
                    "false" => return false,
                    _ => {}
                }
            }
            cur = self.tree.parent_element(node);
        }
        false
    }

    /// HTMLElement.focus(). Returns whether `id` holds focus afterwards.
    pub fn focus(&mut self, id: NodeId) -> bool {
        if !self.is_focusable(id) {
            return false;
        }
        if self.active_element == Some(id) {
            return true;
        }
        if let Some(prev) = self.active_element.take() {
            self.fire(EventTarget::Node(prev), EventType::Blur);
        }
        self.active_element = Some(id);
        self.fire(EventTarget::Node(id), EventType::Focus);
        true
    }

    /// HTMLElement.blur() on whatever holds focus
    pub fn blur(&mut self) {
        if let Some(prev) = self.active_element.take() {
            self.fire(EventTarget::Node(prev), EventType::Blur);
        }
    }

    // === Listeners ===

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn add_event_listener(
        &mut self,
        target: EventTarget,
        event_type: EventType,
        options: ListenerOptions,
        action: ListenerAction,
    ) -> ListenerId {
        self.listeners.add(target, event_type, options, action)
    }

    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn listener_count(&self, target: EventTarget, event_type: EventType) -> usize {
        self.listeners.count(target, event_type)
    }

    /// Run the document-side actions of every listener for this event
    fn fire(&mut self, target: EventTarget, event_type: EventType) {
        for id in self.listeners.matching(target, event_type) {
            let Some(listener) = self.listeners.begin_fire(id) else {
                continue;
            };
            if let ListenerAction::ClearStyle(entries) = listener.action {
                for (node, property) in entries {
                    self.set_style_property(node, &property, "");
                }
            }
        }
    }

    /// Dispatch keydown to document listeners, capture phase first.
    ///
    /// `invoke` runs each `Host` listener; dispatch stops once a listener
    /// calls `stop_immediate_propagation`. Returns the listeners invoked.
    pub fn dispatch_keydown<F>(&mut self, event: &mut KeyboardEvent, mut invoke: F) -> Vec<ListenerId>
    where
        F: FnMut(&mut Document, ListenerId, &mut KeyboardEvent),
    {
        let mut invoked = Vec::new();
        for id in self.listeners.matching(EventTarget::Document, EventType::KeyDown) {
            if event.immediate_propagation_stopped() {
                break;
            }
            // A listener earlier in this dispatch may have removed this one.
            let Some(listener) = self.listeners.begin_fire(id) else {
                continue;
            };
            invoked.push(id);
            match listener.action {
                ListenerAction::Host => invoke(self, id, event),
                ListenerAction::ClearStyle(entries) => {
                    for (node, property) in entries {
                        self.set_style_property(node, &property, "");
                    }
                }
            }
        }
        invoked
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
