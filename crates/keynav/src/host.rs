//! Capabilities navigation needs from the document it runs in.
//!
//! [`LayoutHost`] is read-only and is all the locator and spatial selector
//! use, so they run against any fabricated layout. [`FocusHost`] adds the
//! writes the effector performs, [`ListenerHost`] the keydown listener
//! lifecycle the session manages. `keynav_dom::Document` implements all
//! three.

use std::fmt;

use keynav_css::{self as css, SelectorList};
use keynav_dom::{
    DOMRect, Document, EventTarget, EventType, KeyboardEvent, ListenerAction, ListenerId,
    ListenerOptions, NodeId, ScrollLogicalPosition,
};

/// Read access to elements and their live geometry
pub trait LayoutHost {
    type Node: Copy + Eq + fmt::Debug;

    /// querySelectorAll over the whole document, in document order
    fn query_all(&self, selector: &SelectorList) -> Vec<Self::Node>;

    /// `root` if it matches, else its first matching descendant
    fn find_within(&self, root: Self::Node, selector: &SelectorList) -> Option<Self::Node>;

    /// `node` or its nearest ancestor matching `selector`
    fn closest(&self, node: Self::Node, selector: &SelectorList) -> Option<Self::Node>;

    /// Current bounding box in viewport coordinates. Must be read from live
    /// layout on every call.
    fn bounding_rect(&self, node: Self::Node) -> DOMRect;

    /// The element holding input focus
    fn active_element(&self) -> Option<Self::Node>;
}

/// Focus, scrolling and styling
pub trait FocusHost: LayoutHost {
    /// Free-text input, textarea or content-editable region
    fn is_text_entry(&self, node: Self::Node) -> bool;

    /// Move input focus; false when the element cannot take focus
    fn focus(&mut self, node: Self::Node) -> bool;

    fn scroll_into_view(&mut self, node: Self::Node, block: ScrollLogicalPosition);

    /// Set an inline style property; empty value removes it
    fn set_style(&mut self, node: Self::Node, property: &str, value: &str);

    /// Attach a one-shot blur listener to `target` that removes the given
    /// inline style properties and then detaches itself
    fn clear_style_on_blur(&mut self, target: Self::Node, properties: Vec<(Self::Node, String)>) -> ListenerId;

    /// Detach a listener; false if it already fired or was removed
    fn remove_listener(&mut self, id: ListenerId) -> bool;
}

/// Document location and keydown listener lifecycle
pub trait ListenerHost: FocusHost + Sized {
    /// location.href
    fn location(&self) -> &str;

    /// Client-side navigation: change the location without reloading
    fn set_location(&mut self, url: &str);

    /// Register a capture-phase keydown listener on the document
    fn add_keydown_listener(&mut self) -> ListenerId;

    /// Dispatch keydown, invoking `handler` for each listener in order
    /// until one stops immediate propagation
    fn dispatch_keydown(
        &mut self,
        event: &mut KeyboardEvent,
        handler: &mut dyn FnMut(&mut Self, ListenerId, &mut KeyboardEvent),
    ) -> Vec<ListenerId>;
}

/// `<input>` types that accept typed text
fn is_text_input_type(input_type: Option<&str>) -> bool {
    const NON_TEXT: [&str; 10] = [
        "button", "checkbox", "color", "file", "hidden", "image", "radio", "range", "reset", "submit",
    ];
    input_type.is_none_or(|t| !NON_TEXT.contains(&t.trim().to_ascii_lowercase().as_str()))
}

impl LayoutHost for Document {
    type Node = NodeId;

    fn query_all(&self, selector: &SelectorList) -> Vec<NodeId> {
        css::query_selector_all(self, self.tree().root(), selector)
    }

    fn find_within(&self, root: NodeId, selector: &SelectorList) -> Option<NodeId> {
        if css::matches(self, root, selector) {
            return Some(root);
        }
        css::query_selector(self, root, selector)
    }

    fn closest(&self, node: NodeId, selector: &SelectorList) -> Option<NodeId> {
        css::closest(self, node, selector)
    }

    fn bounding_rect(&self, node: NodeId) -> DOMRect {
        self.bounding_client_rect(node)
    }

    fn active_element(&self) -> Option<NodeId> {
        Document::active_element(self)
    }
}

impl FocusHost for Document {
    fn is_text_entry(&self, node: NodeId) -> bool {
        match self.tag_name(node) {
            Some("textarea") => true,
            Some("input") => is_text_input_type(self.get_attribute(node, "type")),
            _ => self.is_content_editable(node),
        }
    }

    fn focus(&mut self, node: NodeId) -> bool {
        Document::focus(self, node)
    }

    fn scroll_into_view(&mut self, node: NodeId, block: ScrollLogicalPosition) {
        Document::scroll_into_view(self, node, block)
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        self.set_style_property(node, property, value)
    }

    fn clear_style_on_blur(&mut self, target: NodeId, properties: Vec<(NodeId, String)>) -> ListenerId {
        self.add_event_listener(
            EventTarget::Node(target),
            EventType::Blur,
            ListenerOptions::once(),
            ListenerAction::ClearStyle(properties),
        )
    }

    fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.remove_event_listener(id)
    }
}

impl ListenerHost for Document {
    fn location(&self) -> &str {
        self.url()
    }

    fn set_location(&mut self, url: &str) {
        self.set_url(url)
    }

    fn add_keydown_listener(&mut self) -> ListenerId {
        self.add_event_listener(
            EventTarget::Document,
            EventType::KeyDown,
            ListenerOptions::capture(),
            ListenerAction::Host,
        )
    }

    fn dispatch_keydown(
        &mut self,
        event: &mut KeyboardEvent,
        handler: &mut dyn FnMut(&mut Self, ListenerId, &mut KeyboardEvent),
    ) -> Vec<ListenerId> {
        Document::dispatch_keydown(self, event, |doc, id, event| handler(doc, id, event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_entry_classification() {
        let mut doc = Document::new("about:blank");
        let body = doc.body();
        let text = doc.append_element(body, "input", &[]);
        let search = doc.append_element(body, "input", &[("type", "Search")]);
        let checkbox = doc.append_element(body, "input", &[("type", "checkbox")]);
        let submit = doc.append_element(body, "input", &[("type", "submit")]);
        let area = doc.append_element(body, "textarea", &[]);
        let editor = doc.append_element(body, "div", &[("contenteditable", "true")]);
        let link = doc.append_element(body, "a", &[("href", "#")]);

        assert!(doc.is_text_entry(text));
        assert!(doc.is_text_entry(search));
        assert!(!doc.is_text_entry(checkbox));
        assert!(!doc.is_text_entry(submit));
        assert!(doc.is_text_entry(area));
        assert!(doc.is_text_entry(editor));
        assert!(!doc.is_text_entry(link));
    }

    #[test]
    fn test_find_within_includes_root() {
        let mut doc = Document::new("about:blank");
        let body = doc.body();
        let link = doc.append_element(body, "a", &[("class", "link"), ("href", "#")]);
        let selector = SelectorList::parse(".link").unwrap();

        assert_eq!(doc.find_within(link, &selector), Some(link));
        assert_eq!(doc.find_within(body, &selector), Some(link));
    }
}
