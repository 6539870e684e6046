//! Document queries: querySelectorAll, querySelector, closest, matches

use keynav_dom::{Document, NodeId};

use crate::{SelectorElement, SelectorList};

/// An element of a [`Document`] seen through [`SelectorElement`]
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> ElementRef<'a> {
    /// Wrap `id` if it is an element
    pub fn new(doc: &'a Document, id: NodeId) -> Option<Self> {
        doc.element(id).map(|_| Self { doc, id })
    }

    pub fn id_node(&self) -> NodeId {
        self.id
    }
}

impl PartialEq for ElementRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl SelectorElement for ElementRef<'_> {
    fn local_name(&self) -> &str {
        self.doc.tag_name(self.id).unwrap_or_default()
    }

    fn id(&self) -> Option<&str> {
        self.doc.element(self.id).and_then(|e| e.id.as_deref())
    }

    fn has_class(&self, class: &str) -> bool {
        self.doc
            .element(self.id)
            .is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.doc.get_attribute(self.id, name)
    }

    fn parent_element(&self) -> Option<Self> {
        let parent = self.doc.tree().parent_element(self.id)?;
        Self::new(self.doc, parent)
    }

    fn first_child_element(&self) -> Option<Self> {
        let (child, _) = self.doc.tree().children(self.id).find(|(_, node)| node.is_element())?;
        Self::new(self.doc, child)
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        let sibling = self.doc.tree().prev_element_sibling(self.id)?;
        Self::new(self.doc, sibling)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        let sibling = self.doc.tree().next_element_sibling(self.id)?;
        Self::new(self.doc, sibling)
    }
}

/// Element.matches()
pub fn matches(doc: &Document, id: NodeId, selector: &SelectorList) -> bool {
    ElementRef::new(doc, id).is_some_and(|el| selector.matches(el))
}

/// Every element below `root` matching `selector`, in document order.
/// `root` itself is never included.
pub fn query_selector_all(doc: &Document, root: NodeId, selector: &SelectorList) -> Vec<NodeId> {
    doc.tree()
        .descendants(root)
        .filter(|id| matches(doc, *id, selector))
        .collect()
}

/// First element below `root` matching `selector`
pub fn query_selector(doc: &Document, root: NodeId, selector: &SelectorList) -> Option<NodeId> {
    doc.tree()
        .descendants(root)
        .find(|id| matches(doc, *id, selector))
}

/// Element.closest(): `id` itself or its nearest matching ancestor
pub fn closest(doc: &Document, id: NodeId, selector: &SelectorList) -> Option<NodeId> {
    let mut cur = Some(id);
    while let Some(node) = cur {
        if matches(doc, node, selector) {
            return Some(node);
        }
        cur = doc.tree().parent_element(node);
    }
    None
}
