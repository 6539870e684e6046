//! Candidate Locator

use keynav_css::SelectorList;

use crate::LayoutHost;

/// Every item matching `item` that contains (or is) an element matching
/// `focus_target`, in document order. Items without a focus target are not
/// navigation destinations. No deduplication beyond selector semantics:
/// nested items are all returned.
pub fn locate<H: LayoutHost>(host: &H, item: &SelectorList, focus_target: &SelectorList) -> Vec<H::Node> {
    let candidates: Vec<H::Node> = host
        .query_all(item)
        .into_iter()
        .filter(|node| host.find_within(*node, focus_target).is_some())
        .collect();
    tracing::trace!(item = %item, count = candidates.len(), "located candidates");
    candidates
}

/// The item containing the focused element, found by walking up from it
pub fn active_item<H: LayoutHost>(host: &H, item: &SelectorList) -> Option<H::Node> {
    let focused = host.active_element()?;
    host.closest(focused, item)
}
