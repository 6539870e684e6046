//! Focus Effector
//!
//! Focuses the chosen item's focus target, scrolls the item into view and
//! outlines it. The outline lives until the focus target blurs: a one-shot
//! blur listener clears it and detaches itself.

use keynav_css::SelectorList;
use keynav_dom::{ListenerId, ScrollLogicalPosition};
use serde::{Deserialize, Serialize};

use crate::FocusHost;

const OUTLINE: &str = "outline";

/// Inline `outline` values applied while an item is marked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineStyle {
    /// Outline drawn around the item
    pub item: String,
    /// Outline on the focused element itself, usually suppressed so only
    /// the item outline shows
    pub target: String,
}

impl Default for OutlineStyle {
    fn default() -> Self {
        Self { item: "auto".to_string(), target: "none".to_string() }
    }
}

/// A marked item: styles applied, blur listener attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusMark<N> {
    pub item: N,
    pub target: N,
    pub listener: ListenerId,
}

#[derive(Debug)]
pub struct FocusEffector<N> {
    outline: OutlineStyle,
    block: ScrollLogicalPosition,
    mark: Option<FocusMark<N>>,
}

impl<N: Copy + Eq + std::fmt::Debug> FocusEffector<N> {
    pub fn new(outline: OutlineStyle, block: ScrollLogicalPosition) -> Self {
        Self { outline, block, mark: None }
    }

    /// Focus `item`'s focus target and mark it. Returns the focused
    /// element, or `None` (with no side effects) when the item has no
    /// focus target or the target refuses focus.
    pub fn apply<H>(&mut self, host: &mut H, item: N, focus_target: &SelectorList) -> Option<N>
    where
        H: FocusHost<Node = N>,
    {
        let Some(target) = host.find_within(item, focus_target) else {
            tracing::debug!(?item, selector = %focus_target, "item has no focus target");
            return None;
        };
        if !host.focus(target) {
            tracing::debug!(?item, ?target, "focus target refused focus");
            return None;
        }

        // Moving focus blurred the previous target and fired its cleanup.
        // A mark that is still attached belongs to a target that kept focus.
        self.release(host);

        host.scroll_into_view(item, self.block);
        host.set_style(item, OUTLINE, &self.outline.item);
        host.set_style(target, OUTLINE, &self.outline.target);
        let listener = host.clear_style_on_blur(
            target,
            vec![(item, OUTLINE.to_string()), (target, OUTLINE.to_string())],
        );
        self.mark = Some(FocusMark { item, target, listener });

        tracing::debug!(?item, ?target, "focused item");
        Some(target)
    }

    /// Remove the current mark now, if its blur listener has not fired
    pub fn release<H>(&mut self, host: &mut H)
    where
        H: FocusHost<Node = N>,
    {
        let Some(mark) = self.mark.take() else {
            return;
        };
        if host.remove_listener(mark.listener) {
            host.set_style(mark.item, OUTLINE, "");
            host.set_style(mark.target, OUTLINE, "");
        }
    }

    /// The most recent mark. Its listener may already have fired.
    pub fn last_mark(&self) -> Option<&FocusMark<N>> {
        self.mark.as_ref()
    }

    pub fn outline(&self) -> &OutlineStyle {
        &self.outline
    }
}

impl<N: Copy + Eq + std::fmt::Debug> Default for FocusEffector<N> {
    fn default() -> Self {
        Self::new(OutlineStyle::default(), ScrollLogicalPosition::Center)
    }
}
