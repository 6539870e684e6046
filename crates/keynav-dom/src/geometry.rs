//! Geometry APIs
//!
//! DOMRect, the viewport and scroll-into-view.

/// DOMRect - rectangle geometry
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DOMRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DOMRect {
    /// Create empty rect
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with dimensions
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Create from edges, the shape `getBoundingClientRect` is usually read in
    pub fn from_edges(top: f64, left: f64, right: f64, bottom: f64) -> Self {
        Self { x: left, y: top, width: right - left, height: bottom - top }
    }

    /// Top edge (same as y)
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Right edge
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Left edge (same as x)
    pub fn left(&self) -> f64 {
        self.x
    }

    /// Zero width or height
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Same rect moved by (dx, dy)
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy, ..*self }
    }
}

/// Block alignment for scroll-into-view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScrollLogicalPosition {
    Start,
    #[default]
    Center,
    End,
    Nearest,
}

/// The scrolling viewport of a document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { scroll_x: 0.0, scroll_y: 0.0, width: 1280.0, height: 720.0 }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height, ..Default::default() }
    }

    /// Scroll to position; offsets never go negative
    pub fn scroll_to(&mut self, x: f64, y: f64) {
        self.scroll_x = x.max(0.0);
        self.scroll_y = y.max(0.0);
    }

    /// Convert a page-coordinate rect into viewport coordinates
    pub fn to_client(&self, page_rect: DOMRect) -> DOMRect {
        page_rect.translate(-self.scroll_x, -self.scroll_y)
    }

    /// Vertically scroll so `page_rect` lands at `block`
    pub fn scroll_into_view(&mut self, page_rect: DOMRect, block: ScrollLogicalPosition) {
        let target = match block {
            ScrollLogicalPosition::Start => page_rect.top(),
            ScrollLogicalPosition::Center => {
                page_rect.top() + page_rect.height / 2.0 - self.height / 2.0
            }
            ScrollLogicalPosition::End => page_rect.bottom() - self.height,
            ScrollLogicalPosition::Nearest => {
                if page_rect.top() < self.scroll_y {
                    page_rect.top()
                } else if page_rect.bottom() > self.scroll_y + self.height {
                    page_rect.bottom() - self.height
                } else {
                    self.scroll_y
                }
            }
        };
        self.scroll_to(self.scroll_x, target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dom_rect() {
        let rect = DOMRect::from_xywh(10.0, 20.0, 100.0, 50.0);

        assert_eq!(rect.top(), 20.0);
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 70.0);
        assert_eq!(rect.left(), 10.0);
    }

    #[test]
    fn test_from_edges() {
        let rect = DOMRect::from_edges(100.0, 0.0, 100.0, 150.0);
        assert_eq!(rect, DOMRect::from_xywh(0.0, 100.0, 100.0, 50.0));
        assert!(!rect.is_empty());
        assert!(DOMRect::from_edges(5.0, 5.0, 5.0, 5.0).is_empty());
    }

    #[test]
    fn test_scroll_into_view_center() {
        let mut viewport = Viewport::new(800.0, 600.0);
        viewport.scroll_into_view(DOMRect::from_xywh(0.0, 1000.0, 100.0, 100.0), ScrollLogicalPosition::Center);
        assert_eq!(viewport.scroll_y, 750.0);

        let client = viewport.to_client(DOMRect::from_xywh(0.0, 1000.0, 100.0, 100.0));
        assert_eq!(client.top(), 250.0);
    }

    #[test]
    fn test_scroll_clamps_at_top() {
        let mut viewport = Viewport::new(800.0, 600.0);
        viewport.scroll_into_view(DOMRect::from_xywh(0.0, 10.0, 100.0, 20.0), ScrollLogicalPosition::Center);
        assert_eq!(viewport.scroll_y, 0.0);
    }

    #[test]
    fn test_scroll_nearest_keeps_visible_rect() {
        let mut viewport = Viewport::new(800.0, 600.0);
        viewport.scroll_to(0.0, 100.0);
        viewport.scroll_into_view(DOMRect::from_xywh(0.0, 200.0, 10.0, 10.0), ScrollLogicalPosition::Nearest);
        assert_eq!(viewport.scroll_y, 100.0);
    }
}
