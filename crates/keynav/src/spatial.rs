//! Spatial Selector
//!
//! Picks the next item for a direction: candidates must lie past the
//! active item on the directional axis (strict) and overlap it on the
//! other axis (inclusive); the nearest by top-left corner distance wins.

use keynav_dom::DOMRect;

use crate::{Direction, LayoutHost};

/// Directional half-plane plus lateral-overlap test.
///
/// The directional comparison is strict and the overlap comparison is
/// inclusive, so exactly-touching edges still count as the same column
/// or row.
pub fn in_direction(direction: Direction, active: &DOMRect, candidate: &DOMRect) -> bool {
    let overlaps_horizontally =
        candidate.right() >= active.left() && candidate.left() <= active.right();
    let overlaps_vertically =
        candidate.bottom() >= active.top() && candidate.top() <= active.bottom();

    match direction {
        Direction::Up => candidate.bottom() < active.bottom() && overlaps_horizontally,
        Direction::Down => candidate.top() > active.top() && overlaps_horizontally,
        Direction::Left => candidate.right() < active.right() && overlaps_vertically,
        Direction::Right => candidate.left() > active.left() && overlaps_vertically,
    }
}

/// Euclidean distance between the top-left corners
pub fn distance(a: &DOMRect, b: &DOMRect) -> f64 {
    (a.top() - b.top()).hypot(a.left() - b.left())
}

/// Choose the item to move to.
///
/// Without an active item this is the first candidate in document order.
/// Otherwise the active item is excluded and the nearest candidate passing
/// [`in_direction`] wins, earlier document order breaking distance ties.
/// Geometry is read from `host` on every call.
pub fn select<H: LayoutHost>(
    host: &H,
    active: Option<H::Node>,
    direction: Direction,
    candidates: &[H::Node],
) -> Option<H::Node> {
    let Some(active) = active else {
        return candidates.first().copied();
    };
    let origin = host.bounding_rect(active);

    candidates
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, node)| *node != active)
        .filter_map(|(order, node)| {
            let rect = host.bounding_rect(node);
            let accepted = in_direction(direction, &origin, &rect);
            tracing::trace!(?node, %direction, accepted, "evaluated candidate");
            accepted.then(|| (order, distance(&origin, &rect), node))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(_, _, node)| node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keynav_css::SelectorList;

    /// Layout-only host: node `i` has rect `rects[i]`
    struct Grid {
        rects: Vec<DOMRect>,
    }

    impl Grid {
        fn new(edges: &[(f64, f64, f64, f64)]) -> Self {
            Self {
                rects: edges
                    .iter()
                    .map(|&(top, left, right, bottom)| DOMRect::from_edges(top, left, right, bottom))
                    .collect(),
            }
        }

        fn all(&self) -> Vec<usize> {
            (0..self.rects.len()).collect()
        }
    }

    impl LayoutHost for Grid {
        type Node = usize;

        fn query_all(&self, _: &SelectorList) -> Vec<usize> {
            self.all()
        }

        fn find_within(&self, root: usize, _: &SelectorList) -> Option<usize> {
            Some(root)
        }

        fn closest(&self, node: usize, _: &SelectorList) -> Option<usize> {
            Some(node)
        }

        fn bounding_rect(&self, node: usize) -> DOMRect {
            self.rects[node]
        }

        fn active_element(&self) -> Option<usize> {
            None
        }
    }

    const ACTIVE: (f64, f64, f64, f64) = (100.0, 0.0, 100.0, 150.0);

    #[test]
    fn test_directly_above_same_column() {
        let grid = Grid::new(&[ACTIVE, (0.0, 0.0, 100.0, 50.0)]);
        assert_eq!(select(&grid, Some(0), Direction::Up, &grid.all()), Some(1));
    }

    #[test]
    fn test_above_without_overlap_is_rejected() {
        let grid = Grid::new(&[ACTIVE, (0.0, 200.0, 300.0, 50.0)]);
        assert_eq!(select(&grid, Some(0), Direction::Up, &grid.all()), None);
    }

    #[test]
    fn test_nearest_candidate_wins() {
        // distances 80 and 50 from the active top-left corner
        let grid = Grid::new(&[ACTIVE, (180.0, 0.0, 100.0, 230.0), (150.0, 0.0, 100.0, 200.0)]);
        assert_eq!(select(&grid, Some(0), Direction::Down, &grid.all()), Some(2));
    }

    #[test]
    fn test_empty_candidates() {
        let grid = Grid::new(&[ACTIVE]);
        for direction in Direction::ALL {
            assert_eq!(select(&grid, None, direction, &[]), None);
            assert_eq!(select(&grid, Some(0), direction, &[]), None);
        }
    }

    #[test]
    fn test_no_active_item_takes_document_order() {
        // the first candidate is far away and below; geometry is irrelevant
        let grid = Grid::new(&[(900.0, 900.0, 950.0, 950.0), (0.0, 0.0, 10.0, 10.0)]);
        for direction in Direction::ALL {
            assert_eq!(select(&grid, None, direction, &grid.all()), Some(0));
        }
        assert_eq!(select(&grid, None, Direction::Up, &[1, 0]), Some(1));
    }

    #[test]
    fn test_active_item_is_never_returned() {
        let grid = Grid::new(&[ACTIVE]);
        for direction in Direction::ALL {
            assert_eq!(select(&grid, Some(0), direction, &grid.all()), None);
        }
    }

    #[test]
    fn test_distance_ties_use_document_order() {
        // two candidates mirrored left and right below the active item
        let grid = Grid::new(&[
            (100.0, 100.0, 200.0, 150.0),
            (200.0, 150.0, 250.0, 250.0),
            (200.0, 50.0, 150.0, 250.0),
        ]);
        let all = grid.all();
        for _ in 0..5 {
            assert_eq!(select(&grid, Some(0), Direction::Down, &all), Some(1));
        }
        assert_eq!(select(&grid, Some(0), Direction::Down, &[0, 2, 1]), Some(2));
    }

    #[test]
    fn test_row_navigation() {
        // three cards in a row, one card below
        let grid = Grid::new(&[
            (0.0, 0.0, 100.0, 100.0),
            (0.0, 120.0, 220.0, 100.0),
            (0.0, 240.0, 340.0, 100.0),
            (120.0, 0.0, 100.0, 220.0),
        ]);
        let all = grid.all();
        assert_eq!(select(&grid, Some(0), Direction::Right, &all), Some(1));
        assert_eq!(select(&grid, Some(1), Direction::Right, &all), Some(2));
        assert_eq!(select(&grid, Some(2), Direction::Right, &all), None);
        assert_eq!(select(&grid, Some(2), Direction::Left, &all), Some(1));
        assert_eq!(select(&grid, Some(0), Direction::Down, &all), Some(3));
        // no diagonal jump from the lower card to the right column
        assert_eq!(select(&grid, Some(3), Direction::Right, &all), None);
    }

    #[test]
    fn test_boundary_asymmetry() {
        let active = DOMRect::from_edges(100.0, 100.0, 200.0, 200.0);

        // touching the left edge still overlaps the column
        let touching = DOMRect::from_edges(0.0, 0.0, 100.0, 50.0);
        assert!(in_direction(Direction::Up, &active, &touching));

        // same bottom edge is not "above"
        let level = DOMRect::from_edges(0.0, 100.0, 200.0, 200.0);
        assert!(!in_direction(Direction::Up, &active, &level));

        // same top edge is not "below"
        let flush = DOMRect::from_edges(100.0, 100.0, 200.0, 300.0);
        assert!(!in_direction(Direction::Down, &active, &flush));

        // same left edge is not "right of"
        let stacked = DOMRect::from_edges(150.0, 100.0, 300.0, 250.0);
        assert!(!in_direction(Direction::Right, &active, &stacked));
    }

    #[test]
    fn test_zero_area_boxes_participate() {
        let grid = Grid::new(&[(100.0, 0.0, 0.0, 100.0), (50.0, 0.0, 0.0, 50.0)]);
        assert_eq!(select(&grid, Some(0), Direction::Up, &grid.all()), Some(1));
    }

    #[test]
    fn test_rejected_candidates_never_selected() {
        let grid = Grid::new(&[
            ACTIVE,
            (0.0, 0.0, 100.0, 50.0),
            (300.0, 0.0, 100.0, 350.0),
            (100.0, -200.0, -100.0, 150.0),
            (100.0, 200.0, 300.0, 150.0),
            (0.0, 500.0, 600.0, 50.0),
        ]);
        let all = grid.all();
        let origin = grid.bounding_rect(0);
        for direction in Direction::ALL {
            if let Some(chosen) = select(&grid, Some(0), direction, &all) {
                assert!(in_direction(direction, &origin, &grid.bounding_rect(chosen)));
            }
            for node in 1..grid.rects.len() {
                if !in_direction(direction, &origin, &grid.bounding_rect(node)) {
                    assert_ne!(select(&grid, Some(0), direction, &all), Some(node));
                }
            }
        }
        assert_eq!(select(&grid, Some(0), Direction::Up, &all), Some(1));
        assert_eq!(select(&grid, Some(0), Direction::Down, &all), Some(2));
        assert_eq!(select(&grid, Some(0), Direction::Left, &all), Some(3));
        assert_eq!(select(&grid, Some(0), Direction::Right, &all), Some(4));
    }
}
