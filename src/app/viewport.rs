use super::tree::TreeNode;

/// Measures how many lines a node's expanded detail takes on screen.
/// Implemented by the renderer so that counting and drawing share one
/// line generator.
pub trait LineHeight {
    fn detail_height(&self, node: &TreeNode) -> usize;

    /// Header line plus detail when expanded
    fn node_height(&self, node: &TreeNode) -> usize {
        if node.expanded && node.record().is_some() {
            1 + self.detail_height(node)
        } else {
            1
        }
    }
}

/// Every node takes exactly one line
#[cfg(test)]
pub struct SingleLine;

#[cfg(test)]
impl LineHeight for SingleLine {
    fn detail_height(&self, _node: &TreeNode) -> usize {
        0
    }
}

/// Compute the first visible line so that the cursor node stays on screen.
///
/// `heights[i]` is the rendered height of the i-th visible node. The header
/// line of the cursor node always ends up inside `[offset, offset + budget)`.
/// A node that fits is shown whole; a taller one is shown from its header.
pub fn scroll_to_cursor(heights: &[usize], cursor: usize, offset: usize, budget: usize) -> usize {
    let budget = budget.max(1);
    if heights.is_empty() {
        return 0;
    }
    let cursor = cursor.min(heights.len() - 1);

    let total: usize = heights.iter().sum();
    let mut offset = offset.min(total.saturating_sub(budget));

    let start: usize = heights[..cursor].iter().sum();
    let end = start + heights[cursor].max(1) - 1;

    if start < offset {
        offset = start;
    } else if end >= offset + budget {
        offset = start.min(end + 1 - budget);
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_view(heights: &[usize], cursor: usize, offset: usize, budget: usize) -> bool {
        let start: usize = heights[..cursor].iter().sum();
        start >= offset && start < offset + budget
    }

    #[test]
    fn empty_list_scrolls_to_top() {
        assert_eq!(scroll_to_cursor(&[], 0, 7, 10), 0);
    }

    #[test]
    fn cursor_already_visible_keeps_offset() {
        let heights = [1; 20];
        assert_eq!(scroll_to_cursor(&heights, 5, 3, 10), 3);
    }

    #[test]
    fn moving_down_uniform_lines_tracks_bottom_edge() {
        let heights = [1; 50];
        let budget = 8;
        let mut offset = 0;
        for cursor in 0..50 {
            offset = scroll_to_cursor(&heights, cursor, offset, budget);
            assert_eq!(offset, cursor.saturating_sub(budget - 1));
        }
    }

    #[test]
    fn moving_up_never_increases_offset() {
        let heights = [1, 4, 2, 9, 1, 1, 3, 12, 1, 2];
        let mut offset = scroll_to_cursor(&heights, 9, 0, 6);
        for cursor in (0..9).rev() {
            let next = scroll_to_cursor(&heights, cursor, offset, 6);
            assert!(next <= offset);
            offset = next;
        }
        assert_eq!(offset, 0);
    }

    #[test]
    fn moving_down_never_decreases_offset() {
        let heights = [1, 4, 2, 9, 1, 1, 3, 12, 1, 2];
        let mut offset = 0;
        for cursor in 0..heights.len() {
            let next = scroll_to_cursor(&heights, cursor, offset, 6);
            assert!(next >= offset);
            offset = next;
        }
    }

    #[test]
    fn node_that_fits_is_shown_whole() {
        // cursor node spans lines 3..=7, budget 6
        let heights = [1, 1, 1, 5, 1];
        let offset = scroll_to_cursor(&heights, 3, 0, 6);
        assert_eq!(offset, 2);
    }

    #[test]
    fn node_taller_than_budget_shown_from_header() {
        let heights = [1, 1, 1, 30, 1];
        let offset = scroll_to_cursor(&heights, 3, 0, 6);
        assert_eq!(offset, 3);
    }

    #[test]
    fn cursor_above_window_scrolls_up_to_header() {
        let heights = [2, 2, 2, 2, 2];
        assert_eq!(scroll_to_cursor(&heights, 1, 6, 3), 2);
    }

    #[test]
    fn shrunk_content_pulls_offset_back() {
        // content collapsed from many lines down to 5
        let heights = [1; 5];
        assert_eq!(scroll_to_cursor(&heights, 4, 40, 3), 2);
    }

    #[test]
    fn zero_budget_treated_as_one_line() {
        let heights = [1; 4];
        assert_eq!(scroll_to_cursor(&heights, 3, 0, 0), 3);
    }

    #[test]
    fn header_always_inside_window_for_mixed_moves() {
        let heights = [3, 1, 7, 1, 1, 15, 2, 1, 4, 1];
        let budget = 5;
        let moves: [isize; 14] = [1, 1, 1, 1, 1, -1, -1, 1, 1, 1, 1, 1, -1, -1];
        let mut cursor = 0usize;
        let mut offset = 0;
        for step in moves {
            cursor = (cursor as isize + step).clamp(0, heights.len() as isize - 1) as usize;
            offset = scroll_to_cursor(&heights, cursor, offset, budget);
            assert!(in_view(&heights, cursor, offset, budget), "cursor {} offset {}", cursor, offset);
        }
    }
}
