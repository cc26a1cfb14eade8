mod detail;
mod diagnostics;
mod status_bar;
mod styles;
mod tree_view;
mod utils;

pub use detail::DetailRenderer;
pub use styles::Theme;

use crate::app::{App, ViewKind};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

/// Rows left for the list once both bars are drawn
pub fn content_rows(height: u16) -> usize {
    height
        .saturating_sub(status_bar::TOP_BAR_HEIGHT + status_bar::BOTTOM_BAR_HEIGHT)
        .max(1) as usize
}

/// Render the entire UI
pub fn draw(f: &mut Frame, app: &App, detail: &DetailRenderer) {
    let theme = detail.theme;
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(status_bar::TOP_BAR_HEIGHT), // summary + view tabs
            Constraint::Min(1),                             // main content
            Constraint::Length(status_bar::BOTTOM_BAR_HEIGHT), // key hints
        ])
        .split(f.area());

    status_bar::render_top_bar(f, outer[0], app, theme);

    match app.state.view {
        ViewKind::Changes => tree_view::render(f, outer[1], app, detail),
        ViewKind::Errors | ViewKind::Warnings => diagnostics::render(f, outer[1], app, theme),
    }

    status_bar::render_bottom_bar(f, outer[2], app, theme, detail);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_rows_leaves_room_for_bars() {
        assert_eq!(content_rows(24), 21);
    }

    #[test]
    fn content_rows_never_zero() {
        assert_eq!(content_rows(2), 1);
        assert_eq!(content_rows(0), 1);
    }
}
