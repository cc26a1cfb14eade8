use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, GroupKind, NodeContent, TreeNode};

use super::detail::DetailRenderer;
use super::styles::Theme;

/// Render the change tree, starting at the viewport offset
pub fn render(f: &mut Frame, area: Rect, app: &App, detail: &DetailRenderer) {
    let theme = detail.theme;
    let nodes = app.visible_nodes();

    if nodes.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "  No changes to display",
            theme.dim_style(),
        )))
        .style(theme.default_style());
        f.render_widget(empty, area);
        return;
    }

    let window = window_lines(&nodes, app, detail, area.height as usize);
    let list = Paragraph::new(window).style(theme.default_style());
    f.render_widget(list, area);
}

/// Lines from the viewport offset down, at most `height` of them. Rows above
/// or below the window are never built.
fn window_lines<'a>(
    nodes: &[&'a TreeNode],
    app: &App,
    detail: &DetailRenderer,
    height: usize,
) -> Vec<Line<'a>> {
    let theme = detail.theme;
    let top = app.state.offset;
    let bottom = top + height;
    let mut window = Vec::new();
    let mut row = 0;
    for (i, node) in nodes.iter().copied().enumerate() {
        if row >= bottom {
            break;
        }
        if row >= top {
            window.push(header_line(node, i == app.state.cursor, theme));
        }
        row += 1;
        if !node.expanded {
            continue;
        }
        if let Some(record) = node.record() {
            let lines = detail.cached_lines(record);
            let end = row + lines.len();
            if end > top && row < bottom {
                let from = top.saturating_sub(row);
                let to = (bottom - row).min(lines.len());
                window.extend(lines[from..to].iter().cloned());
            }
            row = end;
        }
    }
    window
}

/// The single line that stands for a node when collapsed
pub fn header_line<'a>(node: &'a TreeNode, selected: bool, theme: &Theme) -> Line<'a> {
    let indent = "  ".repeat(node.depth);
    let mut spans = vec![Span::raw(format!(" {}", indent))];

    match &node.content {
        NodeContent::Group(group) => {
            let kind = match group.kind {
                GroupKind::Module => "module",
                GroupKind::File => "file",
            };
            let count = node.children.len();
            spans.push(Span::styled(
                format!("{} ", theme.expand_marker(node.expanded)),
                theme.muted_style(),
            ));
            spans.push(Span::styled(
                group.label.as_str(),
                if selected {
                    theme.selected_style()
                } else {
                    theme.group_style()
                },
            ));
            spans.push(Span::styled(
                format!(
                    "  {} · {} change{}",
                    kind,
                    count,
                    if count == 1 { "" } else { "s" }
                ),
                theme.dim_style(),
            ));
        }
        NodeContent::Record(record) => {
            spans.push(Span::styled(
                format!("{} ", theme.expand_marker(node.expanded)),
                theme.dim_style(),
            ));
            spans.push(Span::styled(
                format!("{} ", theme.action_symbol(node.action())),
                theme.action_style(node.action()),
            ));
            spans.push(Span::styled(
                record.address.as_str(),
                if selected {
                    theme.selected_style()
                } else {
                    theme.bright_style()
                },
            ));
            spans.push(Span::styled(
                format!("  {}", record.action.label()),
                theme.action_style(record.action),
            ));
        }
    }

    let line = Line::from(spans);
    if selected {
        line.style(theme.selected_style())
    } else {
        line
    }
}
