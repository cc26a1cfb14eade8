use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, LineHeight, ViewKind};
use crate::plan::{Action, PlanSummary};

use super::styles::Theme;

pub const TOP_BAR_HEIGHT: u16 = 2;
pub const BOTTOM_BAR_HEIGHT: u16 = 1;

/// Compute the display width of a list of spans
fn spans_width(spans: &[Span]) -> usize {
    spans.iter().map(|s| s.content.chars().count()).sum()
}

/// Render the top status bar
///
///   Row 1: tplan · terraform 1.7.5 · format 1.2          +2 ~1 -0 ±1
///   Row 2: CHANGES (4)  ERRORS (0)  WARNINGS (1)
pub fn render_top_bar(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    // ── Title row ──
    let mut left = vec![Span::styled(" tplan", theme.group_style())];
    if !app.plan.terraform_version.is_empty() {
        left.push(Span::styled(" · ", theme.border_style()));
        left.push(Span::styled(
            format!("terraform {}", app.plan.terraform_version),
            theme.muted_style(),
        ));
    }
    if !app.plan.format_version.is_empty() {
        left.push(Span::styled(" · ", theme.border_style()));
        left.push(Span::styled(
            format!("format {}", app.plan.format_version),
            theme.dim_style(),
        ));
    }
    let right = summary_spans(&app.plan.summary, theme);
    let gap = (area.width as usize).saturating_sub(spans_width(&left) + spans_width(&right));
    left.push(Span::raw(" ".repeat(gap)));
    left.extend(right);
    f.render_widget(
        Paragraph::new(Line::from(left)).style(theme.panel_style()),
        rows[0],
    );

    // ── View tabs ──
    let mut tabs = vec![Span::raw(" ")];
    for view in ViewKind::ALL {
        let label = format!(" {} ({}) ", view.label(), app.view_count(view));
        let style = if view == app.state.view {
            theme.active_tab_style()
        } else {
            theme.muted_style()
        };
        tabs.push(Span::styled(label, style));
        tabs.push(Span::raw(" "));
    }
    f.render_widget(
        Paragraph::new(Line::from(tabs)).style(theme.panel_style()),
        rows[1],
    );
}

fn summary_spans(summary: &PlanSummary, theme: &Theme) -> Vec<Span<'static>> {
    let counts = [
        (Action::Create, summary.create),
        (Action::Update, summary.update),
        (Action::Delete, summary.delete),
        (Action::Replace, summary.replace),
    ];
    let mut spans = Vec::new();
    for (action, count) in counts {
        spans.push(Span::styled(
            format!("{}{} ", theme.action_symbol(action), count),
            theme.action_style(action),
        ));
    }
    spans
}

/// Render the bottom bar: key hints on the left, scroll position on the right
pub fn render_bottom_bar(
    f: &mut Frame,
    area: Rect,
    app: &App,
    theme: &Theme,
    lines: &impl LineHeight,
) {
    let hints: &[(&str, &str)] = &[
        ("↑↓/jk", "move"),
        ("enter", "expand"),
        ("e/c", "all"),
        ("tab", "view"),
        ("g/G", "top/end"),
        ("q", "quit"),
    ];
    let mut spans = vec![Span::raw(" ")];
    for (key, action) in hints {
        spans.push(Span::styled(*key, theme.key_hint_style()));
        spans.push(Span::styled(format!(" {}  ", action), theme.dim_style()));
    }

    let total: usize = app.heights(lines).iter().sum();
    let indicator = scroll_indicator(app.state.offset, app.state.budget, total);
    let indicator_span = Span::styled(format!("{} ", indicator), theme.muted_style());
    let gap = (area.width as usize)
        .saturating_sub(spans_width(&spans) + spans_width(std::slice::from_ref(&indicator_span)));
    spans.push(Span::raw(" ".repeat(gap)));
    spans.push(indicator_span);

    f.render_widget(
        Paragraph::new(Line::from(spans)).style(theme.panel_style()),
        area,
    );
}

/// `Top`, `Bot`, `All` or a percentage, like a pager
fn scroll_indicator(offset: usize, budget: usize, total: usize) -> String {
    if total <= budget {
        return "All".to_string();
    }
    if offset == 0 {
        return "Top".to_string();
    }
    if offset + budget >= total {
        return "Bot".to_string();
    }
    format!("{}%", offset * 100 / (total - budget))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThemeConfig;

    #[test]
    fn indicator_all_when_content_fits() {
        assert_eq!(scroll_indicator(0, 10, 10), "All");
        assert_eq!(scroll_indicator(0, 10, 0), "All");
    }

    #[test]
    fn indicator_top_bottom_and_percent() {
        assert_eq!(scroll_indicator(0, 10, 30), "Top");
        assert_eq!(scroll_indicator(20, 10, 30), "Bot");
        assert_eq!(scroll_indicator(10, 10, 30), "50%");
    }

    #[test]
    fn summary_lists_counts_per_action() {
        let summary = PlanSummary {
            create: 2,
            update: 1,
            replace: 3,
            ..PlanSummary::default()
        };
        let theme = Theme::new(&ThemeConfig { ascii: true });
        let text: String = summary_spans(&summary, &theme)
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(text, "+2 ~1 -0 ±3 ");
    }
}
