use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, ViewKind};
use crate::diff::truncate;
use crate::plan::Diagnostic;

use super::styles::Theme;

/// Render the error or warning list, one line per diagnostic
pub fn render(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let diagnostics = app.diagnostics();
    if diagnostics.is_empty() {
        let label = match app.state.view {
            ViewKind::Errors => "  No errors",
            _ => "  No warnings",
        };
        let empty = Paragraph::new(Line::from(Span::styled(label, theme.dim_style())))
            .style(theme.default_style());
        f.render_widget(empty, area);
        return;
    }

    let width = area.width as usize;
    let lines: Vec<Line> = diagnostics
        .iter()
        .enumerate()
        .skip(app.state.offset)
        .take(area.height as usize)
        .map(|(i, d)| diagnostic_line(d, i == app.state.cursor, width, theme))
        .collect();
    f.render_widget(Paragraph::new(lines).style(theme.default_style()), area);
}

fn diagnostic_line(d: &Diagnostic, selected: bool, width: usize, theme: &Theme) -> Line<'static> {
    let mut text = d.summary.clone();
    if let Some(address) = &d.address {
        text.push_str(&format!(" ({})", address));
    }
    if let Some(detail) = &d.detail {
        text.push_str(" · ");
        text.push_str(&detail.replace('\n', " "));
    }

    let line = Line::from(vec![
        Span::styled(
            format!("  {} ", theme.severity_symbol(d.severity)),
            theme.severity_style(d.severity),
        ),
        Span::styled(
            truncate(&text, width.saturating_sub(6)),
            if selected {
                theme.selected_style()
            } else {
                theme.bright_style()
            },
        ),
    ]);
    if selected {
        line.style(theme.selected_style())
    } else {
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThemeConfig;
    use crate::plan::Severity;

    #[test]
    fn line_joins_summary_address_and_detail() {
        let d = Diagnostic {
            severity: Severity::Error,
            summary: "Invalid reference".into(),
            detail: Some("A managed resource\nhas not been declared".into()),
            address: Some("aws_instance.web".into()),
        };
        let theme = Theme::new(&ThemeConfig { ascii: true });
        let line = diagnostic_line(&d, false, 200, &theme);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(
            text,
            "  E Invalid reference (aws_instance.web) · A managed resource has not been declared"
        );
    }

    #[test]
    fn long_line_truncated_to_width() {
        let d = Diagnostic {
            severity: Severity::Warning,
            summary: "w".repeat(100),
            detail: None,
            address: None,
        };
        let theme = Theme::new(&ThemeConfig::default());
        let line = diagnostic_line(&d, true, 30, &theme);
        assert_eq!(line.spans[1].content.chars().count(), 24);
    }
}
