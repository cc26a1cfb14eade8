use ratatui::style::{Color, Modifier, Style};

use crate::config::ThemeConfig;
use crate::diff::EntryKind;
use crate::plan::{Action, Severity};

// ── Background colors ──
pub const BG: Color = Color::Rgb(12, 12, 12);
pub const PANEL: Color = Color::Rgb(26, 26, 26);
pub const BORDER: Color = Color::Rgb(42, 42, 42);

// ── Text colors ──
pub const TEXT: Color = Color::Rgb(200, 200, 200);
pub const DIM: Color = Color::Rgb(102, 102, 102);
pub const MUTED: Color = Color::Rgb(136, 136, 136);
pub const BRIGHT: Color = Color::Rgb(232, 232, 232);

// ── Accent colors ──
pub const BLUE: Color = Color::Rgb(96, 165, 250);
pub const CYAN: Color = Color::Rgb(34, 211, 238);
pub const GREEN: Color = Color::Rgb(74, 222, 128);
pub const YELLOW: Color = Color::Rgb(250, 204, 21);
pub const RED: Color = Color::Rgb(248, 113, 113);
pub const PURPLE: Color = Color::Rgb(167, 139, 250);

// ── Diff colors ──
pub const ADD_TEXT: Color = Color::Rgb(120, 240, 160);
pub const DEL_TEXT: Color = Color::Rgb(255, 140, 140);

/// Styles and glyphs handed to every render function
#[derive(Debug, Clone)]
pub struct Theme {
    pub ascii: bool,
}

impl Theme {
    pub fn new(config: &ThemeConfig) -> Self {
        Theme { ascii: config.ascii }
    }

    // ── Glyphs ──

    pub fn action_symbol(&self, action: Action) -> &'static str {
        if self.ascii {
            action.ascii_symbol()
        } else {
            action.symbol()
        }
    }

    pub fn expand_marker(&self, expanded: bool) -> &'static str {
        match (self.ascii, expanded) {
            (false, true) => "▼",
            (false, false) => "▶",
            (true, true) => "v",
            (true, false) => ">",
        }
    }

    pub fn arrow(&self) -> &'static str {
        if self.ascii {
            "->"
        } else {
            "→"
        }
    }

    pub fn column_separator(&self) -> &'static str {
        if self.ascii {
            " | "
        } else {
            " │ "
        }
    }

    pub fn severity_symbol(&self, severity: Severity) -> &'static str {
        match (self.ascii, severity) {
            (false, Severity::Error) => "✖",
            (false, Severity::Warning) => "⚠",
            (true, Severity::Error) => "E",
            (true, Severity::Warning) => "W",
        }
    }

    // ── Composed styles ──

    pub fn default_style(&self) -> Style {
        Style::default().fg(TEXT).bg(BG)
    }

    pub fn panel_style(&self) -> Style {
        Style::default().bg(PANEL)
    }

    pub fn dim_style(&self) -> Style {
        Style::default().fg(DIM)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(MUTED)
    }

    pub fn selected_style(&self) -> Style {
        Style::default().fg(BLUE).bg(Color::Rgb(26, 42, 58))
    }

    pub fn key_hint_style(&self) -> Style {
        Style::default().fg(MUTED).add_modifier(Modifier::BOLD)
    }

    pub fn group_style(&self) -> Style {
        Style::default().fg(CYAN).add_modifier(Modifier::BOLD)
    }

    pub fn label_style(&self) -> Style {
        Style::default().fg(MUTED)
    }

    pub fn active_tab_style(&self) -> Style {
        Style::default()
            .fg(BG)
            .bg(BLUE)
            .add_modifier(Modifier::BOLD)
    }

    pub fn action_style(&self, action: Action) -> Style {
        let color = match action {
            Action::Create => GREEN,
            Action::Update => YELLOW,
            Action::Delete => RED,
            Action::Replace => PURPLE,
            Action::Read => CYAN,
            Action::NoOp => DIM,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn entry_style(&self, kind: EntryKind) -> Style {
        match kind {
            EntryKind::Added => Style::default().fg(ADD_TEXT),
            EntryKind::Removed => Style::default().fg(DEL_TEXT),
            EntryKind::Changed => Style::default().fg(YELLOW),
            EntryKind::Unchanged => Style::default().fg(DIM),
        }
    }

    pub fn severity_style(&self, severity: Severity) -> Style {
        match severity {
            Severity::Error => Style::default().fg(RED).add_modifier(Modifier::BOLD),
            Severity::Warning => Style::default().fg(YELLOW).add_modifier(Modifier::BOLD),
        }
    }

    pub fn bright_style(&self) -> Style {
        Style::default().fg(BRIGHT)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(BORDER)
    }
}
