use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use ratatui::text::{Line, Span};
use serde_json::Value;

use crate::app::{LineHeight, TreeNode};
use crate::config::DisplayConfig;
use crate::diff::{self, DiffEntry, EntryKind, Shape};
use crate::plan::ChangeRecord;

use super::styles::Theme;
use super::utils::{fit, try_pretty_json, word_wrap};

/// Indent of detail lines below a record header
const BASE_INDENT: usize = 4;
/// Widest column of a side-by-side string block
const MAX_COLUMN: usize = 100;
const MIN_COLUMN: usize = 10;

/// Builds the lines shown under an expanded record. The same builder backs
/// `LineHeight`, so scrolling always agrees with what gets drawn.
///
/// Lines depend on the width, so a resize needs a fresh renderer.
pub struct DetailRenderer<'a> {
    pub display: &'a DisplayConfig,
    pub theme: &'a Theme,
    /// Columns available to the list
    pub width: usize,
    /// Built detail lines by record address
    cache: RefCell<HashMap<String, Rc<Vec<Line<'static>>>>>,
}

impl<'a> DetailRenderer<'a> {
    pub fn new(display: &'a DisplayConfig, theme: &'a Theme, width: usize) -> Self {
        DetailRenderer {
            display,
            theme,
            width,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// `detail_lines`, diffed at most once per record
    pub fn cached_lines(&self, record: &ChangeRecord) -> Rc<Vec<Line<'static>>> {
        if let Some(lines) = self.cache.borrow().get(&record.address) {
            return Rc::clone(lines);
        }
        let lines = Rc::new(self.detail_lines(record));
        self.cache
            .borrow_mut()
            .insert(record.address.clone(), Rc::clone(&lines));
        lines
    }

    pub fn detail_lines(&self, record: &ChangeRecord) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        if self.display.show_metadata {
            self.metadata_lines(record, &mut lines);
        }

        let entries = diff::diff(&record.before, &record.after, diff::MAX_DEPTH);
        for entry in entries
            .iter()
            .filter(|e| self.display.show_unchanged || !e.is_unchanged())
        {
            self.entry_lines(entry, &mut lines);
        }

        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines
    }

    // ── Metadata ──

    fn metadata_lines(&self, record: &ChangeRecord, out: &mut Vec<Line<'static>>) {
        let indent = " ".repeat(BASE_INDENT);
        let mut field = |label: &str, value: String| {
            if value.is_empty() {
                return;
            }
            out.push(Line::from(vec![
                Span::raw(indent.clone()),
                Span::styled(format!("{}: ", label), self.theme.label_style()),
                Span::styled(
                    diff::truncate(&value, self.display.truncate_at),
                    self.theme.bright_style(),
                ),
            ]));
        };
        field("Type", record.resource_type.clone());
        field("Provider", record.provider.clone());
        field("Mode", record.mode.clone());
        field("File", record.location.clone().unwrap_or_default());
        field("Reason", record.action_reason.clone().unwrap_or_default());
        field("Depends on", record.dependencies.join(", "));
    }

    // ── Diff entries ──

    fn entry_lines(&self, entry: &DiffEntry, out: &mut Vec<Line<'static>>) {
        let indent = " ".repeat(BASE_INDENT + entry.depth * 2);
        let style = self.theme.entry_style(entry.kind);
        let prefix = format!("{}{} ", indent, entry.kind.prefix());
        let limit = self.display.truncate_at;

        let body = match &entry.shape {
            Shape::Value { before, after } => {
                if let (EntryKind::Changed, Some(Value::String(b)), Some(Value::String(a))) =
                    (entry.kind, before, after)
                {
                    let wide = self.display.wide_string_at;
                    if b.chars().count() > wide || a.chars().count() > wide {
                        self.side_by_side(entry, &indent, b, a, out);
                        return;
                    }
                }
                let show = |v: &Option<Value>| v.as_ref().map(|v| diff::display_value(v, limit));
                match entry.kind {
                    EntryKind::Changed => format!(
                        "{} = {} {} {}",
                        entry.key,
                        show(before).unwrap_or_default(),
                        self.theme.arrow(),
                        show(after).unwrap_or_default()
                    ),
                    EntryKind::Removed => {
                        format!("{} = {}", entry.key, show(before).unwrap_or_default())
                    }
                    EntryKind::Added | EntryKind::Unchanged => {
                        format!("{} = {}", entry.key, show(after).unwrap_or_default())
                    }
                }
            }
            Shape::Open(delim) => format!("{} = {}", entry.key, delim.open()),
            Shape::Close(delim) => delim.close().to_string(),
            Shape::TooDeep => format!("{} = <deeply nested>", entry.key),
        };

        let prefix = match entry.shape {
            Shape::Close(_) => format!("{}  ", indent),
            _ => prefix,
        };
        out.push(Line::from(vec![
            Span::styled(prefix, style),
            Span::styled(body, style),
        ]));
    }

    /// Long changed strings: old text on the left, new on the right
    fn side_by_side(
        &self,
        entry: &DiffEntry,
        indent: &str,
        before: &str,
        after: &str,
        out: &mut Vec<Line<'static>>,
    ) {
        let theme = self.theme;
        out.push(Line::from(Span::styled(
            format!("{}{} {}:", indent, entry.kind.prefix(), entry.key),
            theme.entry_style(EntryKind::Changed),
        )));

        let inner = format!("{}  ", indent);
        let separator = theme.column_separator();
        let available = self
            .width
            .saturating_sub(inner.chars().count() + separator.chars().count());
        let column = (available / 2).clamp(MIN_COLUMN, MAX_COLUMN);

        let wrap = |s: &str| {
            let text = try_pretty_json(s).unwrap_or_else(|| s.to_string());
            word_wrap(&text, column)
        };
        let left = wrap(before);
        let right = wrap(after);

        for row in 0..left.len().max(right.len()) {
            let l = left.get(row).map(String::as_str).unwrap_or("");
            let r = right.get(row).map(String::as_str).unwrap_or("");
            out.push(Line::from(vec![
                Span::raw(inner.clone()),
                Span::styled(fit(l, column), theme.entry_style(EntryKind::Removed)),
                Span::styled(separator, theme.border_style()),
                Span::styled(r.to_string(), theme.entry_style(EntryKind::Added)),
            ]));
        }
    }
}

impl LineHeight for DetailRenderer<'_> {
    fn detail_height(&self, node: &TreeNode) -> usize {
        match node.record() {
            Some(record) => self.cached_lines(record).len(),
            None => 0,
        }
    }
}
