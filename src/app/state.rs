use crate::plan::{Diagnostic, Plan};

use super::tree::{self, Locate, TreeNode};
use super::viewport::{self, LineHeight};

// ── Enums ──

/// Which list is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Changes,
    Errors,
    Warnings,
}

impl ViewKind {
    pub const ALL: [ViewKind; 3] = [ViewKind::Changes, ViewKind::Errors, ViewKind::Warnings];

    pub fn label(&self) -> &'static str {
        match self {
            ViewKind::Changes => "CHANGES",
            ViewKind::Errors => "ERRORS",
            ViewKind::Warnings => "WARNINGS",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ViewKind::Changes => ViewKind::Errors,
            ViewKind::Errors => ViewKind::Warnings,
            ViewKind::Warnings => ViewKind::Changes,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            ViewKind::Changes => ViewKind::Warnings,
            ViewKind::Errors => ViewKind::Changes,
            ViewKind::Warnings => ViewKind::Errors,
        }
    }
}

/// Input understood by the navigation state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    Up,
    Down,
    Top,
    Bottom,
    Toggle,
    ExpandAll,
    CollapseAll,
    NextView,
    PrevView,
    /// New number of rows available for the list
    Resize(usize),
    Quit,
}

/// Cursor and scroll position of the active view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    /// Index into the visible sequence of the active view
    pub cursor: usize,
    /// First rendered line shown at the top of the list
    pub offset: usize,
    /// Rows available for the list
    pub budget: usize,
    pub view: ViewKind,
}

impl ViewState {
    pub fn new(budget: usize) -> Self {
        ViewState {
            cursor: 0,
            offset: 0,
            budget: budget.max(1),
            view: ViewKind::Changes,
        }
    }
}

// ── App ──

pub struct App {
    pub plan: Plan,
    pub forest: Vec<TreeNode>,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub state: ViewState,
    pub should_quit: bool,
}

impl App {
    pub fn new(plan: Plan, locate: Option<Locate>, budget: usize) -> Self {
        let forest = tree::build_forest(&plan.records, locate);
        let errors = plan.errors().cloned().collect();
        let warnings = plan.warnings().cloned().collect();
        log::debug!(
            "built {} top-level nodes holding {} of {} records",
            forest.len(),
            tree::leaves(&forest).len(),
            plan.records.len()
        );
        App {
            plan,
            forest,
            errors,
            warnings,
            state: ViewState::new(budget),
            should_quit: false,
        }
    }

    /// Number of selectable rows in the active view
    pub fn visible_len(&self) -> usize {
        match self.state.view {
            ViewKind::Changes => tree::visible_len(&self.forest),
            ViewKind::Errors => self.errors.len(),
            ViewKind::Warnings => self.warnings.len(),
        }
    }

    pub fn visible_nodes(&self) -> Vec<&TreeNode> {
        tree::visible(&self.forest)
    }

    /// Diagnostics listed by the active view (empty for Changes)
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self.state.view {
            ViewKind::Changes => &[],
            ViewKind::Errors => &self.errors,
            ViewKind::Warnings => &self.warnings,
        }
    }

    pub fn view_count(&self, view: ViewKind) -> usize {
        match view {
            ViewKind::Changes => self.plan.summary.actionable(),
            ViewKind::Errors => self.errors.len(),
            ViewKind::Warnings => self.warnings.len(),
        }
    }

    /// Rendered height of every visible row in the active view
    pub fn heights(&self, lines: &impl LineHeight) -> Vec<usize> {
        match self.state.view {
            ViewKind::Changes => self
                .visible_nodes()
                .into_iter()
                .map(|n| lines.node_height(n))
                .collect(),
            _ => vec![1; self.visible_len()],
        }
    }

    /// Apply one input event, then bring the cursor back into view
    pub fn handle(&mut self, event: NavEvent, lines: &impl LineHeight) {
        match event {
            NavEvent::Up => self.prev_node(),
            NavEvent::Down => self.next_node(),
            NavEvent::Top => self.state.cursor = 0,
            NavEvent::Bottom => self.state.cursor = self.visible_len().saturating_sub(1),
            NavEvent::Toggle => self.toggle_expand(lines),
            NavEvent::ExpandAll => self.set_all_expanded(true),
            NavEvent::CollapseAll => self.set_all_expanded(false),
            NavEvent::NextView => self.set_view(self.state.view.next()),
            NavEvent::PrevView => self.set_view(self.state.view.prev()),
            NavEvent::Resize(rows) => self.state.budget = rows.max(1),
            NavEvent::Quit => self.should_quit = true,
        }
        self.scroll_to_cursor(lines);
    }

    // ── Navigation ──

    fn next_node(&mut self) {
        if self.state.cursor + 1 < self.visible_len() {
            self.state.cursor += 1;
        }
    }

    fn prev_node(&mut self) {
        self.state.cursor = self.state.cursor.saturating_sub(1);
    }

    fn toggle_expand(&mut self, lines: &impl LineHeight) {
        if self.state.view != ViewKind::Changes {
            return;
        }
        let Some(node) = tree::visible_node_mut(&mut self.forest, self.state.cursor) else {
            return;
        };
        let has_content = if node.is_group() {
            !node.children.is_empty()
        } else {
            lines.detail_height(node) > 0
        };
        if has_content {
            node.expanded = !node.expanded;
        }
    }

    fn set_all_expanded(&mut self, expanded: bool) {
        tree::set_all_expanded(&mut self.forest, expanded);
        self.clamp_cursor();
    }

    fn set_view(&mut self, view: ViewKind) {
        self.state.view = view;
        self.state.cursor = 0;
        self.state.offset = 0;
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible_len();
        self.state.cursor = self.state.cursor.min(len.saturating_sub(1));
    }

    fn scroll_to_cursor(&mut self, lines: &impl LineHeight) {
        self.clamp_cursor();
        let heights = self.heights(lines);
        self.state.offset = viewport::scroll_to_cursor(
            &heights,
            self.state.cursor,
            self.state.offset,
            self.state.budget,
        );
    }
}
