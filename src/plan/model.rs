use serde_json::Value;

/// What a plan intends to do with a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Update,
    Delete,
    Replace,
    Read,
    NoOp,
}

impl Action {
    /// Map a plan's raw action list (e.g. `["delete", "create"]`) to one action.
    /// Any list holding both a delete and a create is a replacement.
    pub fn from_actions<S: AsRef<str>>(actions: &[S]) -> Self {
        let has = |name: &str| actions.iter().any(|a| a.as_ref() == name);
        if has("delete") && has("create") {
            return Action::Replace;
        }
        match actions.first().map(|a| a.as_ref()) {
            Some("create") => Action::Create,
            Some("update") => Action::Update,
            Some("delete") => Action::Delete,
            Some("read") => Action::Read,
            _ => Action::NoOp,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Replace => "replace",
            Action::Read => "read",
            Action::NoOp => "no-op",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Action::Create => "✚",
            Action::Update => "~",
            Action::Delete => "✖",
            Action::Replace => "⟳",
            Action::Read => "≡",
            Action::NoOp => "•",
        }
    }

    pub fn ascii_symbol(&self) -> &'static str {
        match self {
            Action::Create => "+",
            Action::Update => "~",
            Action::Delete => "-",
            Action::Replace => "±",
            Action::Read => "=",
            Action::NoOp => ".",
        }
    }
}

/// One resource change from a plan
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord {
    /// Unique address, e.g. `module.vpc.aws_subnet.private[0]`
    pub address: String,
    pub action: Action,
    /// Module address (`module.vpc`), None for the root module
    pub module: Option<String>,
    /// Source file declaring the resource, when known
    pub location: Option<String>,
    pub resource_type: String,
    pub name: String,
    /// "managed" or "data"
    pub mode: String,
    pub provider: String,
    /// count / for_each key
    pub index: Option<Value>,
    pub action_reason: Option<String>,
    pub before: Value,
    pub after: Value,
    pub dependencies: Vec<String>,
}

impl ChangeRecord {
    /// Minimal record with only an address and an action; the rest is empty.
    #[cfg(test)]
    pub fn new(address: impl Into<String>, action: Action) -> Self {
        ChangeRecord {
            address: address.into(),
            action,
            module: None,
            location: None,
            resource_type: String::new(),
            name: String::new(),
            mode: String::new(),
            provider: String::new(),
            index: None,
            action_reason: None,
            before: Value::Null,
            after: Value::Null,
            dependencies: Vec::new(),
        }
    }

    pub fn is_data(&self) -> bool {
        self.mode == "data"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// An error or warning reported alongside the plan
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: Option<String>,
    pub address: Option<String>,
}

/// Aggregate counts per action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub replace: usize,
    pub read: usize,
    pub no_op: usize,
}

impl PlanSummary {
    pub fn from_records(records: &[ChangeRecord]) -> Self {
        let mut summary = PlanSummary::default();
        for record in records {
            match record.action {
                Action::Create => summary.create += 1,
                Action::Update => summary.update += 1,
                Action::Delete => summary.delete += 1,
                Action::Replace => summary.replace += 1,
                Action::Read => summary.read += 1,
                Action::NoOp => summary.no_op += 1,
            }
        }
        summary
    }

    /// Records that actually change something
    pub fn actionable(&self) -> usize {
        self.create + self.update + self.delete + self.replace + self.read
    }
}

/// A parsed plan, ready for the viewer
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub format_version: String,
    pub terraform_version: String,
    pub records: Vec<ChangeRecord>,
    pub diagnostics: Vec<Diagnostic>,
    pub summary: PlanSummary,
}

impl Plan {
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning)
    }
}
