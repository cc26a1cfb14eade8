//! Structural before/after comparison of plan attribute values.
//!
//! `diff` walks two `serde_json::Value` trees side by side and emits a flat,
//! ordered list of entries. Nested composites appear as an `Open` entry, their
//! members one level deeper, then a `Close` entry, so a renderer can print the
//! list top to bottom with indentation taken from `depth`.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

/// Nesting bound for `diff`. Composites found at this depth are reported as
/// `Shape::TooDeep` instead of being walked.
pub const MAX_DEPTH: usize = 5;

/// Label used when two non-container roots are compared directly
pub const ROOT_KEY: &str = "value";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Added,
    Removed,
    Changed,
    Unchanged,
}

impl EntryKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            EntryKind::Added => "+",
            EntryKind::Removed => "-",
            EntryKind::Changed => "~",
            EntryKind::Unchanged => " ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delim {
    Brace,
    Bracket,
}

impl Delim {
    pub fn open(&self) -> &'static str {
        match self {
            Delim::Brace => "{",
            Delim::Bracket => "[",
        }
    }

    pub fn close(&self) -> &'static str {
        match self {
            Delim::Brace => "}",
            Delim::Bracket => "]",
        }
    }

    fn of(value: &Value) -> Option<Delim> {
        match value {
            Value::Object(_) => Some(Delim::Brace),
            Value::Array(_) => Some(Delim::Bracket),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A leaf: scalars, empty composites, or values whose types differ
    Value {
        before: Option<Value>,
        after: Option<Value>,
    },
    /// Start of a composite; its members follow at `depth + 1`
    Open(Delim),
    /// End of the composite opened at the same depth
    Close(Delim),
    /// Composite below the nesting bound, not walked
    TooDeep,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiffEntry {
    pub key: String,
    pub kind: EntryKind,
    pub depth: usize,
    pub shape: Shape,
}

impl DiffEntry {
    /// True for entries a reviewer would normally not need to see
    pub fn is_unchanged(&self) -> bool {
        self.kind == EntryKind::Unchanged
    }
}

/// Compare `before` with `after` and list the differences in display order.
///
/// Containers are compared member by member: objects by key (sorted), arrays
/// by index. A null side counts as an empty container, so a create diffs as
/// all-added and a delete as all-removed.
pub fn diff(before: &Value, after: &Value, max_depth: usize) -> Vec<DiffEntry> {
    let mut out = Vec::new();
    if !diff_members(before, after, 0, max_depth, &mut out) {
        compare(ROOT_KEY, before, after, 0, max_depth, &mut out);
    }
    out
}

/// Walk the members of two containers of one kind. Null stands in for an
/// empty container of the other side's kind. Returns false, emitting
/// nothing, when the pair is not comparable member by member.
fn diff_members(
    before: &Value,
    after: &Value,
    depth: usize,
    max_depth: usize,
    out: &mut Vec<DiffEntry>,
) -> bool {
    match (before, after) {
        (Value::Object(b), Value::Object(a)) => diff_objects(Some(b), Some(a), depth, max_depth, out),
        (Value::Null, Value::Object(a)) => diff_objects(None, Some(a), depth, max_depth, out),
        (Value::Object(b), Value::Null) => diff_objects(Some(b), None, depth, max_depth, out),
        (Value::Array(b), Value::Array(a)) => diff_arrays(b, a, depth, max_depth, out),
        (Value::Null, Value::Array(a)) => diff_arrays(&[], a, depth, max_depth, out),
        (Value::Array(b), Value::Null) => diff_arrays(b, &[], depth, max_depth, out),
        (Value::Null, Value::Null) => {}
        _ => return false,
    }
    true
}

/// Keys in lexicographic order, each once
fn diff_objects(
    before: Option<&Map<String, Value>>,
    after: Option<&Map<String, Value>>,
    depth: usize,
    max_depth: usize,
    out: &mut Vec<DiffEntry>,
) {
    let keys: BTreeSet<&String> = before
        .into_iter()
        .chain(after)
        .flat_map(|map| map.keys())
        .collect();
    for key in keys {
        let b = before.and_then(|map| map.get(key));
        let a = after.and_then(|map| map.get(key));
        diff_member(key, b, a, depth, max_depth, out);
    }
}

/// Positions `[0]`, `[1]`, ... up to the longer side
fn diff_arrays(
    before: &[Value],
    after: &[Value],
    depth: usize,
    max_depth: usize,
    out: &mut Vec<DiffEntry>,
) {
    for i in 0..before.len().max(after.len()) {
        let key = format!("[{}]", i);
        diff_member(&key, before.get(i), after.get(i), depth, max_depth, out);
    }
}

fn diff_member(
    key: &str,
    before: Option<&Value>,
    after: Option<&Value>,
    depth: usize,
    max_depth: usize,
    out: &mut Vec<DiffEntry>,
) {
    match (before, after) {
        (None, Some(a)) => expand(key, EntryKind::Added, a, depth, max_depth, out),
        (Some(b), None) => expand(key, EntryKind::Removed, b, depth, max_depth, out),
        (Some(b), Some(a)) => compare(key, b, a, depth, max_depth, out),
        (None, None) => {}
    }
}

/// A key present on both sides
fn compare(
    key: &str,
    before: &Value,
    after: &Value,
    depth: usize,
    max_depth: usize,
    out: &mut Vec<DiffEntry>,
) {
    if before == after {
        out.push(DiffEntry {
            key: key.to_string(),
            kind: EntryKind::Unchanged,
            depth,
            shape: Shape::Value {
                before: Some(before.clone()),
                after: Some(after.clone()),
            },
        });
        return;
    }

    let same_kind = Delim::of(before).filter(|d| Some(*d) == Delim::of(after));
    match same_kind {
        Some(delim) if !is_empty_container(before) && !is_empty_container(after) => {
            if depth >= max_depth {
                out.push(too_deep(key, EntryKind::Changed, depth));
                return;
            }
            out.push(DiffEntry {
                key: key.to_string(),
                kind: EntryKind::Changed,
                depth,
                shape: Shape::Open(delim),
            });
            diff_members(before, after, depth + 1, max_depth, out);
            out.push(DiffEntry {
                key: key.to_string(),
                kind: EntryKind::Changed,
                depth,
                shape: Shape::Close(delim),
            });
        }
        _ => out.push(DiffEntry {
            key: key.to_string(),
            kind: EntryKind::Changed,
            depth,
            shape: Shape::Value {
                before: Some(before.clone()),
                after: Some(after.clone()),
            },
        }),
    }
}

/// A key present on one side only; composites list every member with `kind`
fn expand(
    key: &str,
    kind: EntryKind,
    value: &Value,
    depth: usize,
    max_depth: usize,
    out: &mut Vec<DiffEntry>,
) {
    let delim = match Delim::of(value) {
        Some(d) if !is_empty_container(value) => d,
        _ => {
            out.push(leaf(key, kind, value, depth));
            return;
        }
    };
    if depth >= max_depth {
        out.push(too_deep(key, kind, depth));
        return;
    }

    out.push(DiffEntry {
        key: key.to_string(),
        kind,
        depth,
        shape: Shape::Open(delim),
    });
    // one side empty: every member comes out with `kind`
    match kind {
        EntryKind::Removed => diff_members(value, &Value::Null, depth + 1, max_depth, out),
        _ => diff_members(&Value::Null, value, depth + 1, max_depth, out),
    };
    out.push(DiffEntry {
        key: key.to_string(),
        kind,
        depth,
        shape: Shape::Close(delim),
    });
}

fn leaf(key: &str, kind: EntryKind, value: &Value, depth: usize) -> DiffEntry {
    let (before, after) = match kind {
        EntryKind::Removed => (Some(value.clone()), None),
        _ => (None, Some(value.clone())),
    };
    debug_assert!(kind == EntryKind::Added || kind == EntryKind::Removed);
    DiffEntry {
        key: key.to_string(),
        kind,
        depth,
        shape: Shape::Value { before, after },
    }
}

fn too_deep(key: &str, kind: EntryKind, depth: usize) -> DiffEntry {
    DiffEntry {
        key: key.to_string(),
        kind,
        depth,
        shape: Shape::TooDeep,
    }
}

fn is_empty_container(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

// ── Scalar formatting ──

/// Render a value the way it is written in a plan: strings quoted, integral
/// numbers without a fraction, `null` spelled out. Composites in scalar
/// position are printed as compact JSON.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n),
        Value::String(s) => quote(s),
        Value::Array(items) if items.is_empty() => "[]".to_string(),
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        composite => serde_json::to_string(composite).unwrap_or_else(|_| "…".to_string()),
    }
}

fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => format!("{}", f),
        None => n.to_string(),
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Truncate to `max_len` chars, ending in `…` when shortened
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
    format!("{}…", truncated)
}

/// `format_value` cut down to a display width
pub fn display_value(value: &Value, max_len: usize) -> String {
    truncate(&format_value(value), max_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kinds(entries: &[DiffEntry]) -> Vec<(String, EntryKind)> {
        entries.iter().map(|e| (e.key.clone(), e.kind)).collect()
    }

    fn visible(entries: Vec<DiffEntry>) -> Vec<DiffEntry> {
        entries.into_iter().filter(|e| !e.is_unchanged()).collect()
    }

    fn inverse(kind: EntryKind) -> EntryKind {
        match kind {
            EntryKind::Added => EntryKind::Removed,
            EntryKind::Removed => EntryKind::Added,
            other => other,
        }
    }

    /// Swap the direction of a diff: what was added becomes removed and
    /// before/after values trade places.
    fn invert(entries: &[DiffEntry]) -> Vec<DiffEntry> {
        entries
            .iter()
            .map(|e| DiffEntry {
                key: e.key.clone(),
                kind: inverse(e.kind),
                depth: e.depth,
                shape: match &e.shape {
                    Shape::Value { before, after } => Shape::Value {
                        before: after.clone(),
                        after: before.clone(),
                    },
                    other => other.clone(),
                },
            })
            .collect()
    }

    // ── diff ──

    #[test]
    fn removed_and_added_keys_with_unchanged_elided() {
        let before = json!({"a": 1, "b": 2});
        let after = json!({"a": 1, "c": 3});
        let entries = visible(diff(&before, &after, 2));
        assert_eq!(
            entries,
            vec![
                DiffEntry {
                    key: "b".into(),
                    kind: EntryKind::Removed,
                    depth: 0,
                    shape: Shape::Value { before: Some(json!(2)), after: None },
                },
                DiffEntry {
                    key: "c".into(),
                    kind: EntryKind::Added,
                    depth: 0,
                    shape: Shape::Value { before: None, after: Some(json!(3)) },
                },
            ]
        );
    }

    #[test]
    fn identical_values_are_all_unchanged_at_any_depth() {
        let value = json!({
            "name": "web",
            "tags": {"env": "prod", "team": {"owner": "ops"}},
            "ports": [80, 443],
            "enabled": true,
            "nothing": null
        });
        for depth in 0..4 {
            let entries = diff(&value, &value, depth);
            assert!(!entries.is_empty());
            assert!(entries.iter().all(|e| e.kind == EntryKind::Unchanged));
        }
    }

    #[test]
    fn swapping_sides_swaps_added_and_removed() {
        let before = json!({"keep": 1, "gone": "x", "nested": {"a": 1, "b": [1, 2, 3]}});
        let after = json!({"keep": 2, "new": false, "nested": {"a": 1, "c": {"d": null}, "b": [1, 5]}});
        let forward = diff(&before, &after, MAX_DEPTH);
        let backward = diff(&after, &before, MAX_DEPTH);
        assert_eq!(invert(&forward), backward);
    }

    #[test]
    fn changed_scalar_keeps_both_values() {
        let entries = visible(diff(&json!({"size": "t2.micro"}), &json!({"size": "t3.large"}), 3));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, EntryKind::Changed);
        assert_eq!(
            entries[0].shape,
            Shape::Value { before: Some(json!("t2.micro")), after: Some(json!("t3.large")) }
        );
    }

    #[test]
    fn changed_nested_map_recurses_with_open_and_close() {
        let before = json!({"tags": {"env": "dev", "team": "ops"}});
        let after = json!({"tags": {"env": "prod", "team": "ops"}});
        let entries = visible(diff(&before, &after, 3));
        assert_eq!(
            kinds(&entries),
            vec![
                ("tags".to_string(), EntryKind::Changed),
                ("env".to_string(), EntryKind::Changed),
                ("tags".to_string(), EntryKind::Changed),
            ]
        );
        assert_eq!(entries[0].shape, Shape::Open(Delim::Brace));
        assert_eq!(entries[1].depth, 1);
        assert_eq!(entries[2].shape, Shape::Close(Delim::Brace));
    }

    #[test]
    fn lists_compare_by_index_in_numeric_order() {
        let before = json!({"ids": [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10]});
        let after = json!({"ids": [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]});
        let entries = visible(diff(&before, &after, 3));
        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["ids", "[11]", "ids"]);
    }

    #[test]
    fn bracket_shaped_object_keys_sort_as_text_once_each() {
        let before = json!({"[01]": 1, "[1]": 1, "[9]": 1, "[10]": 1});
        let after = json!({"[1]": 2, "[01]": 2, "[10]": 2, "[9]": 2});
        let entries = diff(&before, &after, 3);
        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["[01]", "[1]", "[10]", "[9]"]);
        assert!(entries.iter().all(|e| e.kind == EntryKind::Changed));
    }

    #[test]
    fn shifted_long_list_changes_every_position() {
        let before: Vec<u32> = (0..20_000).collect();
        let after: Vec<u32> = (1..20_001).collect();
        let entries = visible(diff(&json!({"ids": before}), &json!({"ids": after}), 3));
        // open, one changed entry per index, close
        assert_eq!(entries.len(), 20_002);
        assert_eq!(entries[1].key, "[0]");
        assert_eq!(entries[20_000].key, "[19999]");
    }

    #[test]
    fn object_and_list_roots_compare_as_single_value_entry() {
        let entries = diff(&json!({"a": 1}), &json!([1]), 3);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, ROOT_KEY);
        assert_eq!(entries[0].kind, EntryKind::Changed);
    }

    #[test]
    fn create_from_null_lists_everything_as_added() {
        let entries = diff(&Value::Null, &json!({"a": 1, "b": {"c": 2}}), 3);
        assert!(entries.iter().all(|e| e.kind == EntryKind::Added));
        assert_eq!(entries.len(), 4); // a, b {, c, }
    }

    #[test]
    fn delete_to_null_lists_everything_as_removed() {
        let entries = diff(&json!({"a": [1, 2]}), &Value::Null, 3);
        assert!(entries.iter().all(|e| e.kind == EntryKind::Removed));
    }

    #[test]
    fn keys_sorted_regardless_of_insertion_order() {
        let mut first = serde_json::Map::new();
        first.insert("zeta".into(), json!(1));
        first.insert("alpha".into(), json!(1));
        let mut second = serde_json::Map::new();
        second.insert("alpha".into(), json!(1));
        second.insert("zeta".into(), json!(1));
        let entries = diff(&Value::Null, &Value::Object(first), 2);
        let again = diff(&Value::Null, &Value::Object(second), 2);
        assert_eq!(entries, again);
        assert_eq!(entries[0].key, "alpha");
    }

    #[test]
    fn nesting_beyond_bound_becomes_too_deep_marker() {
        let after = json!({"a": {"b": {"c": {"d": 1}}}});
        let entries = diff(&Value::Null, &after, 2);
        assert!(entries.iter().any(|e| e.shape == Shape::TooDeep && e.depth == 2));
        assert!(entries.iter().all(|e| e.depth <= 2));
        assert!(!entries.iter().any(|e| e.key == "d"));
    }

    #[test]
    fn zero_depth_bound_marks_top_level_composites() {
        let entries = diff(&json!({"m": {"x": 1}}), &json!({"m": {"x": 2}}), 0);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].shape, Shape::TooDeep);
        assert_eq!(entries[0].kind, EntryKind::Changed);
    }

    #[test]
    fn type_change_is_a_single_changed_leaf() {
        let entries = visible(diff(&json!({"v": [1]}), &json!({"v": "1"}), 3));
        assert_eq!(entries.len(), 1);
        assert!(matches!(entries[0].shape, Shape::Value { .. }));
    }

    #[test]
    fn scalar_roots_compare_as_single_value_entry() {
        let entries = diff(&json!("old"), &json!("new"), 3);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, ROOT_KEY);
        assert_eq!(entries[0].kind, EntryKind::Changed);
    }

    #[test]
    fn both_null_yields_nothing() {
        assert!(diff(&Value::Null, &Value::Null, 3).is_empty());
    }

    // ── formatting ──

    #[test]
    fn format_value_is_type_directed() {
        assert_eq!(format_value(&json!("a\"b")), "\"a\\\"b\"");
        assert_eq!(format_value(&json!(true)), "true");
        assert_eq!(format_value(&json!(42)), "42");
        assert_eq!(format_value(&json!(3.0)), "3");
        assert_eq!(format_value(&json!(2.5)), "2.5");
        assert_eq!(format_value(&Value::Null), "null");
        assert_eq!(format_value(&json!({})), "{}");
        assert_eq!(format_value(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn control_characters_escaped_as_json() {
        assert_eq!(format_value(&json!("a\u{1b}b")), "\"a\\u001bb\"");
        assert_eq!(format_value(&json!("line\nnext")), "\"line\\nnext\"");
    }

    #[test]
    fn truncate_shorter_than_limit_returned_as_is() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn truncate_longer_than_limit_truncated_with_ellipsis() {
        assert_eq!(truncate("hello world", 8), "hello w…");
    }

    #[test]
    fn truncation_does_not_affect_equality() {
        let long = "x".repeat(500);
        let entries = diff(&json!({"s": long.clone()}), &json!({"s": long}), 2);
        assert_eq!(entries[0].kind, EntryKind::Unchanged);
        assert_eq!(display_value(&json!("x".repeat(500)), 20).chars().count(), 20);
    }
}
