use std::collections::BTreeMap;

use serde_json::Value;

use crate::plan::{Action, ChangeRecord};

/// Source file lookup used to group root-module records
pub type Locate<'a> = &'a dyn Fn(&ChangeRecord) -> Option<String>;

// ── Node types ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Module,
    File,
}

/// Synthetic header for a module or source file grouping
#[derive(Debug, Clone, PartialEq)]
pub struct GroupHeader {
    pub kind: GroupKind,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    Group(GroupHeader),
    Record(ChangeRecord),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub content: NodeContent,
    pub expanded: bool,
    pub children: Vec<TreeNode>,
    pub depth: usize,
}

impl TreeNode {
    fn leaf(record: ChangeRecord, depth: usize) -> Self {
        TreeNode {
            content: NodeContent::Record(record),
            expanded: false,
            children: Vec::new(),
            depth,
        }
    }

    fn group(kind: GroupKind, label: String, records: Vec<ChangeRecord>) -> Self {
        TreeNode {
            content: NodeContent::Group(GroupHeader { kind, label }),
            expanded: false,
            children: records.into_iter().map(|r| TreeNode::leaf(r, 1)).collect(),
            depth: 0,
        }
    }

    /// Group headers are always no-op
    pub fn action(&self) -> Action {
        match &self.content {
            NodeContent::Group(_) => Action::NoOp,
            NodeContent::Record(r) => r.action,
        }
    }

    pub fn record(&self) -> Option<&ChangeRecord> {
        match &self.content {
            NodeContent::Record(r) => Some(r),
            NodeContent::Group(_) => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.content, NodeContent::Group(_))
    }

    /// Stable identity: the record address, or the group label
    pub fn key(&self) -> &str {
        match &self.content {
            NodeContent::Record(r) => &r.address,
            NodeContent::Group(g) => &g.label,
        }
    }
}

// ── Building ──

/// Turn a flat list of change records into an ordered forest.
///
/// No-op records are dropped. Records inside a module are grouped under one
/// header per module; root-module records are grouped by `locate` when given.
/// Module groups come first, then file groups, then records that could not be
/// placed. A lone file group with nothing unplaced next to it is flattened.
pub fn build_forest(records: &[ChangeRecord], locate: Option<Locate>) -> Vec<TreeNode> {
    let mut modules: BTreeMap<String, Vec<ChangeRecord>> = BTreeMap::new();
    let mut root: Vec<ChangeRecord> = Vec::new();

    for record in records.iter().filter(|r| r.action != Action::NoOp) {
        match record.module.as_deref().filter(|m| !m.is_empty()) {
            Some(module) => modules.entry(module.to_string()).or_default().push(record.clone()),
            None => root.push(record.clone()),
        }
    }
    root.sort_by(|a, b| a.address.cmp(&b.address));

    let mut forest: Vec<TreeNode> = modules
        .into_iter()
        .map(|(module, mut members)| {
            members.sort_by(|a, b| a.address.cmp(&b.address));
            TreeNode::group(GroupKind::Module, module, members)
        })
        .collect();

    let (files, unplaced) = match locate {
        Some(locate) => group_by_file(root, locate),
        None => (BTreeMap::new(), root),
    };

    if files.len() == 1 && unplaced.is_empty() {
        for (_, members) in files {
            forest.extend(members.into_iter().map(|r| TreeNode::leaf(r, 0)));
        }
    } else {
        for (file, members) in files {
            forest.push(TreeNode::group(GroupKind::File, file, members));
        }
        forest.extend(unplaced.into_iter().map(|r| TreeNode::leaf(r, 0)));
    }

    forest
}

/// Split address-sorted root records into file groups and unplaced leftovers
fn group_by_file(
    root: Vec<ChangeRecord>,
    locate: Locate,
) -> (BTreeMap<String, Vec<ChangeRecord>>, Vec<ChangeRecord>) {
    let placed: Vec<Option<String>> = root.iter().map(|r| locate(r)).collect();

    let mut files: BTreeMap<String, Vec<ChangeRecord>> = BTreeMap::new();
    let mut unplaced = Vec::new();
    for (i, record) in root.iter().enumerate() {
        let file = placed[i].clone().or_else(|| {
            root.iter()
                .enumerate()
                .find(|(j, candidate)| placed[*j].is_some() && is_replacement_pair(record, candidate))
                .and_then(|(j, _)| placed[j].clone())
        });
        match file {
            Some(file) => files.entry(file).or_default().push(record.clone()),
            None => unplaced.push(record.clone()),
        }
    }
    for members in files.values_mut() {
        members.sort_by(|a, b| a.address.cmp(&b.address));
    }
    (files, unplaced)
}

/// Whether `orphan` looks like the delete half of a replacement whose create
/// half is `candidate`: same resource type, same count/for_each key.
pub fn is_replacement_pair(orphan: &ChangeRecord, candidate: &ChangeRecord) -> bool {
    orphan.action == Action::Delete
        && candidate.action == Action::Create
        && !orphan.resource_type.is_empty()
        && orphan.resource_type == candidate.resource_type
        && index_matches(orphan.index.as_ref(), candidate.index.as_ref())
}

/// Two absent keys match; numbers and strings compare by their text, so
/// `0` and `"0"` match. Anything else never matches.
fn index_matches(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => match (index_text(a), index_text(b)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        _ => false,
    }
}

fn index_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ── Traversal ──

/// Depth-first flattening; children of a collapsed node are left out
pub fn visible(forest: &[TreeNode]) -> Vec<&TreeNode> {
    let mut out = Vec::new();
    for node in forest {
        push_visible(node, &mut out);
    }
    out
}

fn push_visible<'a>(node: &'a TreeNode, out: &mut Vec<&'a TreeNode>) {
    out.push(node);
    if node.expanded {
        for child in &node.children {
            push_visible(child, out);
        }
    }
}

pub fn visible_len(forest: &[TreeNode]) -> usize {
    visible(forest).len()
}

/// Mutable access to the node at a position in the visible sequence
pub fn visible_node_mut(forest: &mut [TreeNode], index: usize) -> Option<&mut TreeNode> {
    let mut remaining = index;
    for node in forest.iter_mut() {
        if let Some(found) = find_visible_mut(node, &mut remaining) {
            return Some(found);
        }
    }
    None
}

fn find_visible_mut<'a>(node: &'a mut TreeNode, remaining: &mut usize) -> Option<&'a mut TreeNode> {
    if *remaining == 0 {
        return Some(node);
    }
    *remaining -= 1;
    if node.expanded {
        for child in node.children.iter_mut() {
            if let Some(found) = find_visible_mut(child, remaining) {
                return Some(found);
            }
        }
    }
    None
}

pub fn set_all_expanded(forest: &mut [TreeNode], expanded: bool) {
    for node in forest.iter_mut() {
        node.expanded = expanded;
        set_all_expanded(&mut node.children, expanded);
    }
}

/// Every record in the forest, in tree order, regardless of expansion
pub fn leaves(forest: &[TreeNode]) -> Vec<&ChangeRecord> {
    let mut out = Vec::new();
    for node in forest {
        match &node.content {
            NodeContent::Record(r) => out.push(r),
            NodeContent::Group(_) => out.extend(leaves(&node.children)),
        }
    }
    out
}
