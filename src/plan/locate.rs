use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::model::ChangeRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum BlockKind {
    Resource,
    Data,
}

/// Where each `resource` / `data` block is declared, keyed by kind, type and
/// name. Values are base file names such as `network.tf`.
#[derive(Debug, Default)]
pub struct SourceIndex {
    blocks: HashMap<(BlockKind, String, String), String>,
}

impl SourceIndex {
    /// Walk `dir` for `.tf` files, skipping hidden directories such as
    /// `.terraform`. Files are visited in sorted path order and the first
    /// declaration of a block wins.
    pub fn scan(dir: &Path) -> Result<Self> {
        let mut files = Vec::new();
        collect_tf_files(dir, &|d: &Path| fs::read_dir(d), &mut files)
            .with_context(|| format!("Failed to scan {}", dir.display()))?;
        files.sort();

        let mut index = SourceIndex::default();
        for path in &files {
            let content = match fs::read_to_string(path) {
                Ok(c) => c,
                Err(e) => {
                    log::warn!("skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
                continue;
            };
            for key in declarations(&content) {
                index.blocks.entry(key).or_insert_with(|| file_name.clone());
            }
        }
        log::debug!(
            "indexed {} blocks from {} files under {}",
            index.blocks.len(),
            files.len(),
            dir.display()
        );
        Ok(index)
    }

    /// Base name of the file declaring `record`, if any
    pub fn locate(&self, record: &ChangeRecord) -> Option<String> {
        if record.resource_type.is_empty() || record.name.is_empty() {
            return None;
        }
        let kind = if record.is_data() {
            BlockKind::Data
        } else {
            BlockKind::Resource
        };
        self.blocks
            .get(&(kind, record.resource_type.clone(), record.name.clone()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

type ListDir<'a> = &'a dyn Fn(&Path) -> io::Result<fs::ReadDir>;

/// Only a failure to list `dir` itself is returned. Anything below it that
/// cannot be read is logged and skipped.
fn collect_tf_files(dir: &Path, read_dir: ListDir, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("skipping entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(e) => {
                log::warn!("skipping {}: {}", path.display(), e);
                continue;
            }
        };
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if file_type.is_dir() {
            if hidden {
                continue;
            }
            if let Err(e) = collect_tf_files(&path, read_dir, out) {
                log::warn!("skipping {}: {}", path.display(), e);
            }
        } else if path.extension().is_some_and(|ext| ext == "tf") {
            out.push(path);
        }
    }
    Ok(())
}

/// Block headers in one file, e.g. `resource "aws_vpc" "main" {`
fn declarations(content: &str) -> Vec<(BlockKind, String, String)> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim_start();
            let (kind, rest) = if let Some(rest) = line.strip_prefix("resource") {
                (BlockKind::Resource, rest)
            } else if let Some(rest) = line.strip_prefix("data") {
                (BlockKind::Data, rest)
            } else {
                return None;
            };
            if !rest.starts_with(char::is_whitespace) {
                return None;
            }
            let (block_type, rest) = quoted(rest)?;
            let (name, _) = quoted(rest)?;
            Some((kind, block_type, name))
        })
        .collect()
}

/// First quoted label in `s` (double or single quotes) and what follows it
fn quoted(s: &str) -> Option<(String, &str)> {
    let s = s.trim_start();
    let quote = s.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let body = &s[1..];
    let end = body.find(quote)?;
    Some((body[..end].to_string(), &body[end + 1..]))
}
