use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;

use super::model::{Action, ChangeRecord, Diagnostic, Plan, PlanSummary, Severity};

const REPLACE_REASON: &str = "forces replacement";

// ── JSON plan format (`terraform show -json`) ──

#[derive(Debug, Deserialize)]
struct RawPlan {
    #[serde(default)]
    format_version: String,
    #[serde(default)]
    terraform_version: String,
    #[serde(default)]
    resource_changes: Vec<RawResourceChange>,
    #[serde(default)]
    configuration: Option<RawConfiguration>,
    #[serde(default)]
    diagnostics: Vec<RawDiagnostic>,
}

#[derive(Debug, Deserialize)]
struct RawResourceChange {
    address: String,
    #[serde(default)]
    module_address: Option<String>,
    #[serde(default)]
    mode: String,
    #[serde(default, rename = "type")]
    resource_type: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    index: Option<Value>,
    #[serde(default)]
    provider_name: String,
    #[serde(default)]
    action_reason: Option<String>,
    #[serde(default)]
    change: Option<RawChange>,
}

#[derive(Debug, Deserialize)]
struct RawChange {
    #[serde(default)]
    actions: Vec<String>,
    #[serde(default)]
    before: Value,
    #[serde(default)]
    after: Value,
}

#[derive(Debug, Deserialize)]
struct RawConfiguration {
    #[serde(default)]
    root_module: RawModule,
}

#[derive(Debug, Default, Deserialize)]
struct RawModule {
    #[serde(default)]
    resources: Vec<RawConfigResource>,
}

#[derive(Debug, Deserialize)]
struct RawConfigResource {
    address: String,
    #[serde(default)]
    depends_on: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawDiagnostic {
    #[serde(default)]
    severity: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    address: Option<String>,
}

// ── Loading ──

/// Read a plan from a file, or from stdin when `path` is `None` or `-`
pub fn load_plan(path: Option<&Path>) -> Result<Plan> {
    let content = match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read plan file {}", p.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read plan from stdin")?;
            buf
        }
    };
    parse_plan(&content)
}

/// Parse the JSON output of `terraform show -json`
pub fn parse_plan(content: &str) -> Result<Plan> {
    if content.trim().is_empty() {
        bail!("Plan input is empty");
    }
    let raw: RawPlan = serde_json::from_str(content).context("Failed to parse plan JSON")?;

    let depends_on: HashMap<String, Vec<String>> = raw
        .configuration
        .map(|c| {
            c.root_module
                .resources
                .into_iter()
                .map(|r| (r.address, r.depends_on))
                .collect()
        })
        .unwrap_or_default();

    let mut skipped = 0usize;
    let records: Vec<ChangeRecord> = raw
        .resource_changes
        .into_iter()
        .filter_map(|rc| {
            let record = convert_resource_change(rc, &depends_on);
            if record.is_none() {
                skipped += 1;
            }
            record
        })
        .collect();
    if skipped > 0 {
        log::debug!("skipped {} resource changes without a change block", skipped);
    }

    let diagnostics = raw
        .diagnostics
        .into_iter()
        .filter_map(convert_diagnostic)
        .collect();

    Ok(Plan {
        format_version: raw.format_version,
        terraform_version: raw.terraform_version,
        summary: PlanSummary::from_records(&records),
        records,
        diagnostics,
    })
}

fn convert_resource_change(
    rc: RawResourceChange,
    depends_on: &HashMap<String, Vec<String>>,
) -> Option<ChangeRecord> {
    let change = rc.change?;
    let action = Action::from_actions(change.actions.as_slice());
    let action_reason = match (rc.action_reason, action) {
        (Some(reason), _) if !reason.is_empty() => Some(humanize_reason(&reason)),
        (_, Action::Replace) => Some(REPLACE_REASON.to_string()),
        _ => None,
    };
    let module = rc.module_address.filter(|m| !m.is_empty());
    let dependencies = if module.is_none() {
        depends_on
            .get(strip_index(&rc.address))
            .cloned()
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    Some(ChangeRecord {
        address: rc.address,
        action,
        module,
        location: None,
        resource_type: rc.resource_type,
        name: rc.name,
        mode: rc.mode,
        provider: rc.provider_name,
        index: rc.index,
        action_reason,
        before: change.before,
        after: change.after,
        dependencies,
    })
}

fn convert_diagnostic(raw: RawDiagnostic) -> Option<Diagnostic> {
    let severity = match raw.severity.as_str() {
        "error" => Severity::Error,
        "warning" => Severity::Warning,
        other => {
            log::warn!("ignoring diagnostic with unknown severity {:?}", other);
            return None;
        }
    };
    Some(Diagnostic {
        severity,
        summary: raw.summary,
        detail: raw.detail.filter(|d| !d.is_empty()),
        address: raw.address,
    })
}

/// `replace_because_cannot_update` -> `replace because cannot update`
fn humanize_reason(reason: &str) -> String {
    reason.to_lowercase().replace('_', " ")
}

/// `aws_instance.web[0]` -> `aws_instance.web`
fn strip_index(address: &str) -> &str {
    match address.find('[') {
        Some(pos) if address.ends_with(']') => &address[..pos],
        _ => address,
    }
}
