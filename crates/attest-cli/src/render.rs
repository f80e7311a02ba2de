//! # Rendering
//!
//! Turns derived workflow state into terminal text or JSON. Nothing here
//! talks to the collaborator API; every function is a pure view of values
//! the subcommands already hold.

use std::collections::BTreeSet;

use attest_core::{FrameworkId, RequirementId};
use attest_workflow::{
    FrameworkCoverage, IgnoreReason, ScopeComposer, StepStatus, ToggleOutcome, WorkflowProgress,
};
use serde::Serialize;

/// How a subcommand prints its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Pretty-printed JSON of any serializable result.
pub fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

// ── Progress ─────────────────────────────────────────────────────────

fn marker(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Complete => "[x]",
        StepStatus::InProgress => "[~]",
        StepStatus::NotStarted => "[ ]",
    }
}

/// The step bar on one line, recommended step prefixed with `>`.
pub fn progress_bar(progress: &WorkflowProgress) -> String {
    progress
        .steps
        .iter()
        .map(|step| {
            let pointer = if progress.next == Some(step.id) { ">" } else { "" };
            format!("{pointer}{} {}", marker(step.status), step.label)
        })
        .collect::<Vec<_>>()
        .join(" > ")
}

/// Step bar followed by the recommendation line.
pub fn render_progress(progress: &WorkflowProgress) -> String {
    if progress.is_unknown() {
        return "progress unknown".to_string();
    }
    let follow_up = match progress.next_step() {
        Some(step) => format!(
            "Next: {} - {} ({})",
            step.label, step.description, step.target
        ),
        None => "All stages complete.".to_string(),
    };
    format!("{}\n{follow_up}", progress_bar(progress))
}

// ── Scope ────────────────────────────────────────────────────────────

/// One unit of a framework as shown by `scope show`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitRow {
    pub id: RequirementId,
    pub code: String,
    pub name: String,
    pub selected: bool,
    pub mandatory: bool,
}

/// Point-in-time view of a composer's selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeSnapshot {
    pub framework_id: FrameworkId,
    pub include_all: bool,
    pub units: Vec<UnitRow>,
}

impl ScopeSnapshot {
    pub fn of(composer: &ScopeComposer) -> Self {
        let selected = composer.selected();
        let units: Vec<UnitRow> = composer
            .units()
            .iter()
            .map(|unit| UnitRow {
                id: unit.id,
                code: unit.code.clone(),
                name: unit.name.clone(),
                selected: selected.contains(&unit.id),
                mandatory: composer.is_mandatory(unit),
            })
            .collect();
        Self {
            framework_id: *composer.framework(),
            include_all: !units.is_empty() && units.iter().all(|u| u.selected),
            units,
        }
    }

    pub fn selected_count(&self) -> usize {
        self.units.iter().filter(|u| u.selected).count()
    }
}

pub fn render_scope(snapshot: &ScopeSnapshot) -> String {
    if snapshot.units.is_empty() {
        return format!("framework {} has no selectable units", snapshot.framework_id);
    }
    let mut out = format!(
        "{} of {} units in scope{}\n",
        snapshot.selected_count(),
        snapshot.units.len(),
        if snapshot.include_all { " (all)" } else { "" }
    );
    for unit in &snapshot.units {
        let mark = if unit.selected { "[x]" } else { "[ ]" };
        let note = if unit.mandatory { "  (mandatory)" } else { "" };
        out.push_str(&format!("  {mark} {:<6} {}{note}\n", unit.code, unit.name));
    }
    out.trim_end().to_string()
}

/// Human summary of a toggle; explicit selections are listed by unit code
/// in framework order.
pub fn render_toggle(outcome: &ToggleOutcome, snapshot: &ScopeSnapshot) -> String {
    match outcome {
        ToggleOutcome::Ignored {
            reason: IgnoreReason::Mandatory,
        } => "ignored: mandatory units stay in scope".to_string(),
        ToggleOutcome::Ignored {
            reason: IgnoreReason::NoUnits,
        } => "ignored: framework has no selectable units".to_string(),
        ToggleOutcome::Committed {
            selected,
            include_all,
        } => {
            if *include_all {
                return format!("saved: all {} units in scope", snapshot.units.len());
            }
            format!("saved: {}", selected_codes(snapshot, selected).join(", "))
        }
    }
}

fn selected_codes<'a>(snapshot: &'a ScopeSnapshot, selected: &BTreeSet<RequirementId>) -> Vec<&'a str> {
    snapshot
        .units
        .iter()
        .filter(|u| selected.contains(&u.id))
        .map(|u| u.code.as_str())
        .collect()
}

// ── Coverage ─────────────────────────────────────────────────────────

pub fn render_coverage(items: &[FrameworkCoverage]) -> String {
    if items.is_empty() {
        return "no frameworks in scope".to_string();
    }
    items
        .iter()
        .map(|item| {
            let counts = match &item.stats {
                Some(stats) => format!(
                    "{} requirements ({} assessable)",
                    stats.total_requirements, stats.assessable_requirements
                ),
                None => "requirements unavailable".to_string(),
            };
            let maturity = match (item.score, item.percent, item.band) {
                (Some(score), Some(percent), Some(band)) => {
                    format!("maturity {score:.2}/4 ({percent:.0}%) {band}")
                }
                _ => "not scored".to_string(),
            };
            format!("{:<10} {}: {counts}; {maturity}", item.code, item.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
