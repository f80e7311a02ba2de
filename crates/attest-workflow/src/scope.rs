//! # Multi-Framework Scope Composition
//!
//! Each framework in an assessment's scope has a scope record saying which of
//! its top-level units (SOC 2 trust-service categories, NIST CSF functions)
//! are assessed. A [`ScopeComposer`] owns the in-memory selection for one
//! (assessment, framework) pair and persists every change through the
//! collaborator gateway.
//!
//! ## Invariants
//!
//! - Mandatory units are always selected and cannot be toggled off.
//! - A selection equal to the full unit set is persisted as
//!   `include_all = true` with no explicit sets.
//! - Any other selection is persisted as an explicit include set.
//! - Toggles are optimistic: the selection changes before the write and is
//!   restored if the write fails.
//! - Toggles on one composer are serialized, so no update is lost.

use std::collections::BTreeSet;
use std::sync::Arc;

use attest_client::frameworks::{HierarchyNode, ScopeRecord, ScopeUpdate};
use attest_client::{ApiError, CollaboratorGateway};
use attest_core::{AssessmentId, ErrorKind, FrameworkId, RequirementId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

/// Category prefixes of SOC 2 requirement codes, in match priority order.
const CATEGORY_KEYS: [&str; 5] = ["CC", "PI", "A", "C", "P"];

/// Category key of a requirement code: the first of `CC`, `PI`, `A`, `C`,
/// `P` the code starts with.
///
/// `CC6.1` → `CC`, `PI1` → `PI`, `C1.2` → `C`.
pub fn category_key(code: &str) -> Option<&'static str> {
    CATEGORY_KEYS.iter().copied().find(|key| code.starts_with(key))
}

// ── Units ────────────────────────────────────────────────────────────

/// A top-level node of a framework that can be put in or out of scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectableUnit {
    pub id: RequirementId,
    pub code: String,
    pub name: String,
}

impl From<HierarchyNode> for SelectableUnit {
    fn from(node: HierarchyNode) -> Self {
        Self {
            id: node.id,
            code: node.code,
            name: node.name,
        }
    }
}

/// Which unit codes are mandatory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MandatoryPolicy {
    prefixes: Vec<String>,
}

impl MandatoryPolicy {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// No unit is mandatory.
    pub fn none() -> Self {
        Self { prefixes: Vec::new() }
    }

    /// A code is mandatory when it equals one of the policy's prefixes or
    /// extends one past a segment boundary.
    ///
    /// `CC` covers `CC6.1`, `GV` covers `GV.OC`, `P` does not cover `PR`.
    pub fn is_mandatory(&self, code: &str) -> bool {
        self.prefixes.iter().any(|p| extends_prefix(code, p))
    }
}

fn extends_prefix(code: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return false;
    }
    match code.strip_prefix(prefix) {
        Some(rest) => !rest.starts_with(|c: char| c.is_ascii_alphabetic()),
        None => false,
    }
}

impl Default for MandatoryPolicy {
    /// SOC 2 common criteria (security) are always in scope.
    fn default() -> Self {
        Self::new(["CC"])
    }
}

/// Resolve which of `units` a scope record puts in scope.
///
/// - no record, or `include_all`: every unit;
/// - a non-empty include set: that set, restricted to known units;
/// - otherwise: every unit not in the exclude set.
pub fn resolve_membership(
    units: &[SelectableUnit],
    scope: Option<&ScopeRecord>,
) -> BTreeSet<RequirementId> {
    let all = units.iter().map(|u| u.id);
    let Some(scope) = scope else {
        return all.collect();
    };
    if scope.include_all {
        return all.collect();
    }
    if let Some(included) = scope
        .included_requirement_ids
        .as_ref()
        .filter(|set| !set.is_empty())
    {
        return all.filter(|id| included.contains(id)).collect();
    }
    match &scope.excluded_requirement_ids {
        Some(excluded) => all.filter(|id| !excluded.contains(id)).collect(),
        None => all.collect(),
    }
}

// ── Toggle state machine ─────────────────────────────────────────────

/// Phase of one optimistic toggle.
///
/// ```text
/// PENDING ──► COMMITTED
///    │
///    └──────► ROLLED_BACK
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TogglePhase {
    Pending,
    Committed,
    RolledBack,
}

impl TogglePhase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for TogglePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Committed => "COMMITTED",
            Self::RolledBack => "ROLLED_BACK",
        };
        f.write_str(s)
    }
}

/// Audit entry for one toggle that reached the persistence step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleRecord {
    pub unit: RequirementId,
    pub phase: TogglePhase,
    /// Whether the attempted write was the include-all form.
    pub include_all: bool,
    pub selected_after: BTreeSet<RequirementId>,
}

impl ToggleRecord {
    fn pending(unit: RequirementId, include_all: bool, selected_after: BTreeSet<RequirementId>) -> Self {
        Self {
            unit,
            phase: TogglePhase::Pending,
            include_all,
            selected_after,
        }
    }

    fn settle(&mut self, to: TogglePhase) -> Result<(), ScopeError> {
        if self.phase.is_terminal() || !to.is_terminal() {
            return Err(ScopeError::InvalidPhaseTransition {
                from: self.phase,
                to,
            });
        }
        self.phase = to;
        Ok(())
    }
}

/// Why a toggle request was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// The unit is mandatory and stays selected.
    Mandatory,
    /// The framework has no selectable units.
    NoUnits,
}

/// Result of a toggle request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// Nothing changed and nothing was written.
    Ignored { reason: IgnoreReason },
    /// The new selection was persisted.
    Committed {
        selected: BTreeSet<RequirementId>,
        include_all: bool,
    },
}

// ── Errors ───────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum ScopeError {
    /// A collaborator call failed. For toggles the selection has already
    /// been restored.
    #[error("{operation} failed: {source}")]
    Gateway {
        operation: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("unit {unit} is not part of framework {framework}")]
    UnknownUnit {
        unit: RequirementId,
        framework: FrameworkId,
    },

    #[error("invalid toggle transition from {from} to {to}")]
    InvalidPhaseTransition { from: TogglePhase, to: TogglePhase },
}

impl ScopeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Gateway { source, .. } => source.kind(),
            Self::UnknownUnit { .. } => ErrorKind::Validation,
            Self::InvalidPhaseTransition { .. } => ErrorKind::Unknown,
        }
    }
}

// ── Composer ─────────────────────────────────────────────────────────

#[derive(Debug)]
struct Selection {
    selected: BTreeSet<RequirementId>,
    history: Vec<ToggleRecord>,
}

/// Selection of one framework's units within one assessment.
pub struct ScopeComposer {
    gateway: Arc<dyn CollaboratorGateway>,
    assessment: AssessmentId,
    framework: FrameworkId,
    units: Vec<SelectableUnit>,
    policy: MandatoryPolicy,
    /// Visible selection. Never held across `.await`.
    state: RwLock<Selection>,
    /// Serializes toggles; held for the whole write.
    write_gate: Mutex<()>,
}

impl std::fmt::Debug for ScopeComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeComposer")
            .field("assessment", &self.assessment)
            .field("framework", &self.framework)
            .field("units", &self.units.len())
            .finish_non_exhaustive()
    }
}

impl ScopeComposer {
    /// Build a composer from already-fetched units and the current scope
    /// record of the framework, if any.
    pub fn new(
        gateway: Arc<dyn CollaboratorGateway>,
        assessment: AssessmentId,
        framework: FrameworkId,
        units: Vec<SelectableUnit>,
        current_scope: Option<&ScopeRecord>,
        policy: MandatoryPolicy,
    ) -> Self {
        let mut selected = resolve_membership(&units, current_scope);
        selected.extend(
            units
                .iter()
                .filter(|u| policy.is_mandatory(&u.code))
                .map(|u| u.id),
        );
        Self {
            gateway,
            assessment,
            framework,
            units,
            policy,
            state: RwLock::new(Selection {
                selected,
                history: Vec::new(),
            }),
            write_gate: Mutex::new(()),
        }
    }

    /// Fetch the framework's top-level units and build a composer over them.
    pub async fn load(
        gateway: Arc<dyn CollaboratorGateway>,
        assessment: AssessmentId,
        framework: FrameworkId,
        current_scope: Option<&ScopeRecord>,
        policy: MandatoryPolicy,
    ) -> Result<Self, ScopeError> {
        let nodes = gateway
            .get_framework_hierarchy(&framework, Some(0))
            .await
            .map_err(|source| ScopeError::Gateway {
                operation: "load framework hierarchy",
                source,
            })?;
        let units: Vec<SelectableUnit> = nodes.into_iter().map(SelectableUnit::from).collect();
        tracing::debug!(
            assessment = %assessment,
            framework = %framework,
            units = units.len(),
            "scope composer loaded"
        );
        Ok(Self::new(gateway, assessment, framework, units, current_scope, policy))
    }

    /// Like [`ScopeComposer::load`], but also fetches the assessment's scope
    /// records to find the framework's current record.
    pub async fn load_current(
        gateway: Arc<dyn CollaboratorGateway>,
        assessment: AssessmentId,
        framework: FrameworkId,
        policy: MandatoryPolicy,
    ) -> Result<Self, ScopeError> {
        let (nodes, records) = tokio::join!(
            gateway.get_framework_hierarchy(&framework, Some(0)),
            gateway.get_assessment_scope(&assessment),
        );
        let nodes = nodes.map_err(|source| ScopeError::Gateway {
            operation: "load framework hierarchy",
            source,
        })?;
        let records = records.map_err(|source| ScopeError::Gateway {
            operation: "load assessment scope",
            source,
        })?;
        let current = records.iter().find(|r| r.framework_id == framework);
        let units = nodes.into_iter().map(SelectableUnit::from).collect();
        Ok(Self::new(gateway, assessment, framework, units, current, policy))
    }

    pub fn assessment(&self) -> &AssessmentId {
        &self.assessment
    }

    pub fn framework(&self) -> &FrameworkId {
        &self.framework
    }

    pub fn units(&self) -> &[SelectableUnit] {
        &self.units
    }

    pub fn is_mandatory(&self, unit: &SelectableUnit) -> bool {
        self.policy.is_mandatory(&unit.code)
    }

    /// Look up a unit by its code, e.g. `"PI"`.
    pub fn unit_by_code(&self, code: &str) -> Option<&SelectableUnit> {
        self.units.iter().find(|u| u.code.eq_ignore_ascii_case(code))
    }

    /// Current selection, including any toggle still being written.
    pub fn selected(&self) -> BTreeSet<RequirementId> {
        self.state.read().selected.clone()
    }

    pub fn is_selected(&self, unit: &RequirementId) -> bool {
        self.state.read().selected.contains(unit)
    }

    /// Every toggle that reached the persistence step, oldest first.
    pub fn history(&self) -> Vec<ToggleRecord> {
        self.state.read().history.clone()
    }

    fn all_ids(&self) -> BTreeSet<RequirementId> {
        self.units.iter().map(|u| u.id).collect()
    }

    /// Flip one unit in or out of scope and persist the result.
    ///
    /// Mandatory units and frameworks without units are ignored. On a
    /// failed write the previous selection is restored and the error is
    /// returned.
    pub async fn toggle(&self, unit: &RequirementId, code: &str) -> Result<ToggleOutcome, ScopeError> {
        if self.units.is_empty() {
            return Ok(ToggleOutcome::Ignored {
                reason: IgnoreReason::NoUnits,
            });
        }
        let known = self.units.iter().find(|u| u.id == *unit);
        if self.policy.is_mandatory(code) || known.is_some_and(|u| self.is_mandatory(u)) {
            tracing::debug!(unit = %unit, code, "mandatory unit toggle ignored");
            return Ok(ToggleOutcome::Ignored {
                reason: IgnoreReason::Mandatory,
            });
        }
        if known.is_none() {
            return Err(ScopeError::UnknownUnit {
                unit: *unit,
                framework: self.framework,
            });
        }

        let _gate = self.write_gate.lock().await;

        let (previous, next) = {
            let mut state = self.state.write();
            let previous = state.selected.clone();
            let mut next = previous.clone();
            if !next.remove(unit) {
                next.insert(*unit);
            }
            state.selected = next.clone();
            (previous, next)
        };

        let update = if next == self.all_ids() {
            ScopeUpdate::include_all(self.framework)
        } else {
            ScopeUpdate::explicit(self.framework, next.clone())
        };
        let mut record = ToggleRecord::pending(*unit, update.include_all, next.clone());

        let result = self
            .gateway
            .set_assessment_scope(&self.assessment, &update)
            .await;

        match result {
            Ok(_) => {
                record.settle(TogglePhase::Committed)?;
                self.state.write().history.push(record);
                tracing::info!(
                    assessment = %self.assessment,
                    framework = %self.framework,
                    unit = %unit,
                    include_all = update.include_all,
                    selected = next.len(),
                    "scope updated"
                );
                Ok(ToggleOutcome::Committed {
                    selected: next,
                    include_all: update.include_all,
                })
            }
            Err(source) => {
                record.settle(TogglePhase::RolledBack)?;
                {
                    let mut state = self.state.write();
                    state.selected = previous;
                    state.history.push(record);
                }
                tracing::warn!(
                    assessment = %self.assessment,
                    framework = %self.framework,
                    unit = %unit,
                    kind = %source.kind(),
                    error = %source,
                    "scope update failed; selection restored"
                );
                Err(ScopeError::Gateway {
                    operation: "update scope",
                    source,
                })
            }
        }
    }

    /// Remove the framework from the assessment's scope entirely.
    pub async fn remove(&self) -> Result<(), ScopeError> {
        self.gateway
            .remove_assessment_scope(&self.assessment, &self.framework)
            .await
            .map_err(|source| ScopeError::Gateway {
                operation: "remove scope",
                source,
            })?;
        tracing::info!(
            assessment = %self.assessment,
            framework = %self.framework,
            "framework removed from scope"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(code: &str) -> SelectableUnit {
        SelectableUnit {
            id: RequirementId::new(),
            code: code.to_string(),
            name: code.to_string(),
        }
    }

    fn record(framework: FrameworkId) -> ScopeRecord {
        ScopeRecord {
            id: None,
            framework_id: framework,
            framework_code: None,
            include_all: false,
            excluded_requirement_ids: None,
            included_requirement_ids: None,
        }
    }

    // ── Category keys ────────────────────────────────────────────────

    #[test]
    fn category_key_prefers_longest_known_prefix() {
        assert_eq!(category_key("CC6.1"), Some("CC"));
        assert_eq!(category_key("PI1.2"), Some("PI"));
        assert_eq!(category_key("A1"), Some("A"));
        assert_eq!(category_key("C1.1"), Some("C"));
        assert_eq!(category_key("P4"), Some("P"));
        assert_eq!(category_key("ID.AM"), None);
    }

    #[test]
    fn default_policy_makes_common_criteria_mandatory() {
        let policy = MandatoryPolicy::default();
        assert!(policy.is_mandatory("CC"));
        assert!(policy.is_mandatory("CC6.1"));
        assert!(!policy.is_mandatory("C"));
        assert!(!policy.is_mandatory("PI"));
        assert!(!MandatoryPolicy::none().is_mandatory("CC"));
    }

    #[test]
    fn custom_policy_matches_whole_codes() {
        let policy = MandatoryPolicy::new(["GV"]);
        assert!(policy.is_mandatory("GV"));
        assert!(!policy.is_mandatory("ID"));
    }

    #[test]
    fn nist_prefixes_cover_their_subcategories() {
        let policy = MandatoryPolicy::new(["GV", "PR"]);
        assert!(policy.is_mandatory("PR"));
        assert!(policy.is_mandatory("GV.OC"));
        assert!(policy.is_mandatory("PR.AC-1"));
        assert!(!policy.is_mandatory("PRX"));
        assert!(!policy.is_mandatory("ID.AM"));
    }

    #[test]
    fn single_letter_prefix_stops_at_segment_boundary() {
        let policy = MandatoryPolicy::new(["P"]);
        assert!(policy.is_mandatory("P"));
        assert!(policy.is_mandatory("P4.1"));
        assert!(!policy.is_mandatory("PR"));
        assert!(!policy.is_mandatory("PI1"));

        let common = MandatoryPolicy::default();
        assert!(common.is_mandatory("CC1"));
        assert!(common.is_mandatory("CC9.2"));
        assert!(!MandatoryPolicy::new(["C"]).is_mandatory("CC1"));
    }

    #[test]
    fn empty_prefix_matches_nothing() {
        assert!(!MandatoryPolicy::new([""]).is_mandatory("CC"));
    }

    // ── Membership ───────────────────────────────────────────────────

    #[test]
    fn missing_record_means_everything() {
        let units = vec![unit("CC"), unit("A")];
        assert_eq!(resolve_membership(&units, None).len(), 2);
    }

    #[test]
    fn include_all_wins_over_sets() {
        let units = vec![unit("CC"), unit("A")];
        let mut scope = record(FrameworkId::new());
        scope.include_all = true;
        scope.included_requirement_ids = Some(BTreeSet::new());
        assert_eq!(resolve_membership(&units, Some(&scope)).len(), 2);
    }

    #[test]
    fn explicit_include_set_is_authoritative() {
        let units = vec![unit("CC"), unit("A"), unit("C")];
        let mut scope = record(FrameworkId::new());
        scope.included_requirement_ids = Some([units[1].id, RequirementId::new()].into_iter().collect());
        let members = resolve_membership(&units, Some(&scope));
        assert_eq!(members, [units[1].id].into_iter().collect());
    }

    #[test]
    fn empty_include_set_falls_through_to_exclusions() {
        let units = vec![unit("CC"), unit("A"), unit("C")];
        let mut scope = record(FrameworkId::new());
        scope.included_requirement_ids = Some(BTreeSet::new());
        scope.excluded_requirement_ids = Some([units[1].id].into_iter().collect());
        let members = resolve_membership(&units, Some(&scope));
        assert_eq!(members, [units[0].id, units[2].id].into_iter().collect());
    }

    #[test]
    fn empty_include_set_without_exclusions_is_everything() {
        let units = vec![unit("CC"), unit("A")];
        let mut scope = record(FrameworkId::new());
        scope.included_requirement_ids = Some(BTreeSet::new());
        assert_eq!(resolve_membership(&units, Some(&scope)).len(), 2);
    }

    #[test]
    fn exclude_set_subtracts_from_all() {
        let units = vec![unit("CC"), unit("A"), unit("C")];
        let mut scope = record(FrameworkId::new());
        scope.excluded_requirement_ids = Some([units[2].id].into_iter().collect());
        let members = resolve_membership(&units, Some(&scope));
        assert_eq!(members, [units[0].id, units[1].id].into_iter().collect());
    }

    // ── Phase transitions ────────────────────────────────────────────

    #[test]
    fn pending_settles_once() {
        let mut rec = ToggleRecord::pending(RequirementId::new(), false, BTreeSet::new());
        rec.settle(TogglePhase::Committed).unwrap();
        assert_eq!(rec.phase, TogglePhase::Committed);
        assert!(matches!(
            rec.settle(TogglePhase::RolledBack),
            Err(ScopeError::InvalidPhaseTransition { .. })
        ));
    }

    #[test]
    fn pending_cannot_settle_to_pending() {
        let mut rec = ToggleRecord::pending(RequirementId::new(), false, BTreeSet::new());
        assert!(rec.settle(TogglePhase::Pending).is_err());
        assert_eq!(rec.phase, TogglePhase::Pending);
    }

    #[test]
    fn phase_display_is_screaming_case() {
        assert_eq!(TogglePhase::RolledBack.to_string(), "ROLLED_BACK");
    }
}
