//! # Assessment Workflow Progress
//!
//! An assessment moves through seven stages in a fixed order:
//!
//! ```text
//! SCOPE → EVIDENCE → MAPPINGS → INTERVIEWS → SCORING → REVIEW → REPORT
//! ```
//!
//! Stage status is never stored. It is derived on demand from whatever the
//! collaborator API currently holds for the assessment, so the derivation is
//! split in two:
//!
//! - [`ProgressEngine::gather`] fans out to every collaborator at once and
//!   reduces the answers to [`ProgressSignals`]. A failed call contributes
//!   nothing; it never aborts the others.
//! - [`derive_steps`] is a pure function from signals to the ordered step
//!   list, and [`next_step`] picks the first stage that is not complete.

use std::sync::Arc;

use attest_client::{ApiError, CollaboratorGateway};
use attest_core::{ActorId, AssessmentId, ErrorKind};
use serde::{Deserialize, Serialize};

// ── Stages ───────────────────────────────────────────────────────────

/// One stage of the assessment workflow. Declaration order is workflow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Scope,
    Evidence,
    Mappings,
    Interviews,
    Scoring,
    Review,
    Report,
}

impl Stage {
    /// Every stage, in workflow order.
    pub const ALL: [Stage; 7] = [
        Stage::Scope,
        Stage::Evidence,
        Stage::Mappings,
        Stage::Interviews,
        Stage::Scoring,
        Stage::Review,
        Stage::Report,
    ];

    /// Stable identifier, as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scope => "scope",
            Self::Evidence => "evidence",
            Self::Mappings => "mappings",
            Self::Interviews => "interviews",
            Self::Scoring => "scoring",
            Self::Review => "review",
            Self::Report => "report",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Scope => "Scope",
            Self::Evidence => "Evidence",
            Self::Mappings => "Mappings",
            Self::Interviews => "Interviews",
            Self::Scoring => "Scoring",
            Self::Review => "Review",
            Self::Report => "Report",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Scope => "Select compliance frameworks",
            Self::Evidence => "Upload controls & policies",
            Self::Mappings => "Map evidence to requirements",
            Self::Interviews => "Conduct assessment interviews",
            Self::Scoring => "Calculate maturity scores",
            Self::Review => "Review deviations & gaps",
            Self::Report => "Generate assessment report",
        }
    }

    /// The assessment page where work on this stage happens.
    pub fn page(&self) -> &'static str {
        match self {
            Self::Scope => "scope",
            Self::Evidence => "controls",
            Self::Mappings => "mappings",
            Self::Interviews => "interviews",
            Self::Scoring => "scores",
            Self::Review => "deviations",
            Self::Report => "reports",
        }
    }

    /// Navigation target for this stage of `assessment`.
    pub fn target(&self, assessment: &AssessmentId) -> String {
        format!("/assessments/{assessment}/{}", self.page())
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived status of one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    NotStarted,
    InProgress,
    Complete,
}

impl StepStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NotStarted => "NOT_STARTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Complete => "COMPLETE",
        };
        f.write_str(s)
    }
}

/// A stage together with its derived status and presentation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub id: Stage,
    pub status: StepStatus,
    pub label: String,
    pub description: String,
    pub target: String,
}

// ── Signals ──────────────────────────────────────────────────────────

/// Counts distilled from the collaborator answers. A failed call leaves its
/// counts at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSignals {
    pub scope_records: usize,
    pub controls: usize,
    pub policies: usize,
    pub mappings: usize,
    pub approved_mappings: usize,
    pub sessions: usize,
    pub completed_sessions: usize,
    pub score_available: bool,
    pub reports: usize,
}

impl ProgressSignals {
    /// Status of `stage` under these signals.
    pub fn status_of(&self, stage: Stage) -> StepStatus {
        let (done, partial) = match stage {
            Stage::Scope => (self.scope_records > 0, false),
            Stage::Evidence => (
                self.controls > 0 && self.policies > 0,
                self.controls > 0 || self.policies > 0,
            ),
            Stage::Mappings => (self.approved_mappings > 0, self.mappings > 0),
            Stage::Interviews => (self.completed_sessions > 0, self.sessions > 0),
            // Review has no signal of its own and completes with scoring.
            Stage::Scoring | Stage::Review => (self.score_available, false),
            Stage::Report => (self.reports > 0, false),
        };

        if done {
            StepStatus::Complete
        } else if partial {
            StepStatus::InProgress
        } else {
            StepStatus::NotStarted
        }
    }
}

/// Build the ordered step list for `assessment` from `signals`.
pub fn derive_steps(assessment: &AssessmentId, signals: &ProgressSignals) -> Vec<WorkflowStep> {
    Stage::ALL
        .iter()
        .map(|stage| WorkflowStep {
            id: *stage,
            status: signals.status_of(*stage),
            label: stage.label().to_string(),
            description: stage.description().to_string(),
            target: stage.target(assessment),
        })
        .collect()
}

/// First step, in workflow order, that is not complete.
pub fn next_step(steps: &[WorkflowStep]) -> Option<&WorkflowStep> {
    steps.iter().find(|step| !step.status.is_complete())
}

/// Derived progress of one assessment.
///
/// An empty `steps` list means progress could not be determined at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowProgress {
    pub assessment_id: Option<AssessmentId>,
    pub steps: Vec<WorkflowStep>,
    pub next: Option<Stage>,
}

impl WorkflowProgress {
    pub fn from_signals(assessment: &AssessmentId, signals: &ProgressSignals) -> Self {
        let steps = derive_steps(assessment, signals);
        let next = next_step(&steps).map(|step| step.id);
        Self {
            assessment_id: Some(*assessment),
            steps,
            next,
        }
    }

    /// Progress that could not be determined.
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_unknown(&self) -> bool {
        self.steps.is_empty()
    }

    /// The recommended step, if any.
    pub fn next_step(&self) -> Option<&WorkflowStep> {
        let next = self.next?;
        self.steps.iter().find(|step| step.id == next)
    }

    pub fn is_finished(&self) -> bool {
        !self.is_unknown() && self.next.is_none()
    }
}

// ── Engine ───────────────────────────────────────────────────────────

/// Aggregates collaborator state into workflow progress.
#[derive(Clone)]
pub struct ProgressEngine {
    gateway: Arc<dyn CollaboratorGateway>,
}

impl std::fmt::Debug for ProgressEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressEngine").finish_non_exhaustive()
    }
}

impl ProgressEngine {
    pub fn new(gateway: Arc<dyn CollaboratorGateway>) -> Self {
        Self { gateway }
    }

    /// Query every collaborator concurrently and reduce the answers to
    /// signals. Returns only after all calls have settled.
    pub async fn gather(&self, assessment: &AssessmentId, actor: Option<&ActorId>) -> ProgressSignals {
        let gw = self.gateway.as_ref();

        let (scope, controls, policies, control_mappings, policy_mappings, sessions, score, reports) = tokio::join!(
            gw.get_assessment_scope(assessment),
            gw.list_controls(assessment, actor),
            gw.list_policies(assessment, actor),
            gw.list_control_mappings(assessment, actor),
            gw.list_policy_mappings(assessment, actor),
            gw.list_sessions(assessment, actor),
            gw.get_score_summary(assessment, actor),
            gw.list_reports(assessment, actor),
        );

        let scope = settle(assessment, "scope", scope).unwrap_or_default();
        let controls = settle(assessment, "controls", controls).unwrap_or_default();
        let policies = settle(assessment, "policies", policies).unwrap_or_default();
        let control_mappings =
            settle(assessment, "control_mappings", control_mappings).unwrap_or_default();
        let policy_mappings =
            settle(assessment, "policy_mappings", policy_mappings).unwrap_or_default();
        let sessions = settle(assessment, "sessions", sessions).unwrap_or_default();
        let score = settle(assessment, "score_summary", score);
        let reports = settle(assessment, "reports", reports).unwrap_or_default();

        ProgressSignals {
            scope_records: scope.len(),
            controls: controls.len(),
            policies: policies.len(),
            mappings: control_mappings.len() + policy_mappings.len(),
            approved_mappings: control_mappings.iter().filter(|m| m.is_approved).count()
                + policy_mappings.iter().filter(|m| m.is_approved).count(),
            sessions: sessions.len(),
            completed_sessions: sessions.iter().filter(|s| s.status.is_completed()).count(),
            score_available: score.is_some(),
            reports: reports.items.len(),
        }
    }

    /// Derive the progress of `assessment`.
    pub async fn progress(&self, assessment: &AssessmentId, actor: Option<&ActorId>) -> WorkflowProgress {
        let signals = self.gather(assessment, actor).await;
        let progress = WorkflowProgress::from_signals(assessment, &signals);
        tracing::debug!(
            assessment = %assessment,
            next = progress.next.map(|s| s.as_str()).unwrap_or("none"),
            ?signals,
            "workflow progress derived"
        );
        progress
    }

    /// Derive progress from an unvalidated assessment reference.
    ///
    /// A reference that is not a valid identifier yields
    /// [`WorkflowProgress::unknown`] without contacting any collaborator.
    pub async fn evaluate(&self, assessment: &str, actor: Option<&ActorId>) -> WorkflowProgress {
        match AssessmentId::parse(assessment) {
            Ok(id) => self.progress(&id, actor).await,
            Err(e) => {
                tracing::warn!(error = %e, "cannot derive workflow progress");
                WorkflowProgress::unknown()
            }
        }
    }
}

/// Downgrade a failed collaborator call to "no data", logging it.
///
/// `NotFound` is the expected answer for resources that do not exist yet
/// (an unscored assessment) and is logged at debug level only.
fn settle<T>(assessment: &AssessmentId, resource: &'static str, result: Result<T, ApiError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(assessment = %assessment, resource, "collaborator resource not found");
            None
        }
        Err(e) => {
            tracing::warn!(
                assessment = %assessment,
                resource,
                kind = %e.kind(),
                error = %e,
                "collaborator call failed; treating as empty"
            );
            None
        }
    }
}
