//! In-memory collaborator double shared by the workflow integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use attest_client::evidence::{Control, Policy};
use attest_client::frameworks::{
    Framework, FrameworkStats, FrameworkType, HierarchyNode, ScopeRecord, ScopeUpdate,
};
use attest_client::interviews::{InterviewSession, SessionStatus};
use attest_client::mappings::{ControlMapping, PolicyMapping};
use attest_client::reports::{Report, ReportList};
use attest_client::scores::ScoreSummary;
use attest_client::{ApiError, CollaboratorGateway};
use attest_core::{ActorId, AssessmentId, FrameworkId, ReportId, RequirementId, SessionId};
use uuid::Uuid;

#[derive(Default)]
pub struct FakeState {
    pub scope: Vec<ScopeRecord>,
    pub controls: Vec<Control>,
    pub policies: Vec<Policy>,
    pub control_mappings: Vec<ControlMapping>,
    pub policy_mappings: Vec<PolicyMapping>,
    pub sessions: Vec<InterviewSession>,
    pub score: Option<ScoreSummary>,
    pub reports: ReportList,
    pub units: Vec<HierarchyNode>,
    pub frameworks: Vec<Framework>,
    pub stats: BTreeMap<FrameworkId, FrameworkStats>,
    /// Operations that answer 503.
    pub failing: HashSet<&'static str>,
    /// Delays applied to successive scope reads.
    pub scope_read_delays: VecDeque<Duration>,
    pub write_delay: Option<Duration>,
    pub writes: Vec<ScopeUpdate>,
    pub removals: Vec<FrameworkId>,
    pub calls: Vec<&'static str>,
    pub actors: Vec<Option<ActorId>>,
}

#[derive(Default)]
pub struct FakeGateway {
    pub state: Mutex<FakeState>,
}

impl FakeGateway {
    pub fn new(state: FakeState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    fn enter(&self, op: &'static str, actor: Option<&ActorId>) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(op);
        state.actors.push(actor.copied());
        if state.failing.contains(op) {
            return Err(ApiError::status(op, 503, "service unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl CollaboratorGateway for FakeGateway {
    async fn get_assessment_scope(
        &self,
        _assessment: &AssessmentId,
    ) -> Result<Vec<ScopeRecord>, ApiError> {
        self.enter("get_assessment_scope", None)?;
        let delay = self.with(|s| s.scope_read_delays.pop_front());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.with(|s| s.scope.clone()))
    }

    async fn set_assessment_scope(
        &self,
        _assessment: &AssessmentId,
        update: &ScopeUpdate,
    ) -> Result<ScopeRecord, ApiError> {
        let delay = self.with(|s| s.write_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.enter("set_assessment_scope", None)?;
        Ok(self.with(|s| {
            s.writes.push(update.clone());
            let record = ScopeRecord {
                id: Some(Uuid::new_v4()),
                framework_id: update.framework_id,
                framework_code: None,
                include_all: update.include_all,
                excluded_requirement_ids: update.excluded_requirement_ids.clone(),
                included_requirement_ids: update.included_requirement_ids.clone(),
            };
            s.scope.retain(|r| r.framework_id != update.framework_id);
            s.scope.push(record.clone());
            record
        }))
    }

    async fn remove_assessment_scope(
        &self,
        _assessment: &AssessmentId,
        framework: &FrameworkId,
    ) -> Result<(), ApiError> {
        self.enter("remove_assessment_scope", None)?;
        self.with(|s| {
            s.scope.retain(|r| r.framework_id != *framework);
            s.removals.push(*framework);
        });
        Ok(())
    }

    async fn get_framework_hierarchy(
        &self,
        _framework: &FrameworkId,
        _max_depth: Option<u32>,
    ) -> Result<Vec<HierarchyNode>, ApiError> {
        self.enter("get_framework_hierarchy", None)?;
        Ok(self.with(|s| s.units.clone()))
    }

    async fn list_frameworks(&self) -> Result<Vec<Framework>, ApiError> {
        self.enter("list_frameworks", None)?;
        Ok(self.with(|s| s.frameworks.clone()))
    }

    async fn get_framework_stats(
        &self,
        framework: &FrameworkId,
    ) -> Result<FrameworkStats, ApiError> {
        self.enter("get_framework_stats", None)?;
        self.with(|s| s.stats.get(framework).cloned())
            .ok_or_else(|| ApiError::status("get_framework_stats", 404, "not found"))
    }

    async fn list_controls(
        &self,
        _assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<Vec<Control>, ApiError> {
        self.enter("list_controls", actor)?;
        Ok(self.with(|s| s.controls.clone()))
    }

    async fn list_policies(
        &self,
        _assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<Vec<Policy>, ApiError> {
        self.enter("list_policies", actor)?;
        Ok(self.with(|s| s.policies.clone()))
    }

    async fn list_control_mappings(
        &self,
        _assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<Vec<ControlMapping>, ApiError> {
        self.enter("list_control_mappings", actor)?;
        Ok(self.with(|s| s.control_mappings.clone()))
    }

    async fn list_policy_mappings(
        &self,
        _assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<Vec<PolicyMapping>, ApiError> {
        self.enter("list_policy_mappings", actor)?;
        Ok(self.with(|s| s.policy_mappings.clone()))
    }

    async fn list_sessions(
        &self,
        _assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<Vec<InterviewSession>, ApiError> {
        self.enter("list_sessions", actor)?;
        Ok(self.with(|s| s.sessions.clone()))
    }

    async fn get_score_summary(
        &self,
        _assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<ScoreSummary, ApiError> {
        self.enter("get_score_summary", actor)?;
        self.with(|s| s.score.clone())
            .ok_or_else(|| ApiError::status("get_score_summary", 404, "No scores calculated"))
    }

    async fn list_reports(
        &self,
        _assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<ReportList, ApiError> {
        self.enter("list_reports", actor)?;
        Ok(self.with(|s| s.reports.clone()))
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────

pub fn control(assessment: AssessmentId) -> Control {
    Control {
        id: Uuid::new_v4(),
        assessment_id: assessment,
        identifier: Some("AC-1".into()),
        name: "Access reviews".into(),
        description: None,
        owner: None,
        control_type: None,
        implementation_status: None,
    }
}

pub fn policy(assessment: AssessmentId) -> Policy {
    Policy {
        id: Uuid::new_v4(),
        assessment_id: assessment,
        name: "Information Security Policy".into(),
        description: None,
        version: Some("1.0".into()),
        owner: None,
        file_path: None,
    }
}

pub fn control_mapping(approved: bool) -> ControlMapping {
    ControlMapping {
        id: Uuid::new_v4(),
        control_id: Uuid::new_v4(),
        subcategory_id: RequirementId::new(),
        confidence_score: Some(0.8),
        is_approved: approved,
        approved_by_id: None,
        approved_at: None,
        subcategory_code: None,
        control_name: None,
    }
}

pub fn policy_mapping(approved: bool) -> PolicyMapping {
    PolicyMapping {
        id: Uuid::new_v4(),
        policy_id: Uuid::new_v4(),
        subcategory_id: RequirementId::new(),
        confidence_score: None,
        is_approved: approved,
        approved_by_id: None,
        approved_at: None,
        subcategory_code: None,
        policy_name: None,
    }
}

pub fn session(assessment: AssessmentId, status: SessionStatus) -> InterviewSession {
    InterviewSession {
        id: SessionId::new(),
        assessment_id: assessment,
        title: None,
        status,
        started_at: None,
        completed_at: None,
    }
}

pub fn score(assessment: AssessmentId, overall: f64) -> ScoreSummary {
    ScoreSummary {
        assessment_id: assessment,
        overall_maturity: overall,
        function_scores: Vec::new(),
        category_scores: None,
        calculated_at: None,
    }
}

pub fn reports(assessment: AssessmentId, n: usize) -> ReportList {
    let items: Vec<Report> = (0..n)
        .map(|i| Report {
            id: ReportId::new(),
            assessment_id: assessment,
            report_type: "executive_summary".into(),
            title: format!("Report {i}"),
            generated_at: None,
            generated_by_id: None,
            version: 1,
            is_final: false,
        })
        .collect();
    ReportList {
        total: items.len() as u64,
        items,
    }
}

pub fn scope_record(framework: FrameworkId, include_all: bool) -> ScopeRecord {
    ScopeRecord {
        id: Some(Uuid::new_v4()),
        framework_id: framework,
        framework_code: None,
        include_all,
        excluded_requirement_ids: None,
        included_requirement_ids: None,
    }
}

pub fn unit_node(code: &str, name: &str) -> HierarchyNode {
    HierarchyNode {
        id: RequirementId::new(),
        code: code.into(),
        name: name.into(),
        description: None,
        level: 0,
        is_assessable: false,
        parent_id: None,
        display_order: 0,
        children: Vec::new(),
    }
}

/// The five SOC 2 trust-service categories.
pub fn soc2_units() -> Vec<HierarchyNode> {
    vec![
        unit_node("CC", "Security"),
        unit_node("A", "Availability"),
        unit_node("PI", "Processing Integrity"),
        unit_node("C", "Confidentiality"),
        unit_node("P", "Privacy"),
    ]
}

pub fn framework(code: &str, framework_type: FrameworkType) -> Framework {
    Framework {
        id: FrameworkId::new(),
        code: code.into(),
        name: code.into(),
        version: None,
        description: None,
        framework_type,
        is_active: true,
    }
}

pub fn stats(framework: FrameworkId, total: u32) -> FrameworkStats {
    FrameworkStats {
        framework_id: framework,
        framework_code: None,
        framework_name: None,
        total_requirements: total,
        assessable_requirements: total,
        requirements_by_level: BTreeMap::new(),
    }
}
