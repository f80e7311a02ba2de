//! The collaborator seam used by workflow code.
//!
//! Workflow logic depends on [`CollaboratorGateway`] rather than on
//! [`ApiClient`] directly, so engines and composers can run against an
//! in-memory double in tests.

use async_trait::async_trait;
use attest_core::{ActorId, AssessmentId, FrameworkId};

use crate::error::ApiError;
use crate::evidence::{Control, Policy};
use crate::frameworks::{Framework, FrameworkStats, HierarchyNode, ScopeRecord, ScopeUpdate};
use crate::interviews::InterviewSession;
use crate::mappings::{ControlMapping, PolicyMapping};
use crate::reports::ReportList;
use crate::scores::ScoreSummary;
use crate::ApiClient;

/// Every collaborator operation the workflow layer performs.
#[async_trait]
pub trait CollaboratorGateway: Send + Sync {
    async fn get_assessment_scope(
        &self,
        assessment: &AssessmentId,
    ) -> Result<Vec<ScopeRecord>, ApiError>;

    async fn set_assessment_scope(
        &self,
        assessment: &AssessmentId,
        update: &ScopeUpdate,
    ) -> Result<ScopeRecord, ApiError>;

    async fn remove_assessment_scope(
        &self,
        assessment: &AssessmentId,
        framework: &FrameworkId,
    ) -> Result<(), ApiError>;

    async fn get_framework_hierarchy(
        &self,
        framework: &FrameworkId,
        max_depth: Option<u32>,
    ) -> Result<Vec<HierarchyNode>, ApiError>;

    async fn list_frameworks(&self) -> Result<Vec<Framework>, ApiError>;

    async fn get_framework_stats(&self, framework: &FrameworkId)
        -> Result<FrameworkStats, ApiError>;

    async fn list_controls(
        &self,
        assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<Vec<Control>, ApiError>;

    async fn list_policies(
        &self,
        assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<Vec<Policy>, ApiError>;

    async fn list_control_mappings(
        &self,
        assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<Vec<ControlMapping>, ApiError>;

    async fn list_policy_mappings(
        &self,
        assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<Vec<PolicyMapping>, ApiError>;

    async fn list_sessions(
        &self,
        assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<Vec<InterviewSession>, ApiError>;

    /// `NotFound` means the assessment has not been scored yet.
    async fn get_score_summary(
        &self,
        assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<ScoreSummary, ApiError>;

    async fn list_reports(
        &self,
        assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<ReportList, ApiError>;
}

#[async_trait]
impl CollaboratorGateway for ApiClient {
    async fn get_assessment_scope(
        &self,
        assessment: &AssessmentId,
    ) -> Result<Vec<ScopeRecord>, ApiError> {
        self.frameworks().scope(assessment).await
    }

    async fn set_assessment_scope(
        &self,
        assessment: &AssessmentId,
        update: &ScopeUpdate,
    ) -> Result<ScopeRecord, ApiError> {
        self.frameworks().set_scope(assessment, update).await
    }

    async fn remove_assessment_scope(
        &self,
        assessment: &AssessmentId,
        framework: &FrameworkId,
    ) -> Result<(), ApiError> {
        self.frameworks().remove_scope(assessment, framework).await
    }

    async fn get_framework_hierarchy(
        &self,
        framework: &FrameworkId,
        max_depth: Option<u32>,
    ) -> Result<Vec<HierarchyNode>, ApiError> {
        self.frameworks().hierarchy(framework, max_depth).await
    }

    async fn list_frameworks(&self) -> Result<Vec<Framework>, ApiError> {
        self.frameworks().list().await
    }

    async fn get_framework_stats(
        &self,
        framework: &FrameworkId,
    ) -> Result<FrameworkStats, ApiError> {
        self.frameworks().stats(framework).await
    }

    async fn list_controls(
        &self,
        assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<Vec<Control>, ApiError> {
        self.evidence().controls(assessment, actor).await
    }

    async fn list_policies(
        &self,
        assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<Vec<Policy>, ApiError> {
        self.evidence().policies(assessment, actor).await
    }

    async fn list_control_mappings(
        &self,
        assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<Vec<ControlMapping>, ApiError> {
        self.mappings().controls(assessment, actor).await
    }

    async fn list_policy_mappings(
        &self,
        assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<Vec<PolicyMapping>, ApiError> {
        self.mappings().policies(assessment, actor).await
    }

    async fn list_sessions(
        &self,
        assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<Vec<InterviewSession>, ApiError> {
        self.interviews().sessions(assessment, actor).await
    }

    async fn get_score_summary(
        &self,
        assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<ScoreSummary, ApiError> {
        self.scores().summary(assessment, actor).await
    }

    async fn list_reports(
        &self,
        assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<ReportList, ApiError> {
        self.reports().list(assessment, actor).await
    }
}
