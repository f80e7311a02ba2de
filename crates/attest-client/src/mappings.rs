//! Typed client for evidence-to-requirement mappings.
//!
//! Mappings are generated by the collaborator and approved by a reviewer;
//! only `is_approved` matters to workflow progress.

use attest_core::{ActorId, AssessmentId, RequirementId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::transport::Transport;

/// A mapping from a control to a framework requirement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlMapping {
    pub id: Uuid,
    pub control_id: Uuid,
    pub subcategory_id: RequirementId,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default)]
    pub approved_by_id: Option<Uuid>,
    #[serde(default, deserialize_with = "crate::timestamp::optional")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subcategory_code: Option<String>,
    #[serde(default)]
    pub control_name: Option<String>,
}

/// A mapping from a policy to a framework requirement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyMapping {
    pub id: Uuid,
    pub policy_id: Uuid,
    pub subcategory_id: RequirementId,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default)]
    pub approved_by_id: Option<Uuid>,
    #[serde(default, deserialize_with = "crate::timestamp::optional")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subcategory_code: Option<String>,
    #[serde(default)]
    pub policy_name: Option<String>,
}

/// Client for the mapping resources.
#[derive(Debug, Clone)]
pub struct MappingClient {
    transport: Transport,
}

impl MappingClient {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// `GET /mappings/assessments/{id}/controls`
    pub async fn controls(
        &self,
        assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<Vec<ControlMapping>, ApiError> {
        self.transport
            .get_json(&format!("/mappings/assessments/{assessment}/controls"), actor)
            .await
    }

    /// `GET /mappings/assessments/{id}/policies`
    pub async fn policies(
        &self,
        assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<Vec<PolicyMapping>, ApiError> {
        self.transport
            .get_json(&format!("/mappings/assessments/{assessment}/policies"), actor)
            .await
    }
}
