//! Typed client for assessment evidence: controls and policies.
//!
//! ## Paths
//!
//! | Method | Path |
//! |--------|------|
//! | GET    | `/assessments/{assessmentId}/controls` |
//! | GET    | `/assessments/{assessmentId}/policies` |

use attest_core::{ActorId, AssessmentId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::transport::Transport;

/// A security control uploaded as evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Control {
    pub id: Uuid,
    pub assessment_id: AssessmentId,
    #[serde(default)]
    pub identifier: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub control_type: Option<String>,
    #[serde(default)]
    pub implementation_status: Option<String>,
}

/// A policy document uploaded as evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    pub id: Uuid,
    pub assessment_id: AssessmentId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Client for the evidence resources.
#[derive(Debug, Clone)]
pub struct EvidenceClient {
    transport: Transport,
}

impl EvidenceClient {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Controls registered for an assessment.
    pub async fn controls(
        &self,
        assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<Vec<Control>, ApiError> {
        self.transport
            .get_json(&format!("/assessments/{assessment}/controls"), actor)
            .await
    }

    /// Policies registered for an assessment.
    pub async fn policies(
        &self,
        assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<Vec<Policy>, ApiError> {
        self.transport
            .get_json(&format!("/assessments/{assessment}/policies"), actor)
            .await
    }
}
