//! Typed client for interview sessions.

use attest_core::{ActorId, AssessmentId, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::transport::Transport;

/// Lifecycle status of an interview session.
///
/// The API emits lowercase values; uppercase spellings seen from older
/// deployments are accepted too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[serde(alias = "NOT_STARTED")]
    NotStarted,
    #[serde(alias = "IN_PROGRESS")]
    InProgress,
    #[serde(alias = "PAUSED")]
    Paused,
    #[serde(alias = "COMPLETED")]
    Completed,
    #[serde(alias = "CANCELLED")]
    Cancelled,
    /// Forward-compatible catch-all.
    #[serde(other)]
    Unknown,
}

impl SessionStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// An interview session held as part of an assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSession {
    pub id: SessionId,
    pub assessment_id: AssessmentId,
    #[serde(default)]
    pub title: Option<String>,
    pub status: SessionStatus,
    #[serde(default, deserialize_with = "crate::timestamp::optional")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "crate::timestamp::optional")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Client for the interview resources.
#[derive(Debug, Clone)]
pub struct InterviewClient {
    transport: Transport,
}

impl InterviewClient {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Sessions of an assessment, in any status.
    ///
    /// Calls `GET {base}/interviews/assessments/{id}/sessions`.
    pub async fn sessions(
        &self,
        assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<Vec<InterviewSession>, ApiError> {
        self.transport
            .get_json(&format!("/interviews/assessments/{assessment}/sessions"), actor)
            .await
    }
}
