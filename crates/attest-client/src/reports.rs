//! Typed client for generated assessment reports.

use attest_core::{ActorId, AssessmentId, ReportId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::transport::Transport;

/// A generated report. Content is not fetched by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub assessment_id: AssessmentId,
    pub report_type: String,
    pub title: String,
    #[serde(default, deserialize_with = "crate::timestamp::optional")]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub generated_by_id: Option<Uuid>,
    #[serde(default = "first_version")]
    pub version: u32,
    #[serde(default)]
    pub is_final: bool,
}

fn first_version() -> u32 {
    1
}

/// Page of reports, as returned by the list endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportList {
    #[serde(default)]
    pub items: Vec<Report>,
    #[serde(default)]
    pub total: u64,
}

impl ReportList {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Client for the report resources.
#[derive(Debug, Clone)]
pub struct ReportClient {
    transport: Transport,
}

impl ReportClient {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Calls `GET {base}/reports/assessments/{id}/list`.
    pub async fn list(
        &self,
        assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<ReportList, ApiError> {
        self.transport
            .get_json(&format!("/reports/assessments/{assessment}/list"), actor)
            .await
    }
}
