//! Typed client for maturity score summaries.
//!
//! An assessment that has not been scored yet answers `404`; callers should
//! check [`ApiError::is_not_found`](crate::ApiError::is_not_found) rather than
//! treat it as a failure.

use attest_core::{ActorId, AssessmentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::transport::Transport;

/// Score of one framework function (e.g. NIST CSF `PR`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionScore {
    #[serde(default)]
    pub function_code: Option<String>,
    #[serde(default)]
    pub function_name: Option<String>,
    pub score: f64,
}

/// Score of one framework category (e.g. NIST CSF `PR.AC`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    #[serde(default)]
    pub category_code: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    pub score: f64,
}

/// Calculated maturity for an assessment, on a 0–4 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub assessment_id: AssessmentId,
    pub overall_maturity: f64,
    #[serde(default)]
    pub function_scores: Vec<FunctionScore>,
    /// `None` when the summary was computed without category detail.
    #[serde(default)]
    pub category_scores: Option<Vec<CategoryScore>>,
    #[serde(default, deserialize_with = "crate::timestamp::optional")]
    pub calculated_at: Option<DateTime<Utc>>,
}

/// Client for the score resources.
#[derive(Debug, Clone)]
pub struct ScoreClient {
    transport: Transport,
}

impl ScoreClient {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Calls `GET {base}/scores/assessments/{id}/summary`.
    pub async fn summary(
        &self,
        assessment: &AssessmentId,
        actor: Option<&ActorId>,
    ) -> Result<ScoreSummary, ApiError> {
        self.transport
            .get_json(&format!("/scores/assessments/{assessment}/summary"), actor)
            .await
    }
}
