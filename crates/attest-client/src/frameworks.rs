//! Typed client for the framework catalogue and assessment scope resources.
//!
//! ## Paths (relative to the API base)
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/frameworks` | List frameworks |
//! | GET    | `/frameworks/{frameworkId}/stats` | Requirement counts |
//! | GET    | `/frameworks/{frameworkId}/hierarchy?max_depth={n}` | Requirement tree |
//! | GET    | `/frameworks/assessments/{assessmentId}/scope` | Scope records |
//! | POST   | `/frameworks/assessments/{assessmentId}/scope` | Upsert one framework's scope |
//! | DELETE | `/frameworks/assessments/{assessmentId}/scope/{frameworkId}` | Remove a framework from scope |

use std::collections::{BTreeMap, BTreeSet};

use attest_core::{AssessmentId, FrameworkId, RequirementId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::transport::Transport;

// -- Typed enums matching API values -----------------------------------------

/// Framework family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameworkType {
    NistCsf,
    #[serde(rename = "iso_27001")]
    Iso27001,
    Soc2Tsc,
    Custom,
    /// Forward-compatible catch-all.
    #[serde(other)]
    Unknown,
}

// -- Request/Response types --------------------------------------------------

/// A framework in the catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Framework {
    pub id: FrameworkId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub framework_type: FrameworkType,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Requirement counts for one framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkStats {
    pub framework_id: FrameworkId,
    #[serde(default)]
    pub framework_code: Option<String>,
    #[serde(default)]
    pub framework_name: Option<String>,
    #[serde(default)]
    pub total_requirements: u32,
    #[serde(default)]
    pub assessable_requirements: u32,
    #[serde(default)]
    pub requirements_by_level: BTreeMap<String, u32>,
}

/// One node of a framework's requirement tree.
///
/// With `max_depth=0` only the top level is returned and `children` is empty;
/// those top-level nodes are the selectable units of a framework (SOC 2
/// trust-service categories, NIST CSF functions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub id: RequirementId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub is_assessable: bool,
    #[serde(default)]
    pub parent_id: Option<RequirementId>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub children: Vec<HierarchyNode>,
}

/// Persisted statement of which requirements of one framework are in an
/// assessment's scope.
///
/// `include_all = true` and an explicit `included_requirement_ids` set are
/// alternative representations; when `include_all` is false and no include
/// set is present, everything except `excluded_requirement_ids` is in scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeRecord {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub framework_id: FrameworkId,
    #[serde(default)]
    pub framework_code: Option<String>,
    #[serde(default)]
    pub include_all: bool,
    #[serde(default)]
    pub excluded_requirement_ids: Option<BTreeSet<RequirementId>>,
    #[serde(default)]
    pub included_requirement_ids: Option<BTreeSet<RequirementId>>,
}

/// Request body for `POST /frameworks/assessments/{id}/scope`.
///
/// Absent sets are omitted from the payload so the server clears them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeUpdate {
    pub framework_id: FrameworkId,
    pub include_all: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub included_requirement_ids: Option<BTreeSet<RequirementId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded_requirement_ids: Option<BTreeSet<RequirementId>>,
}

impl ScopeUpdate {
    /// Everything in the framework is in scope.
    pub fn include_all(framework_id: FrameworkId) -> Self {
        Self {
            framework_id,
            include_all: true,
            included_requirement_ids: None,
            excluded_requirement_ids: None,
        }
    }

    /// Exactly `included` is in scope.
    pub fn explicit(framework_id: FrameworkId, included: BTreeSet<RequirementId>) -> Self {
        Self {
            framework_id,
            include_all: false,
            included_requirement_ids: Some(included),
            excluded_requirement_ids: None,
        }
    }
}

// -- Client ------------------------------------------------------------------

/// Client for the framework and scope resources.
#[derive(Debug, Clone)]
pub struct FrameworkClient {
    transport: Transport,
}

impl FrameworkClient {
    pub(crate) fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// List the framework catalogue.
    ///
    /// Calls `GET {base}/frameworks`.
    pub async fn list(&self) -> Result<Vec<Framework>, ApiError> {
        self.transport.get_json("/frameworks", None).await
    }

    /// Requirement counts for one framework.
    ///
    /// Calls `GET {base}/frameworks/{id}/stats`.
    pub async fn stats(&self, framework: &FrameworkId) -> Result<FrameworkStats, ApiError> {
        self.transport
            .get_json(&format!("/frameworks/{framework}/stats"), None)
            .await
    }

    /// Requirement tree of a framework, optionally truncated at `max_depth`.
    ///
    /// Calls `GET {base}/frameworks/{id}/hierarchy[?max_depth=n]`.
    pub async fn hierarchy(
        &self,
        framework: &FrameworkId,
        max_depth: Option<u32>,
    ) -> Result<Vec<HierarchyNode>, ApiError> {
        let path = match max_depth {
            Some(depth) => format!("/frameworks/{framework}/hierarchy?max_depth={depth}"),
            None => format!("/frameworks/{framework}/hierarchy"),
        };
        self.transport.get_json(&path, None).await
    }

    /// All scope records of an assessment, one per framework in scope.
    ///
    /// Calls `GET {base}/frameworks/assessments/{id}/scope`.
    pub async fn scope(&self, assessment: &AssessmentId) -> Result<Vec<ScopeRecord>, ApiError> {
        self.transport
            .get_json(&format!("/frameworks/assessments/{assessment}/scope"), None)
            .await
    }

    /// Create or replace one framework's scope record.
    ///
    /// Calls `POST {base}/frameworks/assessments/{id}/scope`.
    pub async fn set_scope(
        &self,
        assessment: &AssessmentId,
        update: &ScopeUpdate,
    ) -> Result<ScopeRecord, ApiError> {
        self.transport
            .post_json(
                &format!("/frameworks/assessments/{assessment}/scope"),
                update,
                None,
            )
            .await
    }

    /// Remove a framework from an assessment's scope.
    ///
    /// Calls `DELETE {base}/frameworks/assessments/{id}/scope/{frameworkId}`.
    pub async fn remove_scope(
        &self,
        assessment: &AssessmentId,
        framework: &FrameworkId,
    ) -> Result<(), ApiError> {
        self.transport
            .delete(
                &format!("/frameworks/assessments/{assessment}/scope/{framework}"),
                None,
            )
            .await
    }
}
