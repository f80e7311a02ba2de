//! Per-framework coverage of an assessment.
//!
//! For each framework in scope: its requirement counts and, when the caller
//! has one, a maturity score mapped onto the five maturity bands.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use attest_client::frameworks::{Framework, FrameworkStats};
use attest_client::CollaboratorGateway;
use attest_core::{AssessmentId, FrameworkId};
use serde::{Deserialize, Serialize};

/// Upper end of the maturity scale.
pub const MAX_MATURITY: f64 = 4.0;

/// Maturity band of a 0–4 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaturityBand {
    Initial,
    Developing,
    Defined,
    Managed,
    Optimized,
}

impl MaturityBand {
    /// Band for `score` on the 0–4 scale.
    pub fn from_score(score: f64) -> Self {
        let percent = percent_of_max(score);
        if percent < 25.0 {
            Self::Initial
        } else if percent < 50.0 {
            Self::Developing
        } else if percent < 75.0 {
            Self::Defined
        } else if percent < 90.0 {
            Self::Managed
        } else {
            Self::Optimized
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Initial => "Initial",
            Self::Developing => "Developing",
            Self::Defined => "Defined",
            Self::Managed => "Managed",
            Self::Optimized => "Optimized",
        }
    }
}

impl std::fmt::Display for MaturityBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// `score` as a percentage of [`MAX_MATURITY`].
pub fn percent_of_max(score: f64) -> f64 {
    score / MAX_MATURITY * 100.0
}

/// Coverage of one framework in scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkCoverage {
    pub framework_id: FrameworkId,
    pub code: String,
    pub name: String,
    pub stats: Option<FrameworkStats>,
    pub score: Option<f64>,
    pub percent: Option<f64>,
    pub band: Option<MaturityBand>,
}

impl FrameworkCoverage {
    fn new(framework: &Framework, stats: Option<FrameworkStats>, score: Option<f64>) -> Self {
        Self {
            framework_id: framework.id,
            code: framework.code.clone(),
            name: framework.name.clone(),
            stats,
            score,
            percent: score.map(percent_of_max),
            band: score.map(MaturityBand::from_score),
        }
    }
}

/// Coverage of every framework in `assessment`'s scope, in catalogue order.
///
/// `scores` supplies a 0–4 score per framework where one is known. A failed
/// scope or catalogue call yields no coverage; a failed stats call leaves
/// that framework's `stats` empty.
pub async fn framework_coverage(
    gateway: Arc<dyn CollaboratorGateway>,
    assessment: &AssessmentId,
    scores: &BTreeMap<FrameworkId, f64>,
) -> Vec<FrameworkCoverage> {
    let (scope, catalogue) = tokio::join!(
        gateway.get_assessment_scope(assessment),
        gateway.list_frameworks(),
    );
    let (scope, catalogue) = match (scope, catalogue) {
        (Ok(scope), Ok(catalogue)) => (scope, catalogue),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(
                assessment = %assessment,
                kind = %e.kind(),
                error = %e,
                "cannot load framework coverage"
            );
            return Vec::new();
        }
    };

    let in_scope: BTreeSet<FrameworkId> = scope.iter().map(|r| r.framework_id).collect();
    let frameworks: Vec<Framework> = catalogue
        .into_iter()
        .filter(|f| in_scope.contains(&f.id))
        .collect();

    let stats = futures::future::join_all(frameworks.iter().map(|f| {
        let gateway = gateway.clone();
        let id = f.id;
        async move {
            match gateway.get_framework_stats(&id).await {
                Ok(stats) => Some(stats),
                Err(e) => {
                    tracing::warn!(framework = %id, error = %e, "framework stats unavailable");
                    None
                }
            }
        }
    }))
    .await;

    frameworks
        .iter()
        .zip(stats)
        .map(|(f, stats)| FrameworkCoverage::new(f, stats, scores.get(&f.id).copied()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries() {
        assert_eq!(MaturityBand::from_score(0.0), MaturityBand::Initial);
        assert_eq!(MaturityBand::from_score(0.99), MaturityBand::Initial);
        assert_eq!(MaturityBand::from_score(1.0), MaturityBand::Developing);
        assert_eq!(MaturityBand::from_score(2.0), MaturityBand::Defined);
        assert_eq!(MaturityBand::from_score(3.0), MaturityBand::Managed);
        assert_eq!(MaturityBand::from_score(3.59), MaturityBand::Managed);
        assert_eq!(MaturityBand::from_score(3.6), MaturityBand::Optimized);
        assert_eq!(MaturityBand::from_score(4.0), MaturityBand::Optimized);
    }

    #[test]
    fn percent_scales_to_one_hundred() {
        assert!((percent_of_max(2.0) - 50.0).abs() < f64::EPSILON);
        assert!((percent_of_max(4.0) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn band_labels_render() {
        assert_eq!(MaturityBand::Developing.to_string(), "Developing");
    }
}
