//! # Coverage Subcommand
//!
//! Requirement counts and maturity band for every framework in an
//! assessment's scope.

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::Result;
use clap::Args;

use attest_core::{AssessmentId, FrameworkId};
use attest_workflow::framework_coverage;

use crate::render::{render_coverage, to_json, OutputFormat};
use crate::Session;

/// Arguments for the `attest coverage` subcommand.
#[derive(Args, Debug)]
pub struct CoverageArgs {
    /// Assessment identifier (UUID).
    pub assessment: AssessmentId,
}

/// Execute the coverage subcommand.
pub async fn run_coverage(args: &CoverageArgs, session: &Session, out: &mut impl Write) -> Result<u8> {
    let scores = maturity_by_framework(session, &args.assessment).await;
    let items = framework_coverage(session.gateway.clone(), &args.assessment, &scores).await;

    match session.format {
        OutputFormat::Text => writeln!(out, "{}", render_coverage(&items))?,
        OutputFormat::Json => writeln!(out, "{}", to_json(&items)?)?,
    }
    Ok(0)
}

/// The assessment's overall maturity, attributed to each framework in
/// scope. Empty when the assessment has not been scored.
async fn maturity_by_framework(
    session: &Session,
    assessment: &AssessmentId,
) -> BTreeMap<FrameworkId, f64> {
    let (summary, scope) = tokio::join!(
        session
            .gateway
            .get_score_summary(assessment, session.actor.as_ref()),
        session.gateway.get_assessment_scope(assessment),
    );

    let summary = match summary {
        Ok(summary) => summary,
        Err(e) => {
            if !e.is_not_found() {
                tracing::warn!(assessment = %assessment, error = %e, "score summary unavailable");
            }
            return BTreeMap::new();
        }
    };
    scope
        .unwrap_or_default()
        .into_iter()
        .map(|record| (record.framework_id, summary.overall_maturity))
        .collect()
}
