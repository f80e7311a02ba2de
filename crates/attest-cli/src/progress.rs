//! # Progress Subcommand
//!
//! Derives the seven-stage workflow state of one assessment and prints the
//! step bar with the recommended next stage. `--watch` keeps re-deriving
//! until the workflow is finished or the user interrupts.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use attest_core::AssessmentId;
use attest_workflow::{ProgressEngine, ProgressView, RefreshOutcome, WorkflowProgress};

use crate::render::{render_progress, to_json, OutputFormat};
use crate::Session;

/// Arguments for the `attest progress` subcommand.
#[derive(Args, Debug)]
pub struct ProgressArgs {
    /// Assessment identifier (UUID).
    pub assessment: String,

    /// Re-derive every N seconds until every stage is complete.
    #[arg(long, value_name = "SECS")]
    pub watch: Option<u64>,
}

/// Execute the progress subcommand.
pub async fn run_progress(args: &ProgressArgs, session: &Session, out: &mut impl Write) -> Result<u8> {
    let engine = ProgressEngine::new(session.gateway.clone());

    let Some(interval) = args.watch else {
        let progress = engine
            .evaluate(&args.assessment, session.actor.as_ref())
            .await;
        print_progress(&progress, session.format, out)?;
        return Ok(0);
    };

    let assessment: AssessmentId = args
        .assessment
        .parse()
        .context("--watch needs a valid assessment id")?;
    watch(engine, assessment, session, Duration::from_secs(interval.max(1)), out).await
}

async fn watch(
    engine: ProgressEngine,
    assessment: AssessmentId,
    session: &Session,
    interval: Duration,
    out: &mut impl Write,
) -> Result<u8> {
    let view = ProgressView::new(engine, assessment, session.actor);
    let mut ticker = tokio::time::interval(interval);

    loop {
        let refreshed = tokio::select! {
            outcome = async {
                ticker.tick().await;
                view.refresh().await
            } => outcome,
            _ = tokio::signal::ctrl_c() => {
                view.teardown();
                tracing::debug!(assessment = %assessment, "watch interrupted");
                return Ok(0);
            }
        };

        if refreshed == RefreshOutcome::Discarded {
            continue;
        }
        if let Some(progress) = view.current() {
            print_progress(&progress, session.format, out)?;
            if progress.is_finished() {
                view.teardown();
                return Ok(0);
            }
        }
    }
}

fn print_progress(progress: &WorkflowProgress, format: OutputFormat, out: &mut impl Write) -> Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{}", render_progress(progress))?,
        OutputFormat::Json => writeln!(out, "{}", to_json(progress)?)?,
    }
    Ok(())
}
