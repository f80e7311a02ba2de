//! # Scope Subcommand
//!
//! Shows and edits which top-level units of a framework an assessment
//! covers.
//!
//! ## Subcommands
//!
//! - `show`: List the framework's units and their selection.
//! - `toggle`: Flip one unit in or out of scope and persist the result.
//! - `remove`: Drop the framework from the assessment entirely.
//!
//! Frameworks are named by id or by catalogue code (`SOC2`, `nist-csf`).

use std::io::Write;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};

use attest_core::{AssessmentId, FrameworkId};
use attest_workflow::{MandatoryPolicy, ScopeComposer};

use crate::render::{render_scope, render_toggle, to_json, OutputFormat, ScopeSnapshot};
use crate::Session;

/// Arguments for the `attest scope` subcommand.
#[derive(Args, Debug)]
pub struct ScopeArgs {
    /// Unit code prefixes that always stay in scope.
    #[arg(long, value_delimiter = ',', default_value = "CC")]
    pub mandatory: Vec<String>,

    #[command(subcommand)]
    pub command: ScopeCommand,
}

/// Scope subcommands.
#[derive(Subcommand, Debug)]
pub enum ScopeCommand {
    /// Show which units of a framework are in scope.
    Show {
        /// Assessment identifier (UUID).
        assessment: AssessmentId,
        /// Framework id or code.
        framework: String,
    },

    /// Toggle one unit in or out of scope.
    Toggle {
        /// Assessment identifier (UUID).
        assessment: AssessmentId,
        /// Framework id or code.
        framework: String,
        /// Unit code, e.g. "A" or "PR".
        unit: String,
    },

    /// Remove the framework from the assessment's scope.
    Remove {
        /// Assessment identifier (UUID).
        assessment: AssessmentId,
        /// Framework id or code.
        framework: String,
    },
}

/// Execute the scope subcommand.
pub async fn run_scope(args: &ScopeArgs, session: &Session, out: &mut impl Write) -> Result<u8> {
    let policy = MandatoryPolicy::new(
        args.mandatory
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string),
    );

    match &args.command {
        ScopeCommand::Show {
            assessment,
            framework,
        } => {
            let composer = open(session, *assessment, framework, policy).await?;
            let snapshot = ScopeSnapshot::of(&composer);
            match session.format {
                OutputFormat::Text => writeln!(out, "{}", render_scope(&snapshot))?,
                OutputFormat::Json => writeln!(out, "{}", to_json(&snapshot)?)?,
            }
            Ok(0)
        }

        ScopeCommand::Toggle {
            assessment,
            framework,
            unit,
        } => {
            let composer = open(session, *assessment, framework, policy).await?;
            let Some(target) = composer.unit_by_code(unit) else {
                if composer.units().is_empty() {
                    bail!("framework {framework} has no selectable units");
                }
                bail!("framework {framework} has no unit {unit:?}");
            };
            let target = target.id;

            let outcome = composer.toggle(&target, unit).await?;
            let snapshot = ScopeSnapshot::of(&composer);
            match session.format {
                OutputFormat::Text => writeln!(out, "{}", render_toggle(&outcome, &snapshot))?,
                OutputFormat::Json => writeln!(out, "{}", to_json(&outcome)?)?,
            }
            Ok(0)
        }

        ScopeCommand::Remove {
            assessment,
            framework,
        } => {
            let composer = open(session, *assessment, framework, policy).await?;
            composer
                .remove()
                .await
                .with_context(|| format!("failed to remove {framework} from scope"))?;
            writeln!(out, "OK: removed {framework} from assessment {assessment}")?;
            Ok(0)
        }
    }
}

async fn open(
    session: &Session,
    assessment: AssessmentId,
    framework: &str,
    policy: MandatoryPolicy,
) -> Result<ScopeComposer> {
    let framework_id = resolve_framework(session, framework).await?;
    let composer =
        ScopeComposer::load_current(session.gateway.clone(), assessment, framework_id, policy)
            .await?;
    Ok(composer)
}

/// Resolve a framework given by id or by catalogue code.
pub async fn resolve_framework(session: &Session, raw: &str) -> Result<FrameworkId> {
    if let Ok(id) = raw.parse::<FrameworkId>() {
        return Ok(id);
    }
    let catalogue = session
        .gateway
        .list_frameworks()
        .await
        .context("failed to list frameworks")?;
    catalogue
        .iter()
        .find(|f| f.code.eq_ignore_ascii_case(raw))
        .map(|f| f.id)
        .with_context(|| format!("no framework with code {raw:?}"))
}
