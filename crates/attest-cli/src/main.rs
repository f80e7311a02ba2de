//! # attest CLI entry point
//!
//! Parses command-line arguments, builds the API session, and dispatches to
//! subcommand handlers.

use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use attest_cli::coverage::{run_coverage, CoverageArgs};
use attest_cli::progress::{run_progress, ProgressArgs};
use attest_cli::render::OutputFormat;
use attest_cli::scope::{run_scope, ScopeArgs};
use attest_cli::Session;
use attest_client::ApiConfig;
use attest_core::ActorId;

/// Attest assessment workflow CLI
///
/// Reports where an assessment stands in its seven-stage workflow, composes
/// multi-framework scope, and summarizes coverage per framework.
#[derive(Parser, Debug)]
#[command(name = "attest", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Collaborator API base URL. Overrides ATTEST_API_URL.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Acting user, forwarded on assessment-scoped calls.
    #[arg(long, global = true)]
    actor: Option<ActorId>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Workflow progress of an assessment and the next recommended stage.
    Progress(ProgressArgs),

    /// Show or edit which units of a framework are in scope.
    Scope(ScopeArgs),

    /// Requirement counts and maturity for every framework in scope.
    Coverage(CoverageArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<u8> {
    let mut config = ApiConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config.base_url = ApiConfig::new(url)?.base_url;
    }
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let session = Session::connect(config, cli.actor, format)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let mut stdout = std::io::stdout().lock();
    runtime.block_on(async {
        match &cli.command {
            Commands::Progress(args) => run_progress(args, &session, &mut stdout).await,
            Commands::Scope(args) => run_scope(args, &session, &mut stdout).await,
            Commands::Coverage(args) => run_coverage(args, &session, &mut stdout).await,
        }
    })
}
