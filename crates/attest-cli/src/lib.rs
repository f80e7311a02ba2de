//! # attest-cli: Command-Line Front End
//!
//! Provides the `attest` command-line interface over the workflow crate.
//! Every subcommand reaches the collaborator API through one
//! [`CollaboratorGateway`] held by a [`Session`].
//!
//! ## Subcommands
//!
//! - `attest progress`: Workflow step bar and next recommended stage.
//! - `attest scope`: Show, toggle, or remove a framework's scope.
//! - `attest coverage`: Requirement counts and maturity per framework.
//!
//! ```bash
//! attest progress 6f1c...e2 --json
//! attest scope toggle 6f1c...e2 SOC2 A
//! attest --api-url http://localhost:8000/api/v1 coverage 6f1c...e2
//! ```

pub mod coverage;
pub mod progress;
pub mod render;
pub mod scope;

use std::sync::Arc;

use attest_client::{ApiClient, ApiConfig, CollaboratorGateway};
use attest_core::ActorId;

use render::OutputFormat;

/// Everything a subcommand needs to talk to the collaborator API.
#[derive(Clone)]
pub struct Session {
    pub gateway: Arc<dyn CollaboratorGateway>,
    /// Identity forwarded on assessment-scoped calls.
    pub actor: Option<ActorId>,
    pub format: OutputFormat,
}

impl Session {
    /// Build a session backed by a real API client.
    pub fn connect(
        config: ApiConfig,
        actor: Option<ActorId>,
        format: OutputFormat,
    ) -> anyhow::Result<Self> {
        tracing::debug!(base_url = %config.base_url, "connecting to collaborator API");
        let client = ApiClient::new(config)?;
        Ok(Self {
            gateway: Arc::new(client),
            actor,
            format,
        })
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("actor", &self.actor)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}
