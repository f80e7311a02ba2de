//! # attest-client -- Typed Rust client for the assessment collaborator API
//!
//! Provides typed access to the resources the assessment workflow reads and
//! writes:
//! - **Frameworks** catalogue, hierarchy, stats, and per-assessment **scope**
//! - **Evidence**: controls and policies
//! - **Mappings** of evidence to requirements
//! - **Interviews**: interview sessions
//! - **Scores**: maturity summaries
//! - **Reports**: generated report listings
//!
//! ## Architecture
//!
//! Every resource is reached through one [`ApiClient`] holding a sub-client
//! per resource. Workflow code does not use the sub-clients directly; it
//! goes through the [`CollaboratorGateway`] trait, which `ApiClient`
//! implements.
//!
//! ## Path Convention
//!
//! The configured base URL carries the version prefix
//! (`http://localhost:8000/api/v1`); each sub-client appends its resource
//! path. The acting user, when known, travels in the `X-User-ID` header.

pub mod config;
pub mod error;
pub mod evidence;
pub mod frameworks;
pub mod gateway;
pub mod interviews;
pub mod mappings;
pub mod reports;
pub(crate) mod retry;
pub mod scores;
pub mod timestamp;
pub(crate) mod transport;

pub use config::ApiConfig;
pub use error::ApiError;
pub use gateway::CollaboratorGateway;
pub use transport::ACTOR_HEADER;

use std::time::Duration;

use retry::RetryPolicy;
use transport::Transport;

/// Top-level collaborator API client. Holds sub-clients for each resource.
#[derive(Debug, Clone)]
pub struct ApiClient {
    frameworks: frameworks::FrameworkClient,
    evidence: evidence::EvidenceClient,
    mappings: mappings::MappingClient,
    interviews: interviews::InterviewClient,
    scores: scores::ScoreClient,
    reports: reports::ReportClient,
}

impl ApiClient {
    /// Create a new client from configuration.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.api_token {
            let mut value =
                reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                    .map_err(|_| ApiError::Config(config::ConfigError::InvalidToken))?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        let transport = Transport::new(http, config.base(), RetryPolicy::new(config.max_retries));

        tracing::debug!(base_url = %config.base_url, "collaborator client initialised");

        Ok(Self {
            frameworks: frameworks::FrameworkClient::new(transport.clone()),
            evidence: evidence::EvidenceClient::new(transport.clone()),
            mappings: mappings::MappingClient::new(transport.clone()),
            interviews: interviews::InterviewClient::new(transport.clone()),
            scores: scores::ScoreClient::new(transport.clone()),
            reports: reports::ReportClient::new(transport),
        })
    }

    /// Access the framework and scope client.
    pub fn frameworks(&self) -> &frameworks::FrameworkClient {
        &self.frameworks
    }

    /// Access the controls/policies client.
    pub fn evidence(&self) -> &evidence::EvidenceClient {
        &self.evidence
    }

    /// Access the mappings client.
    pub fn mappings(&self) -> &mappings::MappingClient {
        &self.mappings
    }

    /// Access the interview sessions client.
    pub fn interviews(&self) -> &interviews::InterviewClient {
        &self.interviews
    }

    /// Access the score summary client.
    pub fn scores(&self) -> &scores::ScoreClient {
        &self.scores
    }

    /// Access the reports client.
    pub fn reports(&self) -> &reports::ReportClient {
        &self.reports
    }
}
