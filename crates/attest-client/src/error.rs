//! Collaborator API client error types.

use attest_core::ErrorKind;

/// Errors from collaborator API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP transport error (connection refused, timeout, TLS, ...).
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The API returned a non-2xx status.
    #[error("API {endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl ApiError {
    /// Build a status error. Mostly useful for test doubles of the gateway.
    pub fn status(endpoint: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            endpoint: endpoint.into(),
            status,
            body: body.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http { source, .. } if source.is_timeout() || source.is_connect() => {
                ErrorKind::Network
            }
            Self::Http { source, .. } => match source.status() {
                Some(status) => ErrorKind::from_status(status.as_u16()),
                None => ErrorKind::Network,
            },
            Self::Status { status, .. } => ErrorKind::from_status(*status),
            Self::Deserialization { .. } | Self::Config(_) => ErrorKind::Unknown,
        }
    }

    /// The endpoint label the failure occurred on, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Http { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Deserialization { endpoint, .. } => Some(endpoint),
            Self::Config(_) => None,
        }
    }

    /// Whether the resource simply does not exist.
    pub fn is_not_found(&self) -> bool {
        self.kind().is_not_found()
    }
}
