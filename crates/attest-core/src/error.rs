//! # Error Taxonomy
//!
//! Collaborator failures are classified into one [`ErrorKind`] regardless of
//! which crate produced them. Aggregation code branches on the kind, never on
//! error message text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a failed collaborator interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Transport failure, timeout, or a server-side (5xx) error.
    Network,
    /// The requested resource does not exist. Expected for score summaries
    /// of assessments that have not been scored yet.
    NotFound,
    /// The caller is not authenticated or not permitted (401/403).
    Unauthorized,
    /// The request was rejected as invalid (400/409/422), or a local
    /// operation was refused by policy.
    Validation,
    /// Anything else: unexpected statuses, undecodable bodies, bad config.
    Unknown,
}

impl ErrorKind {
    /// Classify a non-success HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            404 | 410 => Self::NotFound,
            401 | 403 => Self::Unauthorized,
            400 | 409 | 422 => Self::Validation,
            408 | 429 | 500..=599 => Self::Network,
            _ => Self::Unknown,
        }
    }

    /// Whether this kind is the benign "does not exist yet" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Network => "NETWORK",
            Self::NotFound => "NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Validation => "VALIDATION",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Errors raised by the core primitives themselves.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// An identifier string is not a valid UUID.
    #[error("invalid {kind} identifier {value:?}: {reason}")]
    InvalidIdentifier {
        /// Identifier namespace (`assessment`, `framework`, ...).
        kind: &'static str,
        /// The rejected input.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },
}

impl CoreError {
    /// Core errors are always caller input problems.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(ErrorKind::from_status(404), ErrorKind::NotFound);
        assert_eq!(ErrorKind::from_status(401), ErrorKind::Unauthorized);
        assert_eq!(ErrorKind::from_status(403), ErrorKind::Unauthorized);
        assert_eq!(ErrorKind::from_status(422), ErrorKind::Validation);
        assert_eq!(ErrorKind::from_status(503), ErrorKind::Network);
        assert_eq!(ErrorKind::from_status(418), ErrorKind::Unknown);
    }

    #[test]
    fn only_not_found_is_benign() {
        assert!(ErrorKind::NotFound.is_not_found());
        assert!(!ErrorKind::Network.is_not_found());
    }

    #[test]
    fn kind_display_and_serde() {
        assert_eq!(ErrorKind::NotFound.to_string(), "NOT_FOUND");
        assert_eq!(
            serde_json::to_string(&ErrorKind::Unauthorized).unwrap(),
            "\"unauthorized\""
        );
    }
}
