//! # Identifier Newtypes
//!
//! Every identifier the collaborator API hands out is a UUID. Each namespace
//! gets its own newtype so that the compiler rejects an [`ActorId`] passed
//! where an [`AssessmentId`] is expected.
//!
//! On the wire every identifier is the bare hyphenated UUID string, and
//! `Display` renders the same form so identifiers can be spliced directly
//! into request paths.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Declares a UUID-backed identifier newtype with the shared constructor,
/// parsing, and display surface.
macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $ty:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $ty(Uuid);

        impl $ty {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Parse the hyphenated (or simple) UUID text form.
            pub fn parse(raw: &str) -> Result<Self, CoreError> {
                Uuid::parse_str(raw.trim())
                    .map(Self)
                    .map_err(|e| CoreError::InvalidIdentifier {
                        kind: $label,
                        value: raw.to_string(),
                        reason: e.to_string(),
                    })
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $ty {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_identifier!(
    /// Identifier of a compliance assessment.
    AssessmentId,
    "assessment"
);

uuid_identifier!(
    /// Identifier of a compliance framework (NIST CSF, ISO 27001, SOC 2 TSC, custom).
    FrameworkId,
    "framework"
);

uuid_identifier!(
    /// Identifier of a framework requirement node: a function, category,
    /// subcategory, or trust-service criterion depending on the framework.
    RequirementId,
    "requirement"
);

uuid_identifier!(
    /// Identifier of the acting user, sent with every collaborator call.
    ActorId,
    "actor"
);

uuid_identifier!(
    /// Identifier of an interview session.
    SessionId,
    "session"
);

uuid_identifier!(
    /// Identifier of a generated report.
    ReportId,
    "report"
);
