//! # attest-core: Foundational Types for Attest
//!
//! Every other crate in the workspace depends on `attest-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `AssessmentId`, `FrameworkId`,
//!    `RequirementId`, `ActorId`, `SessionId`: all distinct types. You cannot
//!    pass a framework id where an assessment id is expected.
//!
//! 2. **One error taxonomy.** Collaborator failures are classified into a
//!    single [`ErrorKind`] so that aggregation code can decide per kind
//!    whether a failure is benign (a score summary that does not exist yet)
//!    or worth a warning.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `attest-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;

pub use error::{CoreError, ErrorKind};
pub use identity::{ActorId, AssessmentId, FrameworkId, ReportId, RequirementId, SessionId};
