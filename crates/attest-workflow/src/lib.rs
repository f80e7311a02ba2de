//! # attest-workflow: Assessment Workflow Logic
//!
//! Everything in this crate reaches the collaborator API through the
//! [`CollaboratorGateway`](attest_client::CollaboratorGateway) trait and owns
//! only derived, in-memory state.
//!
//! - [`progress`]: derives the seven-stage workflow state of an assessment
//!   and recommends the next stage.
//! - [`scope`]: composes which units of a framework are in scope, keeping
//!   mandatory units selected and persisting changes optimistically.
//! - [`view`]: a cancellable holder of derived progress.
//! - [`coverage`]: per-framework requirement counts and maturity bands.

pub mod coverage;
pub mod progress;
pub mod scope;
pub mod view;

pub use coverage::{framework_coverage, FrameworkCoverage, MaturityBand};
pub use progress::{
    derive_steps, next_step, ProgressEngine, ProgressSignals, Stage, StepStatus, WorkflowProgress,
    WorkflowStep,
};
pub use scope::{
    category_key, resolve_membership, IgnoreReason, MandatoryPolicy, ScopeComposer, ScopeError,
    SelectableUnit, ToggleOutcome, TogglePhase, ToggleRecord,
};
pub use view::{ProgressView, RefreshOutcome};
