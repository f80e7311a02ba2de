//! # Progress View
//!
//! Holds the last derived progress for a hosting view (a terminal screen, a
//! watch loop). Refreshes may overlap and the view may be torn down while a
//! refresh is in flight; each refresh is stamped with a generation number
//! and its result is published only if it is still the newest request and
//! the view is live.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use attest_core::{ActorId, AssessmentId};
use parking_lot::RwLock;

use crate::progress::{ProgressEngine, WorkflowProgress};

/// What happened to a refresh's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The result became the view's current progress.
    Published,
    /// A newer refresh was started, or the view was torn down, before this
    /// one finished. The result was dropped.
    Discarded,
}

/// Cancellable holder of an assessment's derived progress.
#[derive(Debug)]
pub struct ProgressView {
    engine: ProgressEngine,
    assessment: AssessmentId,
    actor: Option<ActorId>,
    generation: AtomicU64,
    live: AtomicBool,
    current: RwLock<Option<WorkflowProgress>>,
}

impl ProgressView {
    pub fn new(engine: ProgressEngine, assessment: AssessmentId, actor: Option<ActorId>) -> Self {
        Self {
            engine,
            assessment,
            actor,
            generation: AtomicU64::new(0),
            live: AtomicBool::new(true),
            current: RwLock::new(None),
        }
    }

    /// Last published progress, if any refresh has completed.
    pub fn current(&self) -> Option<WorkflowProgress> {
        self.current.read().clone()
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Re-derive progress and publish it unless superseded.
    pub async fn refresh(&self) -> RefreshOutcome {
        if !self.is_live() {
            return RefreshOutcome::Discarded;
        }
        let ticket = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        let progress = self
            .engine
            .progress(&self.assessment, self.actor.as_ref())
            .await;

        let mut current = self.current.write();
        if !self.is_live() || self.generation.load(Ordering::Acquire) != ticket {
            tracing::debug!(
                assessment = %self.assessment,
                ticket,
                "stale progress result discarded"
            );
            return RefreshOutcome::Discarded;
        }
        *current = Some(progress);
        RefreshOutcome::Published
    }

    /// Stop accepting results. In-flight refreshes finish but publish
    /// nothing.
    pub fn teardown(&self) {
        let _current = self.current.write();
        self.live.store(false, Ordering::Release);
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}
