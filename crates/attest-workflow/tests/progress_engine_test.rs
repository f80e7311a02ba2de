//! Progress engine behaviour against an in-memory collaborator.

mod common;

use std::sync::Arc;
use std::time::Duration;

use attest_client::interviews::SessionStatus;
use attest_core::{ActorId, AssessmentId, FrameworkId};
use attest_workflow::{ProgressEngine, ProgressView, RefreshOutcome, Stage, StepStatus, WorkflowProgress};
use common::*;

fn status(progress: &WorkflowProgress, stage: Stage) -> StepStatus {
    progress
        .steps
        .iter()
        .find(|s| s.id == stage)
        .map(|s| s.status)
        .unwrap()
}

fn engine(gateway: &Arc<FakeGateway>) -> ProgressEngine {
    ProgressEngine::new(gateway.clone())
}

// ── Baseline ─────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_assessment_starts_at_scope() {
    let gateway = Arc::new(FakeGateway::default());
    let a = AssessmentId::new();

    let progress = engine(&gateway).progress(&a, None).await;

    assert_eq!(progress.steps.len(), 7);
    assert!(progress.steps.iter().all(|s| s.status == StepStatus::NotStarted));
    assert_eq!(progress.next, Some(Stage::Scope));
    assert_eq!(progress.assessment_id, Some(a));
}

#[tokio::test]
async fn every_collaborator_is_queried_once() {
    let gateway = Arc::new(FakeGateway::default());
    engine(&gateway).progress(&AssessmentId::new(), None).await;

    let mut calls = gateway.with(|s| s.calls.clone());
    calls.sort_unstable();
    assert_eq!(
        calls,
        vec![
            "get_assessment_scope",
            "get_score_summary",
            "list_control_mappings",
            "list_controls",
            "list_policies",
            "list_policy_mappings",
            "list_reports",
            "list_sessions",
        ]
    );
}

#[tokio::test]
async fn actor_is_forwarded_to_assessment_reads() {
    let gateway = Arc::new(FakeGateway::default());
    let actor = ActorId::new();
    engine(&gateway)
        .progress(&AssessmentId::new(), Some(&actor))
        .await;

    let (calls, actors) = gateway.with(|s| (s.calls.clone(), s.actors.clone()));
    for (call, seen) in calls.iter().zip(actors) {
        if *call == "get_assessment_scope" {
            assert_eq!(seen, None);
        } else {
            assert_eq!(seen, Some(actor), "{call} lost the actor");
        }
    }
}

// ── Stage rules ──────────────────────────────────────────────────────

#[tokio::test]
async fn controls_without_policies_leave_evidence_in_progress() {
    let a = AssessmentId::new();
    let gateway = Arc::new(FakeGateway::new(FakeState {
        controls: vec![control(a)],
        ..Default::default()
    }));

    let progress = engine(&gateway).progress(&a, None).await;
    assert_eq!(status(&progress, Stage::Evidence), StepStatus::InProgress);
}

#[tokio::test]
async fn unapproved_mapping_leaves_mappings_in_progress() {
    let a = AssessmentId::new();
    let gateway = Arc::new(FakeGateway::new(FakeState {
        controls: vec![control(a)],
        policies: vec![policy(a)],
        control_mappings: vec![control_mapping(false)],
        ..Default::default()
    }));

    let progress = engine(&gateway).progress(&a, None).await;
    assert_eq!(status(&progress, Stage::Evidence), StepStatus::Complete);
    assert_eq!(status(&progress, Stage::Mappings), StepStatus::InProgress);
}

#[tokio::test]
async fn approved_policy_mapping_completes_mappings() {
    let a = AssessmentId::new();
    let gateway = Arc::new(FakeGateway::new(FakeState {
        control_mappings: vec![control_mapping(false)],
        policy_mappings: vec![policy_mapping(true)],
        ..Default::default()
    }));

    let progress = engine(&gateway).progress(&a, None).await;
    assert_eq!(status(&progress, Stage::Mappings), StepStatus::Complete);
}

#[tokio::test]
async fn only_completed_sessions_complete_interviews() {
    let a = AssessmentId::new();
    let gateway = Arc::new(FakeGateway::new(FakeState {
        sessions: vec![
            session(a, SessionStatus::Paused),
            session(a, SessionStatus::InProgress),
        ],
        ..Default::default()
    }));
    let progress = engine(&gateway).progress(&a, None).await;
    assert_eq!(status(&progress, Stage::Interviews), StepStatus::InProgress);

    gateway.with(|s| s.sessions.push(session(a, SessionStatus::Completed)));
    let progress = engine(&gateway).progress(&a, None).await;
    assert_eq!(status(&progress, Stage::Interviews), StepStatus::Complete);
}

#[tokio::test]
async fn missing_score_summary_is_benign() {
    let a = AssessmentId::new();
    let gateway = Arc::new(FakeGateway::new(FakeState {
        scope: vec![scope_record(FrameworkId::new(), true)],
        ..Default::default()
    }));

    let progress = engine(&gateway).progress(&a, None).await;
    assert_eq!(status(&progress, Stage::Scoring), StepStatus::NotStarted);
    assert_eq!(status(&progress, Stage::Review), StepStatus::NotStarted);
    assert_eq!(status(&progress, Stage::Scope), StepStatus::Complete);
    assert_eq!(progress.next, Some(Stage::Evidence));
}

#[tokio::test]
async fn one_failing_collaborator_does_not_sink_the_rest() {
    let a = AssessmentId::new();
    let gateway = Arc::new(FakeGateway::new(FakeState {
        scope: vec![scope_record(FrameworkId::new(), true)],
        controls: vec![control(a)],
        policies: vec![policy(a)],
        reports: reports(a, 2),
        failing: ["list_reports"].into_iter().collect(),
        ..Default::default()
    }));

    let progress = engine(&gateway).progress(&a, None).await;
    assert_eq!(progress.steps.len(), 7);
    assert_eq!(status(&progress, Stage::Report), StepStatus::NotStarted);
    assert_eq!(status(&progress, Stage::Evidence), StepStatus::Complete);
}

#[tokio::test]
async fn everything_failing_reads_as_not_started() {
    let gateway = Arc::new(FakeGateway::new(FakeState {
        failing: [
            "get_assessment_scope",
            "list_controls",
            "list_policies",
            "list_control_mappings",
            "list_policy_mappings",
            "list_sessions",
            "get_score_summary",
            "list_reports",
        ]
        .into_iter()
        .collect(),
        ..Default::default()
    }));

    let progress = engine(&gateway).progress(&AssessmentId::new(), None).await;
    assert_eq!(progress.steps.len(), 7);
    assert!(progress.steps.iter().all(|s| s.status == StepStatus::NotStarted));
}

#[tokio::test]
async fn fully_progressed_assessment_has_no_next_step() {
    let a = AssessmentId::new();
    let gateway = Arc::new(FakeGateway::new(FakeState {
        scope: vec![scope_record(FrameworkId::new(), true)],
        controls: vec![control(a)],
        policies: vec![policy(a)],
        control_mappings: vec![control_mapping(true)],
        sessions: vec![session(a, SessionStatus::Completed)],
        score: Some(score(a, 2.5)),
        reports: reports(a, 1),
        ..Default::default()
    }));

    let progress = engine(&gateway).progress(&a, None).await;
    assert!(progress.is_finished());
    assert!(progress.steps.iter().all(|s| s.status.is_complete()));
}

#[tokio::test]
async fn next_points_at_earliest_gap() {
    // Scoring done, interviews not: next is interviews even though later
    // stages are complete.
    let a = AssessmentId::new();
    let gateway = Arc::new(FakeGateway::new(FakeState {
        scope: vec![scope_record(FrameworkId::new(), true)],
        controls: vec![control(a)],
        policies: vec![policy(a)],
        control_mappings: vec![control_mapping(true)],
        score: Some(score(a, 1.0)),
        reports: reports(a, 1),
        ..Default::default()
    }));

    let progress = engine(&gateway).progress(&a, None).await;
    assert_eq!(progress.next, Some(Stage::Interviews));
    assert_eq!(
        progress.next_step().map(|s| s.target.clone()),
        Some(format!("/assessments/{a}/interviews"))
    );
}

// ── Invalid references ───────────────────────────────────────────────

#[tokio::test]
async fn invalid_assessment_reference_is_unknown() {
    let gateway = Arc::new(FakeGateway::default());

    let progress = engine(&gateway).evaluate("not-an-id", None).await;

    assert!(progress.is_unknown());
    assert!(gateway.with(|s| s.calls.is_empty()));
}

#[tokio::test]
async fn valid_reference_string_is_evaluated() {
    let a = AssessmentId::new();
    let gateway = Arc::new(FakeGateway::default());

    let progress = engine(&gateway).evaluate(&a.to_string(), None).await;
    assert_eq!(progress.steps.len(), 7);
}

// ── Progress view ────────────────────────────────────────────────────

#[tokio::test]
async fn view_publishes_completed_refresh() {
    let a = AssessmentId::new();
    let gateway = Arc::new(FakeGateway::new(FakeState {
        scope: vec![scope_record(FrameworkId::new(), true)],
        ..Default::default()
    }));
    let view = ProgressView::new(engine(&gateway), a, None);
    assert!(view.current().is_none());

    assert_eq!(view.refresh().await, RefreshOutcome::Published);
    assert_eq!(view.current().unwrap().next, Some(Stage::Evidence));
}

#[tokio::test]
async fn view_discards_result_after_teardown() {
    let a = AssessmentId::new();
    let gateway = Arc::new(FakeGateway::new(FakeState {
        scope_read_delays: [Duration::from_millis(50)].into_iter().collect(),
        ..Default::default()
    }));
    let view = ProgressView::new(engine(&gateway), a, None);

    let (outcome, ()) = tokio::join!(view.refresh(), async {
        tokio::task::yield_now().await;
        view.teardown();
    });

    assert_eq!(outcome, RefreshOutcome::Discarded);
    assert!(view.current().is_none());
    assert!(!view.is_live());
    assert_eq!(view.refresh().await, RefreshOutcome::Discarded);
}

#[tokio::test]
async fn newer_refresh_supersedes_older_one() {
    let a = AssessmentId::new();
    let gateway = Arc::new(FakeGateway::new(FakeState {
        scope_read_delays: [Duration::from_millis(80), Duration::ZERO]
            .into_iter()
            .collect(),
        ..Default::default()
    }));
    let view = ProgressView::new(engine(&gateway), a, None);

    let (first, second) = tokio::join!(view.refresh(), async {
        tokio::task::yield_now().await;
        view.refresh().await
    });

    assert_eq!(first, RefreshOutcome::Discarded);
    assert_eq!(second, RefreshOutcome::Published);
    assert!(view.current().is_some());
}
