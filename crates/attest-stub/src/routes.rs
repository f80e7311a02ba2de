//! Route definitions for the collaborator API stub.
//!
//! Implements the endpoints that `attest-client` calls, with responses that
//! deserialize cleanly into the client's types (snake_case JSON, correct
//! field shapes), plus seeding endpoints so a developer can drive an
//! assessment through every workflow stage by hand.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use dashmap::DashMap;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::store::{list_of, AppState};

/// Build the complete router with all stub routes.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        // Frameworks and scope
        .route("/frameworks", get(frameworks_list))
        .route("/frameworks/:framework_id/stats", get(framework_stats))
        .route("/frameworks/:framework_id/hierarchy", get(framework_hierarchy))
        .route(
            "/frameworks/assessments/:assessment_id/scope",
            get(scope_list).post(scope_upsert),
        )
        .route(
            "/frameworks/assessments/:assessment_id/scope/:framework_id",
            axum::routing::delete(scope_remove),
        )
        // Evidence
        .route(
            "/assessments/:assessment_id/controls",
            get(controls_list).post(controls_create),
        )
        .route(
            "/assessments/:assessment_id/policies",
            get(policies_list).post(policies_create),
        )
        // Mappings
        .route(
            "/mappings/assessments/:assessment_id/controls",
            get(control_mappings_list).post(control_mappings_create),
        )
        .route(
            "/mappings/assessments/:assessment_id/policies",
            get(policy_mappings_list).post(policy_mappings_create),
        )
        // Interviews
        .route(
            "/interviews/assessments/:assessment_id/sessions",
            get(sessions_list).post(sessions_create),
        )
        // Scores
        .route(
            "/scores/assessments/:assessment_id/summary",
            get(score_get).put(score_put),
        )
        // Reports
        .route("/reports/assessments/:assessment_id/list", get(reports_list))
        .route("/reports/assessments/:assessment_id", post(reports_create));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        // Fallback: 501 Not Implemented
        .fallback(not_implemented)
        .with_state(state)
}

fn not_found(detail: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": detail }))).into_response()
}

fn unprocessable(detail: &str) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": detail }))).into_response()
}

/// Stamp `body` with a fresh id, the owning assessment, and a creation time.
fn stamp(mut body: Value, assessment_id: Uuid) -> Value {
    if let Some(obj) = body.as_object_mut() {
        obj.entry("id")
            .or_insert_with(|| json!(Uuid::new_v4().to_string()));
        obj.insert("assessment_id".into(), json!(assessment_id.to_string()));
        obj.insert("created_at".into(), json!(Utc::now().to_rfc3339()));
    }
    body
}

fn append(map: &DashMap<Uuid, Vec<Value>>, assessment_id: Uuid, body: Value) -> Response {
    if !body.is_object() {
        return unprocessable("body must be a JSON object");
    }
    let record = stamp(body, assessment_id);
    map.entry(assessment_id).or_default().push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

// ── Health ──────────────────────────────────────────────────────────

async fn health() -> StatusCode {
    StatusCode::OK
}

// ── Frameworks ──────────────────────────────────────────────────────

async fn frameworks_list(State(state): State<AppState>) -> Json<Value> {
    Json(Value::Array(state.catalogue()))
}

async fn framework_stats(
    State(state): State<AppState>,
    Path(framework_id): Path<Uuid>,
) -> Response {
    let Some(entry) = state.frameworks().get(&framework_id) else {
        return not_found("Framework not found");
    };
    let top = entry.hierarchy.len();
    let assessable: usize = entry
        .hierarchy
        .iter()
        .map(|n| n["children"].as_array().map_or(0, Vec::len))
        .sum();
    let mut by_level = BTreeMap::new();
    by_level.insert("0".to_string(), top);
    by_level.insert("1".to_string(), assessable);

    Json(json!({
        "framework_id": framework_id.to_string(),
        "framework_code": entry.record["code"],
        "framework_name": entry.record["name"],
        "total_requirements": top + assessable,
        "assessable_requirements": assessable,
        "requirements_by_level": by_level
    }))
    .into_response()
}

#[derive(Deserialize)]
struct HierarchyQuery {
    max_depth: Option<u32>,
}

async fn framework_hierarchy(
    State(state): State<AppState>,
    Path(framework_id): Path<Uuid>,
    Query(query): Query<HierarchyQuery>,
) -> Response {
    let Some(entry) = state.frameworks().get(&framework_id) else {
        return not_found("Framework not found");
    };
    let nodes: Vec<Value> = match query.max_depth {
        Some(0) => entry
            .hierarchy
            .iter()
            .map(|n| {
                let mut n = n.clone();
                n["children"] = json!([]);
                n
            })
            .collect(),
        _ => entry.hierarchy.clone(),
    };
    Json(Value::Array(nodes)).into_response()
}

// ── Scope ───────────────────────────────────────────────────────────

async fn scope_list(
    State(state): State<AppState>,
    Path(assessment_id): Path<Uuid>,
) -> Json<Value> {
    let records: Vec<Value> = state
        .scopes()
        .iter()
        .filter(|e| e.key().0 == assessment_id)
        .map(|e| e.value().clone())
        .collect();
    Json(Value::Array(records))
}

#[derive(Deserialize)]
struct ScopeBody {
    framework_id: Uuid,
    #[serde(default)]
    include_all: bool,
    #[serde(default)]
    included_requirement_ids: Option<Vec<Uuid>>,
    #[serde(default)]
    excluded_requirement_ids: Option<Vec<Uuid>>,
}

async fn scope_upsert(
    State(state): State<AppState>,
    Path(assessment_id): Path<Uuid>,
    Json(body): Json<ScopeBody>,
) -> Response {
    let code = match state.frameworks().get(&body.framework_id) {
        Some(entry) => json!(entry.code()),
        None => return not_found("Framework not found"),
    };
    let key = (assessment_id, body.framework_id);
    let id = state
        .scopes()
        .get(&key)
        .and_then(|e| e.value().get("id").cloned())
        .unwrap_or_else(|| json!(Uuid::new_v4().to_string()));

    // include_all clears both explicit sets.
    let (included, excluded) = if body.include_all {
        (None, None)
    } else {
        (body.included_requirement_ids, body.excluded_requirement_ids)
    };
    let record = json!({
        "id": id,
        "assessment_id": assessment_id.to_string(),
        "framework_id": body.framework_id.to_string(),
        "framework_code": code,
        "include_all": body.include_all,
        "included_requirement_ids": included,
        "excluded_requirement_ids": excluded,
        "updated_at": Utc::now().to_rfc3339()
    });
    state.scopes().insert(key, record.clone());
    tracing::debug!(%assessment_id, framework_id = %body.framework_id, "scope upserted");
    Json(record).into_response()
}

async fn scope_remove(
    State(state): State<AppState>,
    Path((assessment_id, framework_id)): Path<(Uuid, Uuid)>,
) -> Response {
    match state.scopes().remove(&(assessment_id, framework_id)) {
        Some(_) => Json(json!({ "message": "Framework removed from scope" })).into_response(),
        None => not_found("Scope not found"),
    }
}

// ── Evidence ────────────────────────────────────────────────────────

async fn controls_list(State(state): State<AppState>, Path(a): Path<Uuid>) -> Json<Value> {
    Json(Value::Array(list_of(state.controls(), &a)))
}

async fn controls_create(
    State(state): State<AppState>,
    Path(a): Path<Uuid>,
    Json(body): Json<Value>,
) -> Response {
    append(state.controls(), a, body)
}

async fn policies_list(State(state): State<AppState>, Path(a): Path<Uuid>) -> Json<Value> {
    Json(Value::Array(list_of(state.policies(), &a)))
}

async fn policies_create(
    State(state): State<AppState>,
    Path(a): Path<Uuid>,
    Json(body): Json<Value>,
) -> Response {
    append(state.policies(), a, body)
}

// ── Mappings ────────────────────────────────────────────────────────

async fn control_mappings_list(State(state): State<AppState>, Path(a): Path<Uuid>) -> Json<Value> {
    Json(Value::Array(list_of(state.control_mappings(), &a)))
}

async fn control_mappings_create(
    State(state): State<AppState>,
    Path(a): Path<Uuid>,
    Json(body): Json<Value>,
) -> Response {
    append(state.control_mappings(), a, body)
}

async fn policy_mappings_list(State(state): State<AppState>, Path(a): Path<Uuid>) -> Json<Value> {
    Json(Value::Array(list_of(state.policy_mappings(), &a)))
}

async fn policy_mappings_create(
    State(state): State<AppState>,
    Path(a): Path<Uuid>,
    Json(body): Json<Value>,
) -> Response {
    append(state.policy_mappings(), a, body)
}

// ── Interviews ──────────────────────────────────────────────────────

async fn sessions_list(State(state): State<AppState>, Path(a): Path<Uuid>) -> Json<Value> {
    Json(Value::Array(list_of(state.sessions(), &a)))
}

async fn sessions_create(
    State(state): State<AppState>,
    Path(a): Path<Uuid>,
    Json(body): Json<Value>,
) -> Response {
    append(state.sessions(), a, body)
}

// ── Scores ──────────────────────────────────────────────────────────

async fn score_get(State(state): State<AppState>, Path(a): Path<Uuid>) -> Response {
    match state.scores().get(&a) {
        Some(entry) => Json(entry.value().clone()).into_response(),
        None => not_found("No scores calculated"),
    }
}

async fn score_put(
    State(state): State<AppState>,
    Path(a): Path<Uuid>,
    Json(mut body): Json<Value>,
) -> Response {
    let Some(obj) = body.as_object_mut() else {
        return unprocessable("body must be a JSON object");
    };
    if !obj.get("overall_maturity").is_some_and(Value::is_number) {
        return unprocessable("overall_maturity is required");
    }
    obj.insert("assessment_id".into(), json!(a.to_string()));
    obj.insert("calculated_at".into(), json!(Utc::now().to_rfc3339()));
    state.scores().insert(a, body.clone());
    Json(body).into_response()
}

// ── Reports ─────────────────────────────────────────────────────────

async fn reports_list(State(state): State<AppState>, Path(a): Path<Uuid>) -> Json<Value> {
    let items = list_of(state.reports(), &a);
    Json(json!({ "total": items.len(), "items": items }))
}

async fn reports_create(
    State(state): State<AppState>,
    Path(a): Path<Uuid>,
    Json(body): Json<Value>,
) -> Response {
    append(state.reports(), a, body)
}

// ── Fallback ────────────────────────────────────────────────────────

async fn not_implemented() -> StatusCode {
    StatusCode::NOT_IMPLEMENTED
}
