//! In-memory storage backend using DashMap.
//!
//! The framework catalogue is keyed by framework id. Everything belonging to
//! an assessment is keyed by assessment id and held as a list of JSON
//! records, the shape the client decodes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use serde_json::{json, Value};
use uuid::Uuid;

/// Top-level unit code, unit name, child requirement codes.
pub type UnitSpec = (&'static str, &'static str, &'static [&'static str]);

const SOC2_UNITS: &[UnitSpec] = &[
    ("CC", "Security", &["CC1", "CC2", "CC3", "CC4", "CC5", "CC6", "CC7", "CC8", "CC9"]),
    ("A", "Availability", &["A1"]),
    ("PI", "Processing Integrity", &["PI1"]),
    ("C", "Confidentiality", &["C1"]),
    ("P", "Privacy", &["P1", "P2", "P3", "P4", "P5", "P6", "P7", "P8"]),
];

const NIST_CSF_UNITS: &[UnitSpec] = &[
    ("GV", "Govern", &["GV.OC", "GV.RM", "GV.RR", "GV.PO", "GV.OV", "GV.SC"]),
    ("ID", "Identify", &["ID.AM", "ID.RA", "ID.IM"]),
    ("PR", "Protect", &["PR.AA", "PR.AT", "PR.DS", "PR.PS", "PR.IR"]),
    ("DE", "Detect", &["DE.CM", "DE.AE"]),
    ("RS", "Respond", &["RS.MA", "RS.AN", "RS.CO", "RS.MI"]),
    ("RC", "Recover", &["RC.RP", "RC.CO"]),
];

/// A framework in the catalogue together with its requirement tree.
#[derive(Debug, Clone)]
pub struct FrameworkEntry {
    /// Registration sequence; catalogue order.
    pub seq: u64,
    pub record: Value,
    /// Top-level nodes, each with its `children` populated.
    pub hierarchy: Vec<Value>,
}

impl FrameworkEntry {
    pub fn code(&self) -> Option<&str> {
        self.record.get("code").and_then(Value::as_str)
    }
}

struct Inner {
    frameworks: DashMap<Uuid, FrameworkEntry>,
    next_seq: AtomicU64,
    scopes: DashMap<(Uuid, Uuid), Value>,
    controls: DashMap<Uuid, Vec<Value>>,
    policies: DashMap<Uuid, Vec<Value>>,
    control_mappings: DashMap<Uuid, Vec<Value>>,
    policy_mappings: DashMap<Uuid, Vec<Value>>,
    sessions: DashMap<Uuid, Vec<Value>>,
    scores: DashMap<Uuid, Value>,
    reports: DashMap<Uuid, Vec<Value>>,
}

/// Shared application state holding all in-memory stores.
///
/// Cheaply cloneable via `Arc`; all clones share the same data.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

impl AppState {
    /// Empty store with no frameworks.
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(Inner {
                frameworks: DashMap::new(),
                next_seq: AtomicU64::new(0),
                scopes: DashMap::new(),
                controls: DashMap::new(),
                policies: DashMap::new(),
                control_mappings: DashMap::new(),
                policy_mappings: DashMap::new(),
                sessions: DashMap::new(),
                scores: DashMap::new(),
                reports: DashMap::new(),
            }),
        }
    }

    /// Store seeded with the SOC 2 and NIST CSF catalogues.
    pub fn seeded() -> Self {
        let state = Self::empty();
        state.add_framework("SOC2", "SOC 2 Trust Services Criteria", "soc2_tsc", SOC2_UNITS);
        state.add_framework("NIST-CSF", "NIST Cybersecurity Framework", "nist_csf", NIST_CSF_UNITS);
        state
    }

    /// Register a framework whose tree is `units`, each with assessable
    /// child requirement codes. Returns the framework id.
    pub fn add_framework(
        &self,
        code: &str,
        name: &str,
        framework_type: &str,
        units: &[UnitSpec],
    ) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();
        let hierarchy = units
            .iter()
            .enumerate()
            .map(|(order, (unit_code, unit_name, children))| {
                let unit_id = Uuid::new_v4();
                let children: Vec<Value> = children
                    .iter()
                    .enumerate()
                    .map(|(child_order, child)| {
                        json!({
                            "id": Uuid::new_v4().to_string(),
                            "code": child,
                            "name": child,
                            "level": 1,
                            "is_assessable": true,
                            "parent_id": unit_id.to_string(),
                            "display_order": child_order,
                            "children": []
                        })
                    })
                    .collect();
                json!({
                    "id": unit_id.to_string(),
                    "code": unit_code,
                    "name": unit_name,
                    "level": 0,
                    "is_assessable": false,
                    "parent_id": null,
                    "display_order": order,
                    "children": children
                })
            })
            .collect();
        let record = json!({
            "id": id.to_string(),
            "code": code,
            "name": name,
            "version": null,
            "description": null,
            "framework_type": framework_type,
            "hierarchy_levels": 2,
            "is_active": true,
            "created_at": now,
            "updated_at": now
        });
        let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed);
        self.inner.frameworks.insert(
            id,
            FrameworkEntry {
                seq,
                record,
                hierarchy,
            },
        );
        id
    }

    pub fn frameworks(&self) -> &DashMap<Uuid, FrameworkEntry> {
        &self.inner.frameworks
    }

    /// Catalogue records in registration order.
    pub fn catalogue(&self) -> Vec<Value> {
        let mut entries: Vec<(u64, Value)> = self
            .inner
            .frameworks
            .iter()
            .map(|e| (e.seq, e.record.clone()))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, record)| record).collect()
    }

    /// Scope records keyed by `(assessment, framework)`.
    pub fn scopes(&self) -> &DashMap<(Uuid, Uuid), Value> {
        &self.inner.scopes
    }

    pub fn controls(&self) -> &DashMap<Uuid, Vec<Value>> {
        &self.inner.controls
    }

    pub fn policies(&self) -> &DashMap<Uuid, Vec<Value>> {
        &self.inner.policies
    }

    pub fn control_mappings(&self) -> &DashMap<Uuid, Vec<Value>> {
        &self.inner.control_mappings
    }

    pub fn policy_mappings(&self) -> &DashMap<Uuid, Vec<Value>> {
        &self.inner.policy_mappings
    }

    pub fn sessions(&self) -> &DashMap<Uuid, Vec<Value>> {
        &self.inner.sessions
    }

    pub fn scores(&self) -> &DashMap<Uuid, Value> {
        &self.inner.scores
    }

    pub fn reports(&self) -> &DashMap<Uuid, Vec<Value>> {
        &self.inner.reports
    }
}

/// Clone of the list stored under `key`, or an empty list.
pub fn list_of(map: &DashMap<Uuid, Vec<Value>>, key: &Uuid) -> Vec<Value> {
    map.get(key).map(|e| e.value().clone()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_catalogue_keeps_registration_order() {
        let state = AppState::seeded();
        let codes: Vec<String> = state
            .catalogue()
            .iter()
            .map(|f| f["code"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(codes, vec!["SOC2", "NIST-CSF"]);
    }

    #[test]
    fn soc2_has_five_top_level_units() {
        let state = AppState::seeded();
        let soc2 = state
            .frameworks()
            .iter()
            .find(|e| e.code() == Some("SOC2"))
            .map(|e| e.value().clone())
            .unwrap();
        let codes: Vec<&str> = soc2
            .hierarchy
            .iter()
            .map(|n| n["code"].as_str().unwrap())
            .collect();
        assert_eq!(codes, vec!["CC", "A", "PI", "C", "P"]);
    }
}
