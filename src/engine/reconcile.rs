//! Merges a fresh payload into the persistent node store.
//!
//! Existing identities keep their physical state, new ones are seeded at the
//! viewport center, stale ones are evicted, and the anchor is snapped back to
//! the center. Bad entries are reported and skipped one at a time.

use std::collections::{BTreeSet, HashMap, HashSet};

use eframe::egui::Vec2;

use crate::error::PayloadIssue;
use crate::payload::{GraphNode, GraphPayload};

use super::Edge;
use super::store::{NodeStore, Upsert};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    /// Nodes, edges or the anchor changed: the layout has to be re-settled.
    Topology,
    /// Same shape, different attributes: only the projection is refreshed.
    Attributes,
}

/// Shape of a reconciled payload, compared between generations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TopologyKey {
    nodes: BTreeSet<String>,
    edges: BTreeSet<(String, String)>,
    anchor: Option<String>,
}

impl TopologyKey {
    fn edge_key(a: &str, b: &str) -> (String, String) {
        if a <= b {
            (a.to_owned(), b.to_owned())
        } else {
            (b.to_owned(), a.to_owned())
        }
    }
}

/// Outcome of a `reconcile` call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReconcileReport {
    /// `None` when the call was deferred.
    pub change: Option<ChangeKind>,
    pub created: usize,
    pub updated: usize,
    pub evicted: Vec<String>,
    pub edges: usize,
    pub issues: Vec<PayloadIssue>,
    /// The viewport was not measured yet; the payload is kept for later.
    pub deferred: bool,
    pub warmed_up: bool,
}

impl ReconcileReport {
    pub(crate) fn deferred() -> Self {
        Self {
            deferred: true,
            ..Self::default()
        }
    }

    pub fn dropped_links(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| matches!(issue, PayloadIssue::DanglingLink { .. }))
            .count()
    }
}

pub(crate) struct Reconciled {
    pub(crate) edges: Vec<Edge>,
    pub(crate) topology: TopologyKey,
    pub(crate) report: ReconcileReport,
}

/// Picks the node entries that survive validation: blank identities are
/// dropped, duplicates resolve to the last entry (in the slot of the first),
/// and only the first `is_me` node keeps the anchor flag.
fn accepted_nodes(nodes: &[GraphNode], issues: &mut Vec<PayloadIssue>) -> Vec<GraphNode> {
    let mut accepted: Vec<GraphNode> = Vec::with_capacity(nodes.len());
    let mut slot_by_id: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());

    for (index, node) in nodes.iter().enumerate() {
        if !node.has_identity() {
            issues.push(PayloadIssue::MissingIdentity { index });
            continue;
        }

        match slot_by_id.get(node.id.as_str()) {
            Some(&slot) => {
                issues.push(PayloadIssue::DuplicateIdentity {
                    id: node.id.clone(),
                });
                accepted[slot] = node.clone();
            }
            None => {
                slot_by_id.insert(node.id.as_str(), accepted.len());
                accepted.push(node.clone());
            }
        }
    }

    let mut anchor: Option<String> = None;
    for node in accepted.iter_mut().filter(|node| node.is_me) {
        match &anchor {
            None => anchor = Some(node.id.clone()),
            Some(kept) => {
                issues.push(PayloadIssue::ExtraAnchor {
                    id: node.id.clone(),
                    anchor: kept.clone(),
                });
                node.is_me = false;
            }
        }
    }

    accepted
}

/// Runs one reconciliation against a measured viewport centered at `center`.
/// `dragging` names a body whose pin belongs to an in-flight drag.
pub(crate) fn reconcile(
    store: &mut NodeStore,
    payload: &GraphPayload,
    center: Vec2,
    dragging: Option<&str>,
) -> Reconciled {
    let mut report = ReconcileReport::default();
    let nodes = accepted_nodes(&payload.nodes, &mut report.issues);

    let mut topology = TopologyKey::default();
    for node in nodes {
        topology.nodes.insert(node.id.clone());
        if node.is_me {
            topology.anchor = Some(node.id.clone());
        }
        match store.upsert(node, center) {
            Upsert::Created(_) => report.created += 1,
            Upsert::Updated(_) => report.updated += 1,
        }
    }

    let present = topology.nodes.iter().map(String::as_str).collect::<HashSet<_>>();
    report.evicted = store.retain_ids(&present);
    store.assert_consistent();

    let mut edges = Vec::with_capacity(payload.links.len());
    for (index, link) in payload.links.iter().enumerate() {
        let source = store.index_of(&link.source);
        let target = store.index_of(&link.target);
        match (source, target) {
            (Some(source), Some(target)) => {
                topology
                    .edges
                    .insert(TopologyKey::edge_key(&link.source, &link.target));
                edges.push(Edge {
                    source,
                    target,
                    link: link.clone(),
                });
            }
            (None, _) => report.issues.push(PayloadIssue::DanglingLink {
                index,
                id: link.source.clone(),
            }),
            (_, None) => report.issues.push(PayloadIssue::DanglingLink {
                index,
                id: link.target.clone(),
            }),
        }
    }
    report.edges = edges.len();

    for body in store.all_mut() {
        if body.is_anchor() {
            body.pin_at(center);
        } else if dragging != Some(body.id()) {
            body.pin = None;
        }
    }

    for issue in &report.issues {
        tracing::warn!(%issue, "rejected payload entry");
    }

    Reconciled {
        edges,
        topology,
        report,
    }
}

pub(crate) fn classify(previous: Option<&TopologyKey>, next: &TopologyKey) -> ChangeKind {
    match previous {
        Some(previous) if previous == next => ChangeKind::Attributes,
        _ => ChangeKind::Topology,
    }
}
