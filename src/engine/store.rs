use std::collections::{HashMap, HashSet};

use eframe::egui::Vec2;

use crate::payload::GraphNode;
use crate::util::stable_direction;

/// Initial speed given to a freshly seeded body so coincident newcomers
/// drift apart along their hashed directions.
const SEED_SPEED: f32 = 1.5;

/// Simulated point for one graph node.
#[derive(Clone, Debug)]
pub struct Body {
    pub(crate) node: GraphNode,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) pin: Option<Vec2>,
}

impl Body {
    fn seeded(node: GraphNode, seed: Vec2, index: usize) -> Self {
        let velocity = if node.is_me {
            Vec2::ZERO
        } else {
            stable_direction(&node.id, index) * SEED_SPEED
        };
        Self {
            node,
            position: seed,
            velocity,
            pin: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.node.id
    }

    pub fn node(&self) -> &GraphNode {
        &self.node
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn pin(&self) -> Option<Vec2> {
        self.pin
    }

    pub fn is_pinned(&self) -> bool {
        self.pin.is_some()
    }

    pub fn is_anchor(&self) -> bool {
        self.node.is_me
    }

    pub(crate) fn pin_at(&mut self, point: Vec2) {
        self.pin = Some(point);
        self.position = point;
        self.velocity = Vec2::ZERO;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upsert {
    Created(usize),
    Updated(usize),
}

impl Upsert {
    pub fn index(self) -> usize {
        match self {
            Upsert::Created(index) | Upsert::Updated(index) => index,
        }
    }
}

/// Identity-keyed body storage.
///
/// Bodies live in a dense vector so the solver can walk them as a slice; the
/// id map gives O(1) lookup. Removal swaps the last body into the hole, so
/// indices are only stable between reconciliations.
#[derive(Debug, Default)]
pub struct NodeStore {
    bodies: Vec<Body>,
    index_by_id: HashMap<String, usize>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a body at `seed`, or replaces the attributes of an existing
    /// one while keeping its position, velocity and pin.
    pub fn upsert(&mut self, node: GraphNode, seed: Vec2) -> Upsert {
        if let Some(&index) = self.index_by_id.get(&node.id) {
            self.bodies[index].node = node;
            return Upsert::Updated(index);
        }

        let index = self.bodies.len();
        self.index_by_id.insert(node.id.clone(), index);
        self.bodies.push(Body::seeded(node, seed, index));
        Upsert::Created(index)
    }

    pub fn remove(&mut self, id: &str) -> Option<Body> {
        let index = self.index_by_id.remove(id)?;
        let removed = self.bodies.swap_remove(index);
        if let Some(moved) = self.bodies.get(index) {
            self.index_by_id.insert(moved.node.id.clone(), index);
        }
        self.assert_consistent();
        Some(removed)
    }

    /// Removes every body whose identity is not in `keep` and returns the
    /// evicted identities.
    pub fn retain_ids(&mut self, keep: &HashSet<&str>) -> Vec<String> {
        let stale = self
            .bodies
            .iter()
            .filter(|body| !keep.contains(body.id()))
            .map(|body| body.node.id.clone())
            .collect::<Vec<_>>();

        for id in &stale {
            self.remove(id);
        }
        stale
    }

    pub fn get(&self, id: &str) -> Option<&Body> {
        self.index_by_id.get(id).map(|&index| &self.bodies[index])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Body> {
        self.index_by_id
            .get(id)
            .copied()
            .map(|index| &mut self.bodies[index])
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn all(&self) -> &[Body] {
        &self.bodies
    }

    pub(crate) fn all_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
        self.index_by_id.clear();
    }

    /// A desync between the id map and the body vector is an engine bug.
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(
            self.bodies.len(),
            self.index_by_id.len(),
            "node store id map out of sync with bodies"
        );
        debug_assert!(
            self.bodies
                .iter()
                .enumerate()
                .all(|(index, body)| self.index_by_id.get(body.id()) == Some(&index)),
            "node store index points at the wrong body"
        );
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn upsert_preserves_physical_state() {
        let mut store = NodeStore::new();
        let created = store.upsert(GraphNode::new("a", "Ada"), vec2(400.0, 300.0));
        assert_eq!(created, Upsert::Created(0));

        let body = store.get_mut("a").expect("body exists");
        body.position = vec2(12.0, 34.0);
        body.pin = Some(vec2(12.0, 34.0));

        let mut renamed = GraphNode::new("a", "Ada L.");
        renamed.strength = 9.0;
        let updated = store.upsert(renamed, vec2(400.0, 300.0));
        assert_eq!(updated, Upsert::Updated(0));

        let body = store.get("a").expect("body exists");
        assert_eq!(body.position(), vec2(12.0, 34.0));
        assert_eq!(body.pin(), Some(vec2(12.0, 34.0)));
        assert_eq!(body.node().label, "Ada L.");
        assert_eq!(body.node().strength, 9.0);
    }

    #[test]
    fn new_bodies_start_at_seed_with_a_kick() {
        let mut store = NodeStore::new();
        store.upsert(GraphNode::new("a", ""), vec2(10.0, 20.0));
        store.upsert(GraphNode::me("me"), vec2(10.0, 20.0));

        let a = store.get("a").expect("body exists");
        assert_eq!(a.position(), vec2(10.0, 20.0));
        assert!(a.velocity().length() > 0.0);
        assert_eq!(store.get("me").expect("anchor").velocity(), Vec2::ZERO);
    }

    #[test]
    fn remove_keeps_index_map_consistent() {
        let mut store = NodeStore::new();
        for id in ["a", "b", "c", "d"] {
            store.upsert(GraphNode::new(id, id), Vec2::ZERO);
        }

        let removed = store.remove("b").expect("b was stored");
        assert_eq!(removed.id(), "b");
        assert_eq!(store.len(), 3);
        for id in ["a", "c", "d"] {
            let index = store.index_of(id).expect("still stored");
            assert_eq!(store.all()[index].id(), id);
        }
        assert!(store.remove("b").is_none());
    }

    #[test]
    fn retain_evicts_stale_ids() {
        let mut store = NodeStore::new();
        for id in ["a", "b", "c"] {
            store.upsert(GraphNode::new(id, id), Vec2::ZERO);
        }

        let keep = HashSet::from(["a"]);
        let mut evicted = store.retain_ids(&keep);
        evicted.sort();
        assert_eq!(evicted, vec!["b".to_owned(), "c".to_owned()]);
        assert_eq!(store.len(), 1);
        assert!(store.get("a").is_some());
    }
}
