use std::collections::BTreeSet;

use eframe::egui::vec2;
use orbit_graph::{
    Body, GraphLink, GraphNode, GraphPayload, LayoutConfig, Simulation, Viewport,
};
use proptest::prelude::*;

const MAX_NODES: usize = 60;

const VIEWPORT: Viewport = Viewport {
    width: 1024.0,
    height: 768.0,
};

/// A random tree: node `i > 0` hangs off `parents[i - 1] % i`.
#[derive(Clone, Debug)]
struct Tree {
    size: usize,
    parents: Vec<u32>,
    anchor: Option<usize>,
}

impl Tree {
    fn payload(&self) -> GraphPayload {
        let nodes = (0..self.size)
            .map(|index| node(index, self.anchor == Some(index)))
            .collect();
        let links = (1..self.size)
            .map(|index| {
                let parent = self.parents[index - 1] as usize % index;
                GraphLink::new(format!("n{parent}"), format!("n{index}"))
            })
            .collect();
        GraphPayload::new(nodes, links)
    }
}

fn node(index: usize, anchor: bool) -> GraphNode {
    if anchor {
        GraphNode::me(format!("n{index}"))
    } else {
        GraphNode::new(format!("n{index}"), format!("Node {index}"))
    }
}

/// Hub `n0` linked to every other node.
fn star(size: usize, anchored: bool) -> GraphPayload {
    let nodes = (0..size).map(|index| node(index, anchored && index == 0)).collect();
    let links = (1..size)
        .map(|index| GraphLink::new("n0", format!("n{index}")))
        .collect();
    GraphPayload::new(nodes, links)
}

fn complete(size: usize) -> GraphPayload {
    let nodes = (0..size).map(|index| node(index, index == 0)).collect();
    let mut links = Vec::new();
    for source in 0..size {
        for target in (source + 1)..size {
            links.push(GraphLink::new(format!("n{source}"), format!("n{target}")));
        }
    }
    GraphPayload::new(nodes, links)
}

fn tree() -> impl Strategy<Value = Tree> {
    (1usize..=MAX_NODES).prop_flat_map(|size| {
        (
            Just(size),
            prop::collection::vec(any::<u32>(), size - 1),
            prop::option::of(0..size),
        )
            .prop_map(|(size, parents, anchor)| Tree {
                size,
                parents,
                anchor,
            })
    })
}

fn settled(payload: &GraphPayload) -> Simulation {
    let mut simulation = Simulation::default();
    simulation.reconcile(payload, VIEWPORT);
    simulation
}

/// The two closest bodies that are not pinned, with their distance.
fn closest_free_pair(simulation: &Simulation) -> Option<(&Body, &Body, f32)> {
    let free = simulation
        .bodies()
        .iter()
        .filter(|body| !body.is_pinned())
        .collect::<Vec<_>>();
    let mut closest: Option<(&Body, &Body, f32)> = None;
    for (offset, a) in free.iter().enumerate() {
        for b in &free[offset + 1..] {
            let distance = (a.position() - b.position()).length();
            if closest.is_none_or(|(_, _, best)| distance < best) {
                closest = Some((a, b, distance));
            }
        }
    }
    closest
}

fn assert_no_overlaps(simulation: &Simulation) {
    let radius = LayoutConfig::default().collision_radius;
    for body in simulation.bodies() {
        assert!(body.position().x.is_finite() && body.position().y.is_finite());
    }
    if let Some((a, b, distance)) = closest_free_pair(simulation) {
        assert!(
            distance >= radius - 1.0,
            "{} and {} overlap at {distance}",
            a.id(),
            b.id()
        );
    }
}

#[test]
fn growing_star_stays_apart_after_every_reconcile() {
    let mut simulation = Simulation::default();
    for size in 1..=30 {
        simulation.reconcile(&star(size, true), VIEWPORT);
        assert_no_overlaps(&simulation);
    }
}

#[test]
fn complete_graph_stays_apart() {
    let simulation = settled(&complete(10));
    assert_eq!(simulation.edges().len(), 45);
    assert_no_overlaps(&simulation);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn only_the_anchor_is_pinned(tree in tree()) {
        let simulation = settled(&tree.payload());
        let center = vec2(512.0, 384.0);

        for body in simulation.bodies() {
            if tree.anchor.is_some_and(|index| body.id() == format!("n{index}")) {
                prop_assert_eq!(body.pin(), Some(center));
                prop_assert_eq!(body.position(), center);
            } else {
                prop_assert_eq!(body.pin(), None);
            }
        }
    }

    #[test]
    fn store_matches_the_latest_payload(
        tree in tree(),
        keep in prop::collection::vec(any::<bool>(), MAX_NODES),
    ) {
        let full = tree.payload();
        let mut simulation = settled(&full);

        let mut smaller = full.clone();
        smaller.nodes.retain(|node| {
            let index = node.id[1..].parse::<usize>().unwrap_or(0);
            keep[index]
        });
        let report = simulation.reconcile(&smaller, VIEWPORT);

        let expected = smaller.nodes.iter().map(|node| node.id.as_str()).collect::<BTreeSet<_>>();
        let actual = simulation.bodies().iter().map(|body| body.id()).collect::<BTreeSet<_>>();
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(report.evicted.len(), full.nodes.len() - smaller.nodes.len());
        for edge in simulation.edges() {
            prop_assert!(edge.source() < simulation.bodies().len());
            prop_assert!(edge.target() < simulation.bodies().len());
        }
    }

    #[test]
    fn dangling_links_never_become_edges(tree in tree(), ghosts in 1usize..4) {
        let mut payload = tree.payload();
        let real_links = payload.links.len();
        for ghost in 0..ghosts {
            payload.links.push(GraphLink::new("n0", format!("ghost-{ghost}")));
        }

        let simulation = settled(&payload);
        prop_assert_eq!(simulation.edges().len(), real_links);
        prop_assert_eq!(simulation.frame().edges.len(), real_links);
    }

    #[test]
    fn warmup_resolves_overlaps(tree in tree()) {
        let simulation = settled(&tree.payload());
        let radius = LayoutConfig::default().collision_radius;

        for body in simulation.bodies() {
            prop_assert!(body.position().x.is_finite() && body.position().y.is_finite());
        }
        if let Some((a, b, distance)) = closest_free_pair(&simulation) {
            prop_assert!(
                distance >= radius - 1.0,
                "{} and {} overlap at {}", a.id(), b.id(), distance
            );
        }
    }

    #[test]
    fn warmup_spreads_a_crowded_star(size in 20usize..=MAX_NODES, anchored in any::<bool>()) {
        let simulation = settled(&star(size, anchored));
        let radius = LayoutConfig::default().collision_radius;

        if let Some((a, b, distance)) = closest_free_pair(&simulation) {
            prop_assert!(
                distance >= radius - 1.0,
                "{} and {} overlap at {}", a.id(), b.id(), distance
            );
        }
    }

    #[test]
    fn reconciling_twice_is_still(tree in tree()) {
        let payload = tree.payload();
        let mut simulation = settled(&payload);
        let before = simulation.bodies().iter().map(|body| body.position()).collect::<Vec<_>>();

        simulation.reconcile(&payload, VIEWPORT);
        for (body, previous) in simulation.bodies().iter().zip(before) {
            prop_assert!((body.position() - previous).length() < 1e-4);
        }
    }
}
