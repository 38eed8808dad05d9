//! Visual projection of the simulation.
//!
//! Derived attributes (radius, colors, card layout, highlight state) are
//! cached and rebuilt only when the data, filter, selection or search change.
//! `frame` runs every tick and only maps body positions through the camera.

use std::collections::{HashMap, HashSet};

use eframe::egui::{Color32, Pos2, Rect, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::payload::{Filter, GraphLink, GraphNode};
use crate::util::distance_to_segment;

use super::Edge;
use super::interaction::Transform;
use super::store::Body;

pub const VERIFIED_COLOR: Color32 = Color32::from_rgb(0x10, 0xb9, 0x81);
pub const PENDING_COLOR: Color32 = Color32::from_rgb(0xf5, 0x9e, 0x0b);
pub const SEARCH_COLOR: Color32 = Color32::from_rgb(0x63, 0x66, 0xf1);

const BASE_RADIUS: f32 = 24.0;
const MAX_RADIUS_BONUS: f32 = 16.0;
/// Distance from the node center to the stat card's anchor line.
pub const CARD_OFFSET: f32 = 36.0;
const CARD_TOP: f32 = -12.0;
const CHAR_WIDTH: f32 = 7.0;
const CARD_PADDING: f32 = 24.0;

const DIMMED_NODE_OPACITY: f32 = 0.1;
const DIMMED_EDGE_OPACITY: f32 = 0.05;
const RESTING_EDGE_OPACITY: f32 = 0.6;
const EDGE_HIT_SLOP: f32 = 4.0;

pub fn node_radius(strength: f32) -> f32 {
    BASE_RADIUS + (strength.max(0.0) * 2.0).min(MAX_RADIUS_BONUS)
}

pub fn ring_color(node: &GraphNode) -> Color32 {
    if node.status_mix.verified >= node.status_mix.pending {
        VERIFIED_COLOR
    } else {
        PENDING_COLOR
    }
}

pub fn ring_width(node: &GraphNode) -> f32 {
    if node.status_mix.verified > 0 { 3.0 } else { 2.0 }
}

pub fn edge_color(link: &GraphLink) -> Color32 {
    if link.pending_count > 0 {
        PENDING_COLOR
    } else {
        VERIFIED_COLOR
    }
}

pub fn edge_width(link: &GraphLink) -> f32 {
    (link.verified_count.saturating_add(1) as f32).clamp(2.0, 6.0)
}

pub fn display_name(node: &GraphNode) -> &str {
    if node.is_me {
        "You"
    } else if node.label.trim().is_empty() {
        &node.id
    } else {
        &node.label
    }
}

pub fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

/// Name plate drawn under a node, with optional OUT/IN counters.
#[derive(Clone, Debug, PartialEq)]
pub struct StatCard {
    pub width: f32,
    pub height: f32,
    /// Vertical offset of the name baseline inside the card.
    pub name_offset: f32,
    pub sent: Option<u32>,
    pub received: Option<u32>,
}

impl StatCard {
    pub fn new(name: &str, sent: u32, received: u32, filter: Filter) -> Self {
        let sent = (filter.shows_sent() && sent > 0).then_some(sent);
        let received = (filter.shows_received() && received > 0).then_some(received);
        let has_stats = sent.is_some() || received.is_some();

        let stats_width = match (sent, received) {
            (Some(_), Some(_)) => 72.0,
            (None, None) => 0.0,
            _ => 40.0,
        };

        Self {
            width: (name.chars().count() as f32 * CHAR_WIDTH + CARD_PADDING).max(stats_width),
            height: if has_stats { 44.0 } else { 24.0 },
            name_offset: if has_stats { 26.0 } else { 5.0 },
            sent,
            received,
        }
    }

    pub fn has_stats(&self) -> bool {
        self.sent.is_some() || self.received.is_some()
    }

    /// Card rectangle in screen space for a node drawn at `center`.
    pub fn rect(&self, center: Pos2, scale: f32) -> Rect {
        let top_left = center + vec2(-self.width * 0.5, CARD_OFFSET + CARD_TOP) * scale;
        Rect::from_min_size(top_left, vec2(self.width, self.height) * scale)
    }

    pub fn name_anchor(&self, center: Pos2, scale: f32) -> Pos2 {
        center + vec2(0.0, CARD_OFFSET + self.name_offset) * scale
    }

    /// Baseline of the OUT/IN counter row.
    pub fn stats_anchor(&self, center: Pos2, scale: f32) -> Pos2 {
        center + vec2(0.0, CARD_OFFSET + 14.0) * scale
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeVisual {
    pub name: String,
    pub radius: f32,
    pub ring_color: Color32,
    pub ring_width: f32,
    pub opacity: f32,
    pub card: StatCard,
    pub anchor: bool,
    pub selected: bool,
    pub matched: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeVisual {
    pub color: Color32,
    pub width: f32,
    pub opacity: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct NodePrimitive<'a> {
    pub index: usize,
    pub center: Pos2,
    /// Radius in screen pixels.
    pub radius: f32,
    pub visual: &'a NodeVisual,
}

#[derive(Clone, Copy, Debug)]
pub struct EdgePrimitive<'a> {
    pub index: usize,
    pub from: Pos2,
    pub to: Pos2,
    /// Stroke width in screen pixels.
    pub width: f32,
    pub visual: &'a EdgeVisual,
}

/// Everything a painter needs for one tick, in viewport-relative screen
/// coordinates. Edges come first so nodes are drawn on top.
#[derive(Clone, Debug)]
pub struct Frame<'a> {
    pub transform: Transform,
    pub edges: Vec<EdgePrimitive<'a>>,
    pub nodes: Vec<NodePrimitive<'a>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    Node(usize),
    Edge(usize),
}

fn fuzzy_matches(matcher: &SkimMatcherV2, text: &str, query: &str) -> bool {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
        .is_some()
}

/// Gave/received of a neighbour, counted only over links with the selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct RelativeStats {
    gave: u32,
    received: u32,
}

fn relative_stats<'a>(selected: &str, edges: &'a [Edge]) -> HashMap<&'a str, RelativeStats> {
    let mut stats: HashMap<&'a str, RelativeStats> = HashMap::new();
    for edge in edges {
        let link = &edge.link;
        if link.source == link.target {
            continue;
        }
        if link.source == selected {
            let entry = stats.entry(link.target.as_str()).or_default();
            entry.received += link.sent_count;
            entry.gave += link.received_count;
        } else if link.target == selected {
            let entry = stats.entry(link.source.as_str()).or_default();
            entry.gave += link.sent_count;
            entry.received += link.received_count;
        }
    }
    stats
}

pub struct Projector {
    nodes: Vec<NodeVisual>,
    edges: Vec<EdgeVisual>,
    filter: Filter,
    selected: Option<String>,
    search: String,
    matcher: SkimMatcherV2,
    rebuilds: u64,
}

impl std::fmt::Debug for Projector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Projector")
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("filter", &self.filter)
            .field("selected", &self.selected)
            .field("search", &self.search)
            .field("rebuilds", &self.rebuilds)
            .finish()
    }
}

impl Default for Projector {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            filter: Filter::All,
            selected: None,
            search: String::new(),
            matcher: SkimMatcherV2::default(),
            rebuilds: 0,
        }
    }
}

impl Projector {
    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// How many times the cached visuals were recomputed.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn node_visuals(&self) -> &[NodeVisual] {
        &self.nodes
    }

    pub fn edge_visuals(&self) -> &[EdgeVisual] {
        &self.edges
    }

    /// Returns whether the setting changed; the caller rebuilds if so.
    pub(crate) fn set_filter(&mut self, filter: Filter) -> bool {
        let changed = self.filter != filter;
        self.filter = filter;
        changed
    }

    pub(crate) fn set_selected(&mut self, selected: Option<String>) -> bool {
        let changed = self.selected != selected;
        self.selected = selected;
        changed
    }

    pub(crate) fn set_search(&mut self, query: &str) -> bool {
        let query = query.trim();
        let changed = self.search != query;
        if changed {
            self.search = query.to_owned();
        }
        changed
    }

    pub(crate) fn rebuild(&mut self, bodies: &[Body], edges: &[Edge]) {
        if let Some(selected) = &self.selected
            && !bodies.iter().any(|body| body.id() == selected)
        {
            self.selected = None;
        }

        let selected = self.selected.as_deref();
        let mut neighbours = HashSet::new();
        let relative = selected.map(|id| relative_stats(id, edges)).unwrap_or_default();
        if let Some(selected) = selected {
            neighbours.insert(selected);
            for edge in edges {
                if let Some(other) = edge.link.other_end(selected) {
                    neighbours.insert(other);
                }
            }
        }

        self.nodes.clear();
        self.nodes.reserve(bodies.len());
        for body in bodies {
            let node = body.node();
            let name = display_name(node).to_owned();
            let is_selected = selected == Some(body.id());

            let (sent, received) = match relative.get(body.id()) {
                Some(stats) if !is_selected => (stats.gave, stats.received),
                _ => (node.sent(), node.received()),
            };
            let card = StatCard::new(&name, sent, received, self.filter);

            let matched =
                !self.search.is_empty() && fuzzy_matches(&self.matcher, &name, &self.search);
            let base = ring_color(node);
            let ring_color = if matched {
                blend_color(base, SEARCH_COLOR, 0.65)
            } else {
                base
            };

            let opacity = if selected.is_none() || neighbours.contains(body.id()) {
                1.0
            } else {
                DIMMED_NODE_OPACITY
            };

            self.nodes.push(NodeVisual {
                radius: node_radius(node.strength),
                ring_color,
                ring_width: ring_width(node),
                opacity,
                card,
                anchor: node.is_me,
                selected: is_selected,
                matched,
                name,
            });
        }

        self.edges.clear();
        self.edges.extend(edges.iter().map(|edge| {
            let opacity = match selected {
                None => RESTING_EDGE_OPACITY,
                Some(id) if edge.link.touches(id) => 1.0,
                Some(_) => DIMMED_EDGE_OPACITY,
            };
            EdgeVisual {
                color: edge_color(&edge.link),
                width: edge_width(&edge.link),
                opacity,
            }
        }));

        self.rebuilds += 1;
        tracing::trace!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            rebuilds = self.rebuilds,
            "projection rebuilt"
        );
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.selected = None;
        self.search.clear();
    }

    fn assert_in_sync(&self, bodies: &[Body], edges: &[Edge]) {
        assert_eq!(
            self.nodes.len(),
            bodies.len(),
            "projection out of sync with node store"
        );
        assert_eq!(
            self.edges.len(),
            edges.len(),
            "projection out of sync with edge list"
        );
    }

    pub(crate) fn frame<'a>(
        &'a self,
        bodies: &[Body],
        edges: &[Edge],
        transform: Transform,
    ) -> Frame<'a> {
        self.assert_in_sync(bodies, edges);

        let edges = edges
            .iter()
            .zip(&self.edges)
            .enumerate()
            .map(|(index, (edge, visual))| EdgePrimitive {
                index,
                from: transform.world_to_screen(bodies[edge.source].position()),
                to: transform.world_to_screen(bodies[edge.target].position()),
                width: visual.width * transform.scale,
                visual,
            })
            .collect();

        let nodes = bodies
            .iter()
            .zip(&self.nodes)
            .enumerate()
            .map(|(index, (body, visual))| NodePrimitive {
                index,
                center: transform.world_to_screen(body.position()),
                radius: visual.radius * transform.scale,
                visual,
            })
            .collect();

        Frame {
            transform,
            edges,
            nodes,
        }
    }

    /// Topmost primitive under `at` (viewport-relative screen position).
    pub(crate) fn hit_test(
        &self,
        bodies: &[Body],
        edges: &[Edge],
        transform: Transform,
        at: Pos2,
    ) -> Option<Hit> {
        self.assert_in_sync(bodies, edges);

        for (index, (body, visual)) in bodies.iter().zip(&self.nodes).enumerate().rev() {
            let center = transform.world_to_screen(body.position());
            let radius = visual.radius * transform.scale;
            let on_card = visual.card.rect(center, transform.scale).contains(at);
            if center.distance(at) <= radius || on_card {
                return Some(Hit::Node(index));
            }
        }

        let point = at.to_vec2();
        edges
            .iter()
            .zip(&self.edges)
            .enumerate()
            .rev()
            .find(|(_, (edge, visual))| {
                let from = transform.world_to_screen(bodies[edge.source].position()).to_vec2();
                let to = transform.world_to_screen(bodies[edge.target].position()).to_vec2();
                let tolerance = (visual.width * transform.scale * 0.5).max(EDGE_HIT_SLOP);
                distance_to_segment(point, from, to) <= tolerance
            })
            .map(|(index, _)| Hit::Edge(index))
    }
}
