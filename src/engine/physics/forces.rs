use eframe::egui::Vec2;

use crate::util::golden_direction;

use super::quadtree::{Cell, QuadTree};

/// Below this squared length two points are treated as coincident.
const COINCIDENT_SQ: f32 = 1e-12;
const NUDGE: f32 = 1e-3;

/// Returns `delta`, or a tiny deterministic offset when it degenerates.
pub(super) fn separation(delta: Vec2, a: usize, b: usize) -> Vec2 {
    if delta.length_sq() < COINCIDENT_SQ || !delta.x.is_finite() || !delta.y.is_finite() {
        golden_direction(a, b) * NUDGE
    } else {
        delta
    }
}

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    /// Charge strength already multiplied by alpha.
    pub(super) strength: f32,
    pub(super) distance_min_sq: f32,
    pub(super) theta_sq: f32,
}

fn charge_between(
    point: Vec2,
    other: Vec2,
    index: usize,
    other_index: usize,
    params: ChargeParams,
) -> Vec2 {
    let delta = separation(other - point, index, other_index);
    delta * (params.strength / delta.length_sq().max(params.distance_min_sq))
}

/// Velocity change on `index` from every other point, approximating far
/// cells by their center of mass.
pub(super) fn accumulate_charge(
    tree: &QuadTree,
    cell: &Cell,
    index: usize,
    positions: &[Vec2],
    params: ChargeParams,
) -> Vec2 {
    if cell.mass <= 0.0 {
        return Vec2::ZERO;
    }

    let point = positions[index];
    if cell.is_leaf() {
        return tree
            .items(cell)
            .iter()
            .filter(|&&other| other != index)
            .map(|&other| charge_between(point, positions[other], index, other, params))
            .fold(Vec2::ZERO, |total, push| total + push);
    }

    let delta = cell.center_of_mass - point;
    let distance_sq = delta.length_sq();
    let side = cell.square.side();
    if !cell.square.contains(point) && side * side / params.theta_sq < distance_sq {
        let falloff = distance_sq.max(params.distance_min_sq);
        return delta * (params.strength * cell.mass / falloff);
    }

    tree.children(cell)
        .iter()
        .map(|child| accumulate_charge(tree, child, index, positions, params))
        .fold(Vec2::ZERO, |total, push| total + push)
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) radius: f32,
    pub(super) strength: f32,
}

impl CollisionParams {
    /// Center distance at which two bodies start to overlap.
    pub(super) fn reach(self) -> f32 {
        self.radius * 2.0
    }
}

/// One collision pass over predicted positions. Pairs are found with a
/// dual-tree walk; cells whose points are all pinned never interact.
pub(super) struct CollisionPass<'a> {
    pub(super) tree: &'a QuadTree,
    pub(super) predicted: &'a [Vec2],
    pub(super) pinned: &'a [bool],
    pub(super) params: CollisionParams,
}

impl CollisionPass<'_> {
    /// Adds the separating velocity of every overlapping pair to `impulses`.
    /// A body's total push per pass is capped at one reach so a crowded
    /// start cannot fling it across the layout.
    pub(super) fn run(&self, impulses: &mut [Vec2]) {
        let root = self.tree.root();
        self.visit(root, root, true, impulses);

        let cap = self.params.reach();
        for impulse in impulses.iter_mut() {
            let length = impulse.length();
            if length > cap {
                *impulse *= cap / length;
            }
        }
    }

    fn visit(&self, a: &Cell, b: &Cell, same: bool, impulses: &mut [Vec2]) {
        let reach = self.params.reach();
        if (a.fixed && b.fixed) || a.extent.gap_sq(b.extent) >= reach * reach {
            return;
        }

        match (a.is_leaf(), b.is_leaf()) {
            (true, true) => self.leaf_pairs(a, b, same, impulses),
            _ if same => {
                let children = self.tree.children(a);
                for (position, first) in children.iter().enumerate() {
                    self.visit(first, first, true, impulses);
                    for second in &children[position + 1..] {
                        self.visit(first, second, false, impulses);
                    }
                }
            }
            (false, true) => self.descend_first(a, b, impulses),
            (true, false) => self.descend_first(b, a, impulses),
            (false, false) => {
                if a.square.half >= b.square.half {
                    self.descend_first(a, b, impulses);
                } else {
                    self.descend_first(b, a, impulses);
                }
            }
        }
    }

    fn descend_first(&self, inner: &Cell, other: &Cell, impulses: &mut [Vec2]) {
        for child in self.tree.children(inner) {
            self.visit(child, other, false, impulses);
        }
    }

    fn leaf_pairs(&self, a: &Cell, b: &Cell, same: bool, impulses: &mut [Vec2]) {
        let first = self.tree.items(a);
        if same {
            for (position, &from) in first.iter().enumerate() {
                for &to in &first[position + 1..] {
                    self.resolve(from, to, impulses);
                }
            }
            return;
        }
        for &from in first {
            for &to in self.tree.items(b) {
                self.resolve(from, to, impulses);
            }
        }
    }

    /// Pushes an overlapping pair apart. A pinned side does not move, so the
    /// free side takes the whole correction.
    pub(super) fn resolve(&self, from: usize, to: usize, impulses: &mut [Vec2]) {
        let (from_share, to_share) = match (self.pinned[from], self.pinned[to]) {
            (true, true) => return,
            (true, false) => (0.0, 1.0),
            (false, true) => (1.0, 0.0),
            (false, false) => (0.5, 0.5),
        };

        let reach = self.params.reach();
        let raw = self.predicted[from] - self.predicted[to];
        if raw.length_sq() >= reach * reach {
            return;
        }

        let delta = separation(raw, from, to);
        let distance = delta.length();
        let push = delta * ((reach - distance) / distance * self.params.strength);
        impulses[from] += push * from_share;
        impulses[to] -= push * to_share;
    }
}
