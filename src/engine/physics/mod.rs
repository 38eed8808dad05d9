mod forces;
mod quadtree;

use std::f32::consts::TAU;

use eframe::egui::Vec2;

use crate::config::LayoutConfig;

use super::Edge;
use super::store::Body;
use forces::{ChargeParams, CollisionParams, CollisionPass, accumulate_charge, separation};
use quadtree::QuadTree;

/// Spacing factor for the ring of neighbours around a hub.
const SEAT_SLACK: f32 = 1.25;

/// Scratch buffers reused across steps so a tick does not allocate.
#[derive(Debug, Default)]
struct PhysicsScratch {
    positions: Vec<Vec2>,
    pinned: Vec<bool>,
    impulses: Vec<Vec2>,
    degrees: Vec<u32>,
}

/// Fixed-step integrator. Charge and link forces feed body velocities, the
/// velocities are damped, and collision then corrects them so the step never
/// lands overlapping bodies on top of each other.
#[derive(Debug, Default)]
pub(crate) struct Solver {
    scratch: PhysicsScratch,
}

impl Solver {
    /// Advances every body by one step at energy `alpha`. `center` enables
    /// the centering force. Returns whether anything is still moving.
    pub(crate) fn step(
        &mut self,
        bodies: &mut [Body],
        edges: &[Edge],
        alpha: f32,
        config: &LayoutConfig,
        center: Option<Vec2>,
    ) -> bool {
        if bodies.is_empty() {
            return false;
        }

        self.scratch.pinned.clear();
        self.scratch
            .pinned
            .extend(bodies.iter().map(|body| body.pin.is_some()));

        self.apply_charge(bodies, alpha, config);
        self.apply_links(bodies, edges, alpha, config);
        if let Some(center) = center {
            apply_centering(bodies, center, config.center_strength);
        }
        damp(bodies, config);
        for _ in 0..config.collision_iterations {
            self.apply_collision(bodies, config);
        }

        advance(bodies)
    }

    fn apply_charge(&mut self, bodies: &mut [Body], alpha: f32, config: &LayoutConfig) {
        if bodies.len() < 2 || config.charge_strength == 0.0 {
            return;
        }

        let positions = &mut self.scratch.positions;
        positions.clear();
        positions.extend(bodies.iter().map(|body| body.position));

        let Some(tree) = QuadTree::build(positions, &self.scratch.pinned) else {
            return;
        };
        let params = ChargeParams {
            strength: config.charge_strength * alpha,
            distance_min_sq: config.charge_distance_min * config.charge_distance_min,
            theta_sq: config.charge_theta * config.charge_theta,
        };

        for (index, body) in bodies.iter_mut().enumerate() {
            body.velocity += accumulate_charge(&tree, tree.root(), index, positions, params);
        }
    }

    fn apply_links(
        &mut self,
        bodies: &mut [Body],
        edges: &[Edge],
        alpha: f32,
        config: &LayoutConfig,
    ) {
        let count = bodies.len();
        let degrees = &mut self.scratch.degrees;
        degrees.clear();
        degrees.resize(count, 0);
        for edge in edges {
            if edge.source < count && edge.target < count && edge.source != edge.target {
                degrees[edge.source] += 1;
                degrees[edge.target] += 1;
            }
        }

        for edge in edges {
            let (source, target) = (edge.source, edge.target);
            if source >= count || target >= count || source == target {
                continue;
            }

            let predicted_source = bodies[source].position + bodies[source].velocity;
            let predicted_target = bodies[target].position + bodies[target].velocity;
            let delta = separation(predicted_target - predicted_source, source, target);
            let distance = delta.length();

            let rest = rest_length(config, degrees[source].max(degrees[target]));
            let stretch = (distance - rest) / distance * alpha * config.link_strength;
            let correction = delta * stretch;
            let bias = degrees[source] as f32 / (degrees[source] + degrees[target]) as f32;

            bodies[target].velocity -= correction * bias;
            bodies[source].velocity += correction * (1.0 - bias);
        }
    }

    fn apply_collision(&mut self, bodies: &mut [Body], config: &LayoutConfig) {
        if bodies.len() < 2 || config.collision_strength == 0.0 {
            return;
        }

        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch
            .positions
            .extend(bodies.iter().map(|body| body.pin.unwrap_or(body.position + body.velocity)));
        scratch.impulses.clear();
        scratch.impulses.resize(bodies.len(), Vec2::ZERO);

        let Some(tree) = QuadTree::build(&scratch.positions, &scratch.pinned) else {
            return;
        };
        let pass = CollisionPass {
            tree: &tree,
            predicted: &scratch.positions,
            pinned: &scratch.pinned,
            params: CollisionParams {
                radius: config.collision_radius,
                strength: config.collision_strength,
            },
        };
        pass.run(&mut scratch.impulses);

        for (body, impulse) in bodies.iter_mut().zip(&scratch.impulses) {
            body.velocity += *impulse;
        }
    }
}

/// Link rest length for an edge whose busier end has `degree` links: the
/// configured distance, stretched so that many neighbours can sit around a
/// hub on a ring without overlapping.
fn rest_length(config: &LayoutConfig, degree: u32) -> f32 {
    if config.collision_strength <= 0.0 {
        return config.link_distance;
    }
    let ring = degree as f32 * config.collision_radius * 2.0 * SEAT_SLACK / TAU;
    config.link_distance.max(ring)
}

/// Shifts free bodies so their mean drifts toward `center`.
fn apply_centering(bodies: &mut [Body], center: Vec2, strength: f32) {
    if strength <= 0.0 {
        return;
    }

    let mut sum = Vec2::ZERO;
    let mut free = 0usize;
    for body in bodies.iter().filter(|body| body.pin.is_none()) {
        sum += body.position;
        free += 1;
    }
    if free == 0 {
        return;
    }

    let shift = (center - sum / free as f32) * strength;
    for body in bodies.iter_mut().filter(|body| body.pin.is_none()) {
        body.position += shift;
    }
}

/// Applies velocity decay and the speed clamp. Pinned bodies stop.
fn damp(bodies: &mut [Body], config: &LayoutConfig) {
    let retain = 1.0 - config.velocity_decay;
    let max_speed = config.max_speed;

    for body in bodies.iter_mut() {
        if body.pin.is_some() {
            body.velocity = Vec2::ZERO;
            continue;
        }

        let mut velocity = body.velocity * retain;
        if !velocity.x.is_finite() || !velocity.y.is_finite() {
            velocity = Vec2::ZERO;
        }
        let speed = velocity.length();
        if speed > max_speed {
            velocity *= max_speed / speed;
        }
        body.velocity = velocity;
    }
}

/// Moves free bodies by their velocity and puts pinned ones on their pin.
fn advance(bodies: &mut [Body]) -> bool {
    let mut any_motion = false;
    for body in bodies.iter_mut() {
        if let Some(pin) = body.pin {
            body.position = pin;
            body.velocity = Vec2::ZERO;
            continue;
        }
        if !body.velocity.x.is_finite() || !body.velocity.y.is_finite() {
            body.velocity = Vec2::ZERO;
        }
        body.position += body.velocity;
        any_motion |= body.velocity.length_sq() > 1e-6;
    }
    any_motion
}
