//! Incremental force-directed layout engine.
//!
//! [`Simulation`] is the long-lived context a host owns for as long as the
//! graph view exists. The host feeds it payloads and viewport sizes, ticks it
//! once per frame, forwards pointer input, and paints [`Frame`]s.

mod energy;
mod interaction;
mod physics;
mod projector;
mod reconcile;
mod store;

use eframe::egui::{Pos2, Vec2};

use crate::config::LayoutConfig;
use crate::error::ConfigError;
use crate::payload::{Filter, GraphLink, GraphNode, GraphPayload};

pub use energy::{Energy, EnergyState};
pub use interaction::{CLICK_SLOP, Transform, Viewport};
pub use projector::{
    CARD_OFFSET, EdgePrimitive, EdgeVisual, Frame, Hit, NodePrimitive, NodeVisual, PENDING_COLOR,
    Projector, SEARCH_COLOR, StatCard, VERIFIED_COLOR, blend_color, display_name, edge_color,
    edge_width, node_radius, ring_color, ring_width,
};
pub use reconcile::{ChangeKind, ReconcileReport};
pub use store::{Body, NodeStore, Upsert};

use interaction::{Interaction, PointerAction, PressTarget};
use physics::Solver;
use reconcile::{Reconciled, TopologyKey};

/// A payload link resolved to body indices in the store.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub(crate) source: usize,
    pub(crate) target: usize,
    pub(crate) link: GraphLink,
}

impl Edge {
    pub fn source(&self) -> usize {
        self.source
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn link(&self) -> &GraphLink {
        &self.link
    }
}

/// Result of a click, carrying the full attribute payload of what was hit.
#[derive(Clone, Debug, PartialEq)]
pub enum Click {
    Node(GraphNode),
    Edge(GraphLink),
    Background,
}

type NodeClickHandler = Box<dyn FnMut(&GraphNode)>;
type EdgeClickHandler = Box<dyn FnMut(&GraphLink)>;

pub struct Simulation {
    config: LayoutConfig,
    viewport: Viewport,
    store: NodeStore,
    edges: Vec<Edge>,
    solver: Solver,
    energy: Energy,
    interaction: Interaction,
    projector: Projector,
    topology: Option<TopologyKey>,
    pending: Option<GraphPayload>,
    on_node_click: Option<NodeClickHandler>,
    on_edge_click: Option<EdgeClickHandler>,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("viewport", &self.viewport)
            .field("bodies", &self.store.len())
            .field("edges", &self.edges.len())
            .field("energy", &self.energy)
            .field("transform", &self.interaction.transform)
            .field("dragging", &self.interaction.dragging)
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::with_valid_config(LayoutConfig::default())
    }
}

impl Simulation {
    /// Builds an idle, empty simulation. Fails when `config` does not pass
    /// [`LayoutConfig::validate`].
    pub fn new(config: LayoutConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: LayoutConfig) -> Self {
        Self {
            config,
            viewport: Viewport::UNMEASURED,
            store: NodeStore::new(),
            edges: Vec::new(),
            solver: Solver::default(),
            energy: Energy::default(),
            interaction: Interaction::default(),
            projector: Projector::default(),
            topology: None,
            pending: None,
            on_node_click: None,
            on_edge_click: None,
        }
    }

    /// Tears the layout down to the initial idle, empty state and drops the
    /// click handlers. The instance can be fed a new payload afterwards.
    pub fn dispose(&mut self) {
        self.store.clear();
        self.edges.clear();
        self.energy.reset();
        self.interaction.reset();
        self.projector.clear();
        self.topology = None;
        self.pending = None;
        self.on_node_click = None;
        self.on_edge_click = None;
        tracing::debug!("simulation disposed");
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Merges `payload` into the layout for a viewport of size `viewport`.
    ///
    /// Topology changes are pre-settled synchronously; attribute-only changes
    /// only refresh the projection. While the viewport is unmeasured the
    /// payload is held back and applied by the next measured `set_viewport`.
    pub fn reconcile(&mut self, payload: &GraphPayload, viewport: Viewport) -> ReconcileReport {
        self.viewport = viewport;
        let Some(center) = viewport.center() else {
            tracing::debug!(
                nodes = payload.nodes.len(),
                "viewport not measured yet, deferring payload"
            );
            self.pending = Some(payload.clone());
            return ReconcileReport::deferred();
        };

        self.pending = None;
        self.apply(payload, center)
    }

    fn apply(&mut self, payload: &GraphPayload, center: Vec2) -> ReconcileReport {
        let dragging = self.interaction.dragging.clone();
        let Reconciled {
            edges,
            topology,
            mut report,
        } = reconcile::reconcile(&mut self.store, payload, center, dragging.as_deref());

        for id in &report.evicted {
            self.interaction.gestures.forget_node(id);
        }
        if let Some(id) = dragging
            && self.store.get(&id).is_none()
        {
            tracing::debug!(id = %id, "dragged node left the graph, cancelling drag");
            self.interaction.dragging = None;
            self.energy.set_target(0.0);
        }
        self.interaction.gestures.forget_edges();
        self.edges = edges;

        let change = reconcile::classify(self.topology.as_ref(), &topology);
        self.topology = Some(topology);
        if change == ChangeKind::Topology {
            self.warmup();
            report.warmed_up = true;
        }
        report.change = Some(change);

        self.projector.rebuild(self.store.all(), &self.edges);

        tracing::debug!(
            change = ?change,
            created = report.created,
            updated = report.updated,
            evicted = report.evicted.len(),
            edges = report.edges,
            issues = report.issues.len(),
            "payload reconciled"
        );
        report
    }

    /// Runs the pre-settle batch at full energy, then leaves the layout at rest.
    fn warmup(&mut self) {
        let center = self.centering_target();
        for _ in 0..self.config.warmup_steps {
            self.solver
                .step(self.store.all_mut(), &self.edges, 1.0, &self.config, center);
        }
        self.energy.settle();
        tracing::debug!(
            steps = self.config.warmup_steps,
            bodies = self.store.len(),
            "warmup finished"
        );
    }

    /// Centering only applies while nothing anchors the layout.
    fn centering_target(&self) -> Option<Vec2> {
        if self.anchor().is_some() {
            None
        } else {
            self.viewport.center()
        }
    }

    /// Records a new viewport size. Returns the report of a deferred
    /// reconciliation if this measurement released one.
    pub fn set_viewport(&mut self, viewport: Viewport) -> Option<ReconcileReport> {
        let previous = self.viewport;
        self.viewport = viewport;
        let center = viewport.center()?;

        if let Some(payload) = self.pending.take() {
            return Some(self.apply(&payload, center));
        }
        if previous == viewport || self.store.is_empty() {
            return None;
        }

        if let Some(anchor) = self.anchor_mut() {
            anchor.pin_at(center);
        }
        self.energy.reheat(self.config.resize_alpha);
        tracing::trace!(
            width = viewport.width,
            height = viewport.height,
            "viewport resized"
        );
        None
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Advances the solver by one step. Returns `false` without touching the
    /// bodies while the layout is idle.
    pub fn tick(&mut self) -> bool {
        let Some(alpha) = self.energy.advance(&self.config) else {
            return false;
        };
        let center = self.centering_target();
        self.solver
            .step(self.store.all_mut(), &self.edges, alpha, &self.config, center);
        true
    }

    pub fn energy(&self) -> Energy {
        self.energy
    }

    pub fn energy_state(&self) -> EnergyState {
        self.energy.state(&self.config)
    }

    pub fn start_drag(&mut self, id: &str) -> bool {
        let Some(body) = self.store.get_mut(id) else {
            return false;
        };
        body.pin = Some(body.position);
        self.energy.set_target(self.config.drag_alpha_target);
        self.interaction.dragging = Some(id.to_owned());
        tracing::trace!(id, "drag started");
        true
    }

    /// Moves the pin of the body being dragged to `world`.
    pub fn drag(&mut self, id: &str, world: Vec2) -> bool {
        if self.interaction.dragging.as_deref() != Some(id)
            || !world.x.is_finite()
            || !world.y.is_finite()
        {
            return false;
        }
        let Some(body) = self.store.get_mut(id) else {
            return false;
        };
        body.pin_at(world);
        true
    }

    /// Releases a drag. The anchor stays where it was dropped until the next
    /// reconciliation, resize or `center_on_user`.
    pub fn end_drag(&mut self, id: &str) -> bool {
        if self.interaction.dragging.as_deref() != Some(id) {
            return false;
        }
        self.interaction.dragging = None;
        self.energy.set_target(0.0);
        if let Some(body) = self.store.get_mut(id)
            && !body.is_anchor()
        {
            body.pin = None;
        }
        tracing::trace!(id, "drag ended");
        true
    }

    pub fn dragging(&self) -> Option<&str> {
        self.interaction.dragging.as_deref()
    }

    pub fn transform(&self) -> Transform {
        self.interaction.transform
    }

    pub fn zoom_at(&mut self, pointer: Pos2, factor: f32) {
        self.interaction.transform.zoom_at(
            pointer,
            factor,
            self.config.min_zoom,
            self.config.max_zoom,
        );
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.interaction.transform.pan_by(delta);
    }

    /// Snaps the anchor back to the viewport center, resets the camera and
    /// reheats the layout. Does nothing without an anchor or a measured
    /// viewport.
    pub fn center_on_user(&mut self) -> bool {
        let Some(center) = self.viewport.center() else {
            return false;
        };
        let Some(anchor) = self.anchor_mut() else {
            return false;
        };
        anchor.pin_at(center);
        self.interaction.transform.reset();
        self.energy.reheat(self.config.recenter_alpha);
        tracing::debug!("recentered on anchor");
        true
    }

    pub fn set_on_node_click(&mut self, handler: impl FnMut(&GraphNode) + 'static) {
        self.on_node_click = Some(Box::new(handler));
    }

    pub fn set_on_edge_click(&mut self, handler: impl FnMut(&GraphLink) + 'static) {
        self.on_edge_click = Some(Box::new(handler));
    }

    /// Topmost node or edge under a viewport-relative screen position.
    pub fn hit_test(&self, at: Pos2) -> Option<Hit> {
        self.projector
            .hit_test(self.store.all(), &self.edges, self.interaction.transform, at)
    }

    /// Resolves a click at `at` and fires the matching handler.
    pub fn click_at(&mut self, at: Pos2) -> Click {
        let target = match self.hit_test(at) {
            Some(Hit::Node(index)) => PressTarget::Node {
                id: self.store.all()[index].id().to_owned(),
                grab_offset: Vec2::ZERO,
            },
            Some(Hit::Edge(index)) => PressTarget::Edge(index),
            None => PressTarget::Background,
        };
        self.fire_click(target)
    }

    fn fire_click(&mut self, target: PressTarget) -> Click {
        match target {
            PressTarget::Node { id, .. } => match self.store.get(&id) {
                Some(body) => {
                    if let Some(handler) = self.on_node_click.as_mut() {
                        handler(body.node());
                    }
                    Click::Node(body.node().clone())
                }
                None => Click::Background,
            },
            PressTarget::Edge(index) => match self.edges.get(index) {
                Some(edge) => {
                    if let Some(handler) = self.on_edge_click.as_mut() {
                        handler(&edge.link);
                    }
                    Click::Edge(edge.link.clone())
                }
                None => Click::Background,
            },
            PressTarget::Background => Click::Background,
        }
    }

    /// Starts a gesture at `at`. A drag whose release never arrived is ended
    /// before the new press is recorded.
    pub fn pointer_down(&mut self, at: Pos2) {
        self.pointer_cancel();
        let transform = self.interaction.transform;
        let target = match self.hit_test(at) {
            Some(Hit::Node(index)) => {
                let body = &self.store.all()[index];
                PressTarget::Node {
                    id: body.id().to_owned(),
                    grab_offset: body.position() - transform.screen_to_world(at),
                }
            }
            Some(Hit::Edge(index)) => PressTarget::Edge(index),
            None => PressTarget::Background,
        };
        let action = self.interaction.gestures.press(at, target);
        self.apply_pointer_action(action, at);
    }

    /// Abandons the current gesture, e.g. when the pointer leaves the
    /// window. An active drag is ended and no click fires.
    pub fn pointer_cancel(&mut self) {
        let action = self.interaction.gestures.cancel();
        self.apply_pointer_action(action, Pos2::ZERO);
    }

    pub fn pointer_move(&mut self, at: Pos2) {
        let action = self.interaction.gestures.motion(at);
        self.apply_pointer_action(action, at);
    }

    /// Finishes a gesture. Returns the click if the pointer barely moved.
    pub fn pointer_up(&mut self, at: Pos2) -> Option<Click> {
        let action = self.interaction.gestures.release(at);
        self.apply_pointer_action(action, at)
    }

    fn apply_pointer_action(&mut self, action: PointerAction, at: Pos2) -> Option<Click> {
        let world = self.interaction.transform.screen_to_world(at);
        match action {
            PointerAction::None => None,
            PointerAction::StartDrag { id, grab_offset } => {
                if self.start_drag(&id) {
                    self.drag(&id, world + grab_offset);
                }
                None
            }
            PointerAction::Drag { id, grab_offset } => {
                self.drag(&id, world + grab_offset);
                None
            }
            PointerAction::EndDrag(id) => {
                self.end_drag(&id);
                None
            }
            PointerAction::Pan(delta) => {
                self.pan_by(delta);
                None
            }
            PointerAction::Click(target) => Some(self.fire_click(target)),
        }
    }

    pub fn is_gesture_active(&self) -> bool {
        self.interaction.gestures.is_active()
    }

    pub fn select(&mut self, id: Option<&str>) {
        if self.projector.set_selected(id.map(str::to_owned)) {
            self.projector.rebuild(self.store.all(), &self.edges);
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.projector.selected()
    }

    pub fn set_filter(&mut self, filter: Filter) {
        if self.projector.set_filter(filter) {
            self.projector.rebuild(self.store.all(), &self.edges);
        }
    }

    pub fn filter(&self) -> Filter {
        self.projector.filter()
    }

    pub fn set_search(&mut self, query: &str) {
        if self.projector.set_search(query) {
            self.projector.rebuild(self.store.all(), &self.edges);
        }
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    /// Screen-space primitives for the current body positions.
    pub fn frame(&self) -> Frame<'_> {
        self.projector
            .frame(self.store.all(), &self.edges, self.interaction.transform)
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub fn bodies(&self) -> &[Body] {
        self.store.all()
    }

    pub fn body(&self, id: &str) -> Option<&Body> {
        self.store.get(id)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn anchor(&self) -> Option<&Body> {
        self.store.all().iter().find(|body| body.is_anchor())
    }

    fn anchor_mut(&mut self) -> Option<&mut Body> {
        self.store.all_mut().iter_mut().find(|body| body.is_anchor())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use eframe::egui::{pos2, vec2};

    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 800.0,
        height: 600.0,
    };

    fn orbit() -> GraphPayload {
        GraphPayload::new(
            vec![
                GraphNode::me("me"),
                GraphNode::new("u1", "Ada"),
                GraphNode::new("u2", "Grace"),
            ],
            vec![GraphLink::new("me", "u1"), GraphLink::new("me", "u2")],
        )
    }

    fn settled() -> Simulation {
        let mut simulation = Simulation::default();
        let report = simulation.reconcile(&orbit(), VIEWPORT);
        assert_eq!(report.change, Some(ChangeKind::Topology));
        assert!(report.warmed_up);
        simulation
    }

    #[test]
    fn warmup_leaves_the_layout_idle() {
        let mut simulation = settled();
        assert_eq!(simulation.energy_state(), EnergyState::Idle);
        assert!(!simulation.tick());
        assert_eq!(simulation.anchor().expect("anchor").position(), vec2(400.0, 300.0));
    }

    #[test]
    fn attribute_update_runs_no_solver_steps() {
        let mut simulation = settled();
        let before = simulation.body("u1").expect("u1").position();
        let rebuilds = simulation.projector().rebuilds();

        let mut update = orbit();
        update.nodes[1].status_mix.pending = 3;
        let report = simulation.reconcile(&update, VIEWPORT);

        assert_eq!(report.change, Some(ChangeKind::Attributes));
        assert!(!report.warmed_up);
        assert_eq!(simulation.body("u1").expect("u1").position(), before);
        assert_eq!(simulation.projector().rebuilds(), rebuilds + 1);
        assert_eq!(simulation.projector().node_visuals()[1].ring_color, PENDING_COLOR);
    }

    #[test]
    fn ticking_does_not_rebuild_the_projection() {
        let mut simulation = settled();
        let rebuilds = simulation.projector().rebuilds();
        simulation.start_drag("u1");
        for _ in 0..10 {
            assert!(simulation.tick());
            let _ = simulation.frame();
        }
        assert_eq!(simulation.projector().rebuilds(), rebuilds);
    }

    #[test]
    fn unmeasured_viewport_defers_until_measured() {
        let mut simulation = Simulation::default();
        let report = simulation.reconcile(&orbit(), Viewport::UNMEASURED);
        assert!(report.deferred);
        assert!(simulation.bodies().is_empty());
        assert!(simulation.has_pending());

        assert!(simulation.set_viewport(Viewport::new(0.0, 600.0)).is_none());
        assert!(simulation.bodies().is_empty());

        let released = simulation.set_viewport(VIEWPORT).expect("pending payload applied");
        assert_eq!(released.change, Some(ChangeKind::Topology));
        assert!(!simulation.has_pending());
        assert_eq!(simulation.bodies().len(), 3);
        for body in simulation.bodies() {
            assert!(body.position().x.is_finite() && body.position().y.is_finite());
        }
    }

    #[test]
    fn resize_resnaps_anchor_and_reheats() {
        let mut simulation = settled();
        assert!(simulation.set_viewport(Viewport::new(1000.0, 800.0)).is_none());
        assert_eq!(simulation.anchor().expect("anchor").position(), vec2(500.0, 400.0));
        assert_eq!(simulation.anchor().expect("anchor").pin(), Some(vec2(500.0, 400.0)));
        assert!((simulation.energy().alpha() - 0.2).abs() < 1e-6);
        assert_eq!(simulation.energy_state(), EnergyState::Perturbed);
    }

    #[test]
    fn drag_pins_and_release_unpins() {
        let mut simulation = settled();
        assert!(!simulation.drag("u1", vec2(0.0, 0.0)), "drag before start is ignored");

        assert!(simulation.start_drag("u1"));
        assert_eq!(simulation.energy().target(), 0.3);
        assert!(simulation.drag("u1", vec2(120.0, 80.0)));
        simulation.tick();
        let body = simulation.body("u1").expect("u1");
        assert_eq!(body.position(), vec2(120.0, 80.0));
        assert_eq!(body.pin(), Some(vec2(120.0, 80.0)));

        assert!(simulation.end_drag("u1"));
        assert_eq!(simulation.body("u1").expect("u1").pin(), None);
        assert_eq!(simulation.energy().target(), 0.0);
        assert_eq!(simulation.dragging(), None);
    }

    #[test]
    fn reconcile_keeps_a_dragged_pin() {
        let mut simulation = settled();
        simulation.start_drag("u1");
        simulation.drag("u1", vec2(50.0, 50.0));
        simulation.reconcile(&orbit(), VIEWPORT);
        assert_eq!(simulation.body("u1").expect("u1").pin(), Some(vec2(50.0, 50.0)));
        assert_eq!(simulation.dragging(), Some("u1"));
    }

    #[test]
    fn evicting_the_dragged_node_cancels_the_drag() {
        let mut simulation = settled();
        simulation.start_drag("u2");
        let mut smaller = orbit();
        smaller.nodes.pop();
        smaller.links.pop();
        simulation.reconcile(&smaller, VIEWPORT);

        assert_eq!(simulation.dragging(), None);
        assert_eq!(simulation.energy().target(), 0.0);
        assert!(!simulation.end_drag("u2"));
    }

    #[test]
    fn pointer_gesture_drags_a_node() {
        let mut simulation = settled();
        let start = simulation.body("u1").expect("u1").position().to_pos2();

        simulation.pointer_down(start);
        simulation.pointer_move(start + vec2(40.0, 0.0));
        assert_eq!(simulation.dragging(), Some("u1"));
        assert_eq!(
            simulation.body("u1").expect("u1").pin(),
            Some(start.to_vec2() + vec2(40.0, 0.0))
        );

        assert_eq!(simulation.pointer_up(start + vec2(40.0, 0.0)), None);
        assert_eq!(simulation.dragging(), None);
    }

    #[test]
    fn press_after_a_lost_release_ends_the_drag() {
        let mut simulation = settled();
        let start = simulation.body("u1").expect("u1").position().to_pos2();
        simulation.pointer_down(start);
        simulation.pointer_move(start + vec2(40.0, 0.0));
        assert_eq!(simulation.dragging(), Some("u1"));

        simulation.pointer_down(pos2(5.0, 5.0));
        assert_eq!(simulation.pointer_up(pos2(5.0, 5.0)), Some(Click::Background));
        assert_eq!(simulation.dragging(), None);
        assert_eq!(simulation.body("u1").expect("u1").pin(), None);
        assert_eq!(simulation.energy().target(), 0.0);

        let mut ticks = 0;
        while simulation.tick() {
            ticks += 1;
            assert!(ticks < 2_000, "layout never cooled down");
        }
        assert_eq!(simulation.energy_state(), EnergyState::Idle);
    }

    #[test]
    fn pointer_cancel_ends_a_drag_without_a_click() {
        let clicks = Rc::new(RefCell::new(0));
        let mut simulation = settled();
        let sink = Rc::clone(&clicks);
        simulation.set_on_node_click(move |_| *sink.borrow_mut() += 1);

        let start = simulation.body("u2").expect("u2").position().to_pos2();
        simulation.pointer_down(start);
        simulation.pointer_move(start + vec2(0.0, 30.0));
        simulation.pointer_cancel();

        assert!(!simulation.is_gesture_active());
        assert_eq!(simulation.dragging(), None);
        assert_eq!(simulation.body("u2").expect("u2").pin(), None);
        assert_eq!(simulation.pointer_up(start), None);
        assert_eq!(*clicks.borrow(), 0);
    }

    #[test]
    fn new_rejects_an_invalid_config() {
        let config = LayoutConfig {
            min_zoom: 4.0,
            max_zoom: 0.1,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            Simulation::new(config),
            Err(ConfigError::Invalid {
                field: "max_zoom",
                ..
            })
        ));
        assert!(Simulation::new(LayoutConfig::default()).is_ok());
    }

    #[test]
    fn pointer_gesture_on_background_pans() {
        let mut simulation = settled();
        simulation.pointer_down(pos2(5.0, 5.0));
        simulation.pointer_move(pos2(25.0, 15.0));
        simulation.pointer_up(pos2(30.0, 20.0));
        assert_eq!(simulation.transform().translate, vec2(25.0, 15.0));
        assert_eq!(simulation.transform().scale, 1.0);
    }

    #[test]
    fn click_fires_edge_handler_with_full_link() {
        let mut simulation = settled();
        let clicked = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&clicked);
        simulation.set_on_edge_click(move |link| sink.borrow_mut().push(link.clone()));

        let edge = &simulation.edges()[0];
        let from = simulation.bodies()[edge.source()].position();
        let to = simulation.bodies()[edge.target()].position();
        let midpoint = ((from + to) * 0.5).to_pos2();
        let expected = edge.link().clone();

        simulation.pointer_down(midpoint);
        let click = simulation.pointer_up(midpoint);

        assert_eq!(click, Some(Click::Edge(expected.clone())));
        assert_eq!(clicked.borrow().as_slice(), &[expected]);
    }

    #[test]
    fn zoom_is_clamped_to_scale_extent() {
        let mut simulation = settled();
        simulation.zoom_at(pos2(400.0, 300.0), 100.0);
        assert_eq!(simulation.transform().scale, 4.0);
        simulation.zoom_at(pos2(400.0, 300.0), 0.0001);
        assert_eq!(simulation.transform().scale, 0.1);
    }

    #[test]
    fn center_on_user_without_anchor_is_a_no_op() {
        let mut simulation = Simulation::default();
        let payload = GraphPayload::new(vec![GraphNode::new("a", "A")], Vec::new());
        simulation.reconcile(&payload, VIEWPORT);
        simulation.pan_by(vec2(10.0, 10.0));

        assert!(!simulation.center_on_user());
        assert_eq!(simulation.transform().translate, vec2(10.0, 10.0));
        assert_eq!(simulation.energy_state(), EnergyState::Idle);
    }

    #[test]
    fn filter_and_selection_rebuild_only_on_change() {
        let mut simulation = settled();
        let rebuilds = simulation.projector().rebuilds();

        simulation.set_filter(Filter::All);
        simulation.select(None);
        simulation.set_search("");
        assert_eq!(simulation.projector().rebuilds(), rebuilds);

        simulation.set_filter(Filter::Gave);
        simulation.select(Some("u1"));
        simulation.set_search("ada");
        assert_eq!(simulation.projector().rebuilds(), rebuilds + 3);
        assert_eq!(simulation.selected(), Some("u1"));
        assert_eq!(simulation.filter(), Filter::Gave);
    }

    #[test]
    fn dispose_returns_to_an_empty_idle_state() {
        let mut simulation = settled();
        simulation.start_drag("u1");
        simulation.select(Some("u1"));
        simulation.dispose();

        assert!(simulation.bodies().is_empty());
        assert!(simulation.edges().is_empty());
        assert_eq!(simulation.dragging(), None);
        assert_eq!(simulation.selected(), None);
        assert_eq!(simulation.energy_state(), EnergyState::Idle);
        assert!(simulation.frame().nodes.is_empty());

        let report = simulation.reconcile(&orbit(), VIEWPORT);
        assert_eq!(report.change, Some(ChangeKind::Topology));
    }
}
