//! Incremental force-directed layout for personal trust networks.
//!
//! The engine keeps a persistent physical simulation across payload updates:
//! bodies keep their positions when their identity survives, new bodies start
//! at the viewport center, and the node flagged `isMe` is pinned there. Every
//! topology change is pre-settled synchronously so the first painted frame is
//! already at rest.
//!
//! ```no_run
//! use orbit_graph::{GraphLink, GraphNode, GraphPayload, Simulation, Viewport};
//!
//! let mut simulation = Simulation::default();
//! let payload = GraphPayload::new(
//!     vec![GraphNode::me("me"), GraphNode::new("u1", "Ada")],
//!     vec![GraphLink::new("me", "u1")],
//! );
//! simulation.reconcile(&payload, Viewport::new(800.0, 600.0));
//! while simulation.tick() {}
//! for node in simulation.frame().nodes {
//!     println!("{} at {:?}", node.visual.name, node.center);
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod payload;
mod util;

pub use config::LayoutConfig;
pub use engine::{
    Body, ChangeKind, Click, Edge, Energy, EnergyState, Frame, Hit, ReconcileReport, Simulation,
    Transform, Viewport,
};
pub use error::{ConfigError, PayloadIssue};
pub use payload::{Filter, GraphLink, GraphNode, GraphPayload, InteractionStats, StatusMix};
