/// flowcanvas: the editing core of a node-based workflow builder
///
/// Nodes (triggers, AI agents, conditions, chain actions, oracles) are placed on
/// a pannable, zoomable canvas and chained through single-parent links. The
/// crate keeps that graph, maps pointer input onto it, and autosaves it.

// Configuration: storage location, editor timings, service endpoints
pub mod config;

// Typed graph errors
pub mod error;

// Workflow model, graph operations and persistence
pub mod workflow;

// Pan/zoom transform and coordinate mapping
pub mod viewport;

// Interaction state machine, panels, notices and the editor session
pub mod editor;

// External collaborators: Telegram, Pyth Hermes, chain client seam
pub mod services;

pub use editor::{EditorSession, OpenOutcome};
pub use error::GraphError;
pub use viewport::Transform;
pub use workflow::{Node, NodeData, NodeKind, Point, Workflow};
