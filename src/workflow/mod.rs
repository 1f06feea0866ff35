/// Workflow Management Layer
///
/// Handles the workflow model and its persistence:
/// - Type definitions (Workflow, Node, NodeData)
/// - Graph model operations and parent/child adjacency
/// - SQLite persistence with sqlx
/// - Lock-free latest-state snapshot and the autosave task that reads it

// Core workflow type definitions
pub mod types;

// Node creation, parent links and adjacency queries
pub mod graph;

// SQLite persistence layer for workflow storage
pub mod storage;

// Latest published workflow, swapped atomically with ArcSwap
pub mod snapshot;

// Periodic, manual and final saves
pub mod autosave;

pub use graph::{ConnectionGraph, RemovalPolicy};
pub use types::{Node, NodeData, NodeKind, Point, Workflow};
