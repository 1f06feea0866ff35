/// Typed errors for rejected graph operations
///
/// Lookups of ids that no longer exist are not errors (they degrade to no-ops);
/// these variants cover operations that would break a graph invariant.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Parent node not found: {0}")]
    ParentNotFound(String),

    #[error("Connecting {node} under {parent} would create a cycle")]
    Cycle { node: String, parent: String },

    #[error("Node {node} is a {actual} node, patch targets {requested}")]
    DataKindMismatch {
        node: String,
        actual: String,
        requested: String,
    },

    #[error("Invalid node data for {node}: {source}")]
    InvalidData {
        node: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Node data patch must be a JSON object")]
    PatchNotObject,
}
