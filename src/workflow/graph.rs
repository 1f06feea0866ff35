/// Graph model: node creation, parent links and adjacency queries
///
/// Every node has at most one parent, so the workflow is a forest. A parent id
/// that points at a deleted node is a dangling link: queries treat the node as
/// a root and nothing panics on it.

use crate::error::GraphError;
use crate::workflow::types::{Node, NodeData, Point, Workflow};
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// Position of the first node added to an empty canvas
pub const DEFAULT_ORIGIN: Point = Point::new(400.0, 300.0);
/// Diagonal offset applied per existing node when no parent is given
pub const CASCADE_STEP: f64 = 50.0;
/// Horizontal distance between a parent and a newly added child
pub const CHILD_OFFSET_X: f64 = 400.0;

/// What happens to the children of a removed node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemovalPolicy {
    /// Children keep pointing at the removed id and render as roots
    #[default]
    LeaveDangling,
    /// The whole subtree is removed
    Cascade,
    /// Children are attached to the removed node's own parent
    Reparent,
}

impl Workflow {
    /// Append a new node and return a copy of it
    ///
    /// Without a parent the node is cascaded from the default origin by the
    /// current node count; with one it sits to the right of the parent.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        data: NodeData,
        parent_id: Option<&str>,
    ) -> Result<Node, GraphError> {
        let position = match parent_id {
            Some(pid) => {
                let parent = self
                    .node(pid)
                    .ok_or_else(|| GraphError::ParentNotFound(pid.to_string()))?;
                Point::new(parent.position.x + CHILD_OFFSET_X, parent.position.y)
            }
            None => {
                let offset = self.nodes.len() as f64 * CASCADE_STEP;
                Point::new(DEFAULT_ORIGIN.x + offset, DEFAULT_ORIGIN.y + offset)
            }
        };

        let node = Node {
            id: self.fresh_node_id(),
            name: name.into(),
            position,
            parent_id: parent_id.map(str::to_string),
            data,
        };

        tracing::debug!("➕ Added node '{}' ({}) parent={:?}", node.id, node.kind(), node.parent_id);
        self.nodes.push(node.clone());
        Ok(node)
    }

    fn fresh_node_id(&self) -> String {
        loop {
            let id = format!("node-{}", uuid::Uuid::new_v4());
            if !self.contains(&id) {
                return id;
            }
        }
    }

    /// Remove a node, leaving its children's parent links dangling
    pub fn remove_node(&mut self, id: &str) -> bool {
        !self.remove_node_with(id, RemovalPolicy::LeaveDangling).is_empty()
    }

    /// Remove a node under the given policy; returns the removed ids
    pub fn remove_node_with(&mut self, id: &str, policy: RemovalPolicy) -> Vec<String> {
        let Some(removed) = self.node(id).cloned() else {
            return Vec::new();
        };

        let mut doomed: HashSet<String> = HashSet::from([removed.id.clone()]);
        match policy {
            RemovalPolicy::LeaveDangling => {}
            RemovalPolicy::Cascade => doomed.extend(self.descendants_of(id)),
            RemovalPolicy::Reparent => {
                let grandparent = self.parent_of(id).map(|p| p.id.clone());
                for node in self.nodes.iter_mut() {
                    if node.parent_id.as_deref() == Some(id) {
                        node.parent_id = grandparent.clone();
                    }
                }
            }
        }

        let mut removed_ids = Vec::new();
        self.nodes.retain(|n| {
            if doomed.contains(&n.id) {
                removed_ids.push(n.id.clone());
                false
            } else {
                true
            }
        });

        tracing::debug!("🗑️ Removed {} node(s) starting at '{}' ({:?})", removed_ids.len(), id, policy);
        removed_ids
    }

    /// Overwrite a node's position; unknown ids are ignored
    pub fn move_node(&mut self, id: &str, position: Point) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    pub fn has_children(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.parent_id.as_deref() == Some(id))
    }

    pub fn children_of(&self, id: &str) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|n| n.parent_id.as_deref() == Some(id))
            .collect()
    }

    /// Parent of a node, `None` for roots and dangling links
    pub fn parent_of(&self, id: &str) -> Option<&Node> {
        let parent_id = self.node(id)?.parent_id.as_deref()?;
        self.node(parent_id)
    }

    /// Nodes rendered as roots: no parent, or a parent that no longer exists
    pub fn roots(&self) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|n| match n.parent_id.as_deref() {
                None => true,
                Some(pid) => !self.contains(pid),
            })
            .collect()
    }

    /// Nodes whose parent id refers to a missing node
    pub fn dangling(&self) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|n| n.parent_id.as_deref().is_some_and(|pid| !self.contains(pid)))
            .collect()
    }

    /// All transitive children of a node
    pub fn descendants_of(&self, id: &str) -> Vec<String> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            for child in self.children_of(&current) {
                if seen.insert(child.id.clone()) {
                    found.push(child.id.clone());
                    stack.push(child.id.clone());
                }
            }
        }
        found
    }

    /// Set or clear a node's parent
    ///
    /// Rejects parenting a node under itself or under any of its descendants.
    /// Returns `Ok(false)` when the node itself is unknown.
    pub fn connect(&mut self, id: &str, parent_id: Option<&str>) -> Result<bool, GraphError> {
        if !self.contains(id) {
            return Ok(false);
        }

        if let Some(pid) = parent_id {
            if !self.contains(pid) {
                return Err(GraphError::ParentNotFound(pid.to_string()));
            }
            if self.is_ancestor_or_self(id, pid) {
                return Err(GraphError::Cycle {
                    node: id.to_string(),
                    parent: pid.to_string(),
                });
            }
        }

        if let Some(node) = self.node_mut(id) {
            node.parent_id = parent_id.map(str::to_string);
        }
        Ok(true)
    }

    /// True if `candidate` is `ancestor` or lies on a path below it
    fn is_ancestor_or_self(&self, ancestor: &str, candidate: &str) -> bool {
        let mut seen = HashSet::new();
        let mut current = Some(candidate);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            if !seen.insert(id) {
                // Loaded data already contains a loop
                return true;
            }
            current = self.node(id).and_then(|n| n.parent_id.as_deref());
        }
        false
    }

    /// Shallow-merge JSON fields into a node's payload
    ///
    /// The `type` tag is fixed to the node's kind. If the merged object no
    /// longer deserializes into that kind the node is left untouched.
    pub fn update_node_data(&mut self, id: &str, patch: Value) -> Result<bool, GraphError> {
        let Value::Object(patch) = patch else {
            return Err(GraphError::PatchNotObject);
        };
        let Some(node) = self.node_mut(id) else {
            return Ok(false);
        };

        let kind = node.kind();
        if let Some(requested) = patch.get("type").and_then(Value::as_str) {
            if requested != kind.as_str() {
                return Err(GraphError::DataKindMismatch {
                    node: id.to_string(),
                    actual: kind.to_string(),
                    requested: requested.to_string(),
                });
            }
        }

        let mut merged = match serde_json::to_value(&node.data) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        for (key, value) in patch {
            merged.insert(key, value);
        }
        merged.insert("type".to_string(), Value::String(kind.as_str().to_string()));

        node.data = serde_json::from_value(Value::Object(merged)).map_err(|source| {
            GraphError::InvalidData {
                node: id.to_string(),
                source,
            }
        })?;
        Ok(true)
    }

    pub fn connection_graph(&self) -> ConnectionGraph {
        ConnectionGraph::build(self)
    }
}

/// Parent -> child adjacency as a petgraph DAG
///
/// Dangling links are skipped, so every edge joins two live nodes.
#[derive(Debug)]
pub struct ConnectionGraph {
    graph: DiGraph<String, ()>,
    node_id_to_index: HashMap<String, NodeIndex>,
}

impl ConnectionGraph {
    pub fn build(workflow: &Workflow) -> Self {
        let mut graph = DiGraph::new();
        let mut node_id_to_index = HashMap::new();

        for node in &workflow.nodes {
            let index = graph.add_node(node.id.clone());
            node_id_to_index.insert(node.id.clone(), index);
        }

        for node in &workflow.nodes {
            let Some(parent_id) = node.parent_id.as_deref() else {
                continue;
            };
            match (node_id_to_index.get(parent_id), node_id_to_index.get(&node.id)) {
                (Some(&from), Some(&to)) => {
                    graph.add_edge(from, to, ());
                }
                _ => tracing::debug!("Skipping dangling link {} -> {}", parent_id, node.id),
            }
        }

        Self { graph, node_id_to_index }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.graph)
    }

    /// Node ids ordered so every parent precedes its children
    pub fn execution_order(&self) -> anyhow::Result<Vec<String>> {
        let order = toposort(&self.graph, None)
            .map_err(|_| anyhow::anyhow!("Workflow contains cycles - parent links must form a tree"))?;
        Ok(order.into_iter().map(|idx| self.graph[idx].clone()).collect())
    }

    /// Child ids of a node in this snapshot
    pub fn successors(&self, id: &str) -> Vec<&str> {
        let Some(&index) = self.node_id_to_index.get(id) else {
            return Vec::new();
        };
        let mut out: Vec<&str> = self
            .graph
            .neighbors(index)
            .map(|child| self.graph[child].as_str())
            .collect();
        out.sort_unstable();
        out
    }
}
