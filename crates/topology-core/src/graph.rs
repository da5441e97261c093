//! # Graph Store
//!
//! The live containment graph: nodes, edges, the selection and the version
//! counter that pollers compare to detect change.
//!
//! Nodes and edges live in `BTreeMap`s keyed by ids issued from monotonic
//! counters, so iteration order is creation order.
//!
//! ## Invariants
//!
//! - Every edge references two live nodes; deleting a node cascades.
//! - At most one edge exists per ordered `(from, to)` pair.
//! - An edge exists only if the rule table allowed it when it was created.
//! - No node contains itself, directly or transitively.
//! - `version` grows by exactly 1 per successful mutation. Failed mutations
//!   and reads leave it untouched.

use crate::primitives::grid_position;
use crate::{
    Edge, EdgeId, Node, NodeId, Position, PropertyValue, RuleTable, TopologyError, TypeRegistry,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

// =============================================================================
// OPTIONS
// =============================================================================

/// Behaviour switches for a `GraphStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOptions {
    /// Fit property patches to the node type's schema.
    ///
    /// When `false`, patches are merged verbatim, including keys the schema
    /// does not declare.
    pub strict_properties: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            strict_properties: true,
        }
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// A consistent read of the whole graph, taken under a single borrow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u64,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub selected_id: Option<NodeId>,
}

// =============================================================================
// GRAPH STORE
// =============================================================================

/// Owner of all nodes and edges. Mutated only through its own operations.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    /// Node storage: NodeId -> Node
    nodes: BTreeMap<NodeId, Node>,

    /// Edge storage: EdgeId -> Edge
    edges: BTreeMap<EdgeId, Edge>,

    /// Pair lookup: (from, to) -> EdgeId
    edge_index: BTreeMap<(NodeId, NodeId), EdgeId>,

    selected: Option<NodeId>,
    version: u64,

    /// Last issued ids; ids start at 1.
    last_node_id: u64,
    last_edge_id: u64,

    options: StoreOptions,
}

impl GraphStore {
    /// Create an empty store with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with the given options.
    #[must_use]
    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    #[must_use]
    pub fn options(&self) -> StoreOptions {
        self.options
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Edge between an ordered pair, if any.
    #[must_use]
    pub fn edge_between(&self, from: NodeId, to: NodeId) -> Option<&Edge> {
        self.edge_index
            .get(&(from, to))
            .and_then(|id| self.edges.get(id))
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All edges in creation order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Edges leaving `node`, in creation order.
    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |e| e.from == node)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Nodes with no incoming edge, in creation order.
    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        let children: BTreeSet<NodeId> = self.edges.values().map(|e| e.to).collect();
        self.nodes
            .values()
            .filter(move |n| !children.contains(&n.id))
    }

    /// Take a consistent snapshot of the graph.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: self.version,
            nodes: self.nodes.values().cloned().collect(),
            edges: self.edges.values().copied().collect(),
            selected_id: self.selected,
        }
    }

    // -------------------------------------------------------------------------
    // Node mutations
    // -------------------------------------------------------------------------

    /// Create a node of the given kind.
    ///
    /// The label is `"{type label} {n}"` with `n` = live nodes of the kind + 1.
    /// Properties start from the schema defaults; the position comes from the
    /// placement grid.
    pub fn add_node(
        &mut self,
        registry: &TypeRegistry,
        type_key: &str,
    ) -> Result<Node, TopologyError> {
        let node_type = registry
            .get(type_key)
            .ok_or_else(|| TopologyError::UnknownType(type_key.to_string()))?;

        let same_kind = self.nodes.values().filter(|n| n.type_key == type_key).count();
        let (x, y) = grid_position(self.nodes.len());

        self.last_node_id = self.last_node_id.saturating_add(1);
        let node = Node {
            id: NodeId(self.last_node_id),
            type_key: type_key.to_string(),
            label: format!("{} {}", node_type.label, same_kind.saturating_add(1)),
            position: Position::new(x, y),
            properties: node_type.initial_properties(),
        };

        self.nodes.insert(node.id, node.clone());
        self.bump();
        Ok(node)
    }

    /// Replace the label and/or merge a property patch into a node.
    ///
    /// With `strict_properties`, every patched key must be declared by the
    /// node's kind and every value must fit its field; the patch is applied
    /// all-or-nothing. Nodes whose kind is no longer registered accept any
    /// patch.
    pub fn update_node(
        &mut self,
        registry: &TypeRegistry,
        id: NodeId,
        label: Option<String>,
        patch: Option<IndexMap<String, PropertyValue>>,
    ) -> Result<&Node, TopologyError> {
        let strict = self.options.strict_properties;
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(TopologyError::NodeNotFound(id))?;

        let patch = match (patch, registry.get(&node.type_key)) {
            (Some(patch), Some(node_type)) if strict => {
                let mut fitted = IndexMap::with_capacity(patch.len());
                for (name, value) in patch {
                    let def = node_type
                        .properties
                        .get(&name)
                        .ok_or_else(|| TopologyError::UnknownProperty(name.clone()))?;
                    let value = def.fit(&name, value)?;
                    fitted.insert(name, value);
                }
                Some(fitted)
            }
            (patch, _) => patch,
        };

        if let Some(label) = label {
            node.label = label;
        }
        if let Some(patch) = patch {
            node.properties.extend(patch);
        }

        self.version = self.version.saturating_add(1);
        Ok(node)
    }

    /// Move a node on the canvas.
    pub fn move_node(&mut self, id: NodeId, position: Position) -> Result<(), TopologyError> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(TopologyError::NodeNotFound(id))?;
        node.position = position;
        self.bump();
        Ok(())
    }

    /// Delete a node together with every edge that references it.
    ///
    /// Clears the selection if it pointed at the node.
    pub fn delete_node(&mut self, id: NodeId) -> Result<Node, TopologyError> {
        let node = self
            .nodes
            .remove(&id)
            .ok_or(TopologyError::NodeNotFound(id))?;

        self.edges.retain(|_, e| e.from != id && e.to != id);
        self.edge_index
            .retain(|(from, to), _| *from != id && *to != id);

        if self.selected == Some(id) {
            self.selected = None;
        }

        self.bump();
        Ok(node)
    }

    // -------------------------------------------------------------------------
    // Edge mutations
    // -------------------------------------------------------------------------

    /// Create a containment edge `from` -> `to`.
    ///
    /// Checked in order: both endpoints exist, the rule table allows the
    /// child kind under the parent kind, the pair is not already connected,
    /// and `to` is not `from` or one of its ancestors.
    pub fn add_edge(
        &mut self,
        registry: &TypeRegistry,
        rules: &RuleTable,
        from: NodeId,
        to: NodeId,
    ) -> Result<Edge, TopologyError> {
        let parent = self.nodes.get(&from).ok_or(TopologyError::NodeNotFound(from))?;
        let child = self.nodes.get(&to).ok_or(TopologyError::NodeNotFound(to))?;

        if !rules.allows(&parent.type_key, &child.type_key) {
            return Err(TopologyError::InvalidNesting {
                child: registry.display_label(&child.type_key).to_string(),
                parent: registry.display_label(&parent.type_key).to_string(),
            });
        }

        if self.edge_index.contains_key(&(from, to)) {
            return Err(TopologyError::DuplicateEdge);
        }

        if from == to || self.is_ancestor(to, from) {
            return Err(TopologyError::CycleDetected);
        }

        self.last_edge_id = self.last_edge_id.saturating_add(1);
        let edge = Edge {
            id: EdgeId(self.last_edge_id),
            from,
            to,
        };

        self.edges.insert(edge.id, edge);
        self.edge_index.insert((from, to), edge.id);
        self.bump();
        Ok(edge)
    }

    /// Delete an edge.
    pub fn delete_edge(&mut self, id: EdgeId) -> Result<Edge, TopologyError> {
        let edge = self
            .edges
            .remove(&id)
            .ok_or(TopologyError::EdgeNotFound(id))?;
        self.edge_index.remove(&(edge.from, edge.to));
        self.bump();
        Ok(edge)
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Select a node.
    pub fn select(&mut self, id: NodeId) -> Result<(), TopologyError> {
        if !self.nodes.contains_key(&id) {
            return Err(TopologyError::NodeNotFound(id));
        }
        self.selected = Some(id);
        self.bump();
        Ok(())
    }

    /// Clear the selection. Always counts as a change.
    pub fn deselect(&mut self) {
        self.selected = None;
        self.bump();
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Record a change made outside the graph proper (e.g. configuration).
    pub(crate) fn bump(&mut self) {
        self.version = self.version.saturating_add(1);
    }

    /// Whether `candidate` can reach `node` by following edges downward,
    /// i.e. `candidate` is a transitive ancestor of `node`.
    fn is_ancestor(&self, candidate: NodeId, node: NodeId) -> bool {
        let mut parents: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        for e in self.edges.values() {
            parents.entry(e.to).or_default().push(e.from);
        }

        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([node]);

        while let Some(current) = queue.pop_front() {
            for &parent in parents.get(&current).into_iter().flatten() {
                if parent == candidate {
                    return true;
                }
                if visited.insert(parent) {
                    queue.push_back(parent);
                }
            }
        }

        false
    }
}

// =============================================================================
// TESTS
// =============================================================================
