//! # Document Export
//!
//! Turns the containment graph into a nested JSON document that reads like
//! hand-written configuration:
//!
//! ```json
//! { "Network 1": { "type": "network", "cidr": "10.0.0.0/24",
//!                  "VM 1": { "type": "vm", "cpu": "2 vCPU" } } }
//! ```
//!
//! - Roots (nodes without an incoming edge) are the top-level keys, in
//!   creation order.
//! - Each object starts with `type` (the kind key), then the properties in
//!   stored order, then one entry per outgoing edge keyed by the child's
//!   label, in edge creation order.
//! - Keys are labels, so entries with the same key overwrite each other and
//!   keep the first one's position. This includes a property named `type`
//!   and sibling children sharing a label. `label_collisions` reports the
//!   sibling case.
//!
//! The output is a pure function of the graph: the same graph always
//! renders byte-identical JSON.

use crate::{GraphStore, Node, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// A rendered export document.
pub type Document = Map<String, Value>;

/// Build the nested export document for the whole graph.
#[must_use]
pub fn build_document(graph: &GraphStore) -> Document {
    let tree = ContainmentTree::new(graph);
    let mut path = BTreeSet::new();

    graph
        .roots()
        .map(|root| (root.label.clone(), Value::Object(tree.build(root, &mut path))))
        .collect()
}

/// Parent -> children adjacency, in edge creation order.
struct ContainmentTree<'a> {
    graph: &'a GraphStore,
    children: BTreeMap<NodeId, Vec<NodeId>>,
}

impl<'a> ContainmentTree<'a> {
    fn new(graph: &'a GraphStore) -> Self {
        let mut children: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        for edge in graph.edges() {
            children.entry(edge.from).or_default().push(edge.to);
        }
        Self { graph, children }
    }

    fn children_of(&self, id: NodeId) -> impl Iterator<Item = &'a Node> + '_ {
        self.children
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|child| self.graph.node(*child))
    }

    /// `path` holds the ancestors of `node`; a child already on it is skipped.
    fn build(&self, node: &Node, path: &mut BTreeSet<NodeId>) -> Map<String, Value> {
        let mut obj = Map::new();
        obj.insert("type".to_string(), Value::String(node.type_key.clone()));
        for (name, value) in &node.properties {
            obj.insert(name.clone(), Value::from(value));
        }

        path.insert(node.id);
        for child in self.children_of(node.id) {
            if path.contains(&child.id) {
                continue;
            }
            obj.insert(child.label.clone(), Value::Object(self.build(child, path)));
        }
        path.remove(&node.id);

        obj
    }
}

// =============================================================================
// LABEL COLLISIONS
// =============================================================================

/// A group of siblings whose labels collapse into one document key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCollision {
    /// The shared parent, or `None` for top-level roots.
    pub parent: Option<NodeId>,
    pub label: String,
    /// Every node sharing the label, in document order.
    pub nodes: Vec<NodeId>,
}

/// Find sibling groups (and root groups) that share a label.
#[must_use]
pub fn label_collisions(graph: &GraphStore) -> Vec<LabelCollision> {
    let tree = ContainmentTree::new(graph);
    let mut collisions = collect_collisions(None, graph.roots());

    for node in graph.nodes() {
        collisions.extend(collect_collisions(Some(node.id), tree.children_of(node.id)));
    }

    collisions
}

fn collect_collisions<'a>(
    parent: Option<NodeId>,
    siblings: impl Iterator<Item = &'a Node>,
) -> Vec<LabelCollision> {
    let mut by_label: Vec<(String, Vec<NodeId>)> = Vec::new();

    for node in siblings {
        match by_label.iter_mut().find(|(label, _)| *label == node.label) {
            Some((_, ids)) => ids.push(node.id),
            None => by_label.push((node.label.clone(), vec![node.id])),
        }
    }

    by_label
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(label, nodes)| LabelCollision {
            parent,
            label,
            nodes,
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
