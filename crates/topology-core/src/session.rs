//! # Session Module
//!
//! A `Session` owns one complete editing context: the type registry, the
//! rule table and the graph built from them. It is the unit a transport
//! shares between requests (behind one lock) and the unit tests create in
//! isolation.
//!
//! Configuration edits bump the graph's version like any graph mutation, so
//! a single counter tells pollers that *something* changed. They never
//! revalidate existing nodes or edges.

use crate::config::{ConfigIssue, ConfigPatch, TopologyConfig};
use crate::export::{self, Document, LabelCollision};
use crate::graph::{GraphStore, Snapshot, StoreOptions};
use crate::primitives::MAX_TYPE_KEY_LENGTH;
use crate::{
    Edge, EdgeId, Node, NodeId, NodeType, Position, PropertyValue, RuleTable, TopologyError,
    TypeRegistry,
};
use indexmap::IndexMap;

/// Registry, rules and graph under a single owner.
#[derive(Debug, Clone)]
pub struct Session {
    registry: TypeRegistry,
    rules: RuleTable,
    graph: GraphStore,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a session seeded with the built-in configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TopologyConfig::default(), StoreOptions::default())
    }

    /// Create a session from a configuration and store options.
    #[must_use]
    pub fn with_config(config: TopologyConfig, options: StoreOptions) -> Self {
        Self {
            registry: config.node_types,
            rules: config.rules,
            graph: GraphStore::with_options(options),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    #[must_use]
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    #[must_use]
    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.graph.version()
    }

    // =========================================================================
    // CONFIGURATION
    // =========================================================================

    /// Copy out the current configuration.
    #[must_use]
    pub fn export_config(&self) -> TopologyConfig {
        TopologyConfig {
            node_types: self.registry.clone(),
            rules: self.rules.clone(),
        }
    }

    /// Replace the sections present in `patch`.
    ///
    /// Always counts as one change. Returns lint findings for the resulting
    /// configuration; they never block the import.
    pub fn import_config(&mut self, patch: ConfigPatch) -> Vec<ConfigIssue> {
        if let Some(types) = patch.node_types {
            self.registry = types;
        }
        if let Some(rules) = patch.rules {
            self.rules = rules;
        }
        self.graph.bump();
        self.export_config().lint()
    }

    /// Insert or overwrite one node kind. Returns `true` if the key is new.
    ///
    /// A new key gets an empty rule entry.
    pub fn put_type(&mut self, key: &str, node_type: NodeType) -> Result<bool, TopologyError> {
        validate_type_key(key)?;

        let is_new = self.registry.put(key, node_type);
        if is_new {
            self.rules.ensure(key);
        }
        self.graph.bump();
        Ok(is_new)
    }

    /// Remove one node kind and every rule that mentions it.
    ///
    /// Nodes of the kind stay in the graph as orphaned references. Always
    /// counts as one change, even when the key was not registered.
    pub fn remove_type(&mut self, key: &str) -> Option<NodeType> {
        let removed = self.registry.remove(key);
        self.rules.purge(key);
        self.graph.bump();
        removed
    }

    /// Replace the whole rule table.
    pub fn replace_rules(&mut self, rules: RuleTable) {
        self.rules = rules;
        self.graph.bump();
    }

    // =========================================================================
    // GRAPH
    // =========================================================================

    pub fn add_node(&mut self, type_key: &str) -> Result<Node, TopologyError> {
        self.graph.add_node(&self.registry, type_key)
    }

    pub fn update_node(
        &mut self,
        id: NodeId,
        label: Option<String>,
        patch: Option<IndexMap<String, PropertyValue>>,
    ) -> Result<&Node, TopologyError> {
        self.graph.update_node(&self.registry, id, label, patch)
    }

    pub fn move_node(&mut self, id: NodeId, position: Position) -> Result<(), TopologyError> {
        self.graph.move_node(id, position)
    }

    pub fn delete_node(&mut self, id: NodeId) -> Result<Node, TopologyError> {
        self.graph.delete_node(id)
    }

    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> Result<Edge, TopologyError> {
        self.graph.add_edge(&self.registry, &self.rules, from, to)
    }

    pub fn delete_edge(&mut self, id: EdgeId) -> Result<Edge, TopologyError> {
        self.graph.delete_edge(id)
    }

    pub fn select(&mut self, id: NodeId) -> Result<(), TopologyError> {
        self.graph.select(id)
    }

    pub fn deselect(&mut self) {
        self.graph.deselect();
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.graph.snapshot()
    }

    // =========================================================================
    // EXPORT
    // =========================================================================

    /// The nested export document for the current graph.
    #[must_use]
    pub fn build_document(&self) -> Document {
        export::build_document(&self.graph)
    }

    /// Label groups that collapse in the export document.
    #[must_use]
    pub fn label_collisions(&self) -> Vec<LabelCollision> {
        export::label_collisions(&self.graph)
    }
}

fn validate_type_key(key: &str) -> Result<(), TopologyError> {
    if key.trim().is_empty() {
        return Err(TopologyError::InvalidConfig(
            "type key must not be empty".to_string(),
        ));
    }
    if key.len() > MAX_TYPE_KEY_LENGTH {
        return Err(TopologyError::InvalidConfig(format!(
            "type key length {} exceeds maximum {} bytes",
            key.len(),
            MAX_TYPE_KEY_LENGTH
        )));
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_uses_builtin_config() {
        let session = Session::new();
        assert!(session.registry().contains("network"));
        assert!(session.rules().allows("vm", "storage"));
        assert_eq!(session.version(), 0);
    }

    #[test]
    fn put_type_ensures_rule_entry() {
        let mut session = Session::new();
        let is_new = session
            .put_type("switch", NodeType::new("Switch", "#a78bfa", "⇄"))
            .expect("put");

        assert!(is_new);
        assert!(session.rules().has_entry("switch"));
        assert_eq!(session.version(), 1);

        let is_new = session
            .put_type("switch", NodeType::new("L3 Switch", "", ""))
            .expect("put");
        assert!(!is_new);
        assert_eq!(session.version(), 2);
    }

    #[test]
    fn put_type_rejects_bad_keys() {
        let mut session = Session::new();
        assert!(session.put_type("  ", NodeType::new("Blank", "", "")).is_err());
        let long = "k".repeat(MAX_TYPE_KEY_LENGTH + 1);
        assert!(session.put_type(&long, NodeType::new("Long", "", "")).is_err());
        assert_eq!(session.version(), 0);
    }

    #[test]
    fn remove_type_purges_rules_and_orphans_nodes() {
        let mut session = Session::new();
        let vm = session.add_node("vm").expect("add");

        assert!(session.remove_type("vm").is_some());
        assert!(!session.rules().allows("network", "vm"));
        assert!(!session.rules().has_entry("vm"));
        assert!(session.graph().node(vm.id).is_some());
        assert!(session.add_node("vm").is_err());

        assert!(session.remove_type("vm").is_none());
        assert_eq!(session.version(), 3);
    }

    #[test]
    fn import_config_replaces_present_sections_only() {
        let mut session = Session::new();
        let mut rules = RuleTable::new();
        rules.set_allowed("storage", ["vm"]);

        let issues = session.import_config(ConfigPatch {
            node_types: None,
            rules: Some(rules),
        });

        assert!(issues.is_empty());
        assert!(session.registry().contains("network"));
        assert!(session.rules().allows("storage", "vm"));
        assert!(!session.rules().allows("network", "vm"));
        assert_eq!(session.version(), 1);
    }

    #[test]
    fn import_config_reports_lint_but_applies() {
        let mut session = Session::new();
        let mut rules = RuleTable::new();
        rules.set_allowed("network", ["router"]);

        let issues = session.import_config(ConfigPatch {
            node_types: None,
            rules: Some(rules),
        });

        assert_eq!(issues.len(), 1);
        assert!(session.rules().allows("network", "router"));
    }

    #[test]
    fn replace_rules_does_not_touch_existing_edges() {
        let mut session = Session::new();
        let net = session.add_node("network").expect("add");
        let vm = session.add_node("vm").expect("add");
        session.add_edge(net.id, vm.id).expect("edge");

        session.replace_rules(RuleTable::new());

        assert_eq!(session.graph().edge_count(), 1);
        assert!(session.build_document()["Network 1"].get("VM 1").is_some());
        let disk = session.add_node("storage").expect("add");
        assert!(session.add_edge(vm.id, disk.id).is_err());
    }

    #[test]
    fn export_config_round_trips() {
        let session = Session::new();
        let exported = session.export_config();
        assert_eq!(exported, TopologyConfig::default());
    }
}
