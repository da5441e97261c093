//! # Type Registry
//!
//! The set of node kinds a graph may be built from, keyed by type key and
//! kept in registration order.
//!
//! Registry edits never touch the graph: removing a kind leaves its nodes in
//! place as orphaned references. Consumers treat a failed `get` as "unknown
//! type" and fall back to the raw key (see `display_label`).

use crate::NodeType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Registered node kinds, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRegistry {
    types: IndexMap<String, NodeType>,
}

impl TypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from an ordered mapping.
    #[must_use]
    pub fn from_types(types: IndexMap<String, NodeType>) -> Self {
        Self { types }
    }

    /// Look up a node kind.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&NodeType> {
        self.types.get(key)
    }

    /// Check whether a kind is registered.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.types.contains_key(key)
    }

    /// Insert or overwrite a kind. Returns `true` if the key is new.
    ///
    /// An overwrite keeps the key's original position. Callers introducing a
    /// new key must also `RuleTable::ensure` it.
    pub fn put(&mut self, key: impl Into<String>, node_type: NodeType) -> bool {
        self.types.insert(key.into(), node_type).is_none()
    }

    /// Remove a kind, returning it if it was registered.
    ///
    /// Callers must also `RuleTable::purge` the key.
    pub fn remove(&mut self, key: &str) -> Option<NodeType> {
        self.types.shift_remove(key)
    }

    /// Replace every kind at once. Nothing is validated against the graph.
    pub fn replace_all(&mut self, types: IndexMap<String, NodeType>) {
        self.types = types;
    }

    /// Human label for a type key, or the key itself when unregistered.
    #[must_use]
    pub fn display_label<'a>(&'a self, key: &'a str) -> &'a str {
        self.types.get(key).map_or(key, |t| t.label.as_str())
    }

    /// Iterate over `(key, kind)` in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &NodeType)> {
        self.types.iter()
    }

    /// Registered keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.types.keys()
    }

    /// Number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no kinds are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The underlying ordered mapping.
    #[must_use]
    pub fn as_map(&self) -> &IndexMap<String, NodeType> {
        &self.types
    }
}
