//! # Rule Table
//!
//! Which kinds may be directly contained by which. A parent key with no
//! entry, or with an empty set, permits no children.
//!
//! The table is not cross-checked against the `TypeRegistry`; use
//! `TopologyConfig::lint` to find rules that name unknown kinds.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Parent kind key -> ordered set of allowed child kind keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable {
    rules: IndexMap<String, IndexSet<String>>,
}

impl RuleTable {
    /// Create an empty rule table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a rule table from an ordered mapping.
    #[must_use]
    pub fn from_rules(rules: IndexMap<String, IndexSet<String>>) -> Self {
        Self { rules }
    }

    /// Kinds allowed directly beneath `parent` (empty if none).
    pub fn allowed_children<'a>(&'a self, parent: &str) -> impl Iterator<Item = &'a String> {
        self.rules.get(parent).into_iter().flatten()
    }

    /// Whether `child` may be nested directly inside `parent`.
    #[must_use]
    pub fn allows(&self, parent: &str, child: &str) -> bool {
        self.rules
            .get(parent)
            .is_some_and(|children| children.contains(child))
    }

    /// Set the allowed children of `parent`, replacing any previous set.
    pub fn set_allowed<I, S>(&mut self, parent: impl Into<String>, children: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules
            .insert(parent.into(), children.into_iter().map(Into::into).collect());
    }

    /// Guarantee an entry exists for `key`, adding an empty one if needed.
    pub fn ensure(&mut self, key: impl Into<String>) {
        self.rules.entry(key.into()).or_default();
    }

    /// Remove `key` as a parent and from every child set.
    pub fn purge(&mut self, key: &str) {
        self.rules.shift_remove(key);
        for children in self.rules.values_mut() {
            children.shift_remove(key);
        }
    }

    /// Replace the whole table. Not validated against the registry.
    pub fn replace_all(&mut self, rules: IndexMap<String, IndexSet<String>>) {
        self.rules = rules;
    }

    /// Whether `key` has an entry (possibly empty).
    #[must_use]
    pub fn has_entry(&self, key: &str) -> bool {
        self.rules.contains_key(key)
    }

    /// Iterate over `(parent, children)` in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &IndexSet<String>)> {
        self.rules.iter()
    }

    /// The underlying ordered mapping.
    #[must_use]
    pub fn as_map(&self) -> &IndexMap<String, IndexSet<String>> {
        &self.rules
    }
}
