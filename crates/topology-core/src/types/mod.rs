//! # Core Type Definitions
//!
//! This module contains the shared vocabulary of the topology graph:
//! - Graph identifiers (`NodeId`, `EdgeId`) and cosmetic `Position`
//! - The property model (`PropertyKind`, `PropertyDefinition`, `PropertyValue`)
//! - Node kinds (`NodeType`) and graph records (`Node`, `Edge`)
//! - Error types (`TopologyError`)
//!
//! ## Ordering Guarantees
//!
//! Identifiers implement `Ord` and are issued from monotonic counters, so a
//! `BTreeMap` keyed by id iterates in creation order. Property schemas and
//! property bags use `IndexMap` so declaration order survives round trips.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// GRAPH IDENTIFIERS
// =============================================================================

/// Unique identifier for a node in the graph.
/// Issued once by the store and never reused after deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a containment edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub u64);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canvas position of a node. Cosmetic only; never consulted by the graph logic.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// =============================================================================
// PROPERTY MODEL
// =============================================================================

/// The editor kind of a property field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    /// Free-text input.
    #[serde(rename = "text")]
    Text,
    /// Numeric input.
    #[serde(rename = "number")]
    Number,
    /// Single choice from `options`.
    #[serde(rename = "select")]
    SingleChoice,
    /// Any subset of `options`, stored as an ordered list.
    #[serde(rename = "multiselect")]
    MultiChoice,
}

impl PropertyKind {
    /// Wire name of the kind, as used in configuration documents.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::SingleChoice => "select",
            Self::MultiChoice => "multiselect",
        }
    }

    /// Whether the field draws its values from an option list.
    #[must_use]
    pub const fn is_choice(self) -> bool {
        matches!(self, Self::SingleChoice | Self::MultiChoice)
    }
}

/// A stored property value.
///
/// Serialized untagged, so the wire form is a plain JSON string, number or
/// array of strings. Deserialization yields `Text`, `Number` or `Choices`;
/// `Choice` is produced when a value is fitted to a single-choice field.
/// `Text` and `Choice` share that wire form, so they compare equal when
/// their strings match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Number(serde_json::Number),
    Choice(String),
    Choices(Vec<String>),
}

impl PropertyValue {
    /// The "unset" value: an empty string.
    #[must_use]
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    /// String content of `Text` and `Choice` values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Choice(s) => Some(s),
            Self::Number(_) | Self::Choices(_) => None,
        }
    }
}

impl PartialEq for PropertyValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Choices(a), Self::Choices(b)) => a == b,
            _ => match (self.as_str(), other.as_str()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl From<&PropertyValue> for serde_json::Value {
    fn from(value: &PropertyValue) -> Self {
        match value {
            PropertyValue::Text(s) | PropertyValue::Choice(s) => Self::String(s.clone()),
            PropertyValue::Number(n) => Self::Number(n.clone()),
            PropertyValue::Choices(list) => {
                Self::Array(list.iter().cloned().map(Self::String).collect())
            }
        }
    }
}

/// Definition of one editable field in a node type's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<PropertyValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl PropertyDefinition {
    /// Create a definition with no default and no options.
    #[must_use]
    pub fn new(kind: PropertyKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            default: None,
            options: Vec::new(),
        }
    }

    /// Builder: set the declared default.
    #[must_use]
    pub fn with_default(mut self, default: PropertyValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Builder: set the option list.
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// The value a freshly created node starts with.
    ///
    /// Multi-choice fields start from their list default or `[]`; every other
    /// field starts from its declared default or `""`.
    #[must_use]
    pub fn initial_value(&self) -> PropertyValue {
        match (self.kind, &self.default) {
            (PropertyKind::MultiChoice, Some(PropertyValue::Choices(list))) => {
                PropertyValue::Choices(list.clone())
            }
            (PropertyKind::MultiChoice, _) => PropertyValue::Choices(Vec::new()),
            (
                PropertyKind::SingleChoice,
                Some(PropertyValue::Text(s) | PropertyValue::Choice(s)),
            ) => PropertyValue::Choice(s.clone()),
            (_, Some(value)) => value.clone(),
            (_, None) => PropertyValue::empty(),
        }
    }

    /// Fit a value to this field, returning the normalized value.
    ///
    /// - text: any string
    /// - number: a JSON number, a numeric string, or `""` (unset)
    /// - select: one listed option
    /// - multiselect: a list of listed options
    ///
    /// An empty option list accepts any string.
    pub fn fit(&self, name: &str, value: PropertyValue) -> Result<PropertyValue, TopologyError> {
        let mismatch = |expected: &str| TopologyError::TypeMismatch {
            property: name.to_string(),
            expected: expected.to_string(),
        };

        match (self.kind, value) {
            (PropertyKind::Text, PropertyValue::Text(s) | PropertyValue::Choice(s)) => {
                Ok(PropertyValue::Text(s))
            }
            (PropertyKind::Text, _) => Err(mismatch("a text value")),

            (PropertyKind::Number, PropertyValue::Number(n)) => Ok(PropertyValue::Number(n)),
            (PropertyKind::Number, PropertyValue::Text(s) | PropertyValue::Choice(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(PropertyValue::empty());
                }
                trimmed
                    .parse::<serde_json::Number>()
                    .map(PropertyValue::Number)
                    .map_err(|_| mismatch("a number"))
            }
            (PropertyKind::Number, PropertyValue::Choices(_)) => Err(mismatch("a number")),

            (PropertyKind::SingleChoice, PropertyValue::Text(s) | PropertyValue::Choice(s)) => {
                if self.allows(&s) {
                    Ok(PropertyValue::Choice(s))
                } else {
                    Err(mismatch("one of the listed options"))
                }
            }
            (PropertyKind::SingleChoice, _) => Err(mismatch("one of the listed options")),

            (PropertyKind::MultiChoice, PropertyValue::Choices(list)) => {
                if list.iter().all(|s| self.allows(s)) {
                    Ok(PropertyValue::Choices(list))
                } else {
                    Err(mismatch("a list of the listed options"))
                }
            }
            (PropertyKind::MultiChoice, _) => Err(mismatch("a list of the listed options")),
        }
    }

    fn allows(&self, option: &str) -> bool {
        self.options.is_empty() || self.options.iter().any(|o| o == option)
    }
}

// =============================================================================
// NODE TYPE
// =============================================================================

/// A node kind: display metadata plus an ordered property schema.
///
/// The kind's key is the key it is registered under in the `TypeRegistry`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeType {
    pub label: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
    #[serde(rename = "props", default)]
    pub properties: IndexMap<String, PropertyDefinition>,
}

impl NodeType {
    /// Create a node type with an empty schema.
    #[must_use]
    pub fn new(label: impl Into<String>, color: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: color.into(),
            icon: icon.into(),
            properties: IndexMap::new(),
        }
    }

    /// Builder: append a property field.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, definition: PropertyDefinition) -> Self {
        self.properties.insert(name.into(), definition);
        self
    }

    /// Property bag for a new node, in schema order.
    #[must_use]
    pub fn initial_properties(&self) -> IndexMap<String, PropertyValue> {
        self.properties
            .iter()
            .map(|(name, def)| (name.clone(), def.initial_value()))
            .collect()
    }
}

// =============================================================================
// GRAPH RECORDS
// =============================================================================

/// A node in the containment graph.
///
/// `properties` is shaped by the node type's schema at creation time; later
/// schema changes are not applied retroactively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub type_key: String,
    pub label: String,
    #[serde(flatten)]
    pub position: Position,
    #[serde(rename = "props")]
    pub properties: IndexMap<String, PropertyValue>,
}

/// A directed containment edge: `from` contains `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the topology core.
///
/// Rejections (`is_rejection`) are expected outcomes of user edits and are
/// meant to be shown to a person. The rest are faults of the caller or of
/// the surrounding I/O.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// No node type is registered under the key.
    #[error("Unknown node type: '{0}'")]
    UnknownType(String),

    /// The requested node was not found in the graph.
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// The requested edge was not found in the graph.
    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),

    /// The rule table does not allow the child kind under the parent kind.
    #[error("{child} cannot be nested inside {parent}")]
    InvalidNesting { child: String, parent: String },

    /// An edge with the same (from, to) pair already exists.
    #[error("Connection already exists")]
    DuplicateEdge,

    /// The edge would make a node contain one of its own ancestors.
    #[error("Connection would create a containment cycle")]
    CycleDetected,

    /// A property value does not fit its field definition.
    #[error("Property '{property}' expects {expected}")]
    TypeMismatch { property: String, expected: String },

    /// A property patch names a field the node type does not declare.
    #[error("Unknown property: '{0}'")]
    UnknownProperty(String),

    /// A configuration document could not be used.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl TopologyError {
    /// Whether this error rejects a user edit rather than signalling a fault.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::NodeNotFound(_)
                | Self::EdgeNotFound(_)
                | Self::InvalidNesting { .. }
                | Self::DuplicateEdge
                | Self::CycleDetected
                | Self::TypeMismatch { .. }
                | Self::UnknownProperty(_)
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
