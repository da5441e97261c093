//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Graph records (`Node`, `Edge`) and configuration documents
//! (`ConfigPatch`, `NodeType`, `RuleTable`) are sent in their core serde
//! shapes; only request envelopes and acknowledgements live here.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use topology_core::{
    ConfigIssue, Edge, LabelCollision, Node, NodeId, Position, PropertyValue, Snapshot,
    TopologyError,
    primitives::{MAX_LABEL_LENGTH, MAX_TYPE_KEY_LENGTH},
};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATE RESPONSE
// =============================================================================

/// Full graph state for pollers. `v` changes whenever anything changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateResponse {
    pub v: u64,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub sel: Option<NodeId>,
}

impl From<Snapshot> for StateResponse {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            v: snapshot.version,
            nodes: snapshot.nodes,
            edges: snapshot.edges,
            sel: snapshot.selected_id,
        }
    }
}

// =============================================================================
// ACKNOWLEDGEMENT
// =============================================================================

/// Outcome of a mutation that returns no record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AckResponse {
    pub fn success() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// NODE REQUESTS
// =============================================================================

/// Create a node of the given kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddNodeRequest {
    #[serde(rename = "type")]
    pub type_key: String,
}

impl AddNodeRequest {
    /// Reject oversized keys at the API boundary.
    pub fn validate(&self) -> Result<(), TopologyError> {
        if self.type_key.len() > MAX_TYPE_KEY_LENGTH {
            return Err(TopologyError::UnknownType(format!(
                "{}...",
                truncate(&self.type_key, MAX_TYPE_KEY_LENGTH)
            )));
        }
        Ok(())
    }
}

/// Rename a node and/or merge a property patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNodeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<IndexMap<String, PropertyValue>>,
}

impl UpdateNodeRequest {
    /// Reject oversized labels at the API boundary.
    pub fn validate(&self) -> Result<(), TopologyError> {
        match &self.label {
            Some(label) if label.len() > MAX_LABEL_LENGTH => {
                Err(TopologyError::TypeMismatch {
                    property: "label".to_string(),
                    expected: format!("at most {} bytes", MAX_LABEL_LENGTH),
                })
            }
            _ => Ok(()),
        }
    }
}

/// New canvas position of a node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MoveNodeRequest {
    pub x: f64,
    pub y: f64,
}

impl From<MoveNodeRequest> for Position {
    fn from(request: MoveNodeRequest) -> Self {
        Position::new(request.x, request.y)
    }
}

// =============================================================================
// EDGE REQUEST/RESPONSE
// =============================================================================

/// Connect `from` (parent) to `to` (child).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AddEdgeRequest {
    pub from: u64,
    pub to: u64,
}

/// Edge creation outcome. Rejections carry a human-readable `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge: Option<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EdgeResponse {
    pub fn success(edge: Edge) -> Self {
        Self {
            ok: true,
            edge: Some(edge),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            edge: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// SETTINGS RESPONSES
// =============================================================================

/// Configuration import outcome, with non-blocking lint findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ImportResponse {
    pub fn with_issues(issues: &[ConfigIssue]) -> Self {
        Self {
            ok: true,
            warnings: issues.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Label groups that collapse in the export document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionsResponse {
    pub collisions: Vec<LabelCollision>,
}

fn truncate(s: &str, max: usize) -> &str {
    let mut end = max.min(s.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
