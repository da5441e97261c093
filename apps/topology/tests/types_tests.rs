//! Unit tests for API types serialization/deserialization.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use serde_json::json;
use topology::api::{
    AckResponse, AddEdgeRequest, AddNodeRequest, EdgeResponse, HealthResponse, ImportResponse,
    MoveNodeRequest, StateResponse, UpdateNodeRequest,
};
use topology_core::{
    ConfigIssue, Edge, EdgeId, NodeId, Position, PropertyValue, TopologyError,
    primitives::{MAX_LABEL_LENGTH, MAX_TYPE_KEY_LENGTH},
};

// =============================================================================
// HEALTH RESPONSE TESTS
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[test]
fn test_health_response_deserialization() {
    let json = r#"{"status":"healthy","version":"1.0.0"}"#;
    let health: HealthResponse = serde_json::from_str(json).unwrap();

    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, "1.0.0");
}

// =============================================================================
// ACK RESPONSE TESTS
// =============================================================================

#[test]
fn test_ack_success_omits_error() {
    let json = serde_json::to_value(AckResponse::success()).unwrap();
    assert_eq!(json, json!({ "ok": true }));
}

#[test]
fn test_ack_error_carries_message() {
    let json = serde_json::to_value(AckResponse::error("Node not found: 3")).unwrap();
    assert_eq!(json, json!({ "ok": false, "error": "Node not found: 3" }));
}

// =============================================================================
// NODE REQUEST TESTS
// =============================================================================

#[test]
fn test_add_node_request_uses_type_key() {
    let request: AddNodeRequest = serde_json::from_str(r#"{"type":"vm"}"#).unwrap();
    assert_eq!(request.type_key, "vm");
    assert!(request.validate().is_ok());
}

#[test]
fn test_add_node_request_rejects_oversized_key() {
    let request = AddNodeRequest {
        type_key: "k".repeat(MAX_TYPE_KEY_LENGTH + 1),
    };
    assert!(matches!(
        request.validate(),
        Err(TopologyError::UnknownType(_))
    ));
}

#[test]
fn test_update_node_request_all_fields_optional() {
    let request: UpdateNodeRequest = serde_json::from_str("{}").unwrap();
    assert!(request.label.is_none());
    assert!(request.props.is_none());
}

#[test]
fn test_update_node_request_keeps_patch_order_and_shapes() {
    let json = r#"{"props":{"roles":["nginx","docker"],"vlan":100,"cpu":"4 vCPU"}}"#;
    let request: UpdateNodeRequest = serde_json::from_str(json).unwrap();
    let props = request.props.unwrap();

    let keys: Vec<_> = props.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["roles", "vlan", "cpu"]);
    assert_eq!(
        props["roles"],
        PropertyValue::Choices(vec!["nginx".into(), "docker".into()])
    );
    assert!(matches!(props["vlan"], PropertyValue::Number(_)));
    assert_eq!(props["cpu"].as_str(), Some("4 vCPU"));
}

#[test]
fn test_update_node_request_rejects_oversized_label() {
    let request = UpdateNodeRequest {
        label: Some("x".repeat(MAX_LABEL_LENGTH + 1)),
        props: None,
    };
    let err = request.validate().unwrap_err();
    assert!(err.is_rejection());
}

#[test]
fn test_move_request_into_position() {
    let request: MoveNodeRequest = serde_json::from_str(r#"{"x":12.5,"y":-3}"#).unwrap();
    let position: Position = request.into();
    assert_eq!(position, Position::new(12.5, -3.0));
}

// =============================================================================
// EDGE TYPES TESTS
// =============================================================================

#[test]
fn test_add_edge_request_deserialization() {
    let request: AddEdgeRequest = serde_json::from_str(r#"{"from":1,"to":2}"#).unwrap();
    assert_eq!(request.from, 1);
    assert_eq!(request.to, 2);
}

#[test]
fn test_edge_response_success_shape() {
    let edge = Edge {
        id: EdgeId(7),
        from: NodeId(1),
        to: NodeId(2),
    };
    let json = serde_json::to_value(EdgeResponse::success(edge)).unwrap();
    assert_eq!(
        json,
        json!({ "ok": true, "edge": { "id": 7, "from": 1, "to": 2 } })
    );
}

#[test]
fn test_edge_response_error_shape() {
    let json = serde_json::to_value(EdgeResponse::error("Connection already exists")).unwrap();
    assert_eq!(
        json,
        json!({ "ok": false, "error": "Connection already exists" })
    );
}

// =============================================================================
// STATE / SETTINGS RESPONSE TESTS
// =============================================================================

#[test]
fn test_state_response_deserializes_wire_shape() {
    let json = json!({
        "v": 5,
        "nodes": [{
            "id": 1, "type": "network", "label": "Network 1",
            "x": 180.0, "y": 100.0, "props": { "cidr": "10.0.0.0/24" }
        }],
        "edges": [],
        "sel": 1
    });
    let state: StateResponse = serde_json::from_value(json).unwrap();

    assert_eq!(state.v, 5);
    assert_eq!(state.nodes[0].label, "Network 1");
    assert_eq!(state.nodes[0].position, Position::new(180.0, 100.0));
    assert_eq!(state.sel, Some(NodeId(1)));
}

#[test]
fn test_import_response_lists_issue_messages() {
    let issues = vec![ConfigIssue::UnknownRuleChild {
        parent: "network".into(),
        child: "router".into(),
    }];
    let response = ImportResponse::with_issues(&issues);

    assert!(response.ok);
    assert_eq!(response.warnings, vec![issues[0].to_string()]);
}

#[test]
fn test_import_response_without_issues_omits_warnings() {
    let json = serde_json::to_value(ImportResponse::with_issues(&[])).unwrap();
    assert_eq!(json, json!({ "ok": true }));
}
