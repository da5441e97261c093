//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Rejected edits (see `TopologyError::is_rejection`) answer `200` with
//! `{"ok": false, "error": ...}` so the editor can show the message inline.
//! Faults answer with a 4xx/5xx status and the same body. So do bodies the
//! extractor cannot parse, such as a `null` or boolean property value.

use super::{
    AppState,
    types::{
        AckResponse, AddEdgeRequest, AddNodeRequest, CollisionsResponse, EdgeResponse,
        HealthResponse, ImportResponse, MoveNodeRequest, StateResponse, UpdateNodeRequest,
    },
};
use axum::{
    Json,
    extract::{FromRequest, Path, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use topology_core::{
    ConfigPatch, Document, EdgeId, Node, NodeId, NodeType, RuleTable, TopologyConfig,
    TopologyError,
};

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// A core error on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub TopologyError);

impl From<TopologyError> for ApiError {
    fn from(err: TopologyError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        if self.0.is_rejection() {
            return StatusCode::OK;
        }
        match self.0 {
            TopologyError::UnknownType(_) | TopologyError::InvalidConfig(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::OK {
            tracing::info!("Rejected: {}", self.0);
        } else {
            tracing::warn!("Request failed ({}): {}", status, self.0);
        }
        (status, Json(AckResponse::error(self.0.to_string()))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// JSON body extractor whose rejections use the `AckResponse` body.
///
/// The status is axum's own: 400 for bad syntax, 415 for a non-JSON content
/// type, 422 for a body that does not fit the request type.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                let status = rejection.status();
                let message = rejection.body_text();
                tracing::warn!("Request body rejected ({}): {}", status, message);
                Err((status, Json(AckResponse::error(message))).into_response())
            }
        }
    }
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// READ HANDLERS
// =============================================================================

/// Current node-type configuration. Served at `/api/config` and `/api/settings`.
pub async fn config_handler(State(state): State<AppState>) -> Json<TopologyConfig> {
    let session = state.session.read().await;
    Json(session.export_config())
}

/// Full graph state with the change counter.
pub async fn state_handler(State(state): State<AppState>) -> Json<StateResponse> {
    let session = state.session.read().await;
    Json(StateResponse::from(session.snapshot()))
}

/// The nested export document.
pub async fn json_handler(State(state): State<AppState>) -> Json<Document> {
    let session = state.session.read().await;

    for collision in session.label_collisions() {
        tracing::warn!(
            "Export drops {} nodes sharing label '{}'",
            collision.nodes.len().saturating_sub(1),
            collision.label
        );
    }

    Json(session.build_document())
}

/// Sibling groups whose labels collapse in the export document.
pub async fn collisions_handler(State(state): State<AppState>) -> Json<CollisionsResponse> {
    let session = state.session.read().await;
    Json(CollisionsResponse {
        collisions: session.label_collisions(),
    })
}

// =============================================================================
// NODE HANDLERS
// =============================================================================

/// Create a node of the requested kind. Returns the node record.
pub async fn add_node_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddNodeRequest>,
) -> ApiResult<Node> {
    request.validate()?;

    let mut session = state.session.write().await;
    let node = session.add_node(&request.type_key)?;
    tracing::debug!("Added node {} ({}) as '{}'", node.id, node.type_key, node.label);
    Ok(Json(node))
}

/// Rename a node and/or merge a property patch.
pub async fn update_node_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    ApiJson(request): ApiJson<UpdateNodeRequest>,
) -> ApiResult<AckResponse> {
    request.validate()?;

    let mut session = state.session.write().await;
    session.update_node(NodeId(id), request.label, request.props)?;
    tracing::debug!("Updated node {}", id);
    Ok(Json(AckResponse::success()))
}

/// Move a node on the canvas.
pub async fn move_node_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    ApiJson(request): ApiJson<MoveNodeRequest>,
) -> ApiResult<AckResponse> {
    let mut session = state.session.write().await;
    session.move_node(NodeId(id), request.into())?;
    tracing::debug!("Moved node {}", id);
    Ok(Json(AckResponse::success()))
}

/// Select a node.
pub async fn select_node_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<AckResponse> {
    let mut session = state.session.write().await;
    session.select(NodeId(id))?;
    Ok(Json(AckResponse::success()))
}

/// Clear the selection.
pub async fn deselect_handler(State(state): State<AppState>) -> Json<AckResponse> {
    let mut session = state.session.write().await;
    session.deselect();
    Json(AckResponse::success())
}

/// Delete a node and every edge touching it.
pub async fn delete_node_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<AckResponse> {
    let mut session = state.session.write().await;
    let node = session.delete_node(NodeId(id))?;
    tracing::debug!("Deleted node {} ('{}')", node.id, node.label);
    Ok(Json(AckResponse::success()))
}

// =============================================================================
// EDGE HANDLERS
// =============================================================================

/// Connect a parent to a child, subject to the rule table.
pub async fn add_edge_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddEdgeRequest>,
) -> Response {
    let mut session = state.session.write().await;
    match session.add_edge(NodeId(request.from), NodeId(request.to)) {
        Ok(edge) => {
            tracing::debug!("Added edge {} ({} -> {})", edge.id, edge.from, edge.to);
            Json(EdgeResponse::success(edge)).into_response()
        }
        Err(e) if e.is_rejection() => {
            tracing::info!("Rejected edge {} -> {}: {}", request.from, request.to, e);
            Json(EdgeResponse::error(e.to_string())).into_response()
        }
        Err(e) => ApiError(e).into_response(),
    }
}

/// Delete an edge.
pub async fn delete_edge_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<AckResponse> {
    let mut session = state.session.write().await;
    session.delete_edge(EdgeId(id))?;
    tracing::debug!("Deleted edge {}", id);
    Ok(Json(AckResponse::success()))
}

// =============================================================================
// SETTINGS HANDLERS
// =============================================================================

/// Replace the node types and/or rules present in the body.
pub async fn import_settings_handler(
    State(state): State<AppState>,
    ApiJson(patch): ApiJson<ConfigPatch>,
) -> Json<ImportResponse> {
    let mut session = state.session.write().await;
    let issues = session.import_config(patch);
    for issue in &issues {
        tracing::warn!("Imported configuration: {}", issue);
    }
    Json(ImportResponse::with_issues(&issues))
}

/// Insert or overwrite one node kind.
pub async fn put_type_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    ApiJson(node_type): ApiJson<NodeType>,
) -> ApiResult<AckResponse> {
    let mut session = state.session.write().await;
    let is_new = session.put_type(&key, node_type)?;
    tracing::debug!(
        "{} node type '{}'",
        if is_new { "Added" } else { "Replaced" },
        key
    );
    Ok(Json(AckResponse::success()))
}

/// Remove one node kind and every rule mentioning it.
pub async fn delete_type_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<AckResponse> {
    let mut session = state.session.write().await;
    if session.remove_type(&key).is_some() {
        tracing::debug!("Removed node type '{}'", key);
    }
    Json(AckResponse::success())
}

/// Replace the whole rule table.
pub async fn put_rules_handler(
    State(state): State<AppState>,
    ApiJson(rules): ApiJson<RuleTable>,
) -> Json<AckResponse> {
    let mut session = state.session.write().await;
    session.replace_rules(rules);
    for issue in session.export_config().lint() {
        tracing::warn!("Rule table: {}", issue);
    }
    Json(AckResponse::success())
}
