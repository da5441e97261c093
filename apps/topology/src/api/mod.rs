//! # Topology HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /api/config` - Node types and rules
//! - `GET /api/state` - Nodes, edges, selection and change counter
//! - `GET /api/json` - Nested export document
//! - `GET /api/json/collisions` - Labels that collapse in the export
//! - `POST /api/node` - Create a node
//! - `PATCH /api/node/{id}` - Rename / patch properties
//! - `PUT /api/node/{id}/pos` - Move
//! - `PUT /api/node/{id}/select` - Select
//! - `DELETE /api/node/deselect` - Clear selection
//! - `DELETE /api/node/{id}` - Delete with cascade
//! - `POST /api/edge` - Connect parent to child
//! - `DELETE /api/edge/{id}` - Disconnect
//! - `GET|POST /api/settings` - Export / import configuration
//! - `PUT|DELETE /api/settings/type/{key}` - Upsert / remove a node type
//! - `PUT /api/settings/rules` - Replace the rule table
//!
//! ## CORS
//!
//! Origins come from the settings file or `TOPOLOGY_CORS_ORIGINS`:
//! `["*"]` allows all, an empty list allows localhost only.

mod handlers;
mod types;

// Re-export handlers and types for integration tests (via `topology::api::*`)
#[allow(unused_imports)]
pub use handlers::{
    ApiError, ApiJson, add_edge_handler, add_node_handler, collisions_handler, config_handler,
    delete_edge_handler, delete_node_handler, delete_type_handler, deselect_handler,
    health_handler, import_settings_handler, json_handler, move_node_handler,
    put_rules_handler, put_type_handler, select_node_handler, state_handler,
    update_node_handler,
};
#[allow(unused_imports)]
pub use types::{
    AckResponse, AddEdgeRequest, AddNodeRequest, CollisionsResponse, EdgeResponse,
    HealthResponse, ImportResponse, MoveNodeRequest, StateResponse, UpdateNodeRequest,
};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{delete, get, patch, post, put},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use topology_core::{Session, TopologyError};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request body limit (2 MB).
const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the editing session.
#[derive(Clone)]
pub struct AppState {
    /// The session; one lock serializes every mutation.
    pub session: Arc<RwLock<Session>>,
}

impl AppState {
    /// Create new app state with a session.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

const CORS_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

/// Build the CORS layer from the configured origins.
///
/// - `["*"]`: allows all origins
/// - empty: localhost only
/// - otherwise: the listed origins; invalid entries are skipped
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS: Allowing ALL origins. This is insecure for production!");
        return CorsLayer::permissive();
    }

    if origins.is_empty() {
        tracing::info!("CORS: No origins configured, defaulting to localhost only");
        return build_localhost_cors();
    }

    let allowed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(hv) => {
                tracing::info!("CORS: Allowing origin: {}", origin);
                Some(hv)
            }
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    if allowed_origins.is_empty() {
        tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
        return build_localhost_cors();
    }

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(CORS_METHODS)
        .allow_headers([header::CONTENT_TYPE])
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(CORS_METHODS)
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner): tracing, CORS, body limit.
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    let cors = build_cors_layer(cors_origins);

    Router::new()
        .route("/health", get(handlers::health_handler))
        // read
        .route("/api/config", get(handlers::config_handler))
        .route("/api/state", get(handlers::state_handler))
        .route("/api/json", get(handlers::json_handler))
        .route("/api/json/collisions", get(handlers::collisions_handler))
        // nodes
        .route("/api/node", post(handlers::add_node_handler))
        .route("/api/node/deselect", delete(handlers::deselect_handler))
        .route(
            "/api/node/{id}",
            patch(handlers::update_node_handler)
                .delete(handlers::delete_node_handler),
        )
        .route("/api/node/{id}/pos", put(handlers::move_node_handler))
        .route("/api/node/{id}/select", put(handlers::select_node_handler))
        // edges
        .route("/api/edge", post(handlers::add_edge_handler))
        .route("/api/edge/{id}", delete(handlers::delete_edge_handler))
        // settings
        .route(
            "/api/settings",
            get(handlers::config_handler).post(handlers::import_settings_handler),
        )
        .route(
            "/api/settings/type/{key}",
            put(handlers::put_type_handler).delete(handlers::delete_type_handler),
        )
        .route("/api/settings/rules", put(handlers::put_rules_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(MAX_BODY_SIZE)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(
    addr: &str,
    session: Session,
    cors_origins: &[String],
) -> Result<(), TopologyError> {
    let state = AppState::new(session);
    let router = create_router(state, cors_origins);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| TopologyError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Topology builder listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| TopologyError::IoError(format!("Server error: {}", e)))
}
