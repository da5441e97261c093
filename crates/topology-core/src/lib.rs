//! # topology-core
//!
//! The containment-graph engine of the topology builder - THE LOGIC.
//!
//! A user assembles a typed hierarchy (networks containing VMs containing
//! storage) as an editable graph; this crate owns that graph and renders it
//! as a nested JSON document.
//!
//! ## Components
//!
//! - `registry` - node kinds with display metadata and property schemas
//! - `rules` - which kinds may directly contain which
//! - `graph` - nodes, edges, selection and the version counter
//! - `export` - the nested, label-keyed export document
//! - `session` - one registry + rules + graph, owned together
//!
//! ## Architectural Constraints
//!
//! - No async, no I/O, no global state: callers own their `Session`
//! - Deterministic: ordered maps, ids from monotonic counters
//! - Every fallible operation returns `Result<T, TopologyError>`

// =============================================================================
// MODULES
// =============================================================================

pub mod config;
pub mod export;
pub mod graph;
pub mod primitives;
pub mod registry;
pub mod rules;
pub mod session;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Edge, EdgeId, Node, NodeId, NodeType, Position, PropertyDefinition, PropertyKind,
    PropertyValue, TopologyError,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use config::{ConfigIssue, ConfigPatch, TopologyConfig};
pub use export::{Document, LabelCollision, build_document, label_collisions};
pub use graph::{GraphStore, Snapshot, StoreOptions};
pub use registry::TypeRegistry;
pub use rules::RuleTable;
pub use session::Session;
