//! # topology
//!
//! Transport for the topology builder: the HTTP API, the CLI and the
//! settings file. All graph logic lives in `topology-core`.

pub mod api;
pub mod cli;
pub mod settings;
