//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api;
use crate::settings::{self, MAX_SETTINGS_FILE_SIZE, Settings};
use std::path::Path;
use topology_core::{TopologyConfig, TopologyError};

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(settings: &Settings, verbose: bool) -> Result<(), TopologyError> {
    let session = settings.build_session()?;

    println!("Topology Builder Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:        {}", settings.server.host);
    println!("  Port:        {}", settings.server.port);
    println!(
        "  Node types:  {}",
        settings
            .types
            .path
            .as_ref()
            .map_or_else(|| "built-in".to_string(), |p| p.display().to_string())
    );
    println!(
        "  Properties:  {}",
        if settings.store.strict_properties {
            "strict"
        } else {
            "permissive"
        }
    );
    println!();
    if verbose {
        println!("Endpoints:");
        println!("  GET    /api/config       - Node types and rules");
        println!("  GET    /api/state        - Graph state and change counter");
        println!("  GET    /api/json         - Nested export document");
        println!("  POST   /api/node         - Create a node");
        println!("  POST   /api/edge         - Connect parent to child");
        println!("  GET    /api/settings     - Export configuration");
        println!("  POST   /api/settings     - Import configuration");
        println!("  GET    /health           - Health check");
        println!();
    }
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    api::run_server(&addr, session, &settings.server.cors_origins).await
}

// =============================================================================
// DEFAULTS COMMAND
// =============================================================================

/// Print the built-in node-type configuration.
pub fn cmd_defaults() -> Result<(), TopologyError> {
    println!("{}", TopologyConfig::default().to_json_pretty()?);
    Ok(())
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Parse and lint a node-type configuration file.
///
/// Lint findings are reported but do not fail the command; a document that
/// does not parse does.
pub fn cmd_check(file: &Path, json_mode: bool) -> Result<(), TopologyError> {
    let (path, text) = settings::read_input_file(file, MAX_SETTINGS_FILE_SIZE)?;
    let config = TopologyConfig::from_json_str(&text)?;
    let issues = config.lint();

    if json_mode {
        let output = serde_json::json!({
            "file": path.to_string_lossy(),
            "node_types": config.node_types.len(),
            "rules": config.rules.iter().count(),
            "issues": issues,
        });
        let rendered = serde_json::to_string_pretty(&output)
            .map_err(|e| TopologyError::SerializationError(e.to_string()))?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("Configuration Check");
    println!("===================");
    println!("File:       {}", path.display());
    println!("Node types: {}", config.node_types.len());
    println!("Rules:      {}", config.rules.iter().count());
    println!();

    if issues.is_empty() {
        println!("No issues found.");
    } else {
        println!("{} issue(s):", issues.len());
        for issue in &issues {
            println!("  - {}", issue);
        }
    }

    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
