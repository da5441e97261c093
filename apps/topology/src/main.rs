//! # Topology Builder Server
//!
//! The main binary for the topology builder.
//!
//! This application provides:
//! - HTTP REST API server (axum-based) over one shared editing session
//! - CLI interface for inspecting node-type configurations
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │            apps/topology (THE BINARY)           │
//! │                                                 │
//! │   ┌─────────────┐          ┌─────────────┐      │
//! │   │    CLI      │          │  HTTP API   │      │
//! │   │   (clap)    │          │   (axum)    │      │
//! │   └──────┬──────┘          └──────┬──────┘      │
//! │          └────────────┬───────────┘             │
//! │                       ▼                         │
//! │               ┌───────────────┐                 │
//! │               │ topology-core │                 │
//! │               │  (THE LOGIC)  │                 │
//! │               └───────────────┘                 │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! topology server --host 0.0.0.0 --port 8080 --config topology.toml
//!
//! # Configuration tooling
//! topology defaults > node-types.json
//! topology check -f node-types.json
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // TOPOLOGY_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("TOPOLOGY_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "topology=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = topology::cli::Cli::parse();

    // Keep stdout clean for commands whose output is piped.
    if !cli.quiet && cli.runs_server() {
        print_banner();
    }

    if let Err(e) = topology::cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  ┌─┐ ┌─┐ ┌─┐
  │N├─┤V├─┤S│   Topology Builder v{}
  └─┘ └─┘ └─┘
"#,
        env!("CARGO_PKG_VERSION")
    );
}
