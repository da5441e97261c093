//! # Topology CLI Module
//!
//! This module implements the CLI interface for the topology builder.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server (default)
//! - `defaults` - Print the built-in node-type configuration
//! - `check` - Parse and lint a node-type configuration file

mod commands;

use crate::settings::Settings;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use topology_core::TopologyError;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Topology Builder
///
/// Assemble typed infrastructure hierarchies (networks, VMs, storage) as a
/// containment graph and export them as nested JSON.
#[derive(Parser, Debug)]
#[command(name = "topology")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the TOML settings file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Whether this invocation starts the HTTP server.
    #[must_use]
    pub fn runs_server(&self) -> bool {
        matches!(self.command, None | Some(Commands::Server { .. }))
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides the settings file)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides the settings file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the built-in node-type configuration as JSON
    Defaults,

    /// Parse and lint a node-type configuration file
    Check {
        /// Path to the JSON configuration file
        #[arg(short, long)]
        file: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), TopologyError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Defaults) => cmd_defaults(),
        Some(Commands::Check { file }) => cmd_check(&file, json_mode),
        Some(Commands::Server { host, port }) => {
            let settings = load_settings(cli.config.as_deref(), host, port)?;
            cmd_server(&settings, cli.verbose).await
        }
        None => {
            // No subcommand - start the server with file settings
            let settings = load_settings(cli.config.as_deref(), None, None)?;
            cmd_server(&settings, cli.verbose).await
        }
    }
}

/// Settings file, then environment, then command-line flags.
fn load_settings(
    path: Option<&std::path::Path>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<Settings, TopologyError> {
    let mut settings = Settings::load(path)?;
    settings.apply_env();
    if let Some(host) = host {
        settings.server.host = host;
    }
    if let Some(port) = port {
        settings.server.port = port;
    }
    Ok(settings)
}
