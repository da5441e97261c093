//! # Settings
//!
//! Optional TOML settings file for the binary:
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//! cors_origins = ["http://localhost:8080"]
//!
//! [store]
//! strict_properties = true
//!
//! [types]
//! path = "node-types.json"
//! ```
//!
//! Every section and field is optional. `TOPOLOGY_CORS_ORIGINS`
//! (comma-separated, or `*`) overrides `server.cors_origins`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use topology_core::{Session, StoreOptions, TopologyConfig, TopologyError};

/// Environment variable overriding the allowed CORS origins.
pub const CORS_ENV: &str = "TOPOLOGY_CORS_ORIGINS";

/// Maximum size of a settings or configuration file (1 MB).
pub const MAX_SETTINGS_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// SETTINGS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub types: TypesSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Allowed origins. Empty means localhost only; `["*"]` allows all.
    pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub strict_properties: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            strict_properties: StoreOptions::default().strict_properties,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypesSettings {
    /// JSON node-type configuration replacing the built-in one.
    pub path: Option<PathBuf>,
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, TopologyError> {
        toml::from_str(text)
            .map_err(|e| TopologyError::InvalidConfig(format!("Invalid settings file: {}", e)))
    }

    /// Load settings from `path`, or defaults when no path is given.
    ///
    /// A relative `types.path` is resolved against the settings file's
    /// directory.
    pub fn load(path: Option<&Path>) -> Result<Self, TopologyError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let (_, text) = read_input_file(path, MAX_SETTINGS_FILE_SIZE)?;
        let mut settings = Self::from_toml_str(&text)?;

        if let (Some(types_path), Some(dir)) = (&settings.types.path, path.parent())
            && types_path.is_relative()
        {
            settings.types.path = Some(dir.join(types_path));
        }

        Ok(settings)
    }

    /// Apply environment overrides.
    pub fn apply_env(&mut self) {
        if let Ok(origins) = std::env::var(CORS_ENV) {
            self.apply_cors_override(&origins);
        }
    }

    /// Replace the CORS origins with a comma-separated list.
    pub fn apply_cors_override(&mut self, origins: &str) {
        self.server.cors_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect();
    }

    #[must_use]
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            strict_properties: self.store.strict_properties,
        }
    }

    /// The node-type configuration: the `types.path` file, or the built-in one.
    pub fn load_topology_config(&self) -> Result<TopologyConfig, TopologyError> {
        match &self.types.path {
            Some(path) => load_config_file(path),
            None => Ok(TopologyConfig::default()),
        }
    }

    /// A fresh session configured from these settings.
    pub fn build_session(&self) -> Result<Session, TopologyError> {
        let config = self.load_topology_config()?;
        for issue in config.lint() {
            tracing::warn!("Node type configuration: {}", issue);
        }
        Ok(Session::with_config(config, self.store_options()))
    }
}

/// Read and parse a JSON node-type configuration file.
pub fn load_config_file(path: &Path) -> Result<TopologyConfig, TopologyError> {
    let (_, text) = read_input_file(path, MAX_SETTINGS_FILE_SIZE)?;
    TopologyConfig::from_json_str(&text)
}

// =============================================================================
// FILE VALIDATION
// =============================================================================

/// Read a small input file after validating it.
///
/// The path is canonicalized (resolving symlinks and "..") and must name a
/// regular file no larger than `max_size`. Returns the canonical path with
/// the contents.
pub fn read_input_file(path: &Path, max_size: u64) -> Result<(PathBuf, String), TopologyError> {
    let canonical = validate_input_file(path, max_size)?;
    let text = std::fs::read_to_string(&canonical).map_err(|e| {
        TopologyError::IoError(format!("Cannot read '{}': {}", canonical.display(), e))
    })?;
    Ok((canonical, text))
}

fn validate_input_file(path: &Path, max_size: u64) -> Result<PathBuf, TopologyError> {
    let canonical = path.canonicalize().map_err(|e| {
        TopologyError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    let metadata = std::fs::metadata(&canonical)
        .map_err(|e| TopologyError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if !metadata.is_file() {
        return Err(TopologyError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }
    if metadata.len() > max_size {
        return Err(TopologyError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }

    Ok(canonical)
}
