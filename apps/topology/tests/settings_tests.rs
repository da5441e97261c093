//! Tests for settings file loading.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use std::io::Write;
use std::path::PathBuf;
use topology::settings::{MAX_SETTINGS_FILE_SIZE, Settings, load_config_file, read_input_file};
use topology_core::{TopologyConfig, TopologyError};

fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

// =============================================================================
// PARSING
// =============================================================================

#[test]
fn test_defaults_without_file() {
    let settings = Settings::load(None).unwrap();

    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 8080);
    assert!(settings.server.cors_origins.is_empty());
    assert!(settings.store.strict_properties);
    assert!(settings.types.path.is_none());
}

#[test]
fn test_partial_file_keeps_defaults() {
    let settings = Settings::from_toml_str("[server]\nport = 9090\n").unwrap();

    assert_eq!(settings.server.port, 9090);
    assert_eq!(settings.server.host, "127.0.0.1");
    assert!(settings.store.strict_properties);
}

#[test]
fn test_full_file() {
    let text = r#"
[server]
host = "0.0.0.0"
port = 3000
cors_origins = ["http://example.test", "http://localhost:5173"]

[store]
strict_properties = false

[types]
path = "/etc/topology/types.json"
"#;
    let settings = Settings::from_toml_str(text).unwrap();

    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.cors_origins.len(), 2);
    assert!(!settings.store_options().strict_properties);
    assert_eq!(
        settings.types.path,
        Some(PathBuf::from("/etc/topology/types.json"))
    );
}

#[test]
fn test_malformed_file_is_invalid_config() {
    let err = Settings::from_toml_str("[server\nport = ").unwrap_err();
    assert!(matches!(err, TopologyError::InvalidConfig(_)));
}

#[test]
fn test_wrong_field_type_is_invalid_config() {
    let err = Settings::from_toml_str("[server]\nport = \"eighty\"\n").unwrap_err();
    assert!(matches!(err, TopologyError::InvalidConfig(_)));
}

// =============================================================================
// OVERRIDES
// =============================================================================

#[test]
fn test_cors_override_splits_and_trims() {
    let mut settings = Settings::default();
    settings.apply_cors_override(" http://a.test , ,http://b.test");

    assert_eq!(
        settings.server.cors_origins,
        vec!["http://a.test".to_string(), "http://b.test".to_string()]
    );
}

#[test]
fn test_cors_override_wildcard() {
    let mut settings = Settings::default();
    settings.apply_cors_override("*");
    assert_eq!(settings.server.cors_origins, vec!["*".to_string()]);
}

// =============================================================================
// FILE LOADING
// =============================================================================

#[test]
fn test_load_resolves_relative_types_path() {
    let dir = tempfile::tempdir().unwrap();
    let config_json = TopologyConfig::default().to_json_pretty().unwrap();
    write_file(&dir, "types.json", &config_json);
    let settings_path = write_file(&dir, "topology.toml", "[types]\npath = \"types.json\"\n");

    let settings = Settings::load(Some(settings_path.as_path())).unwrap();

    assert_eq!(settings.types.path, Some(dir.path().join("types.json")));
    assert_eq!(
        settings.load_topology_config().unwrap(),
        TopologyConfig::default()
    );
}

#[test]
fn test_build_session_uses_types_file() {
    let dir = tempfile::tempdir().unwrap();
    let types = r##"{
        "nodeTypes": {
            "rack": { "label": "Rack", "color": "#888", "icon": "▤", "props": {} },
            "host": { "label": "Host", "color": "#0f0", "icon": "■",
                      "props": { "cores": { "type": "number", "label": "Cores", "default": 8 } } }
        },
        "rules": { "rack": ["host"] }
    }"##;
    write_file(&dir, "types.json", types);
    let settings_path = write_file(
        &dir,
        "topology.toml",
        "[store]\nstrict_properties = false\n[types]\npath = \"types.json\"\n",
    );

    let settings = Settings::load(Some(settings_path.as_path())).unwrap();
    let mut session = settings.build_session().unwrap();

    assert!(!session.graph().options().strict_properties);
    assert!(session.add_node("network").is_err());
    let rack = session.add_node("rack").unwrap();
    let host = session.add_node("host").unwrap();
    session.add_edge(rack.id, host.id).unwrap();
    assert_eq!(session.build_document()["Rack 1"]["Host 1"]["cores"], 8);
}

#[test]
fn test_missing_settings_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Settings::load(Some(dir.path().join("absent.toml").as_path())).unwrap_err();
    assert!(matches!(err, TopologyError::IoError(_)));
}

#[test]
fn test_directory_is_not_a_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Settings::load(Some(dir.path())).unwrap_err();
    assert!(matches!(err, TopologyError::IoError(_)));
}

#[test]
fn test_oversized_config_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let big = " ".repeat(MAX_SETTINGS_FILE_SIZE as usize + 1);
    let path = write_file(&dir, "big.json", &big);

    let err = load_config_file(&path).unwrap_err();
    assert!(matches!(err, TopologyError::SerializationError(_)));
}

#[test]
fn test_malformed_types_file_is_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "types.json", r#"{"nodeTypes": []}"#);

    let err = load_config_file(&path).unwrap_err();
    assert!(matches!(err, TopologyError::InvalidConfig(_)));
}

// =============================================================================
// INPUT FILE VALIDATION
// =============================================================================

#[test]
fn test_read_input_file_honours_max_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "ten.txt", "0123456789");

    let err = read_input_file(&path, 4).unwrap_err();
    assert!(matches!(err, TopologyError::SerializationError(_)));

    let (_, text) = read_input_file(&path, 10).unwrap();
    assert_eq!(text, "0123456789");
}

#[test]
fn test_read_input_file_resolves_parent_segments() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    write_file(&dir, "types.json", "{}");

    let dotted = dir.path().join("sub").join("..").join("types.json");
    let (canonical, _) = read_input_file(&dotted, MAX_SETTINGS_FILE_SIZE).unwrap();

    assert_eq!(
        canonical,
        dir.path().canonicalize().unwrap().join("types.json")
    );
}

#[test]
fn test_settings_and_types_files_share_validation() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.json");

    let settings_err = Settings::load(Some(missing.as_path())).unwrap_err();
    let types_err = load_config_file(&missing).unwrap_err();
    assert_eq!(settings_err.to_string(), types_err.to_string());

    let settings_err = Settings::load(Some(dir.path())).unwrap_err();
    let types_err = load_config_file(dir.path()).unwrap_err();
    assert_eq!(settings_err.to_string(), types_err.to_string());
}
