//! # Configuration Documents
//!
//! The node-type configuration in its wire shape:
//!
//! ```json
//! {
//!   "nodeTypes": { "vm": { "label": "VM", "color": "#4ade80", "icon": "▣",
//!                          "props": { "cpu": { "type": "select", "label": "CPU",
//!                                              "default": "2 vCPU", "options": ["..."] } } } },
//!   "rules": { "network": ["vm"] }
//! }
//! ```
//!
//! Field kinds are `text`, `number`, `select` and `multiselect`.
//!
//! Importing never rejects a document for semantic problems; `lint` reports
//! them so the caller can decide what to surface.

use crate::{
    NodeType, PropertyDefinition, PropertyKind, PropertyValue, RuleTable, TopologyError,
    TypeRegistry,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// DOCUMENTS
// =============================================================================

/// A complete configuration: every node kind plus the rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyConfig {
    #[serde(rename = "nodeTypes")]
    pub node_types: TypeRegistry,
    pub rules: RuleTable,
}

/// A configuration import. Absent sections are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigPatch {
    #[serde(rename = "nodeTypes", default, skip_serializing_if = "Option::is_none")]
    pub node_types: Option<TypeRegistry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<RuleTable>,
}

impl From<TopologyConfig> for ConfigPatch {
    fn from(config: TopologyConfig) -> Self {
        Self {
            node_types: Some(config.node_types),
            rules: Some(config.rules),
        }
    }
}

impl TopologyConfig {
    /// Parse a configuration document from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, TopologyError> {
        serde_json::from_str(text).map_err(|e| TopologyError::InvalidConfig(e.to_string()))
    }

    /// Render the document as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, TopologyError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TopologyError::SerializationError(e.to_string()))
    }

    /// Report semantic problems without rejecting the document.
    #[must_use]
    pub fn lint(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        for (key, node_type) in self.node_types.iter() {
            for (name, def) in &node_type.properties {
                lint_property(key, name, def, &mut issues);
            }
        }

        for (parent, children) in self.rules.iter() {
            if !self.node_types.contains(parent) {
                issues.push(ConfigIssue::UnknownRuleParent {
                    parent: parent.clone(),
                });
            }
            for child in children {
                if !self.node_types.contains(child) {
                    issues.push(ConfigIssue::UnknownRuleChild {
                        parent: parent.clone(),
                        child: child.clone(),
                    });
                }
            }
        }

        issues
    }
}

fn lint_property(type_key: &str, name: &str, def: &PropertyDefinition, issues: &mut Vec<ConfigIssue>) {
    let field = || (type_key.to_string(), name.to_string());

    if def.kind.is_choice() && def.options.is_empty() {
        let (type_key, property) = field();
        issues.push(ConfigIssue::MissingOptions { type_key, property });
    }

    match (def.kind, &def.default) {
        (PropertyKind::SingleChoice, Some(PropertyValue::Text(s) | PropertyValue::Choice(s)))
            if !def.options.is_empty() && !def.options.contains(s) =>
        {
            let (type_key, property) = field();
            issues.push(ConfigIssue::DefaultNotAnOption {
                type_key,
                property,
                value: s.clone(),
            });
        }
        (PropertyKind::MultiChoice, Some(PropertyValue::Choices(list))) => {
            if let Some(bad) = list
                .iter()
                .find(|s| !def.options.is_empty() && !def.options.contains(*s))
            {
                let (type_key, property) = field();
                issues.push(ConfigIssue::DefaultNotAnOption {
                    type_key,
                    property,
                    value: bad.clone(),
                });
            }
        }
        (PropertyKind::MultiChoice, Some(_)) => {
            let (type_key, property) = field();
            issues.push(ConfigIssue::MultiChoiceDefaultNotList { type_key, property });
        }
        _ => {}
    }
}

// =============================================================================
// LINT FINDINGS
// =============================================================================

/// A non-fatal problem found in a configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ConfigIssue {
    UnknownRuleParent { parent: String },
    UnknownRuleChild { parent: String, child: String },
    MissingOptions { type_key: String, property: String },
    DefaultNotAnOption { type_key: String, property: String, value: String },
    MultiChoiceDefaultNotList { type_key: String, property: String },
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownRuleParent { parent } => {
                write!(f, "rule parent '{}' is not a registered type", parent)
            }
            Self::UnknownRuleChild { parent, child } => {
                write!(f, "rule '{}' allows unregistered child type '{}'", parent, child)
            }
            Self::MissingOptions { type_key, property } => {
                write!(f, "{}.{}: choice field has no options", type_key, property)
            }
            Self::DefaultNotAnOption {
                type_key,
                property,
                value,
            } => write!(
                f,
                "{}.{}: default '{}' is not among the options",
                type_key, property, value
            ),
            Self::MultiChoiceDefaultNotList { type_key, property } => {
                write!(f, "{}.{}: multiselect default must be a list", type_key, property)
            }
        }
    }
}

// =============================================================================
// BUILT-IN DEFAULT
// =============================================================================

fn text(label: &str, default: &str) -> PropertyDefinition {
    PropertyDefinition::new(PropertyKind::Text, label)
        .with_default(PropertyValue::Text(default.to_string()))
}

fn select(label: &str, default: &str, options: &[&str]) -> PropertyDefinition {
    PropertyDefinition::new(PropertyKind::SingleChoice, label)
        .with_default(PropertyValue::Choice(default.to_string()))
        .with_options(options.iter().copied())
}

impl Default for TopologyConfig {
    /// Networks containing VMs containing storage.
    fn default() -> Self {
        let network = NodeType::new("Network", "#38bdf8", "⬡")
            .with_property("cidr", text("CIDR Block", "10.0.0.0/24"))
            .with_property(
                "vlan",
                PropertyDefinition::new(PropertyKind::Number, "VLAN ID")
                    .with_default(PropertyValue::empty()),
            )
            .with_property("gateway", text("Gateway", ""))
            .with_property(
                "zone",
                select("Zone", "private", &["private", "public", "dmz", "management"]),
            );

        let vm = NodeType::new("VM", "#4ade80", "▣")
            .with_property(
                "cpu",
                select(
                    "CPU",
                    "2 vCPU",
                    &["1 vCPU", "2 vCPU", "4 vCPU", "8 vCPU", "16 vCPU", "32 vCPU"],
                ),
            )
            .with_property(
                "ram",
                select(
                    "RAM",
                    "4 GB",
                    &["512 MB", "1 GB", "2 GB", "4 GB", "8 GB", "16 GB", "32 GB", "64 GB"],
                ),
            )
            .with_property(
                "os",
                select(
                    "OS",
                    "Ubuntu 22.04",
                    &[
                        "Ubuntu 24.04",
                        "Ubuntu 22.04",
                        "Debian 12",
                        "Debian 11",
                        "CentOS Stream 9",
                        "Rocky Linux 9",
                        "AlmaLinux 9",
                        "Windows Server 2022",
                        "Windows Server 2019",
                    ],
                ),
            )
            .with_property("ip", text("IP Address", ""))
            .with_property(
                "roles",
                PropertyDefinition::new(PropertyKind::MultiChoice, "Ansible Roles")
                    .with_default(PropertyValue::Choices(Vec::new()))
                    .with_options([
                        "common",
                        "security-baseline",
                        "ufw",
                        "fail2ban",
                        "nginx",
                        "apache2",
                        "caddy",
                        "docker",
                        "containerd",
                        "kubernetes-node",
                        "postgresql",
                        "mysql",
                        "mariadb",
                        "mongodb",
                        "redis",
                        "elasticsearch",
                        "kafka",
                        "rabbitmq",
                        "prometheus-node-exporter",
                        "grafana-agent",
                        "certbot",
                        "vault-agent",
                        "consul-agent",
                    ]),
            );

        let storage = NodeType::new("Storage", "#fbbf24", "◬")
            .with_property(
                "size",
                select(
                    "Size",
                    "100 GB",
                    &["10 GB", "50 GB", "100 GB", "500 GB", "1 TB", "5 TB"],
                ),
            )
            .with_property(
                "type",
                select("Type", "SSD", &["SSD", "NVMe", "HDD", "Object", "NFS"]),
            )
            .with_property(
                "replication",
                select("Replication", "none", &["none", "2x", "3x", "geo-redundant"]),
            );

        let mut types = IndexMap::new();
        types.insert("network".to_string(), network);
        types.insert("vm".to_string(), vm);
        types.insert("storage".to_string(), storage);

        let mut rules = RuleTable::new();
        rules.set_allowed("network", ["vm"]);
        rules.set_allowed("vm", ["storage"]);

        Self {
            node_types: TypeRegistry::from_types(types),
            rules,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
