//! Wiring description: the input a diagram author writes
//!
//! Field names follow the JSON the editor tooling emits (`areaId`,
//! `sourcePortKey`, ...). Missing string fields deserialize to empty strings and
//! are reported by [`validate`](super::validate::validate) rather than rejected
//! by the parser.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A complete wiring graph
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WiringGraph {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutSettings>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub areas: Vec<Area>,
    /// Required; `None` when the key is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<DeviceNode>>,
    #[serde(default)]
    pub edges: Vec<Cable>,
}

impl WiringGraph {
    pub fn nodes(&self) -> &[DeviceNode] {
        self.nodes.as_deref().unwrap_or_default()
    }

    pub fn node(&self, id: &str) -> Option<&DeviceNode> {
        self.nodes().iter().find(|n| n.id == id)
    }

    pub fn area(&self, id: &str) -> Option<&Area> {
        self.areas.iter().find(|a| a.id == id)
    }
}

/// Diagram-wide layout preferences
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutSettings {
    /// `"LR"` (default) or `"TB"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

/// A room, rack or other grouping; areas nest through `parent_id`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// A device
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceNode {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_id: Option<String>,
    /// Keyed by port key, in declaration order
    #[serde(default)]
    pub ports: IndexMap<String, DevicePort>,
}

impl DeviceNode {
    /// Explicit label, then "manufacturer model", then the id
    pub fn display_label(&self) -> String {
        if let Some(label) = self.label.as_deref().filter(|l| !l.is_empty()) {
            return label.to_string();
        }
        let name = format!(
            "{} {}",
            self.manufacturer.as_deref().unwrap_or_default(),
            self.model.as_deref().unwrap_or_default()
        );
        let name = name.trim();
        if name.is_empty() {
            self.id.clone()
        } else {
            name.to_string()
        }
    }
}

/// Signal flow of a port as declared by the author. Unknown values read as
/// `Bidirectional`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PortAlignment {
    In,
    Out,
    #[default]
    #[serde(other)]
    Bidirectional,
}

/// A connector on a device
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DevicePort {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<PortAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub port_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

/// A cable between two devices, optionally pinned to ports
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cable {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_port_key: Option<String>,
    #[serde(default)]
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_port_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cable_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wire_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Cable {
    /// Id, source and target are all present
    pub fn is_complete(&self) -> bool {
        !self.id.is_empty() && !self.source.is_empty() && !self.target.is_empty()
    }
}
