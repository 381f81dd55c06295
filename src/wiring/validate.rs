//! Structural validation of wiring graphs
//!
//! Every failure carries a JSON pointer to the offending value, so editors can
//! highlight it. Validation never stops at the first problem.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use super::model::WiringGraph;

/// A structural problem in a wiring graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WiringError {
    #[error("{path}: missing required field '{field}'")]
    MissingField { path: String, field: &'static str },

    #[error("{path}: duplicate id '{id}'")]
    DuplicateId { path: String, id: String },

    #[error("{path}: unknown node '{id}'")]
    UnknownNode { path: String, id: String },

    #[error("{path}: node '{node}' has no port '{port}'")]
    UnknownPort {
        path: String,
        node: String,
        port: String,
    },

    #[error("{path}: unknown area '{id}'")]
    UnknownArea { path: String, id: String },

    #[error("{path}: area '{id}' is nested inside itself")]
    AreaCycle { path: String, id: String },
}

impl WiringError {
    /// JSON pointer of the offending value
    pub fn path(&self) -> &str {
        match self {
            Self::MissingField { path, .. }
            | Self::DuplicateId { path, .. }
            | Self::UnknownNode { path, .. }
            | Self::UnknownPort { path, .. }
            | Self::UnknownArea { path, .. }
            | Self::AreaCycle { path, .. } => path,
        }
    }
}

/// Check a wiring graph, returning every problem found
pub fn validate(graph: &WiringGraph) -> Result<(), Vec<WiringError>> {
    let mut errors = Vec::new();

    if graph.nodes.is_none() {
        errors.push(WiringError::MissingField {
            path: String::new(),
            field: "nodes",
        });
    }

    check_areas(graph, &mut errors);
    check_nodes(graph, &mut errors);
    check_edges(graph, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_areas(graph: &WiringGraph, errors: &mut Vec<WiringError>) {
    let mut seen = HashSet::new();
    for (i, area) in graph.areas.iter().enumerate() {
        let path = format!("/areas/{i}");
        if area.id.is_empty() {
            errors.push(WiringError::MissingField { path, field: "id" });
            continue;
        }
        if !seen.insert(area.id.as_str()) {
            errors.push(WiringError::DuplicateId {
                path: format!("{path}/id"),
                id: area.id.clone(),
            });
        }
        if let Some(parent) = &area.parent_id {
            if graph.area(parent).is_none() {
                errors.push(WiringError::UnknownArea {
                    path: format!("{path}/parentId"),
                    id: parent.clone(),
                });
            }
        }
    }

    let parents: HashMap<&str, &str> = graph
        .areas
        .iter()
        .filter_map(|a| a.parent_id.as_deref().map(|p| (a.id.as_str(), p)))
        .collect();
    for (i, area) in graph.areas.iter().enumerate() {
        if area.id.is_empty() {
            continue;
        }
        let mut current = area.id.as_str();
        // A chain longer than the area count has revisited something
        for _ in 0..=graph.areas.len() {
            match parents.get(current) {
                Some(&parent) if parent == area.id => {
                    errors.push(WiringError::AreaCycle {
                        path: format!("/areas/{i}/parentId"),
                        id: area.id.clone(),
                    });
                    break;
                }
                Some(&parent) => current = parent,
                None => break,
            }
        }
    }
}

fn check_nodes(graph: &WiringGraph, errors: &mut Vec<WiringError>) {
    let mut seen = HashSet::new();
    for (i, node) in graph.nodes().iter().enumerate() {
        let path = format!("/nodes/{i}");
        if node.id.is_empty() {
            errors.push(WiringError::MissingField { path, field: "id" });
            continue;
        }
        if !seen.insert(node.id.as_str()) {
            errors.push(WiringError::DuplicateId {
                path: format!("{path}/id"),
                id: node.id.clone(),
            });
        }
        if let Some(area) = &node.area_id {
            if graph.area(area).is_none() {
                errors.push(WiringError::UnknownArea {
                    path: format!("{path}/areaId"),
                    id: area.clone(),
                });
            }
        }
    }
}

fn check_edges(graph: &WiringGraph, errors: &mut Vec<WiringError>) {
    let mut seen = HashSet::new();
    for (i, cable) in graph.edges.iter().enumerate() {
        let path = format!("/edges/{i}");
        if cable.id.is_empty() {
            errors.push(WiringError::MissingField {
                path: path.clone(),
                field: "id",
            });
        } else if !seen.insert(cable.id.as_str()) {
            errors.push(WiringError::DuplicateId {
                path: format!("{path}/id"),
                id: cable.id.clone(),
            });
        }

        let ends = [
            ("source", "sourcePortKey", &cable.source, &cable.source_port_key),
            ("target", "targetPortKey", &cable.target, &cable.target_port_key),
        ];
        for (field, port_field, node_id, port_key) in ends {
            if node_id.is_empty() {
                errors.push(WiringError::MissingField {
                    path: path.clone(),
                    field,
                });
                continue;
            }
            let Some(node) = graph.node(node_id) else {
                errors.push(WiringError::UnknownNode {
                    path: format!("{path}/{field}"),
                    id: node_id.clone(),
                });
                continue;
            };
            if let Some(key) = port_key {
                if !node.ports.contains_key(key.as_str()) {
                    errors.push(WiringError::UnknownPort {
                        path: format!("{path}/{port_field}"),
                        node: node_id.clone(),
                        port: key.clone(),
                    });
                }
            }
        }
    }
}
