//! Wiring graph to ELK layout input
//!
//! Areas become container nodes, devices become sized leaves with ports, and
//! cables become edges between port ids (`node/key`) or bare node ids. The
//! result carries no positions; a layered layout engine fills those in.

use std::collections::HashMap;

use serde_json::Value;

use super::direction::{port_side, resolve_alignment, LayoutDirection};
use super::model::{Area, Cable, DeviceNode, WiringGraph};
use super::sizing::NodeSizer;
use crate::layout::{
    Label, LayoutEdge, LayoutGraph, Port, PositionedNode, Properties, CATEGORY_PROPERTY,
    PORT_SIDE_PROPERTY, STATUS_PROPERTY, TYPE_PROPERTY,
};

/// Id of the generated root node
pub const ROOT_ID: &str = "root";

/// Port id used in the layout graph
pub fn port_id(node_id: &str, port_key: &str) -> String {
    format!("{node_id}/{port_key}")
}

fn labels(text: Option<&str>) -> Vec<Label> {
    text.filter(|t| !t.is_empty())
        .map(|t| vec![Label { text: t.to_string() }])
        .unwrap_or_default()
}

/// Insert only the values that are present
fn properties<'a>(entries: impl IntoIterator<Item = (&'a str, Option<&'a str>)>) -> Properties {
    entries
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k.to_string(), Value::from(v))))
        .collect()
}

/// Convert a wiring graph with the default node sizes
pub fn convert(graph: &WiringGraph) -> LayoutGraph {
    convert_with(graph, &NodeSizer::default())
}

/// Convert a wiring graph into an ELK root node
pub fn convert_with(graph: &WiringGraph, sizer: &NodeSizer) -> LayoutGraph {
    let direction =
        LayoutDirection::from_setting(graph.layout.as_ref().and_then(|l| l.direction.as_deref()));

    let mut root = PositionedNode {
        id: ROOT_ID.to_string(),
        layout_options: layout_options(direction),
        ..PositionedNode::default()
    };

    let mut devices: HashMap<&str, Vec<PositionedNode>> = HashMap::new();
    let mut top_level = Vec::new();
    for node in graph.nodes().iter().filter(|n| !n.id.is_empty()) {
        let converted = convert_device(node, &graph.edges, direction, sizer);
        match node.area_id.as_deref().filter(|a| graph.area(a).is_some()) {
            Some(area) => devices.entry(area).or_default().push(converted),
            None => top_level.push(converted),
        }
    }

    let areas: Vec<&Area> = graph.areas.iter().filter(|a| !a.id.is_empty()).collect();
    for area in areas.iter().filter(|a| parent_of(a, &areas).is_none()) {
        root.children.push(build_area(area, &areas, &mut devices));
    }
    root.children.extend(top_level);

    root.edges = graph.edges.iter().filter_map(convert_cable).collect();
    root
}

fn layout_options(direction: LayoutDirection) -> Properties {
    properties([
        ("org.eclipse.elk.algorithm", Some("layered")),
        ("org.eclipse.elk.direction", Some(direction.as_elk())),
        ("org.eclipse.elk.layered.edgeRouting", Some("ORTHOGONAL")),
    ])
}

/// Parent area of `area`, when it names an existing one. An area caught in a
/// parent cycle is treated as top-level.
fn parent_of<'a>(area: &Area, areas: &[&'a Area]) -> Option<&'a Area> {
    let parent = area.parent_id.as_deref()?;
    let found = areas.iter().copied().find(|a| a.id == parent)?;

    let mut current = found;
    for _ in 0..=areas.len() {
        if current.id == area.id {
            return None;
        }
        let Some(next) = current
            .parent_id
            .as_deref()
            .and_then(|p| areas.iter().copied().find(|a| a.id == p))
        else {
            return Some(found);
        };
        current = next;
    }
    None
}

fn build_area(
    area: &Area,
    areas: &[&Area],
    devices: &mut HashMap<&str, Vec<PositionedNode>>,
) -> PositionedNode {
    let mut children: Vec<PositionedNode> = areas
        .iter()
        .filter(|child| parent_of(child, areas).is_some_and(|p| p.id == area.id))
        .map(|child| build_area(child, areas, devices))
        .collect();
    children.extend(devices.remove(area.id.as_str()).unwrap_or_default());

    PositionedNode {
        id: area.id.clone(),
        labels: labels(area.label.as_deref()),
        children,
        properties: properties([(TYPE_PROPERTY, Some("area"))]),
        ..PositionedNode::default()
    }
}

fn convert_device(
    node: &DeviceNode,
    cables: &[Cable],
    direction: LayoutDirection,
    sizer: &NodeSizer,
) -> PositionedNode {
    let mut sides = Vec::with_capacity(node.ports.len());
    let ports = node
        .ports
        .iter()
        .map(|(key, port)| {
            let alignment = resolve_alignment(port.alignment, &node.id, key, cables);
            let side = port_side(alignment, direction);
            sides.push(side);
            Port {
                id: port_id(&node.id, key),
                labels: labels(port.label.as_deref()),
                properties: properties([
                    (PORT_SIDE_PROPERTY, Some(side.as_str())),
                    ("hwMeta.portKey", Some(key.as_str())),
                    (TYPE_PROPERTY, port.port_type.as_deref()),
                    ("hwMeta.gender", port.gender.as_deref()),
                ]),
                ..Port::default()
            }
        })
        .collect();

    let (width, height) = sizer.size(&sides, direction);
    let label = node.display_label();
    PositionedNode {
        id: node.id.clone(),
        width,
        height,
        ports,
        labels: labels(Some(label.as_str())),
        properties: properties([
            (TYPE_PROPERTY, Some("device")),
            (CATEGORY_PROPERTY, node.category.as_deref()),
            (STATUS_PROPERTY, node.status.as_deref()),
            ("hwMeta.manufacturer", node.manufacturer.as_deref()),
            ("hwMeta.model", node.model.as_deref()),
        ]),
        ..PositionedNode::default()
    }
}

/// Incomplete cables are dropped
fn convert_cable(cable: &Cable) -> Option<LayoutEdge> {
    if !cable.is_complete() {
        tracing::debug!(edge = %cable.id, "dropping cable without id, source or target");
        return None;
    }

    let endpoint = |node: &str, key: Option<&str>| match key {
        Some(key) => port_id(node, key),
        None => node.to_string(),
    };

    Some(LayoutEdge {
        id: cable.id.clone(),
        sources: vec![endpoint(&cable.source, cable.source_port_key.as_deref())],
        targets: vec![endpoint(&cable.target, cable.target_port_key.as_deref())],
        labels: labels(cable.label.as_deref()),
        properties: properties([
            (CATEGORY_PROPERTY, cable.category.as_deref()),
            (STATUS_PROPERTY, cable.status.as_deref()),
            ("hwMeta.cableType", cable.cable_type.as_deref()),
            ("hwMeta.wireId", cable.wire_id.as_deref()),
        ]),
        ..LayoutEdge::default()
    })
}
