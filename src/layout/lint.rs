//! Lint checks for laid-out wiring diagrams.
//!
//! Runs after routing to flag devices likely to produce bad port hitboxes,
//! edges that could not be routed, and cables passing through devices.

use std::collections::HashSet;
use std::fmt;

use super::geometry::segment_intersects_rect;
use super::routing::{collect_edges, RoutingReport};
use super::tree::{locate_port, walk_nodes};
use super::types::{BoundingBox, LayoutGraph};

/// Devices with more ports than this get crowded hitboxes
const MAX_PORTS: usize = 20;

/// Devices narrower than this are hard to hit
const MIN_WIDTH: f64 = 50.0;

/// A lint warning about a layout defect
#[derive(Debug, Clone, PartialEq)]
pub struct LintWarning {
    pub category: LintCategory,
    pub message: String,
}

/// Category of lint defect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintCategory {
    Hitbox,
    Skipped,
    Collision,
    Crossing,
}

impl fmt::Display for LintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintCategory::Hitbox => write!(f, "hitbox"),
            LintCategory::Skipped => write!(f, "skipped"),
            LintCategory::Collision => write!(f, "collision"),
            LintCategory::Crossing => write!(f, "crossing"),
        }
    }
}

impl fmt::Display for LintWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.message)
    }
}

/// Run all lint checks on a routed layout.
pub fn check(graph: &LayoutGraph, report: &RoutingReport) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    check_hitboxes(graph, &mut warnings);
    check_skipped(report, &mut warnings);
    check_collisions(report, &mut warnings);
    check_crossings(graph, report, &mut warnings);
    warnings
}

fn check_hitboxes(graph: &LayoutGraph, warnings: &mut Vec<LintWarning>) {
    walk_nodes(graph, |located| {
        let node = located.node;
        if node.ports.len() > MAX_PORTS {
            warnings.push(LintWarning {
                category: LintCategory::Hitbox,
                message: format!(
                    "node \"{}\" has {} ports; port hitboxes may overlap",
                    node.id,
                    node.ports.len()
                ),
            });
        }
        // Zero width means "not sized yet", not "too small"
        if node.width > 0.0 && node.width < MIN_WIDTH {
            warnings.push(LintWarning {
                category: LintCategory::Hitbox,
                message: format!("node \"{}\" is only {:.0}px wide", node.id, node.width),
            });
        }
    });
}

fn check_skipped(report: &RoutingReport, warnings: &mut Vec<LintWarning>) {
    for err in &report.skipped {
        warnings.push(LintWarning {
            category: LintCategory::Skipped,
            message: err.to_string(),
        });
    }
}

fn check_collisions(report: &RoutingReport, warnings: &mut Vec<LintWarning>) {
    for route in &report.routes {
        for hit in &route.collisions {
            warnings.push(LintWarning {
                category: LintCategory::Collision,
                message: format!(
                    "edge \"{}\" segment {} still crosses \"{}\" near its port",
                    route.edge_id, hit.segment_index, hit.obstacle_id
                ),
            });
        }
    }
}

/// Owner node id of an endpoint reference (port or bare node)
fn endpoint_owner<'a>(graph: &'a LayoutGraph, reference: &'a str) -> &'a str {
    locate_port(graph, reference)
        .map(|p| p.owner.node.id.as_str())
        .unwrap_or(reference)
}

/// Any segment of a routed path, including the unchecked middle jog, that
/// passes through a device other than its own endpoints.
fn check_crossings(graph: &LayoutGraph, report: &RoutingReport, warnings: &mut Vec<LintWarning>) {
    let mut devices: Vec<(&str, BoundingBox)> = Vec::new();
    walk_nodes(graph, |located| {
        if located.depth > 0 && located.node.is_device() && !located.bounds().is_degenerate() {
            devices.push((located.node.id.as_str(), located.bounds()));
        }
    });

    for edge in collect_edges(graph) {
        let Some(route) = report.route(&edge.id) else {
            continue;
        };
        let endpoints: Vec<&str> = edge
            .sources
            .iter()
            .chain(edge.targets.iter())
            .map(|r| endpoint_owner(graph, r))
            .collect();

        let mut crossed: HashSet<&str> = HashSet::new();
        for seg in route.path.windows(2) {
            for (id, bounds) in &devices {
                if endpoints.contains(id) || crossed.contains(id) {
                    continue;
                }
                if segment_intersects_rect(seg[0], seg[1], bounds) {
                    crossed.insert(*id);
                    warnings.push(LintWarning {
                        category: LintCategory::Crossing,
                        message: format!("edge \"{}\" crosses device \"{}\"", edge.id, id),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::config::RoutingConfig;
    use crate::layout::routing::route_edges;

    fn graph(json: &str) -> LayoutGraph {
        serde_json::from_str(json).unwrap()
    }

    fn categories(warnings: &[LintWarning]) -> Vec<LintCategory> {
        warnings.iter().map(|w| w.category).collect()
    }

    #[test]
    fn test_narrow_node_flagged() {
        let g = graph(
            r#"{"id": "root", "children": [
                {"id": "tiny", "x": 0, "y": 0, "width": 30, "height": 40},
                {"id": "ok", "x": 100, "y": 0, "width": 125, "height": 40}
            ]}"#,
        );
        let warnings = check(&g, &RoutingReport::default());
        assert_eq!(categories(&warnings), vec![LintCategory::Hitbox]);
        assert!(warnings[0].message.contains("tiny"));
    }

    #[test]
    fn test_many_ports_flagged() {
        let ports: Vec<String> = (0..21)
            .map(|i| format!(r#"{{"id": "big/p{i}", "x": 0, "y": {i}}}"#))
            .collect();
        let json = format!(
            r#"{{"id": "root", "children": [
                {{"id": "big", "x": 0, "y": 0, "width": 125, "height": 500, "ports": [{}]}}
            ]}}"#,
            ports.join(",")
        );
        let warnings = check(&graph(&json), &RoutingReport::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("21 ports"));
    }

    #[test]
    fn test_skipped_edge_reported() {
        let g = graph(
            r#"{"id": "root",
                "children": [{"id": "a", "x": 0, "y": 0, "width": 100, "height": 50}],
                "edges": [{"id": "e1", "sources": ["a"], "targets": ["nope"]}]}"#,
        );
        let report = route_edges(&g, &RoutingConfig::default());
        let warnings = check(&g, &report);
        assert_eq!(categories(&warnings), vec![LintCategory::Skipped]);
        assert_eq!(warnings[0].to_string(), "[skipped] edge 'e1': target 'nope' not found in layout");
    }

    #[test]
    fn test_middle_jog_crossing_reported() {
        // A device straddling the straight line between the extensions: both
        // halves detour around it, the middle jog does not
        let g = graph(
            r#"{"id": "root",
                "children": [
                    {"id": "a", "x": -100, "y": 25, "width": 100, "height": 50,
                     "ports": [{"id": "a/out", "x": 100, "y": 25, "side": "EAST"}]},
                    {"id": "mid", "x": 60, "y": 10, "width": 80, "height": 80},
                    {"id": "b", "x": 200, "y": 25, "width": 100, "height": 50,
                     "ports": [{"id": "b/in", "x": 0, "y": 25, "side": "WEST"}]}
                ],
                "edges": [{"id": "e1", "sources": ["a/out"], "targets": ["b/in"]}]}"#,
        );
        let report = route_edges(&g, &RoutingConfig::default());
        let warnings = check(&g, &report);
        assert!(warnings
            .iter()
            .any(|w| w.category == LintCategory::Crossing && w.message.contains("mid")));
        assert!(!warnings.iter().any(|w| w.category == LintCategory::Collision));
    }

    #[test]
    fn test_clean_layout_has_no_warnings() {
        let g = graph(
            r#"{"id": "root",
                "children": [
                    {"id": "a", "x": 0, "y": 0, "width": 100, "height": 50,
                     "ports": [{"id": "a/out", "x": 100, "y": 25, "side": "EAST"}]},
                    {"id": "b", "x": 300, "y": 0, "width": 100, "height": 50,
                     "ports": [{"id": "b/in", "x": 0, "y": 25, "side": "WEST"}]}
                ],
                "edges": [{"id": "e1", "sources": ["a/out"], "targets": ["b/in"]}]}"#,
        );
        let report = route_edges(&g, &RoutingConfig::default());
        assert!(check(&g, &report).is_empty());
    }
}
