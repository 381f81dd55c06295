//! Edge routing between device ports
//!
//! Edges that arrive with layout-engine geometry keep it. Every other edge gets
//! a locally obstacle-aware orthogonal connector: each port departs along its
//! side, detours around the device boxes near it, and the two halves are joined
//! by an unchecked jog through the open space between them.

use std::collections::BTreeSet;

use serde::Serialize;

use super::config::RoutingConfig;
use super::error::{Endpoint, RouteError};
use super::geometry::{manhattan_length, segment_intersects_rect, simplify};
use super::obstacles::{Obstacle, ObstacleIndex};
use super::tree::{locate_node, locate_port, nearest_common_ancestor, walk_nodes};
use super::types::*;

/// How the final path of an edge was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteSource {
    /// Geometry supplied by the layout engine, translated to absolute coordinates
    External,
    /// Local obstacle-avoiding route
    Synthesized,
    /// Two-segment connector, collision detection disabled
    Direct,
}

/// A protected segment that still crosses an obstacle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionHit {
    pub segment_index: usize,
    pub obstacle_id: String,
}

/// The routed polyline of one edge
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutedEdge {
    pub edge_id: String,
    pub path: RoutePath,
    pub source: RouteSource,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collisions: Vec<CollisionHit>,
    /// Adjusted departure points, kept for debug overlays
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<(Point, Point)>,
}

/// Result of routing every edge in one render pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoutingReport {
    pub routes: Vec<RoutedEdge>,
    #[serde(serialize_with = "serialize_errors")]
    pub skipped: Vec<RouteError>,
}

impl RoutingReport {
    pub fn route(&self, edge_id: &str) -> Option<&RoutedEdge> {
        self.routes.iter().find(|r| r.edge_id == edge_id)
    }
}

fn serialize_errors<S: serde::Serializer>(
    errors: &[RouteError],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(|e| e.to_string()))
}

/// Departure point for a port, pushed past the first obstacle it would enter.
///
/// Only the first colliding obstacle is considered; the adjusted point is not
/// re-checked.
pub fn extension_point(
    port: Point,
    side: PortSide,
    obstacles: &[&Obstacle],
    config: &RoutingConfig,
) -> Point {
    let dir = side.outward();
    let ext = Point::new(
        port.x + dir.x * config.extension_length,
        port.y + dir.y * config.extension_length,
    );

    let Some(hit) = obstacles
        .iter()
        .find(|o| segment_intersects_rect(port, ext, &o.bounds))
    else {
        return ext;
    };

    let b = &hit.bounds;
    let c = config.clearance;
    match side {
        PortSide::East => Point::new(b.right() + c, port.y),
        PortSide::West => Point::new(b.x - c, port.y),
        PortSide::North => Point::new(port.x, b.y - c),
        PortSide::South => Point::new(port.x, b.bottom() + c),
    }
}

/// Check the first and last `protected` segments of `path`.
/// Returns the first obstacle hit by each checked segment.
pub fn detect_local_collisions(
    path: &[Point],
    obstacles: &[&Obstacle],
    protected: usize,
) -> Vec<CollisionHit> {
    let segments = path.len().saturating_sub(1);
    let checked: BTreeSet<usize> = (0..protected.min(segments))
        .chain(segments.saturating_sub(protected)..segments)
        .collect();

    checked
        .into_iter()
        .filter_map(|i| {
            obstacles
                .iter()
                .find(|o| segment_intersects_rect(path[i], path[i + 1], &o.bounds))
                .map(|o| CollisionHit {
                    segment_index: i,
                    obstacle_id: o.id.clone(),
                })
        })
        .collect()
}

/// One pre-shaped detour around the union box
#[derive(Debug, Clone, PartialEq)]
struct DetourCandidate {
    name: &'static str,
    points: [Point; 5],
}

impl DetourCandidate {
    fn collides(&self, obstacles: &[&Obstacle]) -> bool {
        self.points.windows(2).any(|w| {
            obstacles
                .iter()
                .any(|o| segment_intersects_rect(w[0], w[1], &o.bounds))
        })
    }

    fn length(&self) -> f64 {
        manhattan_length(&self.points)
    }

    fn interior(&self) -> Vec<Point> {
        self.points[1..4].to_vec()
    }
}

/// The two candidates for a side, in preference order
fn detour_candidates(
    ext: Point,
    side: PortSide,
    union: &BoundingBox,
    aim: Point,
    clearance: f64,
) -> [DetourCandidate; 2] {
    match side {
        PortSide::East | PortSide::West => {
            let x = if side == PortSide::East {
                union.right() + clearance
            } else {
                union.x - clearance
            };
            let shape = |name, y: f64| DetourCandidate {
                name,
                points: [
                    ext,
                    Point::new(ext.x, y),
                    Point::new(x, y),
                    Point::new(x, aim.y),
                    aim,
                ],
            };
            [
                shape("above", union.y - clearance),
                shape("below", union.bottom() + clearance),
            ]
        }
        PortSide::North | PortSide::South => {
            let y = if side == PortSide::South {
                union.bottom() + clearance
            } else {
                union.y - clearance
            };
            let shape = |name, x: f64| DetourCandidate {
                name,
                points: [
                    ext,
                    Point::new(x, ext.y),
                    Point::new(x, y),
                    Point::new(aim.x, y),
                    aim,
                ],
            };
            [
                shape("right", union.right() + clearance),
                shape("left", union.x - clearance),
            ]
        }
    }
}

/// Interior waypoints leading from an extension point toward `aim` around
/// the local obstacles.
///
/// Without obstacles this is a single turn. Otherwise the first of the two
/// candidates that is collision-free wins; if both collide, the shorter one does.
pub fn route_detour(
    ext: Point,
    side: PortSide,
    obstacles: &[&Obstacle],
    aim: Point,
    clearance: f64,
) -> Vec<Point> {
    let Some((first, rest)) = obstacles.split_first() else {
        return vec![minimal_turn(ext, side, aim)];
    };

    let union = rest
        .iter()
        .fold(first.bounds, |acc, o| acc.union(&o.bounds));
    let candidates = detour_candidates(ext, side, &union, aim, clearance);

    if let Some(clear) = candidates.iter().find(|c| !c.collides(obstacles)) {
        return clear.interior();
    }

    // Both collide: `min_by` keeps the earlier candidate on ties
    let fallback = candidates
        .iter()
        .min_by(|a, b| a.length().total_cmp(&b.length()))
        .unwrap_or(&candidates[0]);
    tracing::debug!(
        candidate = fallback.name,
        length = fallback.length(),
        "no collision-free detour, using shorter candidate"
    );
    fallback.interior()
}

/// Single right-angle turn from `ext` toward `aim`
fn minimal_turn(ext: Point, side: PortSide, aim: Point) -> Point {
    if side.is_horizontal() {
        Point::new(ext.x, aim.y)
    } else {
        Point::new(aim.x, ext.y)
    }
}

/// Jog joining the source half (ending at `a`) to the target half (starting at `b`).
/// Empty when the points already share a coordinate.
pub fn middle_connector(a: Point, b: Point, source_side: PortSide) -> Vec<Point> {
    if a.x == b.x || a.y == b.y {
        return vec![];
    }
    if source_side.is_horizontal() {
        let mx = (a.x + b.x) / 2.0;
        vec![Point::new(mx, a.y), Point::new(mx, b.y)]
    } else {
        let my = (a.y + b.y) / 2.0;
        vec![Point::new(a.x, my), Point::new(b.x, my)]
    }
}

/// Plain connector with one corner, used when collision detection is off
pub fn direct_connector(source: Point, source_side: PortSide, target: Point) -> RoutePath {
    let corner = if source_side.is_horizontal() {
        Point::new(target.x, source.y)
    } else {
        Point::new(source.x, target.y)
    };
    simplify(&[source, corner, target])
}

/// Locally routed path plus the data debug overlays need
#[derive(Debug, Clone, PartialEq)]
pub struct LocalRoute {
    pub path: RoutePath,
    pub collisions: Vec<CollisionHit>,
    pub source_extension: Point,
    pub target_extension: Point,
}

/// Route one request around the obstacles near its two ports
pub fn route_local(
    request: &RoutingRequest<'_>,
    obstacles: &ObstacleIndex,
    config: &RoutingConfig,
) -> LocalRoute {
    let src = request.source;
    let tgt = request.target;

    if src.point == tgt.point {
        return LocalRoute {
            path: vec![src.point],
            collisions: vec![],
            source_extension: src.point,
            target_extension: tgt.point,
        };
    }

    let excluded = request.excluded();
    let src_local = obstacles.nearby(src.point, config.local_search_radius, &excluded);
    let tgt_local = obstacles.nearby(tgt.point, config.local_search_radius, &excluded);

    let src_ext = extension_point(src.point, src.side, &src_local, config);
    let tgt_ext = extension_point(tgt.point, tgt.side, &tgt_local, config);

    let src_interior = route_detour(src_ext, src.side, &src_local, tgt_ext, config.clearance);
    let mut tgt_interior = route_detour(tgt_ext, tgt.side, &tgt_local, src_ext, config.clearance);
    tgt_interior.reverse();

    let jog = match (src_interior.last(), tgt_interior.first()) {
        (Some(&a), Some(&b)) => middle_connector(a, b, src.side),
        _ => vec![],
    };

    let mut raw = Vec::with_capacity(src_interior.len() + tgt_interior.len() + jog.len() + 4);
    raw.push(src.point);
    raw.push(src_ext);
    raw.extend(src_interior);
    raw.extend(jog);
    raw.extend(tgt_interior);
    raw.push(tgt_ext);
    raw.push(tgt.point);
    let path = simplify(&raw);

    let mut local = src_local;
    for o in tgt_local {
        if !local.iter().any(|known| known.id == o.id) {
            local.push(o);
        }
    }
    let collisions = detect_local_collisions(&path, &local, config.protected_segments_count);

    LocalRoute {
        path,
        collisions,
        source_extension: src_ext,
        target_extension: tgt_ext,
    }
}

/// Attachment point in the middle of one side of a box
pub fn attachment_point(bounds: &BoundingBox, side: PortSide) -> Point {
    match side {
        PortSide::North => Point::new(bounds.x + bounds.width / 2.0, bounds.y),
        PortSide::South => Point::new(bounds.x + bounds.width / 2.0, bounds.bottom()),
        PortSide::West => Point::new(bounds.x, bounds.y + bounds.height / 2.0),
        PortSide::East => Point::new(bounds.right(), bounds.y + bounds.height / 2.0),
    }
}

/// Side of `bounds` facing `toward`
pub fn facing_side(bounds: &BoundingBox, toward: Point) -> PortSide {
    let center = bounds.center();
    let dx = toward.x - center.x;
    let dy = toward.y - center.y;
    if dx.abs() >= dy.abs() {
        if dx >= 0.0 {
            PortSide::East
        } else {
            PortSide::West
        }
    } else if dy > 0.0 {
        PortSide::South
    } else {
        PortSide::North
    }
}

/// Rough absolute position of a port or node reference
fn reference_hint(graph: &LayoutGraph, reference: &str) -> Option<Point> {
    locate_port(graph, reference)
        .map(|p| p.point)
        .or_else(|| locate_node(graph, reference).map(|n| n.bounds().center()))
}

/// Resolve an edge endpoint to an absolute anchor.
///
/// A port id resolves to the port. A bare node id (edges converted without a
/// port key) attaches to the middle of the side facing the other endpoint.
fn resolve_endpoint<'a>(
    graph: &'a LayoutGraph,
    edge: &LayoutEdge,
    endpoint: Endpoint,
    reference: &str,
    other: Option<&str>,
) -> Result<PortAnchor<'a>, RouteError> {
    if let Some(port) = locate_port(graph, reference) {
        return Ok(PortAnchor {
            point: port.point,
            side: port.side,
            node_id: &port.owner.node.id,
        });
    }

    let node = locate_node(graph, reference)
        .filter(|n| n.depth > 0)
        .ok_or_else(|| RouteError::unresolved(&edge.id, endpoint, reference))?;
    let bounds = node.bounds();
    let toward = other
        .and_then(|o| reference_hint(graph, o))
        .unwrap_or_else(|| bounds.center());
    let side = facing_side(&bounds, toward);
    Ok(PortAnchor {
        point: attachment_point(&bounds, side),
        side,
        node_id: &node.node.id,
    })
}

/// Layout-engine geometry translated from the container frame to absolute
fn external_path(
    graph: &LayoutGraph,
    edge: &LayoutEdge,
    source: &PortAnchor<'_>,
    target: &PortAnchor<'_>,
) -> Result<RoutePath, RouteError> {
    let offset = match &edge.container {
        Some(container) => locate_node(graph, container)
            .map(|n| n.origin)
            .ok_or_else(|| RouteError::unresolved_container(&edge.id, container))?,
        None => nearest_common_ancestor(graph, source.node_id, target.node_id)
            .map(|n| n.origin)
            .unwrap_or_default(),
    };

    let mut path: RoutePath = Vec::new();
    for point in edge.sections.iter().flat_map(|s| s.points()) {
        let point = point.offset(offset);
        if path.last() != Some(&point) {
            path.push(point);
        }
    }
    Ok(path)
}

/// Produce the absolute polyline for one edge.
///
/// The obstacle index is built once per pass by the caller and shared by every
/// edge. Unresolvable endpoints are reported as an error; nothing panics.
pub fn compute_route(
    edge: &LayoutEdge,
    graph: &LayoutGraph,
    obstacles: &ObstacleIndex,
    config: &RoutingConfig,
) -> Result<RoutedEdge, RouteError> {
    let source_ref = edge
        .source()
        .ok_or_else(|| RouteError::missing(&edge.id, Endpoint::Source))?;
    let target_ref = edge
        .target()
        .ok_or_else(|| RouteError::missing(&edge.id, Endpoint::Target))?;

    let source = resolve_endpoint(graph, edge, Endpoint::Source, source_ref, Some(target_ref))?;
    let target = resolve_endpoint(graph, edge, Endpoint::Target, target_ref, Some(source_ref))?;

    if !edge.sections.is_empty() {
        tracing::debug!(edge = %edge.id, "using layout engine geometry");
        return Ok(RoutedEdge {
            edge_id: edge.id.clone(),
            path: external_path(graph, edge, &source, &target)?,
            source: RouteSource::External,
            collisions: vec![],
            extensions: None,
        });
    }

    if !config.enable_collision_detection {
        return Ok(RoutedEdge {
            edge_id: edge.id.clone(),
            path: direct_connector(source.point, source.side, target.point),
            source: RouteSource::Direct,
            collisions: vec![],
            extensions: None,
        });
    }

    let request = RoutingRequest::new(source, target);
    let local = route_local(&request, obstacles, config);
    if !local.collisions.is_empty() {
        tracing::debug!(
            edge = %edge.id,
            hits = local.collisions.len(),
            "protected segments still cross obstacles"
        );
    }

    Ok(RoutedEdge {
        edge_id: edge.id.clone(),
        path: local.path,
        source: RouteSource::Synthesized,
        collisions: local.collisions,
        extensions: Some((local.source_extension, local.target_extension)),
    })
}

/// Every edge declared anywhere in the tree, in tree order
pub fn collect_edges(graph: &LayoutGraph) -> Vec<&LayoutEdge> {
    let mut edges = Vec::new();
    walk_nodes(graph, |located| edges.extend(located.node.edges.iter()));
    edges
}

/// Route all edges of a laid-out graph
pub fn route_edges(graph: &LayoutGraph, config: &RoutingConfig) -> RoutingReport {
    let obstacles = ObstacleIndex::build(graph, config);
    let mut report = RoutingReport::default();

    for edge in collect_edges(graph) {
        match compute_route(edge, graph, &obstacles, config) {
            Ok(routed) => report.routes.push(routed),
            Err(err) => {
                tracing::warn!(edge = %edge.id, "skipping edge: {err}");
                report.skipped.push(err);
            }
        }
    }

    report
}
