//! Properties every routed path must satisfy, checked over whole layouts

use avflow::layout::geometry::{is_orthogonal, segment_intersects_rect};
use avflow::layout::{
    locate_port, route_edges, LayoutGraph, ObstacleIndex, Point, RouteError, RouteSource,
    RoutingConfig,
};
use avflow::parse_layout;
use pretty_assertions::assert_eq;

/// A booth area with a microphone, a stage box and a mixer, plus an amplifier
/// below it. `e3` points at a port that does not exist, `e4` connects bare nodes.
const STUDIO: &str = r#"{
    "id": "root",
    "children": [
        {
            "id": "booth", "x": 50, "y": 50, "width": 500, "height": 300,
            "children": [
                {"id": "mic", "x": 20, "y": 40, "width": 100, "height": 50,
                 "ports": [{"id": "mic/out", "x": 100, "y": 25, "side": "EAST"}]},
                {"id": "stagebox", "x": 200, "y": 120, "width": 60, "height": 60},
                {"id": "mixer", "x": 360, "y": 40, "width": 125, "height": 80,
                 "ports": [
                    {"id": "mixer/in", "x": 0, "y": 25, "side": "WEST"},
                    {"id": "mixer/out", "x": 62.5, "y": 80, "side": "SOUTH"}
                 ]}
            ]
        },
        {"id": "amp", "x": 150, "y": 450, "width": 125, "height": 60,
         "ports": [{"id": "amp/in", "x": 62.5, "y": 0, "side": "NORTH"}]}
    ],
    "edges": [
        {"id": "e1", "sources": ["mic/out"], "targets": ["mixer/in"]},
        {"id": "e2", "sources": ["mixer/out"], "targets": ["amp/in"]},
        {"id": "e3", "sources": ["mic/out"], "targets": ["ghost/in"]},
        {"id": "e4", "sources": ["stagebox"], "targets": ["amp"]}
    ]
}"#;

/// Two racks far apart with level ports: nothing is near either port
const STRAIGHT: &str = r#"{
    "id": "root",
    "children": [
        {"id": "player", "x": 0, "y": 0, "width": 125, "height": 46,
         "ports": [{"id": "player/out", "x": 125, "y": 23, "side": "EAST"}]},
        {"id": "display", "x": 600, "y": 0, "width": 125, "height": 46,
         "ports": [{"id": "display/in", "x": 0, "y": 23, "side": "WEST"}]}
    ],
    "edges": [{"id": "hdmi", "sources": ["player/out"], "targets": ["display/in"]}]
}"#;

/// A patch panel sitting right in front of the source port
const BLOCKED_EXIT: &str = r#"{
    "id": "root",
    "children": [
        {"id": "a", "x": 0, "y": 0, "width": 100, "height": 50,
         "ports": [{"id": "a/out", "x": 100, "y": 25, "side": "EAST"}]},
        {"id": "panel", "x": 120, "y": 10, "width": 40, "height": 30},
        {"id": "b", "x": 500, "y": 0, "width": 100, "height": 50,
         "ports": [{"id": "b/in", "x": 0, "y": 25, "side": "WEST"}]}
    ],
    "edges": [{"id": "e1", "sources": ["a/out"], "targets": ["b/in"]}]
}"#;

fn layout(json: &str) -> LayoutGraph {
    parse_layout(json).expect("layout should parse")
}

fn has_redundant_point(path: &[Point]) -> bool {
    path.windows(2).any(|w| w[0] == w[1])
        || path.windows(3).any(|w| {
            (w[0].x == w[1].x && w[1].x == w[2].x) || (w[0].y == w[1].y && w[1].y == w[2].y)
        })
}

#[test]
fn test_paths_start_and_end_at_ports() {
    let graph = layout(STUDIO);
    let report = route_edges(&graph, &RoutingConfig::default());

    let e1 = report.route("e1").unwrap();
    assert_eq!(e1.path.first(), Some(&Point::new(170.0, 115.0)));
    assert_eq!(e1.path.last(), Some(&Point::new(410.0, 115.0)));

    let e2 = report.route("e2").unwrap();
    assert_eq!(e2.path.first(), Some(&Point::new(472.5, 170.0)));
    assert_eq!(e2.path.last(), Some(&Point::new(212.5, 450.0)));

    // Bare node ids attach to the middle of the facing sides
    let e4 = report.route("e4").unwrap();
    assert_eq!(e4.path.first(), Some(&Point::new(280.0, 230.0)));
    assert_eq!(e4.path.last(), Some(&Point::new(212.5, 450.0)));
}

#[test]
fn test_port_positions_resolve_through_containers() {
    let graph = layout(STUDIO);
    let port = locate_port(&graph, "mixer/in").unwrap();
    assert_eq!(port.point, Point::new(410.0, 115.0));
    assert_eq!(port.owner.node.id, "mixer");
}

#[test]
fn test_paths_are_orthogonal_and_minimal() {
    for json in [STUDIO, STRAIGHT, BLOCKED_EXIT] {
        let graph = layout(json);
        let report = route_edges(&graph, &RoutingConfig::default());
        for route in &report.routes {
            assert!(
                is_orthogonal(&route.path),
                "{} is not orthogonal: {:?}",
                route.edge_id,
                route.path
            );
            assert!(
                !has_redundant_point(&route.path),
                "{} has redundant points: {:?}",
                route.edge_id,
                route.path
            );
        }
    }
}

#[test]
fn test_protected_segments_avoid_local_obstacles() {
    let graph = layout(STUDIO);
    let config = RoutingConfig::default();
    let obstacles = ObstacleIndex::build(&graph, &config);
    let report = route_edges(&graph, &config);

    let owners = [("e1", ["mic", "mixer"]), ("e2", ["mixer", "amp"]), ("e4", ["stagebox", "amp"])];
    for (edge_id, excluded) in owners {
        let route = report.route(edge_id).unwrap();
        assert_eq!(route.source, RouteSource::Synthesized);
        assert!(route.collisions.is_empty(), "{edge_id}: {:?}", route.collisions);

        let first = route.path[0];
        let last = route.path[route.path.len() - 1];
        let segments = route.path.len() - 1;
        let protected = config.protected_segments_count;
        for i in (0..protected).chain(segments - protected..segments) {
            let (a, b) = (route.path[i], route.path[i + 1]);
            for near in [first, last] {
                for o in obstacles.nearby(near, config.local_search_radius, &excluded) {
                    assert!(
                        !segment_intersects_rect(a, b, &o.bounds),
                        "{edge_id} segment {i} crosses {}",
                        o.id
                    );
                }
            }
        }
    }
}

#[test]
fn test_straight_line_when_nothing_is_near() {
    let graph = layout(STRAIGHT);
    let report = route_edges(&graph, &RoutingConfig::default());
    let route = report.route("hdmi").unwrap();
    assert_eq!(
        route.path,
        vec![Point::new(125.0, 23.0), Point::new(600.0, 23.0)]
    );
    assert_eq!(
        route.extensions,
        Some((Point::new(155.0, 23.0), Point::new(570.0, 23.0)))
    );
}

#[test]
fn test_extension_pushed_past_blocking_device() {
    let graph = layout(BLOCKED_EXIT);
    let report = route_edges(&graph, &RoutingConfig::default());
    let route = report.route("e1").unwrap();

    // Padded panel ends at x = 170, plus clearance 10
    let (source_ext, target_ext) = route.extensions.unwrap();
    assert_eq!(source_ext, Point::new(180.0, 25.0));
    assert_eq!(target_ext, Point::new(470.0, 25.0));

    // The adjusted extension is not re-checked: the departure segment still
    // runs through the panel and is reported
    assert_eq!(
        route.path,
        vec![Point::new(100.0, 25.0), Point::new(500.0, 25.0)]
    );
    assert_eq!(route.collisions.len(), 1);
    assert_eq!(route.collisions[0].segment_index, 0);
    assert_eq!(route.collisions[0].obstacle_id, "panel");
}

#[test]
fn test_routing_is_deterministic() {
    let graph = layout(STUDIO);
    let config = RoutingConfig::default();
    let first = route_edges(&graph, &config);
    let second = route_edges(&graph, &config);
    assert_eq!(first.routes, second.routes);
    assert_eq!(first.skipped, second.skipped);
}

#[test]
fn test_unresolvable_edge_does_not_stop_the_pass() {
    let graph = layout(STUDIO);
    let report = route_edges(&graph, &RoutingConfig::default());

    let routed: Vec<&str> = report.routes.iter().map(|r| r.edge_id.as_str()).collect();
    assert_eq!(routed, vec!["e1", "e2", "e4"]);
    assert_eq!(report.skipped.len(), 1);
    assert!(matches!(
        &report.skipped[0],
        RouteError::UnresolvedPort { edge, reference, .. } if edge == "e3" && reference == "ghost/in"
    ));
}

#[test]
fn test_disabled_collision_detection_uses_direct_connectors() {
    let graph = layout(STUDIO);
    let config = RoutingConfig::default().with_collision_detection(false);
    let report = route_edges(&graph, &config);

    let e1 = report.route("e1").unwrap();
    assert_eq!(e1.source, RouteSource::Direct);
    assert_eq!(
        e1.path,
        vec![Point::new(170.0, 115.0), Point::new(410.0, 115.0)]
    );

    let e2 = report.route("e2").unwrap();
    assert_eq!(
        e2.path,
        vec![
            Point::new(472.5, 170.0),
            Point::new(472.5, 450.0),
            Point::new(212.5, 450.0)
        ]
    );
}
