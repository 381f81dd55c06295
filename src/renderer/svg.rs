//! SVG generation from a laid-out box tree and its routed edges

use crate::layout::{
    collect_edges, walk_nodes, BoundingBox, LayoutEdge, LayoutGraph, ObstacleIndex, Point,
    PortSide, PositionedNode, RoutedEdge, RoutingReport, CATEGORY_PROPERTY, STATUS_PROPERTY,
};
use crate::stylesheet::{ResolvedStyle, Stylesheet};

use super::SvgConfig;

/// Side length used for ports the layout engine left unsized
const DEFAULT_PORT_SIZE: f64 = 8.0;

/// Baseline offset of a box title from the box top
const TITLE_OFFSET: f64 = 16.0;

/// Horizontal alignment of a text element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    fn as_str(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// Build SVG elements incrementally
pub struct SvgBuilder {
    config: SvgConfig,
    defs: Vec<String>,
    styles: Vec<String>,
    elements: Vec<String>,
    connections: Vec<String>,
    overlay: Vec<String>,
    indent: usize,
}

impl SvgBuilder {
    /// Create a new SVG builder
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            defs: vec![],
            styles: vec![],
            elements: vec![],
            connections: vec![],
            overlay: vec![],
            indent: 1,
        }
    }

    /// Add one CSS custom property per category, in name order
    pub fn add_stylesheet(&mut self, stylesheet: &Stylesheet) {
        let prefix = self.prefix();
        let mut categories: Vec<(&String, &String)> = stylesheet.categories.iter().collect();
        categories.sort();

        let mut css = String::from(":root {\n");
        for (category, color) in categories {
            css.push_str(&format!("    --{}{}: {};\n", prefix, css_token(category), color));
        }
        css.push_str("  }\n");
        css.push_str(&format!(
            "  .{prefix}label {{ font-family: sans-serif; font-size: {}px; }}\n  .{prefix}port-label {{ font-family: sans-serif; font-size: {}px; }}",
            self.config.font_size, self.config.port_font_size
        ));
        self.styles.push(css);
    }

    pub fn prefix(&self) -> String {
        self.config.class_prefix.clone().unwrap_or_default()
    }

    fn indent_str(&self) -> String {
        if self.config.pretty_print {
            "  ".repeat(self.indent)
        } else {
            String::new()
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    /// Add the arrow marker used at cable targets
    pub fn add_arrow_marker(&mut self) {
        let prefix = self.prefix();
        // fill="context-stroke" lets the arrow take the cable's category color
        self.defs.push(format!(
            r#"<marker id="{prefix}arrow" viewBox="0 0 10 10" refX="8" refY="5" markerWidth="5" markerHeight="5" markerUnits="strokeWidth" orient="auto">
      <path d="M0,0 L10,5 L0,10 Z" fill="context-stroke"/>
    </marker>"#
        ));
    }

    /// Add a rectangle element
    pub fn add_rect(&mut self, id: Option<&str>, bounds: &BoundingBox, classes: &[String], styles: &str) {
        let id_attr = id
            .map(|i| format!(r#" id="{}""#, escape_xml(i)))
            .unwrap_or_default();

        self.elements.push(format!(
            r#"{}<rect{} class="{}" x="{}" y="{}" width="{}" height="{}"{}/>"#,
            self.indent_str(),
            id_attr,
            classes.join(" "),
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height,
            styles
        ));
    }

    /// Add a text element
    pub fn add_text(&mut self, text: &str, x: f64, y: f64, anchor: TextAnchor, class: &str) {
        let prefix = self.prefix();
        self.elements.push(format!(
            r#"{}<text class="{}{}" x="{}" y="{}" text-anchor="{}">{}</text>"#,
            self.indent_str(),
            prefix,
            class,
            x,
            y,
            anchor.as_str(),
            escape_xml(text)
        ));
    }

    /// Add a path for a routed cable
    pub fn add_edge_path(
        &mut self,
        id: &str,
        path: &[Point],
        classes: &[String],
        styles: &str,
        marker_end: bool,
    ) {
        let prefix = self.prefix();
        let marker = if marker_end {
            format!(r#" marker-end="url(#{prefix}arrow)""#)
        } else {
            String::new()
        };

        self.connections.push(format!(
            r#"{}<path id="{}" class="{}" d="{}"{}{}/>"#,
            self.indent_str(),
            escape_xml(id),
            classes.join(" "),
            path_to_d(path),
            styles,
            marker
        ));
    }

    /// Add a text element drawn above the cables
    pub fn add_edge_label(&mut self, text: &str, at: Point) {
        let prefix = self.prefix();
        self.connections.push(format!(
            r#"{}<text class="{}label {}edge-label" x="{}" y="{}" text-anchor="middle">{}</text>"#,
            self.indent_str(),
            prefix,
            prefix,
            at.x,
            at.y - 4.0,
            escape_xml(text)
        ));
    }

    /// Outline a padded obstacle in the debug overlay
    pub fn add_overlay_rect(&mut self, id: &str, bounds: &BoundingBox) {
        let prefix = self.prefix();
        self.overlay.push(format!(
            r##"{}<rect class="{}debug-obstacle" data-node="{}" x="{}" y="{}" width="{}" height="{}" fill="none" stroke="#ff00ff" stroke-dasharray="4 2"/>"##,
            self.indent_str(),
            prefix,
            escape_xml(id),
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height
        ));
    }

    /// Mark a port extension point in the debug overlay
    pub fn add_overlay_point(&mut self, at: Point) {
        let prefix = self.prefix();
        self.overlay.push(format!(
            r##"{}<circle class="{}debug-extension" cx="{}" cy="{}" r="3" fill="#ff00ff"/>"##,
            self.indent_str(),
            prefix,
            at.x,
            at.y
        ));
    }

    /// Add a group element with optional ID and classes
    pub fn start_group(&mut self, id: Option<&str>, classes: &[String]) {
        let id_attr = id
            .map(|i| format!(r#" id="{}""#, escape_xml(i)))
            .unwrap_or_default();
        let class_attr = if classes.is_empty() {
            String::new()
        } else {
            format!(r#" class="{}""#, classes.join(" "))
        };

        self.elements
            .push(format!("{}<g{}{}>", self.indent_str(), id_attr, class_attr));
        self.indent += 1;
    }

    /// Close a group element
    pub fn end_group(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.elements.push(format!("{}</g>", self.indent_str()));
    }

    /// Assemble the document: boxes first, then cables, then the debug overlay
    pub fn build(self, viewbox: BoundingBox) -> String {
        let nl = self.newline();
        let area = viewbox.inflate(self.config.viewbox_padding);

        let mut svg = String::new();
        if self.config.standalone {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(nl);
        }
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
            area.x, area.y, area.width, area.height
        ));
        svg.push_str(nl);

        push_section(&mut svg, "style", &self.styles, nl);
        push_section(&mut svg, "defs", &self.defs, nl);

        for line in self
            .elements
            .iter()
            .chain(&self.connections)
            .chain(&self.overlay)
        {
            svg.push_str(line);
            svg.push_str(nl);
        }

        svg.push_str("</svg>");
        svg
    }
}

/// Wrap `items` in a `<tag>` block; nothing when empty
fn push_section(svg: &mut String, tag: &str, items: &[String], nl: &str) {
    if items.is_empty() {
        return;
    }
    svg.push_str(&format!("  <{tag}>{nl}"));
    for item in items {
        svg.push_str(&format!("    {item}{nl}"));
    }
    svg.push_str(&format!("  </{tag}>{nl}"));
}

/// Render a routed layout to an SVG string
pub fn render_svg(
    graph: &LayoutGraph,
    report: &RoutingReport,
    config: &SvgConfig,
    stylesheet: &Stylesheet,
) -> String {
    render(graph, report, None, config, stylesheet)
}

/// Render a routed layout with the obstacle rectangles and port extension
/// points drawn on top
pub fn render_svg_with_overlay(
    graph: &LayoutGraph,
    report: &RoutingReport,
    obstacles: &ObstacleIndex,
    config: &SvgConfig,
    stylesheet: &Stylesheet,
) -> String {
    render(graph, report, Some(obstacles), config, stylesheet)
}

fn render(
    graph: &LayoutGraph,
    report: &RoutingReport,
    overlay: Option<&ObstacleIndex>,
    config: &SvgConfig,
    stylesheet: &Stylesheet,
) -> String {
    let mut builder = SvgBuilder::new(config.clone());
    builder.add_stylesheet(stylesheet);
    if config.arrows && !report.routes.is_empty() {
        builder.add_arrow_marker();
    }

    // The root is the canvas; its frame is the absolute frame
    let origin = Point::new(graph.x, graph.y);
    for child in &graph.children {
        render_node(child, origin, &mut builder, config, stylesheet);
    }

    for edge in collect_edges(graph) {
        if let Some(route) = report.route(&edge.id) {
            render_edge(edge, route, &mut builder, config, stylesheet);
        }
    }

    if let Some(obstacles) = overlay {
        for obstacle in obstacles.obstacles() {
            builder.add_overlay_rect(&obstacle.id, &obstacle.bounds);
        }
        for (source, target) in report.routes.iter().filter_map(|r| r.extensions) {
            builder.add_overlay_point(source);
            builder.add_overlay_point(target);
        }
    }

    builder.build(diagram_bounds(graph, report))
}

/// Render an area (container) or a device (leaf) and everything inside it
fn render_node(
    node: &PositionedNode,
    parent_origin: Point,
    builder: &mut SvgBuilder,
    config: &SvgConfig,
    stylesheet: &Stylesheet,
) {
    let origin = parent_origin.offset(Point::new(node.x, node.y));
    let bounds = BoundingBox::new(origin.x, origin.y, node.width, node.height);
    let prefix = builder.prefix();

    if node.is_container() {
        builder.start_group(Some(&node.id), &[format!("{prefix}area")]);
        builder.add_rect(
            None,
            &bounds,
            &[format!("{prefix}area-frame")],
            r##" fill="#fafafa" stroke="#999999" stroke-dasharray="8 4""##,
        );
        builder.add_text(
            node.display_label(),
            bounds.x + 8.0,
            bounds.y + TITLE_OFFSET,
            TextAnchor::Start,
            "label",
        );
        for child in &node.children {
            render_node(child, origin, builder, config, stylesheet);
        }
        builder.end_group();
        return;
    }

    let category = node.property_str(CATEGORY_PROPERTY);
    let status = node.property_str(STATUS_PROPERTY);
    let style = stylesheet.node_style(category, status);

    let mut classes = vec![format!("{prefix}device")];
    if let Some(category) = category {
        classes.push(format!("{prefix}cat-{}", css_token(category)));
    }
    if let Some(status) = status {
        classes.push(format!("{prefix}status-{}", css_token(status)));
    }

    builder.start_group(Some(&node.id), &classes);
    builder.add_rect(None, &bounds, &[format!("{prefix}device-box")], &format_style(&style));
    builder.add_text(
        node.display_label(),
        bounds.center().x,
        bounds.y + TITLE_OFFSET,
        TextAnchor::Middle,
        "label",
    );

    for port in &node.ports {
        let side = port.resolved_side(node.width, node.height);
        let (w, h) = if port.width > 0.0 && port.height > 0.0 {
            (port.width, port.height)
        } else {
            (DEFAULT_PORT_SIZE, DEFAULT_PORT_SIZE)
        };
        let anchor = origin.offset(port.anchor());
        let port_box = BoundingBox::new(anchor.x - w / 2.0, anchor.y - h / 2.0, w, h);
        builder.add_rect(
            Some(&port.id),
            &port_box,
            &[format!("{prefix}port"), format!("{prefix}port-{}", css_token(side.as_str()))],
            r##" fill="#ffffff" stroke="#333333""##,
        );

        if config.port_labels {
            if let Some(label) = port.labels.first().filter(|l| !l.text.is_empty()) {
                let (x, y, text_anchor) = match side {
                    PortSide::West => (anchor.x + w, anchor.y + 3.0, TextAnchor::Start),
                    PortSide::East => (anchor.x - w, anchor.y + 3.0, TextAnchor::End),
                    PortSide::North => (anchor.x, anchor.y + h + 8.0, TextAnchor::Middle),
                    PortSide::South => (anchor.x, anchor.y - h, TextAnchor::Middle),
                };
                builder.add_text(&label.text, x, y, text_anchor, "port-label");
            }
        }
    }

    builder.end_group();
}

fn render_edge(
    edge: &LayoutEdge,
    route: &RoutedEdge,
    builder: &mut SvgBuilder,
    config: &SvgConfig,
    stylesheet: &Stylesheet,
) {
    let prefix = builder.prefix();
    let category = edge.property_str(CATEGORY_PROPERTY);
    let status = edge.property_str(STATUS_PROPERTY);
    let style = stylesheet.edge_style(category, status);

    let mut classes = vec![format!("{prefix}edge")];
    if let Some(category) = category {
        classes.push(format!("{prefix}cat-{}", css_token(category)));
    }
    if !route.collisions.is_empty() {
        classes.push(format!("{prefix}edge-collision"));
    }

    builder.add_edge_path(&edge.id, &route.path, &classes, &format_style(&style), config.arrows);

    if let Some(label) = edge.labels.first().filter(|l| !l.text.is_empty()) {
        builder.add_edge_label(&label.text, label_position(&route.path));
    }
}

/// Midpoint of the middle segment of a path
fn label_position(path: &[Point]) -> Point {
    match path.len() {
        0 => Point::default(),
        1 => path[0],
        n => {
            let i = (n - 1) / 2;
            let (a, b) = (path[i], path[i + 1]);
            Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
        }
    }
}

/// Smallest box holding every non-root node and every routed point
fn diagram_bounds(graph: &LayoutGraph, report: &RoutingReport) -> BoundingBox {
    let mut bounds: Option<BoundingBox> = None;
    walk_nodes(graph, |located| {
        if located.depth == 0 {
            return;
        }
        let b = located.bounds();
        bounds = Some(bounds.map_or(b, |acc| acc.union(&b)));
    });
    for point in report.routes.iter().flat_map(|r| r.path.iter()) {
        bounds = Some(match bounds {
            Some(acc) => acc.expand_to_include(*point),
            None => BoundingBox::new(point.x, point.y, 0.0, 0.0),
        });
    }
    bounds.unwrap_or_default()
}

/// Format a resolved style as SVG presentation attributes
fn format_style(style: &ResolvedStyle) -> String {
    let mut parts = vec![
        format!(r#" fill="{}""#, style.fill),
        format!(r#" stroke="{}""#, style.stroke),
        format!(r#" stroke-width="{}""#, style.stroke_width),
    ];
    if style.opacity < 1.0 {
        parts.push(format!(r#" opacity="{}""#, style.opacity));
    }
    if let Some(dash) = &style.dash {
        parts.push(format!(r#" stroke-dasharray="{}""#, dash));
    }
    parts.join("")
}

/// Lowercase, with anything outside `[a-z0-9]` replaced by `-`
fn css_token(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

/// Convert a path of points to an SVG path d attribute
fn path_to_d(path: &[Point]) -> String {
    let Some((first, rest)) = path.split_first() else {
        return String::new();
    };

    let mut d = format!("M{} {}", first.x, first.y);
    for point in rest {
        d.push_str(&format!(" L{} {}", point.x, point.y));
    }
    d
}

/// Escape special XML characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{route_edges, RoutingConfig};

    fn sample() -> LayoutGraph {
        serde_json::from_str(
            r#"{
                "id": "root",
                "children": [
                    {
                        "id": "stage", "x": 0, "y": 0, "width": 500, "height": 200,
                        "labels": [{"text": "Stage & FOH"}],
                        "children": [
                            {"id": "mic", "x": 20, "y": 40, "width": 125, "height": 46,
                             "labels": [{"text": "Mic"}],
                             "properties": {"hwMeta.category": "Audio"},
                             "ports": [{"id": "mic/out", "x": 125, "y": 23, "side": "EAST",
                                        "labels": [{"text": "XLR"}]}]},
                            {"id": "desk", "x": 300, "y": 40, "width": 125, "height": 46,
                             "properties": {"hwMeta.category": "Audio", "hwMeta.status": "Existing"},
                             "ports": [{"id": "desk/in", "x": 0, "y": 23, "side": "WEST"}]}
                        ]
                    }
                ],
                "edges": [{"id": "c1", "sources": ["mic/out"], "targets": ["desk/in"],
                           "labels": [{"text": "W-01"}],
                           "properties": {"hwMeta.category": "Audio"}}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_path_to_d() {
        let path = vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
        ];
        assert_eq!(path_to_d(&path), "M0 0 L100 0 L100 100");
        assert_eq!(path_to_d(&[]), "");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b"), "a &lt; b");
        assert_eq!(escape_xml("a & b"), "a &amp; b");
    }

    #[test]
    fn test_css_token() {
        assert_eq!(css_token("Audio"), "audio");
        assert_eq!(css_token("Stage Box 2"), "stage-box-2");
    }

    #[test]
    fn test_format_style() {
        let style = ResolvedStyle {
            fill: "none".into(),
            stroke: "#1f77b4".into(),
            stroke_width: 1.5,
            opacity: 0.6,
            dash: Some("6 4".into()),
        };
        assert_eq!(
            format_style(&style),
            r##" fill="none" stroke="#1f77b4" stroke-width="1.5" opacity="0.6" stroke-dasharray="6 4""##
        );
    }

    #[test]
    fn test_label_position() {
        let path = vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(40.0, 10.0),
            Point::new(40.0, 20.0),
        ];
        assert_eq!(label_position(&path), Point::new(20.0, 10.0));
        assert_eq!(label_position(&path[..1]), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_render_devices_areas_and_edges() {
        let graph = sample();
        let report = route_edges(&graph, &RoutingConfig::default());
        let svg = render_svg(&graph, &report, &SvgConfig::default(), &Stylesheet::default());

        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains(r#"<g id="stage" class="av-area">"#));
        assert!(svg.contains("Stage &amp; FOH"));
        assert!(svg.contains(r#"<g id="mic" class="av-device av-cat-audio">"#));
        assert!(svg.contains("av-status-existing"));
        assert!(svg.contains(r#"id="mic/out""#));
        assert!(svg.contains(">XLR</text>"));
        assert!(svg.contains(r#"d="M145 63 L300 63""#));
        assert!(svg.contains(r#"marker-end="url(#av-arrow)""#));
        assert!(svg.contains(">W-01</text>"));
        assert!(svg.contains("--av-audio: #1f77b4;"));
        assert!(!svg.contains("av-debug-obstacle"));
    }

    #[test]
    fn test_render_overlay() {
        let graph = sample();
        let config = RoutingConfig::default();
        let report = route_edges(&graph, &config);
        let obstacles = ObstacleIndex::build(&graph, &config);
        let svg = render_svg_with_overlay(
            &graph,
            &report,
            &obstacles,
            &SvgConfig::default(),
            &Stylesheet::default(),
        );

        assert_eq!(svg.matches("av-debug-obstacle").count(), 2);
        assert_eq!(svg.matches("av-debug-extension").count(), 2);
    }

    #[test]
    fn test_render_without_prefix_or_arrows() {
        let graph = sample();
        let report = route_edges(&graph, &RoutingConfig::default());
        let config = SvgConfig::default()
            .without_class_prefix()
            .with_arrows(false)
            .with_standalone(false);
        let svg = render_svg(&graph, &report, &config, &Stylesheet::default());

        assert!(svg.starts_with("<svg"));
        assert!(!svg.contains("<defs>"));
        assert!(svg.contains(r#"class="edge cat-audio""#));
    }

    #[test]
    fn test_viewbox_covers_nodes() {
        let graph = sample();
        let report = route_edges(&graph, &RoutingConfig::default());
        let svg = render_svg(
            &graph,
            &report,
            &SvgConfig::default().with_viewbox_padding(0.0),
            &Stylesheet::default(),
        );
        assert!(svg.contains(r#"viewBox="0 0 500 200""#));
    }
}
