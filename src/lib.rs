//! avflow - AV wiring diagrams with local obstacle-avoiding cable routing
//!
//! This library converts wiring descriptions to layered-layout input, routes
//! cables over a laid-out box tree, and renders the result as SVG.
//!
//! # Example
//!
//! ```rust
//! use avflow::render;
//!
//! let svg = render(r#"{
//!     "id": "root",
//!     "children": [{"id": "mixer", "x": 0, "y": 0, "width": 125, "height": 46}]
//! }"#).unwrap();
//! assert!(svg.contains("<svg"));
//! ```

pub mod error;
pub mod layout;
pub mod renderer;
pub mod stylesheet;
pub mod wiring;

pub use error::{parse_json, InputError};
pub use layout::{
    compute_route, route_edges, ConfigError, LayoutGraph, ObstacleIndex, Point, RouteError,
    RoutedEdge, RoutingConfig, RoutingReport,
};
pub use renderer::{render_svg, render_svg_with_overlay, SvgConfig};
pub use wiring::{WiringError, WiringGraph};

use thiserror::Error;

// Re-export Stylesheet for public API
pub use stylesheet::{Stylesheet, StylesheetError};

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// The input document could not be read
    #[error(transparent)]
    Input(#[from] InputError),

    /// The wiring description failed validation
    #[error("invalid wiring: {}", format_wiring_errors(.0))]
    Wiring(Vec<WiringError>),

    /// The routing configuration could not be loaded
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The stylesheet could not be loaded
    #[error("stylesheet error: {0}")]
    Stylesheet(#[from] StylesheetError),
}

impl From<Vec<WiringError>> for RenderError {
    fn from(errors: Vec<WiringError>) -> Self {
        RenderError::Wiring(errors)
    }
}

fn format_wiring_errors(errors: &[WiringError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Configuration for the complete render pipeline
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    /// Edge routing configuration
    pub routing: RoutingConfig,
    /// SVG output configuration
    pub svg: SvgConfig,
    /// Stylesheet for category and status colors
    pub stylesheet: Stylesheet,
    /// Debug mode: draw obstacles and port extensions
    pub debug: bool,
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the routing configuration
    pub fn with_routing(mut self, config: RoutingConfig) -> Self {
        self.routing = config;
        self
    }

    /// Set the SVG configuration
    pub fn with_svg(mut self, config: SvgConfig) -> Self {
        self.svg = config;
        self
    }

    /// Set the stylesheet
    pub fn with_stylesheet(mut self, stylesheet: Stylesheet) -> Self {
        self.stylesheet = stylesheet;
        self
    }

    /// Enable or disable debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Parse an ELK JSON layout document
pub fn parse_layout(source: &str) -> Result<LayoutGraph, InputError> {
    parse_json(source)
}

/// Parse and validate a wiring description
pub fn parse_wiring(source: &str) -> Result<WiringGraph, RenderError> {
    let graph: WiringGraph = parse_json(source)?;
    wiring::validate(&graph)?;
    Ok(graph)
}

/// Convert a wiring description to ELK layout input
///
/// # Example
///
/// ```rust
/// use avflow::convert_wiring;
///
/// let elk = convert_wiring(r#"{
///     "nodes": [{"id": "cam", "ports": {"sdi": {"alignment": "Out"}}}],
///     "edges": []
/// }"#).unwrap();
/// assert_eq!(elk.children[0].ports[0].id, "cam/sdi");
/// ```
pub fn convert_wiring(source: &str) -> Result<LayoutGraph, RenderError> {
    let graph = parse_wiring(source)?;
    Ok(wiring::convert(&graph))
}

/// Route every edge of a laid-out ELK JSON document
pub fn route_layout(source: &str, config: &RoutingConfig) -> Result<RoutingReport, RenderError> {
    let graph = parse_layout(source)?;
    Ok(route_edges(&graph, config))
}

/// Render a laid-out ELK JSON document to SVG with default configuration
pub fn render(source: &str) -> Result<String, RenderError> {
    render_with_config(source, &RenderConfig::default())
}

/// Render a laid-out ELK JSON document to SVG with custom configuration
///
/// # Example
///
/// ```rust
/// use avflow::{render_with_config, RenderConfig, RoutingConfig, SvgConfig};
///
/// let config = RenderConfig::new()
///     .with_routing(RoutingConfig::default().with_clearance(20.0))
///     .with_svg(SvgConfig::default().with_viewbox_padding(50.0));
///
/// let svg = render_with_config(r#"{"id": "root"}"#, &config).unwrap();
/// assert!(svg.contains("<svg"));
/// ```
pub fn render_with_config(source: &str, config: &RenderConfig) -> Result<String, RenderError> {
    let graph = parse_layout(source)?;
    let report = route_edges(&graph, &config.routing);

    for warning in layout::lint::check(&graph, &report) {
        tracing::info!(category = %warning.category, "{}", warning.message);
    }

    let svg = if config.debug {
        let obstacles = ObstacleIndex::build(&graph, &config.routing);
        render_svg_with_overlay(&graph, &report, &obstacles, &config.svg, &config.stylesheet)
    } else {
        render_svg(&graph, &report, &config.svg, &config.stylesheet)
    };

    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &str = r#"{
        "id": "root",
        "children": [
            {"id": "a", "x": 0, "y": 0, "width": 125, "height": 46,
             "ports": [{"id": "a/out", "x": 125, "y": 23, "side": "EAST"}]},
            {"id": "b", "x": 300, "y": 0, "width": 125, "height": 46,
             "ports": [{"id": "b/in", "x": 0, "y": 23, "side": "WEST"}]}
        ],
        "edges": [{"id": "e1", "sources": ["a/out"], "targets": ["b/in"]}]
    }"#;

    #[test]
    fn test_render_layout() {
        let svg = render(LAYOUT).unwrap();
        assert!(svg.contains(r#"d="M125 23 L300 23""#));
    }

    #[test]
    fn test_render_debug_overlay() {
        let svg = render_with_config(LAYOUT, &RenderConfig::new().with_debug(true)).unwrap();
        assert!(svg.contains("av-debug-obstacle"));
    }

    #[test]
    fn test_route_layout() {
        let report = route_layout(LAYOUT, &RoutingConfig::default()).unwrap();
        assert_eq!(report.routes.len(), 1);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_invalid_json() {
        let result = render("{ not json");
        assert!(matches!(result, Err(RenderError::Input(_))));
    }

    #[test]
    fn test_invalid_wiring() {
        let result = convert_wiring(r#"{"edges": []}"#);
        match result {
            Err(RenderError::Wiring(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("expected wiring error, got {other:?}"),
        }
    }
}
