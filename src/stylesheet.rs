//! Stylesheet system for category and status styling
//!
//! Devices and cables are colored by their signal category (Audio, Video, ...)
//! and decorated by their installation status (Regular, Existing, Defect).
//! Both tables come from TOML so a diagram can be re-themed without touching
//! the wiring description.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing stylesheets
#[derive(Error, Debug)]
pub enum StylesheetError {
    #[error("Failed to read stylesheet file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse stylesheet TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Color used when a category is missing or unknown
pub const FALLBACK_COLOR: &str = "#cccccc";

/// Edge width used when neither the stylesheet nor the status sets one
pub const FALLBACK_EDGE_WIDTH: f64 = 1.5;

/// Stroke decoration for one installation status
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusStyle {
    pub stroke: String,
    #[serde(default = "full_opacity")]
    pub opacity: f64,
    /// Overrides the base edge width
    #[serde(default)]
    pub edge_width: Option<f64>,
    /// SVG `stroke-dasharray` for cables
    #[serde(default)]
    pub dash: Option<String>,
}

fn full_opacity() -> f64 {
    1.0
}

/// Concrete presentation values for one node or edge
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub opacity: f64,
    pub dash: Option<String>,
}

/// A stylesheet mapping categories and statuses to concrete styles
#[derive(Debug, Clone)]
pub struct Stylesheet {
    /// Optional name for the stylesheet
    pub name: Option<String>,
    /// Optional description
    pub description: Option<String>,
    /// Category name -> hex color
    pub categories: HashMap<String, String>,
    /// Status name -> stroke decoration
    pub statuses: HashMap<String, StatusStyle>,
    /// Base cable width
    pub edge_width: f64,
}

/// TOML structure for deserializing stylesheets
#[derive(Deserialize)]
struct TomlStylesheet {
    metadata: Option<TomlMetadata>,
    #[serde(default)]
    categories: HashMap<String, String>,
    #[serde(default)]
    statuses: HashMap<String, StatusStyle>,
    #[serde(default)]
    edges: Option<TomlEdges>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct TomlEdges {
    width: f64,
}

/// Default palette
const DEFAULT_PALETTE: &str = r##"
[metadata]
name = "default"

[categories]
Audio = "#1f77b4"
Video = "#ff7f0e"
Network = "#2ca02c"
Control = "#d62728"
Power = "#9467bd"
Default = "#cccccc"

[statuses.Regular]
stroke = "#000000"
opacity = 1.0

[statuses.Existing]
stroke = "#555555"
opacity = 0.6
dash = "6 4"

[statuses.Defect]
stroke = "#ff0000"
opacity = 1.0
edge_width = 3.0

[edges]
width = 1.5
"##;

/// Case-insensitive lookup, exact match first
fn lookup<'a, V>(table: &'a HashMap<String, V>, key: &str) -> Option<&'a V> {
    table.get(key).or_else(|| {
        table
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

impl Stylesheet {
    /// Load stylesheet from TOML file
    pub fn from_file(path: &Path) -> Result<Self, StylesheetError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load stylesheet from TOML string
    pub fn from_toml(content: &str) -> Result<Self, StylesheetError> {
        let parsed: TomlStylesheet = toml::from_str(content)?;

        Ok(Stylesheet {
            name: parsed.metadata.as_ref().and_then(|m| m.name.clone()),
            description: parsed.metadata.as_ref().and_then(|m| m.description.clone()),
            categories: parsed.categories,
            statuses: parsed.statuses,
            edge_width: parsed.edges.map_or(FALLBACK_EDGE_WIDTH, |e| e.width),
        })
    }

    /// Color of a category, if this stylesheet defines it
    pub fn resolve(&self, category: &str) -> Option<&str> {
        lookup(&self.categories, category).map(String::as_str)
    }

    /// Category color with fallback to the `Default` entry, then the built-in gray
    pub fn category_color(&self, category: Option<&str>) -> &str {
        category
            .and_then(|c| self.resolve(c))
            .or_else(|| self.resolve("Default"))
            .unwrap_or(FALLBACK_COLOR)
    }

    /// Status decoration; unknown or missing statuses use `Regular`
    pub fn status_style(&self, status: Option<&str>) -> Option<&StatusStyle> {
        status
            .and_then(|s| lookup(&self.statuses, s))
            .or_else(|| lookup(&self.statuses, "Regular"))
    }

    /// Style for a device box
    pub fn node_style(&self, category: Option<&str>, status: Option<&str>) -> ResolvedStyle {
        let status = self.status_style(status);
        ResolvedStyle {
            fill: self.category_color(category).to_string(),
            stroke: status.map_or("#000000", |s| s.stroke.as_str()).to_string(),
            stroke_width: 1.0,
            opacity: status.map_or(1.0, |s| s.opacity),
            dash: None,
        }
    }

    /// Style for a cable
    pub fn edge_style(&self, category: Option<&str>, status: Option<&str>) -> ResolvedStyle {
        let status = self.status_style(status);
        ResolvedStyle {
            fill: "none".to_string(),
            stroke: self.category_color(category).to_string(),
            stroke_width: status
                .and_then(|s| s.edge_width)
                .unwrap_or(self.edge_width),
            opacity: status.map_or(1.0, |s| s.opacity),
            dash: status.and_then(|s| s.dash.clone()),
        }
    }
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self::from_toml(DEFAULT_PALETTE).unwrap_or_else(|_| Stylesheet {
            name: None,
            description: None,
            categories: HashMap::new(),
            statuses: HashMap::new(),
            edge_width: FALLBACK_EDGE_WIDTH,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette_parses() {
        assert!(Stylesheet::from_toml(DEFAULT_PALETTE).is_ok());
        let stylesheet = Stylesheet::default();
        assert_eq!(stylesheet.name.as_deref(), Some("default"));
        assert_eq!(stylesheet.categories.len(), 6);
        assert_eq!(stylesheet.statuses.len(), 3);
    }

    #[test]
    fn test_category_colors() {
        let stylesheet = Stylesheet::default();
        assert_eq!(stylesheet.category_color(Some("Audio")), "#1f77b4");
        assert_eq!(stylesheet.category_color(Some("video")), "#ff7f0e");
        assert_eq!(stylesheet.category_color(Some("Lighting")), "#cccccc");
        assert_eq!(stylesheet.category_color(None), "#cccccc");
    }

    #[test]
    fn test_node_style_by_status() {
        let stylesheet = Stylesheet::default();
        let style = stylesheet.node_style(Some("Power"), Some("Existing"));
        assert_eq!(style.fill, "#9467bd");
        assert_eq!(style.stroke, "#555555");
        assert_eq!(style.opacity, 0.6);

        let regular = stylesheet.node_style(Some("Power"), None);
        assert_eq!(regular.stroke, "#000000");
        assert_eq!(regular.opacity, 1.0);
    }

    #[test]
    fn test_edge_style() {
        let stylesheet = Stylesheet::default();
        let base = stylesheet.edge_style(Some("Network"), None);
        assert_eq!(base.stroke, "#2ca02c");
        assert_eq!(base.stroke_width, 1.5);
        assert_eq!(base.dash, None);

        let defect = stylesheet.edge_style(Some("Network"), Some("Defect"));
        assert_eq!(defect.stroke_width, 3.0);

        let existing = stylesheet.edge_style(Some("Network"), Some("Existing"));
        assert_eq!(existing.dash.as_deref(), Some("6 4"));
    }

    #[test]
    fn test_custom_stylesheet_without_statuses() {
        let toml_str = r##"
[categories]
Audio = "#000000"

[edges]
width = 2.0
"##;
        let stylesheet = Stylesheet::from_toml(toml_str).expect("Should parse");
        assert_eq!(stylesheet.name, None);
        assert_eq!(stylesheet.category_color(Some("Audio")), "#000000");
        assert_eq!(stylesheet.category_color(Some("Video")), FALLBACK_COLOR);

        let style = stylesheet.edge_style(Some("Audio"), Some("Defect"));
        assert_eq!(style.stroke_width, 2.0);
        assert_eq!(style.opacity, 1.0);
    }

    #[test]
    fn test_invalid_toml_error() {
        let invalid = "this is not valid toml {{{{";
        assert!(Stylesheet::from_toml(invalid).is_err());
    }
}
