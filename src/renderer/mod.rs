//! SVG renderer for routed wiring diagrams
//!
//! Takes a laid-out tree plus its routing report and produces an SVG string
//! with category and status classes for styling.

pub mod config;
pub mod svg;

pub use config::SvgConfig;
pub use svg::{render_svg, render_svg_with_overlay, SvgBuilder, TextAnchor};
