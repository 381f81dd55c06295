//! SVG output options

/// Presentation switches for one rendered diagram
#[derive(Debug, Clone)]
pub struct SvgConfig {
    /// Space between the outermost box or cable and the viewBox edge
    pub viewbox_padding: f64,

    /// Emit the XML declaration before the `<svg>` element
    pub standalone: bool,

    /// One element per line, indented by nesting depth
    pub pretty_print: bool,

    /// Prepended to every generated class name (`av-device`, `av-edge`, ...)
    pub class_prefix: Option<String>,

    /// Arrowhead at the target end of every cable
    pub arrows: bool,

    /// Port labels drawn inside device boxes
    pub port_labels: bool,

    /// Font size of device and area titles, in px
    pub font_size: f64,

    /// Font size of port labels, in px
    pub port_font_size: f64,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            viewbox_padding: 20.0,
            standalone: true,
            pretty_print: true,
            class_prefix: Some("av-".to_string()),
            arrows: true,
            port_labels: true,
            font_size: 12.0,
            port_font_size: 9.0,
        }
    }
}

impl SvgConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_viewbox_padding(mut self, padding: f64) -> Self {
        self.viewbox_padding = padding;
        self
    }

    pub fn with_standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = Some(prefix.into());
        self
    }

    /// Bare class names (`device`, `edge`, ...)
    pub fn without_class_prefix(mut self) -> Self {
        self.class_prefix = None;
        self
    }

    pub fn with_arrows(mut self, arrows: bool) -> Self {
        self.arrows = arrows;
        self
    }

    pub fn with_port_labels(mut self, labels: bool) -> Self {
        self.port_labels = labels;
        self
    }

    /// Title and port label sizes
    pub fn with_font_sizes(mut self, title: f64, port: f64) -> Self {
        self.font_size = title;
        self.port_font_size = port;
        self
    }
}
