//! Configuration for SVG and PNG output

/// Configuration options for SVG output
#[derive(Debug, Clone, PartialEq)]
pub struct SvgConfig {
    /// Whether to include the XML declaration
    pub standalone: bool,

    /// Whether to format output with indentation
    pub pretty_print: bool,

    /// Prefix for CSS class names (e.g., "ob-" for "ob-shape")
    pub class_prefix: Option<String>,

    /// Fill of a full-canvas rectangle painted below every shape
    pub background: Option<String>,

    /// Decimal places kept for coordinates
    pub precision: usize,

    /// Pixels per canvas unit when rasterizing
    pub png_scale: f32,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            standalone: true,
            pretty_print: true,
            class_prefix: Some("ob-".to_string()),
            background: None,
            precision: 3,
            png_scale: 1.0,
        }
    }
}

impl SvgConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether output is standalone
    pub fn with_standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    /// Set whether to pretty-print output
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// Set the CSS class prefix
    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = Some(prefix.into());
        self
    }

    /// Remove the CSS class prefix
    pub fn without_class_prefix(mut self) -> Self {
        self.class_prefix = None;
        self
    }

    /// Paint the whole canvas with `fill` first
    pub fn with_background(mut self, fill: impl Into<String>) -> Self {
        self.background = Some(fill.into());
        self
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_png_scale(mut self, scale: f32) -> Self {
        self.png_scale = scale;
        self
    }
}
