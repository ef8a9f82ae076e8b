//! Drawing primitives and the SVG/PNG backends
//!
//! A solved group is projected into a [`Drawing`]: a fixed-size canvas and an
//! ordered list of [`Primitive`]s with concrete coordinates. The drawing can
//! then be serialized to SVG or rasterized to PNG.

pub mod config;
pub mod png;
pub mod svg;

pub use config::SvgConfig;
pub use svg::{render_svg, SvgBuilder};

use crate::geometry::Style;
use crate::stylesheet::Stylesheet;
use crate::RenderError;

/// One concrete drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        style: Style,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        style: Style,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        style: Style,
    },
    /// Text centred on (x, y)
    Text {
        content: String,
        font_size: f64,
        x: f64,
        y: f64,
        style: Style,
    },
}

impl Primitive {
    pub fn style(&self) -> &Style {
        match self {
            Primitive::Rect { style, .. }
            | Primitive::Circle { style, .. }
            | Primitive::Line { style, .. }
            | Primitive::Text { style, .. } => style,
        }
    }
}

/// A rendered canvas: size plus primitives in paint order
#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    pub width: f64,
    pub height: f64,
    primitives: Vec<Primitive>,
}

impl Drawing {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            primitives: Vec::new(),
        }
    }

    /// Append a primitive; it paints over everything already added
    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn to_svg(&self, config: &SvgConfig, stylesheet: &Stylesheet) -> String {
        render_svg(self, config, stylesheet)
    }

    pub fn to_png(
        &self,
        config: &SvgConfig,
        stylesheet: &Stylesheet,
        scale: f32,
    ) -> Result<Vec<u8>, RenderError> {
        png::rasterize(&self.to_svg(config, stylesheet), scale)
    }
}
