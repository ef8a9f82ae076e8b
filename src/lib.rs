//! Obsidian - declarative vector diagrams solved by constraints
//!
//! Shapes are declared with symbolic geometry: every coordinate and size is an
//! [`Expr`] that may still be unknown. Shapes are gathered in a [`Group`]
//! together with constraints relating them, the group is solved in a single
//! simultaneous pass, and a [`Canvas`] projects the result into SVG or PNG.
//!
//! # Example
//!
//! ```rust
//! use obsidian::{Canvas, Circle, Group, Style};
//!
//! let circle = Circle::free("dot").with_style(Style::from([("fill", "black")]));
//! let group = Group::new()
//!     .with_constraint(circle.x.eq_to(50.0))
//!     .with_constraint(circle.y.eq_to(50.0))
//!     .with_constraint(circle.radius.eq_to(10.0))
//!     .with_shape(circle);
//!
//! let mut canvas = Canvas::new(group, 100.0, 100.0);
//! let svg = canvas.to_svg().unwrap();
//! assert!(svg.contains(r#"<circle class="ob-shape ob-circle" cx="50" cy="50" r="10" fill="black"/>"#));
//! ```

pub mod canvas;
pub mod demo;
pub mod geometry;
pub mod layout;
pub mod renderer;
pub mod stylesheet;
pub mod symbolic;

pub use canvas::{Canvas, RenderState};
pub use geometry::{Bounds, Circle, HasBounds, Line, Point, Rectangle, Shape, ShapeKind, Style, Text};
pub use layout::{Group, LayoutError, Solution, SolverConfig, SolverError};
pub use renderer::{Drawing, Primitive, SvgConfig};
pub use symbolic::{Constraint, ConstraintOrigin, Expr, Relation, Strength, Variable};

use std::path::PathBuf;

use thiserror::Error;

// Re-export Stylesheet for public API
pub use stylesheet::Stylesheet;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error during validation or solving
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Writing an output file failed
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// SVG could not be rasterized
    #[error("rasterization failed: {0}")]
    Raster(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styled(color: &str) -> Style {
        Style::from([("fill", color)])
    }

    #[test]
    fn test_render_simple_shape() {
        let rect = Rectangle::new(10, 10, 20, 20).with_style(styled("red"));
        let mut canvas = Canvas::new(Group::new().with_shape(rect), 50.0, 50.0);
        let svg = canvas.to_svg().unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
        assert!(svg.contains(r#"fill="red""#));
    }

    #[test]
    fn test_missing_style_is_layout_error() {
        let mut canvas = Canvas::new(Group::new().with_shape(Circle::new(1, 1, 1)), 5.0, 5.0);
        let err = canvas.to_svg().unwrap_err();
        assert!(matches!(
            err,
            RenderError::Layout(LayoutError::MissingStyle { .. })
        ));
    }

    #[test]
    fn test_io_error_names_path() {
        let rect = Rectangle::new(0, 0, 1, 1).with_style(styled("red"));
        let mut canvas = Canvas::new(Group::new().with_shape(rect), 5.0, 5.0);
        let err = canvas
            .save_svg("/nonexistent-dir/out.svg")
            .unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent-dir/out.svg"));
    }

    #[test]
    fn test_render_text_with_palette_token() {
        let text = Text::new("Hello World", 24, Point::new(50, 20)).with_style(styled("accent"));
        let mut canvas = Canvas::new(Group::new().with_shape(text), 100.0, 40.0);
        let svg = canvas.to_svg().unwrap();
        assert!(svg.contains("Hello World"));
        assert!(svg.contains(r#"font-size="24""#));
        assert!(svg.contains(r##"fill="#2196f3""##));
        assert!(svg.contains("ob-text"));
    }
}
