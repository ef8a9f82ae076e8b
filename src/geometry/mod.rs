//! Shapes, bounds and styles
//!
//! Every geometric attribute is an [`Expr`](crate::symbolic::Expr), so shapes can
//! be declared, related to each other and composed before anything is solved.

pub mod bounds;
pub mod shapes;
pub mod style;

pub use bounds::{Bounds, HasBounds};
pub use shapes::{Circle, IntoOffset, Line, Point, Rectangle, Shape, ShapeKind, Text};
pub use style::Style;
