//! Shape variants with symbolic geometry

use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Add, Sub};

use crate::layout::Group;
use crate::symbolic::{Constraint, Expr, Variable};

use super::bounds::{Bounds, HasBounds};
use super::style::Style;

/// A symbolic 2D point
///
/// Points are plain values: lines and text own theirs. Adding or subtracting an
/// offset yields a new point with the same style.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: Expr,
    pub y: Expr,
    pub style: Style,
}

impl Point {
    pub fn new(x: impl Into<Expr>, y: impl Into<Expr>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            style: Style::default(),
        }
    }

    /// A point whose coordinates are fresh variables `{name}.x` and `{name}.y`
    pub fn free(name: &str) -> Self {
        Self::new(Expr::named(format!("{name}.x")), Expr::named(format!("{name}.y")))
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    fn offset_by(&self, dx: Expr, dy: Expr) -> Point {
        Point {
            x: &self.x + dx,
            y: &self.y + dy,
            style: self.style.clone(),
        }
    }

    fn offset_back(&self, dx: Expr, dy: Expr) -> Point {
        Point {
            x: &self.x - dx,
            y: &self.y - dy,
            style: self.style.clone(),
        }
    }
}

impl HasBounds for Point {
    fn bounds(&self) -> Bounds {
        Bounds::at(&self.x, &self.y)
    }
}

/// Something a point can be shifted by: another point, a pair, or a 2-array
pub trait IntoOffset {
    fn into_offset(self) -> (Expr, Expr);
}

impl IntoOffset for Point {
    fn into_offset(self) -> (Expr, Expr) {
        (self.x, self.y)
    }
}

impl IntoOffset for &Point {
    fn into_offset(self) -> (Expr, Expr) {
        (self.x.clone(), self.y.clone())
    }
}

impl<A: Into<Expr>, B: Into<Expr>> IntoOffset for (A, B) {
    fn into_offset(self) -> (Expr, Expr) {
        (self.0.into(), self.1.into())
    }
}

impl IntoOffset for [f64; 2] {
    fn into_offset(self) -> (Expr, Expr) {
        (Expr::constant(self[0]), Expr::constant(self[1]))
    }
}

impl<O: IntoOffset> Add<O> for Point {
    type Output = Point;
    fn add(self, offset: O) -> Point {
        let (dx, dy) = offset.into_offset();
        self.offset_by(dx, dy)
    }
}

impl<O: IntoOffset> Add<O> for &Point {
    type Output = Point;
    fn add(self, offset: O) -> Point {
        let (dx, dy) = offset.into_offset();
        self.offset_by(dx, dy)
    }
}

impl<O: IntoOffset> Sub<O> for Point {
    type Output = Point;
    fn sub(self, offset: O) -> Point {
        let (dx, dy) = offset.into_offset();
        self.offset_back(dx, dy)
    }
}

impl<O: IntoOffset> Sub<O> for &Point {
    type Output = Point;
    fn sub(self, offset: O) -> Point {
        let (dx, dy) = offset.into_offset();
        self.offset_back(dx, dy)
    }
}

// Pair on the left: addition commutes, subtraction keeps the point's style.
impl Add<Point> for (f64, f64) {
    type Output = Point;
    fn add(self, point: Point) -> Point {
        point + self
    }
}

impl Sub<Point> for (f64, f64) {
    type Output = Point;
    fn sub(self, point: Point) -> Point {
        Point {
            x: self.0 - &point.x,
            y: self.1 - &point.y,
            style: point.style,
        }
    }
}

/// Axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rectangle {
    pub x: Expr,
    pub y: Expr,
    pub width: Expr,
    pub height: Expr,
    pub style: Style,
}

impl Rectangle {
    pub fn new(
        x: impl Into<Expr>,
        y: impl Into<Expr>,
        width: impl Into<Expr>,
        height: impl Into<Expr>,
    ) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            width: width.into(),
            height: height.into(),
            style: Style::default(),
        }
    }

    /// A rectangle whose four attributes are fresh variables named after `name`
    pub fn free(name: &str) -> Self {
        Self::new(
            Expr::named(format!("{name}.x")),
            Expr::named(format!("{name}.y")),
            Expr::named(format!("{name}.width")),
            Expr::named(format!("{name}.height")),
        )
    }

    /// The rectangle surrounding `group` with `margin` on every side
    ///
    /// The group's geometry may still be unresolved; the rectangle is expressed
    /// in terms of it. Returns `None` for an empty group.
    pub fn around(group: &Group, margin: f64, style: Style) -> Option<Self> {
        group
            .bounds()
            .map(|bounds| Self::around_bounds(&bounds, margin, style))
    }

    /// The rectangle surrounding `bounds` with `margin` on every side
    pub fn around_bounds(bounds: &Bounds, margin: f64, style: Style) -> Self {
        Self {
            x: &bounds.left_edge - margin,
            y: &bounds.top_edge - margin,
            width: bounds.width() + 2.0 * margin,
            height: bounds.height() + 2.0 * margin,
            style,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl HasBounds for Rectangle {
    fn bounds(&self) -> Bounds {
        Bounds::new(&self.x, &self.x + &self.width, &self.y, &self.y + &self.height)
    }
}

/// Circle given by its centre and radius
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Circle {
    pub x: Expr,
    pub y: Expr,
    pub radius: Expr,
    pub style: Style,
}

impl Circle {
    pub fn new(x: impl Into<Expr>, y: impl Into<Expr>, radius: impl Into<Expr>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            radius: radius.into(),
            style: Style::default(),
        }
    }

    pub fn free(name: &str) -> Self {
        Self::new(
            Expr::named(format!("{name}.x")),
            Expr::named(format!("{name}.y")),
            Expr::named(format!("{name}.radius")),
        )
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn center(&self) -> Point {
        Point::new(&self.x, &self.y)
    }
}

impl HasBounds for Circle {
    fn bounds(&self) -> Bounds {
        Bounds::new(
            &self.x - &self.radius,
            &self.x + &self.radius,
            &self.y - &self.radius,
            &self.y + &self.radius,
        )
    }
}

/// Straight segment between two points
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Line {
    pub pt1: Point,
    pub pt2: Point,
    pub style: Style,
}

impl Line {
    pub fn new(pt1: Point, pt2: Point) -> Self {
        Self {
            pt1,
            pt2,
            style: Style::default(),
        }
    }

    pub fn free(name: &str) -> Self {
        Self::new(
            Point::free(&format!("{name}.pt1")),
            Point::free(&format!("{name}.pt2")),
        )
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl HasBounds for Line {
    fn bounds(&self) -> Bounds {
        Bounds {
            left_edge: self.pt1.x.min_with(&self.pt2.x),
            right_edge: self.pt1.x.max_with(&self.pt2.x),
            top_edge: self.pt1.y.min_with(&self.pt2.y),
            bottom_edge: self.pt1.y.max_with(&self.pt2.y),
        }
    }
}

/// A text label, always centred on its anchor point
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Text {
    pub text: String,
    pub font_size: Expr,
    pub anchor_point: Point,
    pub style: Style,
}

impl Text {
    pub fn new(text: impl Into<String>, font_size: impl Into<Expr>, anchor_point: Point) -> Self {
        Self {
            text: text.into(),
            font_size: font_size.into(),
            anchor_point,
            style: Style::default(),
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl HasBounds for Text {
    // Glyph extents need font metrics, so only the anchor is known.
    fn bounds(&self) -> Bounds {
        self.anchor_point.bounds()
    }
}

/// Discriminant of [`Shape`], for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Line,
    Text,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Line => "line",
            ShapeKind::Text => "text",
        };
        write!(f, "{}", name)
    }
}

/// A renderable member of a [`Group`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Shape {
    Rectangle(Rectangle),
    Circle(Circle),
    Line(Line),
    Text(Text),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Line(_) => ShapeKind::Line,
            Shape::Text(_) => ShapeKind::Text,
        }
    }

    pub fn style(&self) -> &Style {
        match self {
            Shape::Rectangle(r) => &r.style,
            Shape::Circle(c) => &c.style,
            Shape::Line(l) => &l.style,
            Shape::Text(t) => &t.style,
        }
    }

    /// Whether rendering needs at least one style entry
    pub fn requires_style(&self) -> bool {
        !matches!(self, Shape::Text(_))
    }

    /// Every symbolic attribute of the shape
    pub fn attributes(&self) -> Vec<&Expr> {
        match self {
            Shape::Rectangle(r) => vec![&r.x, &r.y, &r.width, &r.height],
            Shape::Circle(c) => vec![&c.x, &c.y, &c.radius],
            Shape::Line(l) => vec![&l.pt1.x, &l.pt1.y, &l.pt2.x, &l.pt2.y],
            Shape::Text(t) => vec![&t.font_size, &t.anchor_point.x, &t.anchor_point.y],
        }
    }

    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut out = BTreeSet::new();
        for attr in self.attributes() {
            attr.collect_variables(&mut out);
        }
        out
    }

    /// Constraints the shape's geometry implies on its own
    pub fn intrinsic_constraints(&self) -> Vec<Constraint> {
        match self {
            Shape::Rectangle(r) => vec![r.width.ge(0.0), r.height.ge(0.0)],
            Shape::Circle(c) => vec![c.radius.ge(0.0)],
            Shape::Line(_) => vec![],
            Shape::Text(t) => vec![t.font_size.gt(0.0)],
        }
    }
}

impl HasBounds for Shape {
    fn bounds(&self) -> Bounds {
        match self {
            Shape::Rectangle(r) => r.bounds(),
            Shape::Circle(c) => c.bounds(),
            Shape::Line(l) => l.bounds(),
            Shape::Text(t) => t.bounds(),
        }
    }
}

impl From<Rectangle> for Shape {
    fn from(r: Rectangle) -> Self {
        Shape::Rectangle(r)
    }
}

impl From<Circle> for Shape {
    fn from(c: Circle) -> Self {
        Shape::Circle(c)
    }
}

impl From<Line> for Shape {
    fn from(l: Line) -> Self {
        Shape::Line(l)
    }
}

impl From<Text> for Shape {
    fn from(t: Text) -> Self {
        Shape::Text(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::solver::Solution;

    #[test]
    fn test_point_plus_pair() {
        assert_eq!(Point::new(2, 3) + (1, 1), Point::new(3, 4));
        assert_eq!(Point::new(2, 3) + [1.0, 1.0], Point::new(3, 4));
    }

    #[test]
    fn test_point_minus_point() {
        assert_eq!(Point::new(3, 4) - Point::new(2, 3), Point::new(1, 1));
    }

    #[test]
    fn test_point_addition_commutes() {
        let p = Point::new(2, 3);
        assert_eq!((1.0, 1.0) + p.clone(), p + (1.0, 1.0));
    }

    #[test]
    fn test_pair_minus_point() {
        assert_eq!((5.0, 5.0) - Point::new(2, 3), Point::new(3, 2));
    }

    #[test]
    fn test_point_offset_keeps_style() {
        let style = Style::from([("fill", "black")]);
        let p = Point::new(0, 0).with_style(style.clone());
        assert_eq!((&p + (1, 2)).style, style);
        assert_eq!((p - Point::new(1, 1)).style, style);
    }

    #[test]
    fn test_symbolic_offset_is_structural_not_reduced() {
        let a = Point::free("a");
        let b = Point::free("b");
        let round_trip = &a + &b - &b;
        assert_ne!(round_trip, a);
        let mut expected = a.x.variables();
        expected.extend(b.x.variables());
        assert_eq!(round_trip.x.variables(), expected);
    }

    #[test]
    fn test_rectangle_bounds_derive_from_attributes() {
        let r = Rectangle::free("r");
        let b = r.bounds();
        assert_eq!(b.left_edge, r.x);
        assert_eq!(b.right_edge, &r.x + &r.width);
        assert_eq!(b.top_edge, r.y);
        assert_eq!(b.bottom_edge, &r.y + &r.height);
    }

    #[test]
    fn test_circle_bounds() {
        let c = Circle::new(5, 5, 3);
        let empty = Solution::default();
        let b = c.bounds();
        assert_eq!(b.left_edge.evaluate(&empty).unwrap(), 2.0);
        assert_eq!(b.right_edge.evaluate(&empty).unwrap(), 8.0);
        assert_eq!(b.top_edge.evaluate(&empty).unwrap(), 2.0);
        assert_eq!(b.bottom_edge.evaluate(&empty).unwrap(), 8.0);
    }

    #[test]
    fn test_line_bounds_are_order_independent() {
        let a = Line::new(Point::new(0, 0), Point::new(3, -2));
        let b = Line::new(Point::new(3, -2), Point::new(0, 0));
        assert_eq!(a.bounds(), b.bounds());
        assert_eq!(a.bounds(), Bounds::new(0.0, 3.0, -2.0, 0.0));
    }

    #[test]
    fn test_text_bounds_at_anchor() {
        let t = Text::new("hi", 12, Point::new(4, 7));
        assert_eq!(t.bounds(), Bounds::new(4, 4, 7, 7));
    }

    #[test]
    fn test_shape_kind_and_style_requirement() {
        let shape: Shape = Text::new("label", 10, Point::new(0, 0)).into();
        assert_eq!(shape.kind(), ShapeKind::Text);
        assert!(!shape.requires_style());

        let shape: Shape = Circle::new(0, 0, 1).into();
        assert_eq!(shape.kind().to_string(), "circle");
        assert!(shape.requires_style());
    }

    #[test]
    fn test_intrinsic_constraints() {
        let r: Shape = Rectangle::free("r").into();
        assert_eq!(r.intrinsic_constraints().len(), 2);
        let l: Shape = Line::free("l").into();
        assert!(l.intrinsic_constraints().is_empty());
        assert_eq!(l.variables().len(), 4);
    }
}
