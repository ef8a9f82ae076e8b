//! Axis-aligned symbolic bounding boxes

use crate::symbolic::{Constraint, Expr};

/// The box spanned by a shape or group
///
/// Bounds are never stored on a shape; they are recomputed from its current
/// attributes whenever asked for. Coordinates grow rightwards and downwards, so
/// `top_edge <= bottom_edge` for well-formed geometry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub left_edge: Expr,
    pub right_edge: Expr,
    pub top_edge: Expr,
    pub bottom_edge: Expr,
}

impl Bounds {
    pub fn new(
        left_edge: impl Into<Expr>,
        right_edge: impl Into<Expr>,
        top_edge: impl Into<Expr>,
        bottom_edge: impl Into<Expr>,
    ) -> Self {
        Self {
            left_edge: left_edge.into(),
            right_edge: right_edge.into(),
            top_edge: top_edge.into(),
            bottom_edge: bottom_edge.into(),
        }
    }

    /// Degenerate box at a single point
    pub fn at(x: &Expr, y: &Expr) -> Self {
        Self::new(x, x, y, y)
    }

    pub fn width(&self) -> Expr {
        &self.right_edge - &self.left_edge
    }

    pub fn height(&self) -> Expr {
        &self.bottom_edge - &self.top_edge
    }

    pub fn center_x(&self) -> Expr {
        (&self.left_edge + &self.right_edge) * 0.5
    }

    pub fn center_y(&self) -> Expr {
        (&self.top_edge + &self.bottom_edge) * 0.5
    }

    /// Smallest box enclosing all of `bounds`; `None` when there are none
    pub fn union<'a, I>(bounds: I) -> Option<Bounds>
    where
        I: IntoIterator<Item = &'a Bounds>,
    {
        let all: Vec<&Bounds> = bounds.into_iter().collect();
        Some(Bounds {
            left_edge: Expr::min(all.iter().map(|b| b.left_edge.clone()))?,
            right_edge: Expr::max(all.iter().map(|b| b.right_edge.clone()))?,
            top_edge: Expr::min(all.iter().map(|b| b.top_edge.clone()))?,
            bottom_edge: Expr::max(all.iter().map(|b| b.bottom_edge.clone()))?,
        })
    }

    /// These bounds grown by `margin` on every side
    pub fn expanded(&self, margin: f64) -> Bounds {
        Bounds {
            left_edge: &self.left_edge - margin,
            right_edge: &self.right_edge + margin,
            top_edge: &self.top_edge - margin,
            bottom_edge: &self.bottom_edge + margin,
        }
    }

    /// Constraints keeping `inner` within these bounds, `padding` away from each edge
    pub fn contains(&self, inner: &Bounds, padding: f64) -> Vec<Constraint> {
        vec![
            (&self.left_edge + padding).le(&inner.left_edge),
            (&self.top_edge + padding).le(&inner.top_edge),
            (&inner.right_edge + padding).le(&self.right_edge),
            (&inner.bottom_edge + padding).le(&self.bottom_edge),
        ]
    }

    /// Both boxes share the same horizontal centre
    pub fn center_horizontally(&self, other: &Bounds) -> Constraint {
        self.center_x().eq_to(other.center_x())
    }

    /// Both boxes share the same vertical centre
    pub fn center_vertically(&self, other: &Bounds) -> Constraint {
        self.center_y().eq_to(other.center_y())
    }
}

/// Anything with a derivable bounding box
pub trait HasBounds {
    fn bounds(&self) -> Bounds;
}

impl HasBounds for Bounds {
    fn bounds(&self) -> Bounds {
        self.clone()
    }
}
