//! Equalities and inequalities between symbolic values

use std::collections::BTreeSet;
use std::fmt;

use crate::layout::solver::{Solution, SolverError};

use super::expr::{Expr, Variable};

/// Comparison between the two sides of a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Eq,
    Le,
    Ge,
    Lt,
    Gt,
}

impl Relation {
    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Eq => "==",
            Relation::Le => "<=",
            Relation::Ge => ">=",
            Relation::Lt => "<",
            Relation::Gt => ">",
        }
    }

    pub fn is_strict(self) -> bool {
        matches!(self, Relation::Lt | Relation::Gt)
    }
}

/// How hard the solver tries to honour a constraint
///
/// Only `Required` constraints are binding; the others are preferences the
/// solver satisfies as well as it can, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strength {
    #[default]
    Required,
    Strong,
    Medium,
    Weak,
}

/// Where a constraint came from (for error messages)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintOrigin {
    /// Declared on a group by the caller
    UserDefined,
    /// Implied by a shape's own geometry, e.g. a non-negative width
    Intrinsic { shape: String },
}

impl fmt::Display for ConstraintOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintOrigin::UserDefined => write!(f, "user constraint"),
            ConstraintOrigin::Intrinsic { shape } => write!(f, "intrinsic to {}", shape),
        }
    }
}

/// `lhs <relation> rhs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub lhs: Expr,
    pub relation: Relation,
    pub rhs: Expr,
    pub strength: Strength,
    pub origin: ConstraintOrigin,
}

impl Constraint {
    pub fn new(lhs: impl Into<Expr>, relation: Relation, rhs: impl Into<Expr>) -> Self {
        Self {
            lhs: lhs.into(),
            relation,
            rhs: rhs.into(),
            strength: Strength::Required,
            origin: ConstraintOrigin::UserDefined,
        }
    }

    pub fn equal(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::new(lhs, Relation::Eq, rhs)
    }

    pub fn less_or_equal(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::new(lhs, Relation::Le, rhs)
    }

    pub fn greater_or_equal(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::new(lhs, Relation::Ge, rhs)
    }

    pub fn less_than(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::new(lhs, Relation::Lt, rhs)
    }

    pub fn greater_than(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::new(lhs, Relation::Gt, rhs)
    }

    /// Downgrade (or upgrade) this constraint to the given strength
    pub fn with_strength(mut self, strength: Strength) -> Self {
        self.strength = strength;
        self
    }

    pub fn with_origin(mut self, origin: ConstraintOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn is_required(&self) -> bool {
        self.strength == Strength::Required
    }

    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut out = BTreeSet::new();
        self.lhs.collect_variables(&mut out);
        self.rhs.collect_variables(&mut out);
        out
    }

    /// Largest absolute operand value under an assignment, at least 1
    pub fn magnitude(&self, solution: &Solution) -> Result<f64, SolverError> {
        let lhs = self.lhs.evaluate(solution)?;
        let rhs = self.rhs.evaluate(solution)?;
        Ok(lhs.abs().max(rhs.abs()).max(1.0))
    }

    /// Check the constraint against an assignment
    ///
    /// Non-strict relations accept a deviation of `tolerance`, scaled by the
    /// magnitude of the operands. Strict relations are checked exactly.
    pub fn is_satisfied(&self, solution: &Solution, tolerance: f64) -> Result<bool, SolverError> {
        let lhs = self.lhs.evaluate(solution)?;
        let rhs = self.rhs.evaluate(solution)?;
        let slack = tolerance * lhs.abs().max(rhs.abs()).max(1.0);
        let diff = lhs - rhs;
        Ok(match self.relation {
            Relation::Eq => diff.abs() <= slack,
            Relation::Le => diff <= slack,
            Relation::Ge => diff >= -slack,
            Relation::Lt => diff < 0.0,
            Relation::Gt => diff > 0.0,
        })
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.relation.symbol(), self.rhs)?;
        if self.strength != Strength::Required {
            write!(f, " [{:?}]", self.strength)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_default_to_required_user_constraints() {
        let x = Expr::named("x");
        let c = x.le(10.0);
        assert_eq!(c.relation, Relation::Le);
        assert!(c.is_required());
        assert_eq!(c.origin, ConstraintOrigin::UserDefined);
        assert_eq!(c.to_string(), "x <= 10");
    }

    #[test]
    fn test_with_strength_display() {
        let c = Constraint::equal(Expr::named("w"), 40.0).with_strength(Strength::Weak);
        assert!(!c.is_required());
        assert_eq!(c.to_string(), "w == 40 [Weak]");
    }

    #[test]
    fn test_is_satisfied() {
        let x = Variable::named("x");
        let solution: Solution = [(x.clone(), 0.0)].into_iter().collect();
        let x = Expr::from(x);

        assert!(x.le(0.0).is_satisfied(&solution, 1e-6).unwrap());
        assert!(!x.lt(0.0).is_satisfied(&solution, 1e-6).unwrap());
        assert!(x.ge(-1e-9).is_satisfied(&solution, 1e-6).unwrap());
        assert!(!x.gt(0.0).is_satisfied(&solution, 1e-6).unwrap());
        assert!(x.eq_to(1e-9).is_satisfied(&solution, 1e-6).unwrap());
        assert!(!x.eq_to(1.0).is_satisfied(&solution, 1e-6).unwrap());
    }

    #[test]
    fn test_intrinsic_origin_display() {
        let origin = ConstraintOrigin::Intrinsic {
            shape: "rectangle #0".to_string(),
        };
        assert_eq!(origin.to_string(), "intrinsic to rectangle #0");
    }
}
