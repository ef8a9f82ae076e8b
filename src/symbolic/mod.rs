//! Symbolic values and the constraints built from them

pub mod constraint;
pub mod expr;

pub use constraint::{Constraint, ConstraintOrigin, Relation, Strength};
pub use expr::{Expr, Term, Variable};
