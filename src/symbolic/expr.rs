//! Symbolic real-valued terms
//!
//! An [`Expr`] is an immutable expression tree over solver variables. Arithmetic
//! on expressions builds new trees and never evaluates anything: the only way to
//! obtain a number is [`Expr::evaluate`] against a [`Solution`].

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::layout::solver::{Solution, SolverError};

use super::constraint::{Constraint, Relation};

static NEXT_VARIABLE_ID: AtomicU64 = AtomicU64::new(0);

/// A free real-valued variable
///
/// Every call to [`Variable::new`] or [`Variable::named`] yields a variable that
/// is distinct from all others in the process. The name is for diagnostics only
/// and takes no part in equality.
#[derive(Debug, Clone)]
pub struct Variable {
    id: u64,
    name: Option<Arc<str>>,
}

impl Variable {
    pub fn new() -> Self {
        Self {
            id: NEXT_VARIABLE_ID.fetch_add(1, Ordering::Relaxed),
            name: None,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: NEXT_VARIABLE_ID.fetch_add(1, Ordering::Relaxed),
            name: Some(Arc::from(name.into())),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Default for Variable {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Variable {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Variable {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "v{}", self.id),
        }
    }
}

/// Node of an expression tree
#[derive(Debug)]
pub enum Term {
    Var(Variable),
    Const(f64),
    Add(Expr, Expr),
    Sub(Expr, Expr),
    /// factor * expr
    Scale(f64, Expr),
    /// Smallest of two or more operands
    Min(Vec<Expr>),
    /// Largest of two or more operands
    Max(Vec<Expr>),
}

// Constants compare by bit pattern so that `Eq` and `Hash` stay consistent.
impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Term::Var(a), Term::Var(b)) => a == b,
            (Term::Const(a), Term::Const(b)) => a.to_bits() == b.to_bits(),
            (Term::Add(a1, b1), Term::Add(a2, b2)) | (Term::Sub(a1, b1), Term::Sub(a2, b2)) => {
                a1 == a2 && b1 == b2
            }
            (Term::Scale(k1, e1), Term::Scale(k2, e2)) => k1.to_bits() == k2.to_bits() && e1 == e2,
            (Term::Min(a), Term::Min(b)) | (Term::Max(a), Term::Max(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Term::Var(v) => v.hash(state),
            Term::Const(c) => c.to_bits().hash(state),
            Term::Add(a, b) | Term::Sub(a, b) => {
                a.hash(state);
                b.hash(state);
            }
            Term::Scale(k, e) => {
                k.to_bits().hash(state);
                e.hash(state);
            }
            Term::Min(args) | Term::Max(args) => args.hash(state),
        }
    }
}

/// A symbolic real value
///
/// Cloning is cheap: subtrees are shared.
#[derive(Clone)]
pub struct Expr(Arc<Term>);

#[derive(Clone, Copy)]
enum Extremum {
    Min,
    Max,
}

impl Expr {
    fn from_term(term: Term) -> Self {
        Self(Arc::new(term))
    }

    /// A fresh anonymous variable
    pub fn var() -> Self {
        Variable::new().into()
    }

    /// A fresh variable carrying a diagnostic name
    pub fn named(name: impl Into<String>) -> Self {
        Variable::named(name).into()
    }

    pub fn constant(value: f64) -> Self {
        Self::from_term(Term::Const(value))
    }

    pub fn term(&self) -> &Term {
        &self.0
    }

    pub fn as_constant(&self) -> Option<f64> {
        match self.term() {
            Term::Const(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self.term() {
            Term::Var(v) => Some(v),
            _ => None,
        }
    }

    /// Smallest of the given values, `None` for an empty collection
    pub fn min<I: IntoIterator<Item = Expr>>(items: I) -> Option<Expr> {
        Self::extremum(items, Extremum::Min)
    }

    /// Largest of the given values, `None` for an empty collection
    pub fn max<I: IntoIterator<Item = Expr>>(items: I) -> Option<Expr> {
        Self::extremum(items, Extremum::Max)
    }

    /// `min(self, other)`
    pub fn min_with(&self, other: &Expr) -> Expr {
        Self::extremum([self.clone(), other.clone()], Extremum::Min)
            .unwrap_or_else(|| self.clone())
    }

    /// `max(self, other)`
    pub fn max_with(&self, other: &Expr) -> Expr {
        Self::extremum([self.clone(), other.clone()], Extremum::Max)
            .unwrap_or_else(|| self.clone())
    }

    fn extremum<I: IntoIterator<Item = Expr>>(items: I, kind: Extremum) -> Option<Expr> {
        let mut args: Vec<Expr> = Vec::new();
        for item in items {
            // min(min(a, b), c) flattens to min(a, b, c)
            let nested = match (kind, item.term()) {
                (Extremum::Min, Term::Min(inner)) | (Extremum::Max, Term::Max(inner)) => {
                    Some(inner.clone())
                }
                _ => None,
            };
            for arg in nested.unwrap_or_else(|| vec![item]) {
                if !args.contains(&arg) {
                    args.push(arg);
                }
            }
        }

        if args.len() <= 1 {
            return args.pop();
        }

        let constants: Option<Vec<f64>> = args.iter().map(Expr::as_constant).collect();
        if let Some(values) = constants {
            let folded = match kind {
                Extremum::Min => values.into_iter().fold(f64::INFINITY, f64::min),
                Extremum::Max => values.into_iter().fold(f64::NEG_INFINITY, f64::max),
            };
            return Some(Expr::constant(folded));
        }

        Some(Self::from_term(match kind {
            Extremum::Min => Term::Min(args),
            Extremum::Max => Term::Max(args),
        }))
    }

    /// Free variables of this expression, in creation order
    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    pub(crate) fn collect_variables(&self, out: &mut BTreeSet<Variable>) {
        match self.term() {
            Term::Var(v) => {
                out.insert(v.clone());
            }
            Term::Const(_) => {}
            Term::Add(a, b) | Term::Sub(a, b) => {
                a.collect_variables(out);
                b.collect_variables(out);
            }
            Term::Scale(_, e) => e.collect_variables(out),
            Term::Min(args) | Term::Max(args) => {
                for arg in args {
                    arg.collect_variables(out);
                }
            }
        }
    }

    /// Evaluate against a solved assignment
    pub fn evaluate(&self, solution: &Solution) -> Result<f64, SolverError> {
        let value = match self.term() {
            Term::Var(v) => solution
                .value(v)
                .ok_or_else(|| SolverError::UnresolvedVariable { name: v.to_string() })?,
            Term::Const(c) => *c,
            Term::Add(a, b) => a.evaluate(solution)? + b.evaluate(solution)?,
            Term::Sub(a, b) => a.evaluate(solution)? - b.evaluate(solution)?,
            Term::Scale(k, e) => k * e.evaluate(solution)?,
            Term::Min(args) => args.iter().try_fold(f64::INFINITY, |acc, arg| {
                Ok::<_, SolverError>(acc.min(arg.evaluate(solution)?))
            })?,
            Term::Max(args) => args.iter().try_fold(f64::NEG_INFINITY, |acc, arg| {
                Ok::<_, SolverError>(acc.max(arg.evaluate(solution)?))
            })?,
        };
        Ok(value)
    }

    /// Required constraint `self == rhs`
    pub fn eq_to(&self, rhs: impl Into<Expr>) -> Constraint {
        Constraint::new(self.clone(), Relation::Eq, rhs)
    }

    /// Required constraint `self <= rhs`
    pub fn le(&self, rhs: impl Into<Expr>) -> Constraint {
        Constraint::new(self.clone(), Relation::Le, rhs)
    }

    /// Required constraint `self >= rhs`
    pub fn ge(&self, rhs: impl Into<Expr>) -> Constraint {
        Constraint::new(self.clone(), Relation::Ge, rhs)
    }

    /// Required constraint `self < rhs`
    pub fn lt(&self, rhs: impl Into<Expr>) -> Constraint {
        Constraint::new(self.clone(), Relation::Lt, rhs)
    }

    /// Required constraint `self > rhs`
    pub fn gt(&self, rhs: impl Into<Expr>) -> Constraint {
        Constraint::new(self.clone(), Relation::Gt, rhs)
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.term() {
            Term::Var(v) => write!(f, "{}", v),
            Term::Const(c) => write!(f, "{}", c),
            Term::Add(a, b) => write!(f, "({} + {})", a, b),
            Term::Sub(a, b) => write!(f, "({} - {})", a, b),
            Term::Scale(k, e) => write!(f, "{} * {}", k, e),
            Term::Min(args) | Term::Max(args) => {
                let name = if matches!(self.term(), Term::Min(_)) { "min" } else { "max" };
                let parts: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", name, parts.join(", "))
            }
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({})", self)
    }
}

impl From<Variable> for Expr {
    fn from(v: Variable) -> Self {
        Self::from_term(Term::Var(v))
    }
}

impl From<f64> for Expr {
    fn from(v: f64) -> Self {
        Self::constant(v)
    }
}

impl From<i32> for Expr {
    fn from(v: i32) -> Self {
        Self::constant(f64::from(v))
    }
}

impl From<&Expr> for Expr {
    fn from(e: &Expr) -> Self {
        e.clone()
    }
}

fn add_exprs(a: Expr, b: Expr) -> Expr {
    match (a.as_constant(), b.as_constant()) {
        (Some(x), Some(y)) => Expr::constant(x + y),
        (Some(x), None) if x == 0.0 => b,
        (None, Some(y)) if y == 0.0 => a,
        _ => Expr::from_term(Term::Add(a, b)),
    }
}

fn sub_exprs(a: Expr, b: Expr) -> Expr {
    match (a.as_constant(), b.as_constant()) {
        (Some(x), Some(y)) => Expr::constant(x - y),
        (None, Some(y)) if y == 0.0 => a,
        _ => Expr::from_term(Term::Sub(a, b)),
    }
}

fn scale_expr(e: Expr, k: f64) -> Expr {
    if k == 1.0 {
        return e;
    }
    match e.term() {
        Term::Const(c) => Expr::constant(c * k),
        Term::Scale(inner_k, inner) => Expr::from_term(Term::Scale(inner_k * k, inner.clone())),
        _ => Expr::from_term(Term::Scale(k, e)),
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $build:ident) => {
        impl $trait<Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                $build(self, rhs)
            }
        }

        impl $trait<&Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                $build(self, rhs.clone())
            }
        }

        impl $trait<Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                $build(self.clone(), rhs)
            }
        }

        impl $trait<&Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                $build(self.clone(), rhs.clone())
            }
        }

        impl $trait<f64> for Expr {
            type Output = Expr;
            fn $method(self, rhs: f64) -> Expr {
                $build(self, Expr::constant(rhs))
            }
        }

        impl $trait<f64> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: f64) -> Expr {
                $build(self.clone(), Expr::constant(rhs))
            }
        }

        impl $trait<Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                $build(Expr::constant(self), rhs)
            }
        }

        impl $trait<&Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                $build(Expr::constant(self), rhs.clone())
            }
        }
    };
}

impl_binary_op!(Add, add, add_exprs);
impl_binary_op!(Sub, sub, sub_exprs);

impl Mul<f64> for Expr {
    type Output = Expr;
    fn mul(self, rhs: f64) -> Expr {
        scale_expr(self, rhs)
    }
}

impl Mul<f64> for &Expr {
    type Output = Expr;
    fn mul(self, rhs: f64) -> Expr {
        scale_expr(self.clone(), rhs)
    }
}

impl Mul<Expr> for f64 {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        scale_expr(rhs, self)
    }
}

impl Mul<&Expr> for f64 {
    type Output = Expr;
    fn mul(self, rhs: &Expr) -> Expr {
        scale_expr(rhs.clone(), self)
    }
}

impl Div<f64> for Expr {
    type Output = Expr;
    fn div(self, rhs: f64) -> Expr {
        scale_expr(self, 1.0 / rhs)
    }
}

impl Div<f64> for &Expr {
    type Output = Expr;
    fn div(self, rhs: f64) -> Expr {
        scale_expr(self.clone(), 1.0 / rhs)
    }
}

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        scale_expr(self, -1.0)
    }
}

impl Neg for &Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        scale_expr(self.clone(), -1.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_variables_are_unique() {
        let a = Variable::named("x");
        let b = Variable::named("x");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_arithmetic_stays_symbolic() {
        let x = Expr::named("x");
        let sum = &x + 1.0;
        assert!(matches!(sum.term(), Term::Add(_, _)));
        assert_eq!(sum.as_constant(), None);
        assert_eq!(sum.to_string(), "(x + 1)");
    }

    #[test]
    fn test_constant_folding() {
        assert_eq!(Expr::from(2.0) + 1.0, Expr::from(3.0));
        assert_eq!(Expr::from(3) - Expr::from(2), Expr::from(1));
        assert_eq!(Expr::from(4.0) * 0.5, Expr::from(2.0));
    }

    #[test]
    fn test_adding_zero_is_identity() {
        let x = Expr::named("x");
        assert_eq!(&x + 0.0, x);
        assert_eq!(0.0 + &x, x);
        assert_eq!(&x - 0.0, x);
        assert_eq!((&x + 0.0).to_string(), "x");
        // Not an identity: 0 - x is a negation.
        assert!(matches!((0.0 - &x).term(), Term::Sub(_, _)));
    }

    #[test]
    fn test_structural_equality_and_hash() {
        let x = Expr::named("x");
        let a = &x + 2.0;
        let b = &x + 2.0;
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));

        let other = Expr::named("x") + 2.0;
        assert!(!set.contains(&other));
    }

    #[test]
    fn test_min_max_shapes() {
        let x = Expr::named("x");
        let y = Expr::named("y");

        assert_eq!(Expr::min(Vec::new()), None);
        assert_eq!(Expr::min([x.clone()]), Some(x.clone()));
        // duplicates collapse
        assert_eq!(x.min_with(&x), x);

        let m = Expr::min([x.clone(), y.clone()]).unwrap();
        assert!(matches!(m.term(), Term::Min(args) if args.len() == 2));

        let z = Expr::named("z");
        let nested = m.min_with(&z);
        assert!(matches!(nested.term(), Term::Min(args) if args.len() == 3));

        assert_eq!(Expr::max([Expr::from(1.0), Expr::from(4.0)]), Some(Expr::from(4.0)));
    }

    #[test]
    fn test_evaluate() {
        let x = Variable::named("x");
        let y = Variable::named("y");
        let solution: Solution = [(x.clone(), 2.0), (y.clone(), 5.0)].into_iter().collect();

        let x = Expr::from(x);
        let y = Expr::from(y);
        let expr = (&x + &y) * 2.0 - 1.0;
        assert_eq!(expr.evaluate(&solution).unwrap(), 13.0);
        assert_eq!(x.min_with(&y).evaluate(&solution).unwrap(), 2.0);
        assert_eq!(x.max_with(&y).evaluate(&solution).unwrap(), 5.0);
        assert_eq!((-&x).evaluate(&solution).unwrap(), -2.0);
        assert_eq!((&y / 2.0).evaluate(&solution).unwrap(), 2.5);
    }

    #[test]
    fn test_evaluate_unresolved_variable() {
        let expr = Expr::named("orphan") + 1.0;
        let err = expr.evaluate(&Solution::default()).unwrap_err();
        assert!(err.to_string().contains("orphan"));
    }

    #[test]
    fn test_variables_collected_through_tree() {
        let x = Expr::named("x");
        let y = Expr::named("y");
        let expr = x.max_with(&(&y * 3.0)) - &x;
        assert_eq!(expr.variables().len(), 2);
    }
}
