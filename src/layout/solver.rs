//! Constraint solver integration
//!
//! This module provides a wrapper around the kasuari Cassowary constraint solver,
//! translating symbolic constraints into the solver's format and extracting the
//! assignment of every variable.
//!
//! Cassowary only handles linear arithmetic. `min`/`max` nodes are given an
//! auxiliary variable bounded by every operand and weakly pulled onto each of
//! them. That relaxation lets the auxiliary drift off every operand, so when
//! the relaxed assignment breaks the exact semantics the caller asks
//! [`ConstraintSolver::pin_extrema`] to search for an operand choice per node.

use std::collections::HashMap;

use kasuari::{
    Expression, Solver as KasuariSolver, Strength as KasuariStrength,
    Variable as KasuariVariable, WeightedRelation::*,
};
use thiserror::Error;
use tracing::{debug, trace};

use crate::symbolic::{Constraint, ConstraintOrigin, Expr, Relation, Strength, Term, Variable};

use super::config::SolverConfig;

/// Errors from the constraint solver
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("unsatisfiable constraint `{constraint}` ({origin}): {reason}")]
    Unsatisfiable {
        constraint: String,
        origin: ConstraintOrigin,
        /// Constraints accepted before this one, any of which may be in conflict
        conflicting: Vec<String>,
        reason: String,
    },

    #[error("variable '{name}' has no value in the solution")]
    UnresolvedVariable { name: String },

    #[error("gave up after trying {limit} min/max operand choices")]
    BranchLimit { limit: usize },

    #[error("internal solver error: {0}")]
    Internal(String),
}

#[derive(Clone, Copy)]
enum Extremum {
    Min,
    Max,
}

/// The stand-in for one min/max node
struct ExtremumNode {
    aux: KasuariVariable,
    kind: Extremum,
    operands: Vec<(Expr, Expression)>,
}

impl ExtremumNode {
    /// Operand indices, most extreme under `hint` first
    fn preference(&self, hint: &Solution) -> Vec<usize> {
        let values: Vec<f64> = self
            .operands
            .iter()
            .map(|(arg, _)| hint.evaluate(arg).unwrap_or(f64::NAN))
            .collect();
        let mut order: Vec<usize> = (0..values.len()).collect();
        match self.kind {
            Extremum::Min => order.sort_by(|&a, &b| values[a].total_cmp(&values[b])),
            Extremum::Max => order.sort_by(|&a, &b| values[b].total_cmp(&values[a])),
        }
        order
    }
}

fn kasuari_strength(strength: Strength) -> KasuariStrength {
    match strength {
        Strength::Required => KasuariStrength::REQUIRED,
        Strength::Strong => KasuariStrength::STRONG,
        Strength::Medium => KasuariStrength::MEDIUM,
        Strength::Weak => KasuariStrength::WEAK,
    }
}

/// Wrapper around kasuari solver
pub struct ConstraintSolver {
    solver: KasuariSolver,
    /// Maps our variables to kasuari variables
    variables: HashMap<Variable, KasuariVariable>,
    /// Reverse of `variables`
    names: HashMap<KasuariVariable, Variable>,
    /// Latest value of every registered variable
    assignment: HashMap<Variable, f64>,
    /// Min/max stand-ins in creation order
    extrema: Vec<ExtremumNode>,
    extremum_index: HashMap<Expr, usize>,
    /// Descriptions of accepted constraints, for error reporting
    sources: Vec<String>,
    config: SolverConfig,
}

impl ConstraintSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            solver: KasuariSolver::new(),
            variables: HashMap::new(),
            names: HashMap::new(),
            assignment: HashMap::new(),
            extrema: Vec::new(),
            extremum_index: HashMap::new(),
            sources: Vec::new(),
            config,
        }
    }

    /// Get or create the kasuari variable for one of ours
    ///
    /// Registered variables always appear in the solution, even when no
    /// constraint mentions them.
    pub fn register(&mut self, var: &Variable) -> KasuariVariable {
        if let Some(&kvar) = self.variables.get(var) {
            kvar
        } else {
            let kvar = KasuariVariable::new();
            self.variables.insert(var.clone(), kvar);
            self.names.insert(kvar, var.clone());
            self.assignment.insert(var.clone(), 0.0);
            kvar
        }
    }

    /// Number of variables known to the solver
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Number of min/max nodes standing in as auxiliary variables
    pub fn extremum_count(&self) -> usize {
        self.extrema.len()
    }

    /// Translate an expression tree into a kasuari linear expression
    fn expression(&mut self, expr: &Expr) -> Result<Expression, SolverError> {
        let translated = match expr.term() {
            Term::Var(v) => Expression::from(self.register(v)),
            Term::Const(c) => Expression::from_constant(*c),
            Term::Add(a, b) => self.expression(a)? + self.expression(b)?,
            Term::Sub(a, b) => self.expression(a)? - self.expression(b)?,
            Term::Scale(k, e) => self.expression(e)? * *k,
            Term::Min(args) => self.extremum(expr, args, Extremum::Min)?,
            Term::Max(args) => self.extremum(expr, args, Extremum::Max)?,
        };
        Ok(translated)
    }

    fn extremum(
        &mut self,
        node: &Expr,
        args: &[Expr],
        kind: Extremum,
    ) -> Result<Expression, SolverError> {
        if let Some(&index) = self.extremum_index.get(node) {
            return Ok(Expression::from(self.extrema[index].aux));
        }

        let mut operands = Vec::with_capacity(args.len());
        for arg in args {
            operands.push((arg.clone(), self.expression(arg)?));
        }

        let aux = KasuariVariable::new();
        for (arg, arg_expr) in &operands {
            let bound = match kind {
                Extremum::Min => {
                    Expression::from(aux) | LE(KasuariStrength::REQUIRED) | arg_expr.clone()
                }
                Extremum::Max => {
                    Expression::from(aux) | GE(KasuariStrength::REQUIRED) | arg_expr.clone()
                }
            };
            let desc = format!("{} bound by {}", node, arg);
            self.solver
                .add_constraint(bound)
                .map_err(|e| self.convert_kasuari_error(e, &desc, &ConstraintOrigin::UserDefined))?;
            let pull = Expression::from(aux) | EQ(KasuariStrength::WEAK) | arg_expr.clone();
            self.solver
                .add_constraint(pull)
                .map_err(|e| self.convert_kasuari_error(e, &desc, &ConstraintOrigin::UserDefined))?;
        }

        self.extremum_index.insert(node.clone(), self.extrema.len());
        self.extrema.push(ExtremumNode {
            aux,
            kind,
            operands,
        });
        Ok(Expression::from(aux))
    }

    /// Convert a kasuari error to a SolverError with context
    fn convert_kasuari_error(
        &self,
        e: kasuari::AddConstraintError,
        constraint_desc: &str,
        origin: &ConstraintOrigin,
    ) -> SolverError {
        match e {
            kasuari::AddConstraintError::UnsatisfiableConstraint => SolverError::Unsatisfiable {
                constraint: constraint_desc.to_string(),
                origin: origin.clone(),
                conflicting: self.sources.clone(),
                reason: "conflicts with existing constraints".to_string(),
            },
            kasuari::AddConstraintError::DuplicateConstraint => {
                SolverError::Internal(format!("duplicate constraint: {}", constraint_desc))
            }
            kasuari::AddConstraintError::InternalSolverError(msg) => {
                SolverError::Internal(format!("{} while adding {}", msg, constraint_desc))
            }
        }
    }

    /// Add a constraint to the solver
    ///
    /// Constraints without variables are decided on the spot.
    pub fn add_constraint(&mut self, constraint: &Constraint) -> Result<(), SolverError> {
        self.add_scaled(constraint, 1.0)
    }

    /// Add a constraint, widening the strict-relation gap by `margin_scale`
    pub fn add_scaled(
        &mut self,
        constraint: &Constraint,
        margin_scale: f64,
    ) -> Result<(), SolverError> {
        let desc = constraint.to_string();

        if constraint.variables().is_empty() {
            let holds = constraint.is_satisfied(&Solution::default(), self.config.tolerance)?;
            if !holds && constraint.is_required() {
                return Err(SolverError::Unsatisfiable {
                    constraint: desc,
                    origin: constraint.origin.clone(),
                    conflicting: Vec::new(),
                    reason: "constant constraint is false".to_string(),
                });
            }
            return Ok(());
        }

        let lhs = self.expression(&constraint.lhs)?;
        let rhs = self.expression(&constraint.rhs)?;
        let strength = kasuari_strength(constraint.strength);
        let margin = self.config.strict_margin * margin_scale;

        let translated = match constraint.relation {
            Relation::Eq => lhs | EQ(strength) | rhs,
            Relation::Le => lhs | LE(strength) | rhs,
            Relation::Ge => lhs | GE(strength) | rhs,
            Relation::Lt => lhs | LE(strength) | rhs - margin,
            Relation::Gt => lhs | GE(strength) | rhs + margin,
        };

        self.solver
            .add_constraint(translated)
            .map_err(|e| self.convert_kasuari_error(e, &desc, &constraint.origin))?;
        self.sources.push(desc);
        Ok(())
    }

    /// Require every min/max stand-in to equal one of its operands
    ///
    /// Operand choices are searched depth first, node by node, trying the
    /// operand that is extreme under `hint` first. Branches the solver rejects
    /// are pruned as soon as their choice is added. Returns `false`, with no
    /// choice left in place, when every combination is infeasible.
    pub fn pin_extrema(&mut self, hint: &Solution) -> Result<bool, SolverError> {
        let orders: Vec<Vec<usize>> = self
            .extrema
            .iter()
            .map(|node| node.preference(hint))
            .collect();
        let mut budget = self.config.max_branches;
        let found = self.pin_from(0, &orders, &mut budget)?;
        debug!(
            found,
            nodes = orders.len(),
            branches = self.config.max_branches - budget,
            "searched min/max operands"
        );
        Ok(found)
    }

    fn pin_from(
        &mut self,
        depth: usize,
        orders: &[Vec<usize>],
        budget: &mut usize,
    ) -> Result<bool, SolverError> {
        let Some(order) = orders.get(depth) else {
            return Ok(true);
        };

        for &choice in order {
            if *budget == 0 {
                return Err(SolverError::BranchLimit {
                    limit: self.config.max_branches,
                });
            }
            *budget -= 1;

            let (pin, desc) = {
                let node = &self.extrema[depth];
                let (arg, arg_expr) = &node.operands[choice];
                let pin = Expression::from(node.aux)
                    | EQ(KasuariStrength::REQUIRED)
                    | arg_expr.clone();
                (pin, format!("min/max operand {}", arg))
            };
            match self.solver.add_constraint(pin.clone()) {
                Ok(()) => {
                    trace!(depth, operand = %desc, "pinned");
                    if self.pin_from(depth + 1, orders, budget)? {
                        return Ok(true);
                    }
                    self.solver.remove_constraint(&pin).map_err(|e| {
                        SolverError::Internal(format!("{:?} while releasing {}", e, desc))
                    })?;
                }
                Err(kasuari::AddConstraintError::UnsatisfiableConstraint) => {}
                Err(e) => {
                    let origin = ConstraintOrigin::UserDefined;
                    return Err(self.convert_kasuari_error(e, &desc, &origin));
                }
            }
        }
        Ok(false)
    }
}

impl Default for ConstraintSolver {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

/// A concrete value for every variable of a solved system
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Solution {
    values: HashMap<Variable, f64>,
}

impl Solution {
    /// Get value for a variable
    pub fn value(&self, var: &Variable) -> Option<f64> {
        self.values.get(var).copied()
    }

    /// Evaluate an expression against this assignment
    pub fn evaluate(&self, expr: &Expr) -> Result<f64, SolverError> {
        expr.evaluate(self)
    }

    pub fn insert(&mut self, var: Variable, value: f64) {
        self.values.insert(var, value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, f64)> {
        self.values.iter().map(|(var, value)| (var, *value))
    }
}

impl FromIterator<(Variable, f64)> for Solution {
    fn from_iter<I: IntoIterator<Item = (Variable, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl ConstraintSolver {
    /// Read the current assignment of every registered variable
    ///
    /// Variables the solver never moved keep Cassowary's resting value of zero.
    pub fn solve(&mut self) -> Solution {
        for (kvar, value) in self.solver.fetch_changes() {
            if let Some(var) = self.names.get(kvar) {
                self.assignment.insert(var.clone(), *value);
            }
        }

        for (var, value) in &self.assignment {
            trace!(variable = %var, value, "solved");
        }

        Solution {
            values: self.assignment.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solver() -> ConstraintSolver {
        ConstraintSolver::new(SolverConfig::default())
    }

    fn var(name: &str) -> (Variable, Expr) {
        let v = Variable::named(name);
        (v.clone(), Expr::from(v))
    }

    #[test]
    fn test_fixed_constraint() {
        let mut solver = solver();
        let (w, width) = var("box.width");

        solver.add_constraint(&width.eq_to(100.0)).unwrap();
        let solution = solver.solve();

        assert!((solution.value(&w).unwrap() - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_equal_constraint() {
        let mut solver = solver();
        let (a, a_x) = var("a.x");
        let (b, b_x) = var("b.x");

        // a.x = b.x + 20
        solver.add_constraint(&a_x.eq_to(&b_x + 20.0)).unwrap();
        solver.add_constraint(&b_x.eq_to(50.0)).unwrap();
        let solution = solver.solve();

        assert!((solution.value(&a).unwrap() - 70.0).abs() < 0.001);
        assert!((solution.value(&b).unwrap() - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_unmentioned_variable_defaults_to_zero() {
        let mut solver = solver();
        let (lonely, _) = var("lonely");
        solver.register(&lonely);
        let solution = solver.solve();
        assert_eq!(solution.value(&lonely), Some(0.0));
        assert_eq!(solver.variable_count(), 1);
    }

    #[test]
    fn test_inequality_with_soft_preference() {
        let mut solver = solver();
        let (w, width) = var("box.width");

        // width >= 50, but would like to be 30
        solver.add_constraint(&width.ge(50.0)).unwrap();
        solver
            .add_constraint(&width.eq_to(30.0).with_strength(Strength::Strong))
            .unwrap();
        let solution = solver.solve();

        assert!(solution.value(&w).unwrap() >= 50.0 - 0.001);
    }

    #[test]
    fn test_strict_inequality_uses_margin() {
        let mut solver = ConstraintSolver::new(SolverConfig::default().with_strict_margin(1.0));
        let (x, x_expr) = var("x");
        solver.add_constraint(&x_expr.gt(10.0)).unwrap();
        solver
            .add_constraint(&x_expr.eq_to(0.0).with_strength(Strength::Weak))
            .unwrap();
        let solution = solver.solve();
        assert!((solution.value(&x).unwrap() - 11.0).abs() < 0.001);
    }

    #[test]
    fn test_min_settles_on_smallest_operand() {
        let mut solver = solver();
        let (_, a) = var("a");
        let (_, b) = var("b");
        let (m, m_expr) = var("m");

        solver.add_constraint(&a.eq_to(3.0)).unwrap();
        solver.add_constraint(&b.eq_to(7.0)).unwrap();
        solver.add_constraint(&m_expr.eq_to(a.min_with(&b))).unwrap();
        let solution = solver.solve();

        assert!((solution.value(&m).unwrap() - 3.0).abs() < 0.001);
    }

    #[test]
    fn test_max_settles_on_largest_operand() {
        let mut solver = solver();
        let (_, a) = var("a");
        let (_, b) = var("b");
        let (m, m_expr) = var("m");

        solver.add_constraint(&a.eq_to(-4.0)).unwrap();
        solver.add_constraint(&b.eq_to(2.5)).unwrap();
        solver.add_constraint(&m_expr.eq_to(a.max_with(&b))).unwrap();
        let solution = solver.solve();

        assert!((solution.value(&m).unwrap() - 2.5).abs() < 0.001);
    }

    #[test]
    fn test_pin_extrema_moves_free_operand() {
        let mut solver = solver();
        let (_, a) = var("a");
        let (b, b_expr) = var("b");

        solver.add_constraint(&a.eq_to(0.0)).unwrap();
        solver
            .add_constraint(&b_expr.eq_to(0.0).with_strength(Strength::Weak))
            .unwrap();
        solver.add_constraint(&a.max_with(&b_expr).ge(10.0)).unwrap();
        assert_eq!(solver.extremum_count(), 1);

        let relaxed = solver.solve();
        assert!(solver.pin_extrema(&relaxed).unwrap());
        let solution = solver.solve();
        assert!((solution.value(&b).unwrap() - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_pin_extrema_reports_infeasible_choices() {
        let mut solver = solver();
        let (_, a) = var("a");
        let (_, b) = var("b");

        solver.add_constraint(&a.eq_to(3.0)).unwrap();
        solver.add_constraint(&b.eq_to(3.0)).unwrap();
        solver.add_constraint(&a.min_with(&b).le(1.0)).unwrap();

        let relaxed = solver.solve();
        assert!(!solver.pin_extrema(&relaxed).unwrap());
    }

    #[test]
    fn test_repeated_solve_keeps_unchanged_values() {
        let mut solver = solver();
        let (x, x_expr) = var("x");
        let (y, y_expr) = var("y");

        solver.add_constraint(&x_expr.eq_to(4.0)).unwrap();
        let first = solver.solve();
        solver.add_constraint(&y_expr.eq_to(9.0)).unwrap();
        let second = solver.solve();

        assert!((first.value(&x).unwrap() - 4.0).abs() < 0.001);
        assert!((second.value(&x).unwrap() - 4.0).abs() < 0.001);
        assert!((second.value(&y).unwrap() - 9.0).abs() < 0.001);
    }

    #[test]
    fn test_scaled_margin_for_strict_relation() {
        let mut solver = solver();
        let (x, x_expr) = var("x");
        solver.add_scaled(&x_expr.gt(1.0e11), 1.0e11).unwrap();
        let solution = solver.solve();
        assert!(solution.value(&x).unwrap() > 1.0e11);
    }

    #[test]
    fn test_constant_constraints_decided_immediately() {
        let mut solver = solver();
        solver
            .add_constraint(&Constraint::greater_or_equal(10.0, 0.0))
            .unwrap();
        let err = solver
            .add_constraint(&Constraint::less_than(1.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, SolverError::Unsatisfiable { .. }));
    }

    #[test]
    fn test_conflicting_constraints_error() {
        let mut solver = solver();
        let (_, x) = var("box.x");

        solver.add_constraint(&x.eq_to(100.0)).unwrap();
        let result = solver.add_constraint(&x.eq_to(200.0));

        match result.unwrap_err() {
            SolverError::Unsatisfiable {
                reason,
                conflicting,
                constraint,
                ..
            } => {
                assert!(reason.contains("conflicts"));
                assert_eq!(conflicting, vec!["box.x == 100".to_string()]);
                assert_eq!(constraint, "box.x == 200");
            }
            other => panic!("Expected Unsatisfiable error, got: {:?}", other),
        }
    }

    #[test]
    fn test_conflicting_inequality_constraints_error() {
        let mut solver = solver();
        let (_, x) = var("box.x");

        solver.add_constraint(&x.ge(200.0)).unwrap();
        let result = solver.add_constraint(&x.le(100.0));

        assert!(matches!(
            result,
            Err(SolverError::Unsatisfiable { .. })
        ));
    }
}
