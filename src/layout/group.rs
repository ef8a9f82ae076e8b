//! Groups of shapes and the constraints between them

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::geometry::{Bounds, HasBounds, Shape};
use crate::symbolic::{Constraint, ConstraintOrigin, Expr, Strength, Variable};

use super::config::SolverConfig;
use super::error::LayoutError;
use super::solver::{ConstraintSolver, Solution, SolverError};

/// An ordered collection of shapes plus explicit constraints
///
/// Shapes are painted in insertion order. Every symbolic attribute reachable
/// from the shapes or the constraints is resolved by [`Group::solve`].
#[derive(Debug, Clone, Default)]
pub struct Group {
    shapes: Vec<Shape>,
    constraints: Vec<Constraint>,
    config: SolverConfig,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shape(mut self, shape: impl Into<Shape>) -> Self {
        self.add(shape);
        self
    }

    pub fn add(&mut self, shape: impl Into<Shape>) {
        self.shapes.push(shape.into());
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constrain(constraint);
        self
    }

    pub fn constrain(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn constrain_all(&mut self, constraints: impl IntoIterator<Item = Constraint>) {
        self.constraints.extend(constraints);
    }

    /// Prefer `expr == value` without requiring it
    pub fn suggest(&mut self, expr: impl Into<Expr>, value: f64) {
        let expr = expr.into();
        self.constrain(expr.eq_to(value).with_strength(Strength::Strong));
    }

    pub fn with_solver_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn solver_config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Explicit constraints, in insertion order
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Union of the member shapes' bounds; `None` for an empty group
    pub fn bounds(&self) -> Option<Bounds> {
        let all: Vec<Bounds> = self.shapes.iter().map(HasBounds::bounds).collect();
        Bounds::union(&all)
    }

    /// Check that every shape that needs styling has some
    pub fn validate(&self) -> Result<(), LayoutError> {
        for (index, shape) in self.shapes.iter().enumerate() {
            if shape.requires_style() && shape.style().is_empty() {
                return Err(LayoutError::missing_style(index, shape.kind()));
            }
        }
        Ok(())
    }

    /// Intrinsic constraints of every shape followed by the explicit ones
    pub fn all_constraints(&self) -> Vec<Constraint> {
        let mut all = Vec::new();
        for (index, shape) in self.shapes.iter().enumerate() {
            let origin = ConstraintOrigin::Intrinsic {
                shape: format!("{} #{}", shape.kind(), index),
            };
            all.extend(
                shape
                    .intrinsic_constraints()
                    .into_iter()
                    .map(|c| c.with_origin(origin.clone())),
            );
        }
        all.extend(self.constraints.iter().cloned());
        all
    }

    /// Every variable reachable from the shapes or the explicit constraints
    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut vars = BTreeSet::new();
        for shape in &self.shapes {
            vars.extend(shape.variables());
        }
        for constraint in &self.constraints {
            vars.extend(constraint.variables());
        }
        vars
    }

    /// Resolve every variable of the group simultaneously
    ///
    /// Each call builds a fresh solver, so solving twice without changes yields
    /// the same assignment. The result satisfies every required constraint or
    /// the call fails; no partial assignment is returned.
    pub fn solve(&self) -> Result<Solution, LayoutError> {
        self.validate()?;

        let variables = self.variables();
        let constraints = self.all_constraints();
        debug!(
            shapes = self.shapes.len(),
            variables = variables.len(),
            constraints = constraints.len(),
            "solving group"
        );

        // Strict relations whose gap vanished in floating point are retried
        // with a margin scaled to the size of their operands.
        let mut margin_scales: Vec<Option<f64>> = vec![None; constraints.len()];
        loop {
            let (solution, exhausted) = self.attempt(&variables, &constraints, &margin_scales)?;
            let Some(index) = self.first_violation(&constraints, &solution)? else {
                debug!(variables = solution.len(), "group solved");
                return Ok(solution);
            };

            let constraint = &constraints[index];
            if constraint.relation.is_strict() && margin_scales[index].is_none() {
                let scale = constraint.magnitude(&solution)?;
                if scale > 1.0 {
                    debug!(constraint = %constraint, scale, "widening strict margin");
                    margin_scales[index] = Some(scale);
                    continue;
                }
            }

            let reason = if exhausted {
                "violated under every choice of min/max operand"
            } else {
                "solver produced an assignment violating this constraint"
            };
            return Err(SolverError::Unsatisfiable {
                constraint: constraint.to_string(),
                origin: constraint.origin.clone(),
                conflicting: Vec::new(),
                reason: reason.to_string(),
            }
            .into());
        }
    }

    /// One pass through a fresh solver
    ///
    /// When the linear relaxation of min/max breaks a required constraint,
    /// the stand-ins are pinned to operands. The flag reports that no choice
    /// of operands was feasible, in which case the relaxed assignment is
    /// returned for reporting.
    fn attempt(
        &self,
        variables: &BTreeSet<Variable>,
        constraints: &[Constraint],
        margin_scales: &[Option<f64>],
    ) -> Result<(Solution, bool), SolverError> {
        let mut solver = ConstraintSolver::new(self.config.clone());
        for var in variables {
            solver.register(var);
        }
        for (constraint, scale) in constraints.iter().zip(margin_scales) {
            trace!(constraint = %constraint, "adding constraint");
            solver.add_scaled(constraint, scale.unwrap_or(1.0))?;
        }

        let relaxed = solver.solve();
        let exact = self.first_violation(constraints, &relaxed)?.is_none();
        if exact || solver.extremum_count() == 0 {
            return Ok((relaxed, false));
        }

        debug!(
            extrema = solver.extremum_count(),
            "relaxed min/max assignment rejected, searching operands"
        );
        if solver.pin_extrema(&relaxed)? {
            Ok((solver.solve(), false))
        } else {
            Ok((relaxed, true))
        }
    }

    /// Index of the first required constraint the assignment breaks
    fn first_violation(
        &self,
        constraints: &[Constraint],
        solution: &Solution,
    ) -> Result<Option<usize>, SolverError> {
        for (index, constraint) in constraints.iter().enumerate() {
            if !constraint.is_required() {
                continue;
            }
            if !constraint.is_satisfied(solution, self.config.tolerance)? {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }
}
