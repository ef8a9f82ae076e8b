//! Error types for groups and solving

use thiserror::Error;

use crate::geometry::ShapeKind;

use super::solver::SolverError;

/// Errors that can occur while validating or solving a group
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A shape that needs styling has an empty style map
    #[error("{kind} #{index} has no style entries")]
    MissingStyle { index: usize, kind: ShapeKind },

    /// Constraint solver error
    #[error("constraint solver error: {0}")]
    Solver(#[from] SolverError),
}

impl LayoutError {
    /// Create a missing style error
    pub fn missing_style(index: usize, kind: ShapeKind) -> Self {
        Self::MissingStyle { index, kind }
    }

    /// Whether the group's constraints have no solution
    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self, Self::Solver(SolverError::Unsatisfiable { .. }))
    }
}
