//! Constraint-based layout
//!
//! A [`Group`] collects shapes and the constraints between them. Solving the
//! group resolves every symbolic attribute at once and yields a [`Solution`]
//! that shapes are evaluated against when rendering.

pub mod config;
pub mod error;
pub mod group;
pub mod solver;

pub use config::SolverConfig;
pub use error::LayoutError;
pub use group::Group;
pub use solver::{ConstraintSolver, Solution, SolverError};
