//! Configuration for constraint solving

/// Configuration options for [`Group::solve`](super::Group::solve)
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Gap enforced for strict relations: `a < b` is solved as `a <= b - strict_margin`
    pub strict_margin: f64,

    /// Relative tolerance when verifying the solved assignment
    pub tolerance: f64,

    /// Operand choices tried before giving up on a min/max system
    pub max_branches: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            strict_margin: 1e-6,
            tolerance: 1e-6,
            max_branches: 4096,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the margin used for strict inequalities
    pub fn with_strict_margin(mut self, margin: f64) -> Self {
        self.strict_margin = margin;
        self
    }

    /// Set the verification tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the min/max operand search budget
    pub fn with_max_branches(mut self, max_branches: usize) -> Self {
        self.max_branches = max_branches;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SolverConfig::default();
        assert_eq!(config.strict_margin, 1e-6);
        assert_eq!(config.tolerance, 1e-6);
        assert_eq!(config.max_branches, 4096);
    }

    #[test]
    fn test_builder_pattern() {
        let config = SolverConfig::new()
            .with_strict_margin(0.5)
            .with_tolerance(1e-3)
            .with_max_branches(16);

        assert_eq!(config.strict_margin, 0.5);
        assert_eq!(config.tolerance, 1e-3);
        assert_eq!(config.max_branches, 16);
    }
}
