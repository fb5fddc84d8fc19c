//! Outcome of a solver run

use crate::grid::Grid;
use std::time::Duration;

/// Final state and accounting for one simulation run
///
/// A run that was cut short (broken barrier, lost worker) still returns the
/// grid as of the last fully completed iteration; the gap between
/// `iterations_completed` and `iterations_requested` is the discrepancy
/// report, never silently hidden.
#[derive(Debug, Clone)]
pub struct SolveReport {
    /// Temperature grid after the last completed iteration
    pub grid: Grid,
    /// Iterations that fully completed (swap + invariants re-applied)
    pub iterations_completed: usize,
    /// Iterations originally requested
    pub iterations_requested: usize,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl SolveReport {
    /// Whether every requested iteration completed
    pub fn is_complete(&self) -> bool {
        self.iterations_completed == self.iterations_requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completeness() {
        let report = SolveReport {
            grid: Grid::filled(3, 3, 0.0),
            iterations_completed: 10,
            iterations_requested: 10,
            elapsed: Duration::from_millis(1),
        };
        assert!(report.is_complete());

        let partial = SolveReport {
            iterations_completed: 7,
            ..report
        };
        assert!(!partial.is_complete());
    }
}
