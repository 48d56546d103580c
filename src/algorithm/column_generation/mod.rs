//! # Column generation
//!
//! The master problem side of column generation. A driver alternates between
//!
//! * fixing parts of the solution once the objective stabilizes,
//! * generating new columns using the dual solution (the pricing problem, often a shortest path
//! in a `SortedDag`),
//! * picking the active columns and solving the restricted master problem with an external
//! linear program solver.
//!
//! `MasterProblem` holds what all problems share, `SetPartitioningProblem` adds the fixing and
//! rounding logic for problems where every member is covered by exactly one column.
pub mod column;
pub mod config;
pub mod master;
pub mod pool;
pub mod set_partitioning;

use crate::algorithm::column_generation::master::MasterProblem;
use crate::error::ColumnGenerationError;

/// What the driver knows when it asks a problem to fix columns.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FixInformation {
    /// Iteration count, starting at 1.
    pub iteration: usize,
    /// Change of the objective value in the last iteration, NaN if unknown.
    pub objective_change: f64,
}

/// Result of a fixing attempt.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FixOutcome {
    /// This many columns were fixed, possibly none.
    Fixed(usize),
    /// Nothing is left to fix; the current fractional solution should be rounded and the run
    /// stopped.
    Exhausted,
}

impl FixOutcome {
    /// Number of fixed columns, or `-1` when exhausted.
    pub fn as_signal(self) -> i64 {
        match self {
            FixOutcome::Fixed(count) => count as i64,
            FixOutcome::Exhausted => -1,
        }
    }
}

/// A problem that a column generation driver can work on.
pub trait ColumnGenerationProblem {
    /// Shared master problem state.
    fn master(&self) -> &MasterProblem;

    /// Shared master problem state, mutable.
    fn master_mut(&mut self) -> &mut MasterProblem;

    /// Add new columns to the pool, typically those with a negative reduced cost.
    ///
    /// # Arguments
    ///
    /// * `duals`: Dual value of every row of the master problem.
    fn generate(&mut self, duals: &[f64]) -> Result<(), ColumnGenerationError>;

    /// Fix some columns to steer towards an integral solution.
    fn fix(&mut self, information: &FixInformation) -> Result<FixOutcome, ColumnGenerationError>;

    /// Value of a rounded version of the current solution, excluding the objective constant.
    ///
    /// NaN when the problem doesn't know how to round.
    fn integral_solution_value(&mut self) -> Result<f64, ColumnGenerationError> {
        Ok(f64::NAN)
    }
}

#[cfg(test)]
mod test {
    use crate::algorithm::column_generation::FixOutcome;

    #[test]
    fn signal() {
        assert_eq!(FixOutcome::Fixed(3).as_signal(), 3);
        assert_eq!(FixOutcome::Fixed(0).as_signal(), 0);
        assert_eq!(FixOutcome::Exhausted.as_signal(), -1);
    }
}
