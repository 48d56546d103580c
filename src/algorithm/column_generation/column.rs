//! # Columns
//!
//! A column is a variable of the master problem together with its coefficients in the rows. Only
//! the cost, the bounds and the coefficients are persistent; the fix state and the solution value
//! belong to a single run and are not serialized.
use serde::{Deserialize, Serialize};

use crate::error::ColumnGenerationError;

/// Coefficient of a column in one row of the master problem.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowEntry {
    /// Row index in the master problem.
    pub row: usize,
    /// Coefficient in that row.
    pub coefficient: f64,
}

fn is_true() -> bool {
    true
}

/// A column of the master problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Value in the most recent solution of the master problem.
    #[serde(skip)]
    pub solution_value: f64,
    rows: Vec<RowEntry>,
    cost: f64,
    lower: f64,
    upper: f64,
    #[serde(skip)]
    fixed: Option<u32>,
    #[serde(skip, default = "is_true")]
    is_integer: bool,
}

impl Column {
    /// Create a column without coefficients.
    ///
    /// Columns are integral by default.
    pub fn new(cost: f64, lower: f64, upper: f64) -> Self {
        Self {
            solution_value: 0.0,
            rows: Vec::new(),
            cost,
            lower,
            upper,
            fixed: None,
            is_integer: true,
        }
    }

    /// Lower bound, or the fixed value while fixed.
    pub fn lower_bound(&self) -> f64 {
        self.fixed.map_or(self.lower, f64::from)
    }

    /// Upper bound, or the fixed value while fixed.
    pub fn upper_bound(&self) -> f64 {
        self.fixed.map_or(self.upper, f64::from)
    }

    /// Objective coefficient.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Append a coefficient.
    pub fn add_coefficient(&mut self, row: usize, coefficient: f64) {
        self.rows.push(RowEntry { row, coefficient });
    }

    /// Coefficients, in the order they were added.
    pub fn rows(&self) -> &[RowEntry] {
        &self.rows
    }

    /// Whether the column has a nonzero coefficient in `row`.
    pub fn has_row(&self, row: usize) -> bool {
        self.rows.iter().any(|entry| entry.row == row)
    }

    /// Whether this column needs an integral value in the final solution.
    ///
    /// # Errors
    ///
    /// A fixed column can't be made continuous.
    pub fn set_integer(&mut self, is_integer: bool) -> Result<(), ColumnGenerationError> {
        if self.is_fixed() && !is_integer {
            return Err(ColumnGenerationError::FixedContinuous);
        }

        self.is_integer = is_integer;
        Ok(())
    }

    /// Whether the column needs an integral value.
    pub fn is_integer(&self) -> bool {
        self.is_integer
    }

    /// Fix both bounds to a nonnegative integer until `unfix` is called.
    ///
    /// The solution value is set to the fixed value.
    ///
    /// # Errors
    ///
    /// If the value is negative or the column is continuous.
    pub fn fix(&mut self, value: i64) -> Result<(), ColumnGenerationError> {
        let fixed = u32::try_from(value).map_err(|_| ColumnGenerationError::NegativeFix(value))?;
        if !self.is_integer {
            return Err(ColumnGenerationError::NonIntegralColumn);
        }

        self.solution_value = f64::from(fixed);
        self.fixed = Some(fixed);
        Ok(())
    }

    /// Restore the original bounds.
    pub fn unfix(&mut self) {
        self.fixed = None;
    }

    /// Whether the bounds are overridden by `fix`.
    pub fn is_fixed(&self) -> bool {
        self.fixed.is_some()
    }

    /// Cost minus the dual value of every row, weighted by the coefficient.
    ///
    /// # Arguments
    ///
    /// * `duals`: One value per row of the master problem; every row of the column needs to be
    /// in range.
    pub fn reduced_cost(&self, duals: &[f64]) -> f64 {
        self.rows.iter().fold(self.cost, |total, entry| total - entry.coefficient * duals[entry.row])
    }
}

fn close(left: f64, right: f64) -> bool {
    left == right || (left - right).abs() < 1e-9
}

/// Columns are equal when their coefficients are exactly equal and their cost and bounds are
/// within `1e-9`. The fix state and solution value are ignored.
impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        close(self.cost, other.cost)
            && close(self.lower, other.lower)
            && close(self.upper, other.upper)
            && self.rows == other.rows
    }
}
