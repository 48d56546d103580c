//! # Checking models and solutions
use std::collections::HashSet;

use crate::data::linear_program::ip::IntegerProgram;

/// Whether `value` lies within `[lower, upper]` up to a relative error of `eps`.
fn within(lower: f64, value: f64, upper: f64, eps: f64) -> bool {
    let relative_error = |bound: f64| (value - bound).abs() / (1.0 + bound.abs());

    if value < lower {
        relative_error(lower) <= eps
    } else if value > upper {
        relative_error(upper) <= eps
    } else {
        true
    }
}

impl IntegerProgram {
    /// Number of variables, helpers included.
    pub fn number_of_variables(&self) -> usize {
        self.variables.len()
    }

    /// Number of rows.
    pub fn number_of_constraints(&self) -> usize {
        self.rows.len()
    }

    /// Number of nonzero coefficients over all rows.
    pub fn matrix_size(&self) -> usize {
        self.rows.iter().map(|row| row.entries.len()).sum()
    }

    /// Whether the model is consistent.
    ///
    /// All bounds need to be ordered and every row may refer to an existing variable only once.
    pub fn check_invariants(&self) -> bool {
        let bounds_ordered = self.variables.iter().all(|variable| variable.lower <= variable.upper)
            && self.rows.iter().all(|row| row.lower <= row.upper);

        let entries_valid = self.rows.iter().all(|row| {
            let mut seen = HashSet::with_capacity(row.entries.len());
            row.entries.iter().all(|&(index, _)| index < self.variables.len() && seen.insert(index))
        });

        bounds_ordered
            && entries_valid
            && self.primal.len() == self.variables.len()
            && self.dual.len() == self.rows.len()
    }

    /// Whether the current solution satisfies all bounds and rows.
    ///
    /// A variable without a value makes the solution infeasible.
    pub fn is_feasible(&self, eps: f64) -> bool {
        let bounds = self.variables.iter()
            .zip(&self.primal)
            .all(|(variable, &value)| !value.is_nan() && within(variable.lower, value, variable.upper, eps));
        if !bounds {
            return false;
        }

        self.rows.iter().all(|row| {
            let activity = row.entries.iter()
                .map(|&(index, coefficient)| coefficient * self.primal[index])
                .sum::<f64>();
            within(row.lower, activity, row.upper, eps)
        })
    }

    /// Whether the current solution is feasible and all integer variables have integral values.
    pub fn is_feasible_and_integral(&self, feasible_eps: f64, integral_eps: f64) -> bool {
        self.is_feasible(feasible_eps)
            && self.variables.iter()
                .zip(&self.primal)
                .filter(|(variable, _)| variable.variable_type.is_integral())
                .all(|(_, value)| (value - value.round()).abs() <= integral_eps)
    }

    /// Whether the current dual solution is feasible for the current primal solution.
    ///
    /// Rows that are only bounded from below need a nonnegative dual, rows only bounded from above
    /// a nonpositive one. Variables strictly between their bounds need a reduced cost of zero;
    /// variables at a bound are not checked as there are no duals for the bounds.
    pub fn is_dual_feasible(&self, eps: f64) -> bool {
        let mut transposed = vec![0.0; self.variables.len()];
        for (row, &dual) in self.rows.iter().zip(&self.dual) {
            for &(index, coefficient) in &row.entries {
                transposed[index] += coefficient * dual;
            }
            if row.upper == f64::INFINITY && !within(0.0, dual, f64::INFINITY, eps) {
                return false;
            }
            if row.lower == f64::NEG_INFINITY && !within(f64::NEG_INFINITY, dual, 0.0, eps) {
                return false;
            }
        }

        self.variables.iter()
            .zip(&self.primal)
            .zip(transposed)
            .filter(|&((variable, &value), _)| variable.lower + eps < value && value < variable.upper - eps)
            .all(|((variable, _), reduced)| within(variable.cost, reduced, variable.cost, eps))
    }
}
