//! # Modelling shortcuts
//!
//! Groups of variables and common constraint patterns.
use crate::data::grid::{Grid, Grid3};
use crate::data::linear_program::elements::VariableType;
use crate::data::linear_program::ip::IntegerProgram;
use crate::data::linear_program::sum::{Sum, Variable};
use crate::error::ModelError;

impl IntegerProgram {
    /// Add `n` variables of the same type and cost.
    pub fn add_vector(&mut self, n: usize, variable_type: VariableType, cost: f64) -> Vec<Variable> {
        (0..n).map(|_| self.add_variable(variable_type, cost)).collect()
    }

    /// Add an `m × n` table of variables.
    pub fn add_grid(&mut self, m: usize, n: usize, variable_type: VariableType, cost: f64) -> Grid<Variable> {
        Grid::from_fn(m, n, |_, _| self.add_variable(variable_type, cost))
    }

    /// Add an `m × n × o` table of variables.
    pub fn add_cube(
        &mut self,
        m: usize,
        n: usize,
        o: usize,
        variable_type: VariableType,
        cost: f64,
    ) -> Grid3<Variable> {
        Grid3::from_fn([m, n, o], |_, _, _| self.add_variable(variable_type, cost))
    }

    /// An integer quantity that can take exactly the given values.
    ///
    /// One boolean is added per value, exactly one of which is one.
    ///
    /// # Return value
    ///
    /// The sum of the values weighted by their booleans.
    pub fn add_variable_as_booleans(&mut self, values: &[i32]) -> Result<Sum, ModelError> {
        let mut value = Sum::default();
        let mut choices = Sum::default();
        for &option in values {
            let choice = self.add_boolean(0.0);
            value += choice * f64::from(option);
            choices += choice;
        }
        self.add(choices.equal_to(1))?;

        Ok(value)
    }

    /// An integer quantity that can take every value in `lower..=upper`.
    pub fn add_variable_as_boolean_range(&mut self, lower: i32, upper: i32) -> Result<Sum, ModelError> {
        self.add_variable_as_booleans(&(lower..=upper).collect::<Vec<_>>())
    }

    /// Forbid more than `n` consecutive sums to be one.
    ///
    /// Every window of `n + 1` consecutive sums gets total at most `n`.
    pub fn add_max_consecutive_constraints(&mut self, n: usize, sums: &[Sum]) -> Result<(), ModelError> {
        for window in sums.windows(n + 1) {
            let total = window.iter().cloned().sum::<Sum>();
            self.add(total.at_most(n as f64))?;
        }

        Ok(())
    }

    /// Forbid runs of ones shorter than `n`.
    ///
    /// For every run length below `n`, a window with zeros on both sides is excluded:
    /// `before - Σ window + after >= 1 - window length`.
    ///
    /// # Arguments
    ///
    /// * `n`: Minimum run length.
    /// * `sums`: 0/1 expressions, in order.
    /// * `ok_at_border`: Whether shorter runs are allowed when they touch the start or the end.
    ///
    /// # Errors
    ///
    /// If `n` is larger than the number of sums.
    pub fn add_min_consecutive_constraints(
        &mut self,
        n: usize,
        sums: &[Sum],
        ok_at_border: bool,
    ) -> Result<(), ModelError> {
        if n <= 1 {
            return Ok(());
        }
        if n > sums.len() {
            return Err(ModelError::InvalidWindow { window: n, len: sums.len() });
        }
        if n == sums.len() {
            for sum in sums {
                self.add(sum.clone().equal_to(1))?;
            }
            return Ok(());
        }

        for window_size in 1..n {
            for start in 0..=sums.len() - window_size {
                let end = start + window_size;
                let before = start.checked_sub(1).map(|i| &sums[i]);
                let after = sums.get(end);
                if ok_at_border && (before.is_none() || after.is_none()) {
                    continue;
                }

                let mut constraint = Sum::default();
                if let Some(before) = before {
                    constraint += before.clone();
                }
                for sum in &sums[start..end] {
                    constraint -= sum.clone();
                }
                if let Some(after) = after {
                    constraint += after.clone();
                }
                self.add(constraint.at_least(1.0 - window_size as f64))?;
            }
        }

        Ok(())
    }
}
