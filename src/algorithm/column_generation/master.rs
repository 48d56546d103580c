//! # Master problem
//!
//! Row bounds, the column pool and the set of active columns of a column generation run. Every
//! iteration, the active columns are turned into a restricted master problem which is solved
//! externally, after which the solution is read back into the columns and the dual solution.
use itertools::Itertools;
use tracing::{debug, trace};

use crate::algorithm::column_generation::pool::ColumnPool;
use crate::data::linear_program::elements::VariableType;
use crate::data::linear_program::ip::IntegerProgram;
use crate::data::linear_program::sum::{DualVariable, Sum, Variable};
use crate::error::ColumnGenerationError;

/// Columns that had a zero value in this many consecutive iterations are dropped from the active
/// set, unless they were among the initial columns.
pub const COLUMN_INACTIVE_LIMIT: usize = 5;

/// Solution values below this are considered zero when tracking inactivity.
const INACTIVE_VALUE: f64 = 1e-6;

/// The linear program over the active columns, to be solved by an external solver.
#[derive(Debug)]
pub struct RestrictedMaster {
    ip: IntegerProgram,
    column_variables: Vec<Variable>,
    row_duals: Vec<DualVariable>,
}

impl RestrictedMaster {
    /// The model, to be read by a solver.
    pub fn ip(&self) -> &IntegerProgram {
        &self.ip
    }

    /// The model, for the solver to write its solution into.
    pub fn ip_mut(&mut self) -> &mut IntegerProgram {
        &mut self.ip
    }

    /// One variable per active column, in the order of the active columns.
    pub fn column_variables(&self) -> &[Variable] {
        &self.column_variables
    }

    /// One dual variable per row of the master problem.
    pub fn row_duals(&self) -> &[DualVariable] {
        &self.row_duals
    }
}

/// State of the master problem that is shared by all kinds of column generation problems.
#[derive(Debug, Clone)]
pub struct MasterProblem {
    pool: ColumnPool,
    row_lower: Vec<f64>,
    row_upper: Vec<f64>,
    initial_column_count: usize,
    active_columns: Vec<usize>,
    inactive_count: Vec<usize>,
    dual_solution: Vec<f64>,
    objective_constant: f64,
}

impl MasterProblem {
    /// A master problem with free rows and no columns.
    pub fn new(number_of_rows: usize) -> Self {
        Self {
            pool: ColumnPool::new(),
            row_lower: vec![f64::NEG_INFINITY; number_of_rows],
            row_upper: vec![f64::INFINITY; number_of_rows],
            initial_column_count: 0,
            active_columns: Vec::new(),
            inactive_count: Vec::new(),
            dual_solution: vec![0.0; number_of_rows],
            objective_constant: 0.0,
        }
    }

    /// Number of rows, fixed at construction.
    pub fn number_of_rows(&self) -> usize {
        self.row_lower.len()
    }

    fn check_row(&self, row: usize) -> Result<(), ColumnGenerationError> {
        if row < self.number_of_rows() {
            Ok(())
        } else {
            Err(ColumnGenerationError::OutOfRange { what: "rows", index: row, len: self.number_of_rows() })
        }
    }

    /// Change the lower bound of a row.
    pub fn set_row_lower_bound(&mut self, row: usize, lower: f64) -> Result<(), ColumnGenerationError> {
        self.check_row(row)?;
        self.row_lower[row] = lower;
        Ok(())
    }

    /// Change the upper bound of a row.
    pub fn set_row_upper_bound(&mut self, row: usize, upper: f64) -> Result<(), ColumnGenerationError> {
        self.check_row(row)?;
        self.row_upper[row] = upper;
        Ok(())
    }

    /// Lower and upper bound of a row.
    pub fn row_bounds(&self, row: usize) -> Option<(f64, f64)> {
        Some((*self.row_lower.get(row)?, *self.row_upper.get(row)?))
    }

    /// All columns generated so far.
    pub fn pool(&self) -> &ColumnPool {
        &self.pool
    }

    /// Columns that are not tied to a member (e.g. slack columns) are added here directly.
    pub fn pool_mut(&mut self) -> &mut ColumnPool {
        &mut self.pool
    }

    /// Indices of the columns in the current restricted master problem, sorted.
    pub fn active_columns(&self) -> &[usize] {
        &self.active_columns
    }

    /// Dual value of every row in the most recent solution.
    pub fn dual_solution(&self) -> &[f64] {
        &self.dual_solution
    }

    /// Constant added to the objective value.
    pub fn objective_constant(&self) -> f64 {
        self.objective_constant
    }

    /// Constant added to the objective of every restricted master problem.
    pub fn set_objective_constant(&mut self, constant: f64) {
        self.objective_constant = constant;
    }

    /// Mark the columns currently in the pool as initial columns.
    ///
    /// Initial columns are always part of the restricted master problem, which keeps it feasible.
    /// When this is not called, the pool contents at the first call of `pick_columns` are used.
    pub fn set_initial_columns(&mut self) {
        self.initial_column_count = self.pool.len();
    }

    /// Number of columns that are always active.
    pub fn initial_column_count(&self) -> usize {
        self.initial_column_count
    }

    /// Choose the columns of the next restricted master problem.
    ///
    /// Without active columns, the initial columns are used. In the first iteration of a later
    /// run, the active columns are kept as they are. Otherwise, columns are kept if they are
    /// initial, or if they were nonzero recently and are not fixed to zero; the priced columns
    /// with the most negative reduced cost are added, at most as many as there were active
    /// columns.
    pub fn pick_columns(&mut self, iteration: usize) {
        if self.active_columns.is_empty() {
            if self.initial_column_count == 0 {
                self.initial_column_count = self.pool.len();
            }
            self.inactive_count.clear();
            self.active_columns = (0..self.initial_column_count).collect();
            return;
        }
        if iteration == 1 {
            self.inactive_count.clear();
            return;
        }

        self.inactive_count.resize(self.pool.len(), 0);
        let mut kept = Vec::with_capacity(self.active_columns.len());
        for &i in &self.active_columns {
            let column = &self.pool[i];
            debug_assert!(column.solution_value >= -1e-5);

            if column.solution_value < INACTIVE_VALUE {
                self.inactive_count[i] += 1;
            } else {
                self.inactive_count[i] = 0;
            }

            let initial = i < self.initial_column_count;
            let recently_active = self.inactive_count[i] < COLUMN_INACTIVE_LIMIT;
            let fixed_to_zero = column.is_fixed() && column.upper_bound() == 0.0;
            if initial || (recently_active && !fixed_to_zero) {
                kept.push(i);
            }
        }

        let priced = self.pool.sorted_by_reduced_cost(&self.dual_solution, self.active_columns.len());
        trace!(kept = kept.len(), priced = priced.len(), "picking columns");
        self.active_columns = kept.into_iter()
            .chain(priced.into_iter().map(|score| score.index))
            .sorted()
            .dedup()
            .collect();
    }

    /// Build the linear program over the active columns.
    ///
    /// Every row gets an extra variable fixed at zero, so that no row is stored as a variable
    /// bound and every row has a dual variable. The current column values and duals are set as
    /// the solution of the model, to be used as a starting point.
    ///
    /// # Arguments
    ///
    /// * `use_integer_variables`: Whether integral columns become integer variables.
    ///
    /// # Errors
    ///
    /// If a column has a negative lower bound or refers to a row that does not exist, or if a row
    /// is not used by any active column.
    pub fn create_ip(&self, use_integer_variables: bool) -> Result<RestrictedMaster, ColumnGenerationError> {
        let mut ip = IntegerProgram::new();
        let mut row_sums = vec![Sum::default(); self.number_of_rows()];
        let mut row_used = vec![false; self.number_of_rows()];

        let mut column_variables = Vec::with_capacity(self.active_columns.len());
        for &i in &self.active_columns {
            let column = self.pool.get(i)
                .ok_or(ColumnGenerationError::OutOfRange { what: "columns", index: i, len: self.pool.len() })?;
            let variable_type = if use_integer_variables && column.is_integer() {
                VariableType::Integer
            } else {
                VariableType::Real
            };
            let variable = ip.add_variable(variable_type, column.cost());

            if column.lower_bound() < 0.0 {
                return Err(ColumnGenerationError::NegativeColumnBound(i));
            }
            ip.add_bounds(column.lower_bound(), variable, column.upper_bound())?;
            for entry in column.rows() {
                self.check_row(entry.row)?;
                row_sums[entry.row] += variable * entry.coefficient;
                row_used[entry.row] = true;
            }
            ip.set_solution(variable.index(), column.solution_value)?;

            column_variables.push(variable);
        }

        let zero = ip.add_variable(VariableType::Real, 0.0);
        ip.add_bounds(0.0, zero, 0.0)?;
        ip.set_solution(zero.index(), 0.0)?;

        let mut row_duals = Vec::with_capacity(self.number_of_rows());
        for (row, sum) in row_sums.into_iter().enumerate() {
            if !row_used[row] {
                return Err(ColumnGenerationError::UnusedRow(row));
            }

            let dual = ip.add_constraint(self.row_lower[row], &(sum + zero), self.row_upper[row])?;
            if let Some(index) = dual.row() {
                ip.set_dual_solution(index, self.dual_solution[row])?;
            }
            row_duals.push(dual);
        }
        debug!(columns = column_variables.len(), rows = row_duals.len(), "created restricted master");

        Ok(RestrictedMaster { ip, column_variables, row_duals })
    }

    /// Read the solution of a solved restricted master problem.
    ///
    /// Column values are clipped to the column bounds.
    ///
    /// # Return value
    ///
    /// The objective value, including the objective constant.
    ///
    /// # Errors
    ///
    /// If the model has no dual value for one of the rows, or if it was not created from the
    /// current active columns.
    pub fn absorb_solution(&mut self, master: &RestrictedMaster) -> Result<f64, ColumnGenerationError> {
        if master.column_variables.len() != self.active_columns.len()
            || master.row_duals.len() != self.number_of_rows()
        {
            return Err(ColumnGenerationError::InvalidColumn("restricted master does not match the active columns"));
        }

        for (row, &dual) in master.row_duals.iter().enumerate() {
            self.dual_solution[row] = master.ip.dual_solution(dual)?;
        }
        for (&i, &variable) in self.active_columns.iter().zip(&master.column_variables) {
            let value = master.ip.solution(variable)?;
            let column = &mut self.pool[i];
            column.solution_value = value.max(column.lower_bound()).min(column.upper_bound());
        }

        Ok(master.ip.entire_objective() + self.objective_constant)
    }

    /// Number of active integral columns with a fractional value, and the number of active
    /// integral columns.
    pub fn fractionality(&self) -> (usize, usize) {
        let integral = self.active_columns.iter()
            .filter_map(|&i| self.pool.get(i))
            .filter(|column| column.is_integer())
            .map(|column| (column.solution_value - column.solution_value.round()).abs())
            .collect::<Vec<_>>();
        let fractional = integral.iter().filter(|&&residual| residual > 1e-5).count();

        (fractional, integral.len())
    }
}
