//! # Set partitioning
//!
//! Every member (e.g. an employee) needs to be covered by exactly one column (e.g. a roster).
//! Side constraints (e.g. staffing demand per shift) are soft: they are bounded rows with a cost
//! per unit of over- and undercoverage.
//!
//! The rows of the master problem are laid out as follows:
//!
//! /                 || member columns              | slack columns                   |
//! ==================||=============================|=================================|
//! Member rows (== 1)|| one 1 per column            |               0                 |
//! ------------------||-----------------------------|---------------------------------|
//! Constraint rows   || a 1 per covered constraint  | +1 (under) and -1 (over) per row|
//! ---------------------------------------------------------------------------------------
use cumsum::cumsum_array_owned;
use enum_map::{Enum, EnumMap, enum_map};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::algorithm::column_generation::column::Column;
use crate::algorithm::column_generation::config::FixingConfig;
use crate::algorithm::column_generation::master::MasterProblem;
use crate::data::grid::Grid;
use crate::data::linear_program::elements::BoundDirection;
use crate::error::ColumnGenerationError;

mod fixing;
mod log;

pub use log::{ConstraintEntry, FixEvent, LogEntry, MemberEntry};

/// Member sums below this value can't be normalized.
const MINIMUM_MEMBER_SUM: f64 = 1e-6;
/// Tolerance when comparing a fix state to the fractional solution.
const FIX_STATE_TOLERANCE: f64 = 1e-3;
/// Starting value of the coverage history.
const INITIAL_HISTORY: f64 = 0.5;

/// The two groups of rows.
#[derive(Enum, Debug, Copy, Clone, Eq, PartialEq)]
pub enum RowType {
    /// Exactly one column per member.
    Member,
    /// Soft side constraints.
    Constraint,
}

/// Fix of a side constraint for a member.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
pub enum FixState {
    /// All columns are allowed.
    #[default]
    Unset,
    /// Columns of the member may not cover the constraint.
    Zero,
    /// Columns of the member need to cover the constraint.
    One,
}

impl FixState {
    /// The fixed value, if any.
    pub fn value(self) -> Option<u8> {
        match self {
            FixState::Unset => None,
            FixState::Zero => Some(0),
            FixState::One => Some(1),
        }
    }
}

/// Bounds and penalties of a side constraint.
#[derive(Debug, Copy, Clone, PartialEq)]
struct Coverage {
    min: f64,
    max: f64,
    over_cost: f64,
    under_cost: f64,
}

impl Coverage {
    fn penalty(&self, value: f64) -> f64 {
        if value > self.max {
            self.over_cost * (value - self.max)
        } else if value < self.min {
            self.under_cost * (self.min - value)
        } else {
            0.0
        }
    }
}

/// A set partitioning master problem with fixing and rounding heuristics.
///
/// Problems that generate columns keep one of these and delegate to it.
#[derive(Debug, Clone)]
pub struct SetPartitioningProblem {
    master: MasterProblem,
    config: FixingConfig,

    /// Indices that separate the row groups.
    row_group_end: EnumMap<RowType, usize>,
    /// Bounds and penalties of each side constraint, if initialized.
    constraints: Vec<Option<Coverage>>,

    /// Member of each column; `None` for e.g. slack columns.
    column_member: Vec<Option<usize>>,
    /// All columns for a given member.
    columns_for_member: Vec<Vec<usize>>,

    /// (member, constraint) -> fix state.
    fixes: Grid<FixState>,
    fixes_per_member: Vec<usize>,
    /// (member, constraint) -> coverage in the current solution.
    fractional: Grid<f64>,
    /// (member, constraint) -> exponential average of the coverage.
    history: Grid<f64>,

    member_names: Vec<Option<String>>,
    /// Attached to the next log entry.
    events: Vec<FixEvent>,
}

impl SetPartitioningProblem {
    /// Create a problem with default fixing settings.
    ///
    /// # Arguments
    ///
    /// * `number_of_groups`: Number of members.
    /// * `number_of_constraints`: Number of side constraints.
    pub fn new(number_of_groups: usize, number_of_constraints: usize) -> Self {
        Self::with_config(number_of_groups, number_of_constraints, FixingConfig::default())
    }

    /// Create a problem with custom fixing parameters.
    pub fn with_config(number_of_groups: usize, number_of_constraints: usize, config: FixingConfig) -> Self {
        let cumulative = cumsum_array_owned([number_of_groups, number_of_constraints]);
        let row_group_end = enum_map! {
            RowType::Member     => cumulative[0],
            RowType::Constraint => cumulative[1],
        };

        let mut master = MasterProblem::new(row_group_end[RowType::Constraint]);
        for member in 0..number_of_groups {
            // In range by construction
            let _ = master.set_row_lower_bound(member, 1.0);
            let _ = master.set_row_upper_bound(member, 1.0);
        }

        Self {
            master,
            config,
            row_group_end,
            constraints: vec![None; number_of_constraints],
            column_member: Vec::new(),
            columns_for_member: vec![Vec::new(); number_of_groups],
            fixes: Grid::new(number_of_groups, number_of_constraints, FixState::Unset),
            fixes_per_member: vec![0; number_of_groups],
            fractional: Grid::new(number_of_groups, number_of_constraints, 0.0),
            history: Grid::new(number_of_groups, number_of_constraints, INITIAL_HISTORY),
            member_names: vec![None; number_of_groups],
            events: Vec::new(),
        }
    }

    /// Parameters of the fixing heuristic.
    pub fn config(&self) -> &FixingConfig {
        &self.config
    }

    /// The underlying master problem.
    pub fn master(&self) -> &MasterProblem {
        &self.master
    }

    /// Slack columns and other columns without a member are added to the pool directly.
    pub fn master_mut(&mut self) -> &mut MasterProblem {
        &mut self.master
    }

    /// Number of members, each of which is covered by exactly one column.
    pub fn number_of_groups(&self) -> usize {
        self.row_group_end[RowType::Member]
    }

    /// Number of side constraints.
    pub fn number_of_constraints(&self) -> usize {
        self.row_group_end[RowType::Constraint] - self.row_group_end[RowType::Member]
    }

    /// One row per member followed by one row per side constraint.
    pub fn number_of_rows(&self) -> usize {
        self.row_group_end[RowType::Constraint]
    }

    /// Classify a row by type using the row index.
    ///
    /// # Return value
    ///
    /// The group and the index within the group, or `None` if the row is out of range.
    pub fn row_type(&self, row: usize) -> Option<(RowType, usize)> {
        if row < self.row_group_end[RowType::Member] {
            Some((RowType::Member, row))
        } else if row < self.row_group_end[RowType::Constraint] {
            Some((RowType::Constraint, row - self.row_group_end[RowType::Member]))
        } else {
            None
        }
    }

    /// Row index of a side constraint.
    pub fn constraint_row(&self, constraint: usize) -> usize {
        self.row_group_end[RowType::Member] + constraint
    }

    /// Side constraints covered by a column.
    fn covered_constraints<'a>(&'a self, column: &'a Column) -> impl Iterator<Item = usize> + 'a {
        column.rows().iter().filter_map(|entry| match self.row_type(entry.row) {
            Some((RowType::Constraint, constraint)) => Some(constraint),
            _ => None,
        })
    }

    fn check_member(&self, member: usize) -> Result<(), ColumnGenerationError> {
        if member < self.number_of_groups() {
            Ok(())
        } else {
            Err(ColumnGenerationError::OutOfRange { what: "members", index: member, len: self.number_of_groups() })
        }
    }

    fn check_constraint(&self, constraint: usize) -> Result<(), ColumnGenerationError> {
        if constraint < self.number_of_constraints() {
            Ok(())
        } else {
            Err(ColumnGenerationError::OutOfRange {
                what: "constraints",
                index: constraint,
                len: self.number_of_constraints(),
            })
        }
    }

    /// Add a column for a member to the pool.
    ///
    /// The member is the single member row of the column.
    ///
    /// # Return value
    ///
    /// The index of the column in the pool, or `None` if an equal column was already present.
    ///
    /// # Errors
    ///
    /// The column needs bounds `[0, 1]`, exactly one member row, and all coefficients equal to 1.
    pub fn add_column(&mut self, column: Column) -> Result<Option<usize>, ColumnGenerationError> {
        if column.lower_bound() != 0.0 || column.upper_bound() != 1.0 {
            return Err(ColumnGenerationError::InvalidColumn("only 0/1 columns are accepted"));
        }

        let mut member = None;
        for entry in column.rows() {
            match self.row_type(entry.row) {
                Some((RowType::Member, index)) => {
                    if member.is_some() {
                        return Err(ColumnGenerationError::InvalidColumn("more than one member row"));
                    }
                    member = Some(index);
                },
                Some((RowType::Constraint, _)) => {},
                None => return Err(ColumnGenerationError::OutOfRange {
                    what: "rows",
                    index: entry.row,
                    len: self.number_of_rows(),
                }),
            }
            if entry.coefficient != 1.0 {
                return Err(ColumnGenerationError::InvalidColumn("all coefficients need to be 1"));
            }
        }
        let member = member.ok_or(ColumnGenerationError::MemberlessColumn)?;

        let index = self.master.pool_mut().add(column);
        if let Some(index) = index {
            if self.column_member.len() <= index {
                self.column_member.resize(index + 1, None);
            }
            self.column_member[index] = Some(member);
            self.columns_for_member[member].push(index);
            trace!(index, member, "added column");
        }

        Ok(index)
    }

    /// Set the bounds and penalties of a side constraint.
    ///
    /// Adds an under- and an overcoverage slack column to the pool, which should become initial
    /// columns. Call once per constraint, before solving.
    ///
    /// # Arguments
    ///
    /// * `constraint`: Index of the side constraint.
    /// * `min_value`, `max_value`: Bounds of the coverage.
    /// * `over_cost`: Cost per unit of coverage above `max_value`.
    /// * `under_cost`: Cost per unit of coverage below `min_value`.
    pub fn initialize_constraint(
        &mut self,
        constraint: usize,
        min_value: f64,
        max_value: f64,
        over_cost: f64,
        under_cost: f64,
    ) -> Result<(), ColumnGenerationError> {
        self.check_constraint(constraint)?;
        self.constraints[constraint] = Some(Coverage { min: min_value, max: max_value, over_cost, under_cost });

        let row = self.constraint_row(constraint);
        self.master.set_row_lower_bound(row, min_value)?;
        self.master.set_row_upper_bound(row, max_value)?;

        for direction in [BoundDirection::Lower, BoundDirection::Upper] {
            let cost = match direction {
                BoundDirection::Lower => under_cost,
                BoundDirection::Upper => over_cost,
            };
            let mut slack = Column::new(cost, 0.0, f64::INFINITY);
            slack.add_coefficient(row, -direction.sign::<f64>());
            slack.set_integer(false)?;
            self.master.pool_mut().add(slack);
        }

        Ok(())
    }

    /// The member of a column, `None` for columns that don't belong to a member.
    pub fn column_member(&self, column: usize) -> Option<usize> {
        self.column_member.get(column).copied().flatten()
    }

    /// Pool indices of all columns of a member.
    pub fn columns_for_member(&self, member: usize) -> &[usize] {
        &self.columns_for_member[member]
    }

    /// Fix state of every side constraint for a member.
    pub fn fixes_for_member(&self, member: usize) -> &[FixState] {
        self.fixes.row(member)
    }

    /// Whether the member is fully determined by fixes, so no more columns need to be generated
    /// for it.
    pub fn member_fully_fixed(&self, member: usize) -> bool {
        self.fixes_per_member.get(member).is_some_and(|&count| count >= self.number_of_constraints())
    }

    /// Whether a column respects the fix state of its member.
    ///
    /// Columns without a member are always allowed.
    pub fn column_allowed(&self, column: usize) -> bool {
        let (Some(member), Some(column)) = (self.column_member(column), self.master.pool().get(column)) else {
            return true;
        };

        let fixes = self.fixes.row(member);
        let mut covered = vec![false; fixes.len()];
        for constraint in self.covered_constraints(column) {
            if fixes[constraint] == FixState::Zero {
                return false;
            }
            covered[constraint] = true;
        }

        fixes.iter().zip(covered).all(|(&fix, covered)| fix != FixState::One || covered)
    }

    /// How much a member contributes to a side constraint in the current solution.
    ///
    /// Available after computing the fractional solution.
    pub fn fractional_solution(&self, member: usize, constraint: usize) -> f64 {
        self.fractional[(member, constraint)]
    }

    /// Compute the fractional solution of all members.
    ///
    /// # Errors
    ///
    /// If a member can't be normalized, or if a fix state doesn't match the solution, which means
    /// that a column violating the fix state was added.
    pub fn compute_fractional_solution(&mut self, active_columns: &[usize]) -> Result<(), ColumnGenerationError> {
        for member in 0..self.number_of_groups() {
            self.compute_member_fractional_solution(member, active_columns)?;

            for constraint in 0..self.number_of_constraints() {
                let fix = self.fixes[(member, constraint)];
                let value = self.fractional[(member, constraint)];
                if let Some(fixed) = fix.value()
                    && (f64::from(fixed) - value).abs() > FIX_STATE_TOLERANCE
                {
                    return Err(ColumnGenerationError::StaleFixState { member, constraint, fix: fixed, value });
                }
            }
        }

        Ok(())
    }

    /// Compute how much a member contributes to every side constraint.
    ///
    /// The values of the member's active columns are first scaled so that they sum to one, which
    /// corrects for inexact solvers and for columns that were fixed to zero since the last solve.
    ///
    /// # Errors
    ///
    /// If the member has active columns, but their values sum to (almost) zero.
    pub fn compute_member_fractional_solution(
        &mut self,
        member: usize,
        active_columns: &[usize],
    ) -> Result<(), ColumnGenerationError> {
        self.check_member(member)?;
        self.fractional.row_mut(member).fill(0.0);

        let columns = active_columns.iter()
            .copied()
            .filter(|&i| self.column_member(i) == Some(member))
            .collect::<Vec<_>>();
        if columns.is_empty() {
            return Ok(());
        }

        let sum = columns.iter().map(|&i| self.master.pool()[i].solution_value).sum::<f64>();
        if sum <= MINIMUM_MEMBER_SUM {
            return Err(ColumnGenerationError::MemberSumTooSmall { member, sum });
        }

        let first_constraint_row = self.row_group_end[RowType::Member];
        for i in columns {
            let column = &mut self.master.pool_mut()[i];
            column.solution_value = (column.solution_value / sum)
                .max(column.lower_bound())
                .min(column.upper_bound());

            let value = column.solution_value;
            for entry in column.rows() {
                if entry.row >= first_constraint_row {
                    self.fractional[(member, entry.row - first_constraint_row)] += value;
                }
            }
        }

        Ok(())
    }

    /// Cost of rounding the current solution.
    ///
    /// Every member gets its active column with the highest value. The cost is the cost of these
    /// columns plus the coverage penalties of the rounded solution. Afterwards,
    /// `fractional_solution` describes the rounded solution; the column values are unchanged.
    ///
    /// # Errors
    ///
    /// If a member has no active column with a positive value.
    pub fn integral_solution_value(&mut self, active_columns: &[usize]) -> Result<f64, ColumnGenerationError> {
        let mut best = vec![None::<(usize, f64)>; self.number_of_groups()];
        let mut saved = Vec::new();
        for &i in active_columns {
            let Some(member) = self.column_member(i) else { continue };
            let value = self.master.pool()[i].solution_value;
            if best[member].is_none_or(|(_, best_value)| value > best_value) {
                best[member] = Some((i, value));
            }
            saved.push((i, value));
        }

        let mut chosen = Vec::with_capacity(best.len());
        for (member, entry) in best.into_iter().enumerate() {
            match entry {
                Some((i, value)) if value > 0.0 => chosen.push(i),
                _ => return Err(ColumnGenerationError::NoPositiveColumn(member)),
            }
        }

        for &(i, _) in &saved {
            self.master.pool_mut()[i].solution_value = 0.0;
        }
        for &i in &chosen {
            self.master.pool_mut()[i].solution_value = 1.0;
        }
        let result = self.compute_fractional_solution(active_columns);
        for (i, value) in saved {
            self.master.pool_mut()[i].solution_value = value;
        }
        result?;

        let column_cost = chosen.iter().map(|&i| self.master.pool()[i].cost()).sum::<f64>();
        Ok(column_cost + self.cover_cost())
    }

    /// Cost of rounding the solution over the active columns of the master problem.
    pub fn current_integral_solution_value(&mut self) -> Result<f64, ColumnGenerationError> {
        let active_columns = self.master.active_columns().to_vec();
        self.integral_solution_value(&active_columns)
    }

    /// Coverage penalty of the solution in `fractional`.
    fn cover_cost(&self) -> f64 {
        self.constraints.iter()
            .enumerate()
            .filter_map(|(constraint, coverage)| coverage.map(|coverage| (constraint, coverage)))
            .map(|(constraint, coverage)| {
                let value = (0..self.number_of_groups())
                    .map(|member| self.fractional[(member, constraint)])
                    .sum::<f64>();
                coverage.penalty(value)
            })
            .sum()
    }

    /// Remove all fixes, so that the problem can be solved again.
    pub fn unfix_all(&mut self) {
        self.fixes.iter_mut().for_each(|fix| *fix = FixState::Unset);
        self.history.iter_mut().for_each(|value| *value = INITIAL_HISTORY);
        self.master.pool_mut().iter_mut().for_each(Column::unfix);
        self.fixes_per_member.fill(0);
    }

    /// Display name of a member, its index unless a name was set.
    pub fn member_name(&self, member: usize) -> String {
        match self.member_names.get(member) {
            Some(Some(name)) => name.clone(),
            _ => member.to_string(),
        }
    }

    /// Name a member for logging.
    pub fn set_member_name(&mut self, member: usize, name: impl Into<String>) -> Result<(), ColumnGenerationError> {
        self.check_member(member)?;
        self.member_names[member] = Some(name.into());
        Ok(())
    }
}
