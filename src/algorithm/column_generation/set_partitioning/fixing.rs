//! # Fixing
//!
//! Steers the master problem towards an integral solution by forbidding columns. Three strategies
//! are tried in order, from weak to strong:
//!
//! 1. Fix side constraints of a member to one (and, based on the history, to zero).
//! 2. Fix a column with a value of at least one half.
//! 3. Fix the largest fractional column of a member that still has several.
use itertools::Itertools;
use tracing::{debug, info, trace};

use crate::algorithm::column_generation::{FixInformation, FixOutcome};
use crate::algorithm::column_generation::set_partitioning::{FixEvent, FixState, SetPartitioningProblem};
use crate::error::ColumnGenerationError;

/// Values at or below this count as zero.
const NONZERO: f64 = 1e-6;
/// Columns with a value at least this close to one are already integral.
const INTEGRAL: f64 = 1e-7;

impl SetPartitioningProblem {
    /// Fix using the active columns of the master problem.
    pub fn fix(&mut self, information: &FixInformation) -> Result<FixOutcome, ColumnGenerationError> {
        let active_columns = self.master.active_columns().to_vec();
        self.fix_using_columns(information, &active_columns)
    }

    /// Fix parts of the current solution.
    ///
    /// Nothing is fixed during the first iterations and while the objective still changes
    /// significantly, but the coverage history is always updated.
    ///
    /// # Arguments
    ///
    /// * `information`: Progress of the driver.
    /// * `active_columns`: Columns of the last restricted master problem, their values are
    /// normalized per member.
    ///
    /// # Return value
    ///
    /// The number of columns fixed, or `Exhausted` if there is nothing left to fix.
    pub fn fix_using_columns(
        &mut self,
        information: &FixInformation,
        active_columns: &[usize],
    ) -> Result<FixOutcome, ColumnGenerationError> {
        self.compute_fractional_solution(active_columns)?;
        self.update_history();

        if information.iteration <= self.config.minimum_iterations
            || information.objective_change < -self.config.objective_change_before_fixing
            || information.objective_change > 0.0
        {
            trace!(iteration = information.iteration, change = information.objective_change, "not fixing");
            return Ok(FixOutcome::Fixed(0));
        }

        let mut fixed = 0;
        let mut threshold = self.config.fix_threshold;
        while fixed == 0 && threshold > self.config.minimum_threshold {
            fixed = self.fix_constraints(threshold, active_columns)?;
            threshold *= self.config.threshold_decay;
        }

        if fixed == 0 {
            fixed = self.fix_column(active_columns)?;
        }
        if fixed == 0 {
            fixed = self.fix_column_as_last_resort()?;
        }

        let remaining = self.members_remaining();
        debug!(
            total = remaining.len(),
            "members remaining: {}",
            remaining.iter().map(|&(member, count)| format!("({}, {count})", self.member_name(member))).join(" "),
        );

        if fixed == 0 {
            info!("not able to fix anything, creating integer solution");
            self.events.push(FixEvent::IntegerSolution);
            Ok(FixOutcome::Exhausted)
        } else {
            Ok(FixOutcome::Fixed(fixed))
        }
    }

    /// Exponential average of the coverage, used to decide on fixes to zero.
    fn update_history(&mut self) {
        let fraction = self.config.history_update_fraction;
        for member in 0..self.number_of_groups() {
            for constraint in 0..self.number_of_constraints() {
                let current = self.fractional[(member, constraint)];
                let history = &mut self.history[(member, constraint)];
                *history = fraction * *history + (1.0 - fraction) * current;
            }
        }
    }

    /// Fix constraints to members where the coverage is at least the threshold, and to zero where
    /// the coverage history is low.
    ///
    /// # Return value
    ///
    /// The number of columns fixed by fixes to one.
    fn fix_constraints(&mut self, threshold: f64, active_columns: &[usize]) -> Result<usize, ColumnGenerationError> {
        let mut fixed = 0;
        let mut fixed_for_members = Vec::new();
        let mut fixed_to_zero_for_members = Vec::new();

        for member in 0..self.number_of_groups() {
            let mut member_fixes = 0;
            let mut member_fixes_to_zero = 0;

            for constraint in 0..self.number_of_constraints() {
                if self.fixes[(member, constraint)] != FixState::Unset {
                    continue;
                }

                // A fix can change the coverage of the other constraints of this member, so the
                // fractional solution is recomputed after each one.
                if self.fractional[(member, constraint)] >= threshold {
                    fixed += self.fix_constraint_to_member(member, constraint, true)?;
                    self.compute_member_fractional_solution(member, active_columns)?;
                    member_fixes += 1;
                } else if self.history[(member, constraint)] <= self.config.zero_fix_threshold {
                    match self.fix_constraint_to_member(member, constraint, false) {
                        Ok(_) => {
                            self.compute_member_fractional_solution(member, active_columns)?;
                            member_fixes_to_zero += 1;
                        },
                        Err(ColumnGenerationError::StrandedMember { .. }) => {
                            trace!(member, constraint, "fixing to zero would leave no columns");
                        },
                        Err(error) => return Err(error),
                    }
                }
            }

            if member_fixes > 0 {
                fixed_for_members.push(format!("{}: {member_fixes}", self.member_name(member)));
            }
            if member_fixes_to_zero > 0 {
                fixed_to_zero_for_members.push(format!("{}: {member_fixes_to_zero}", self.member_name(member)));
            }
        }

        if !fixed_for_members.is_empty() {
            info!("fixed for {} at level {threshold}", fixed_for_members.join(", "));
            self.events.push(FixEvent::ThresholdShift { level: threshold });
        }
        if !fixed_to_zero_for_members.is_empty() {
            info!(
                "fixed to zero for {} at level {}",
                fixed_to_zero_for_members.join(", "),
                self.config.zero_fix_threshold,
            );
        }

        Ok(fixed)
    }

    /// Require that a member always (`value == true`) or never covers a side constraint.
    ///
    /// Columns of the member that don't satisfy the fix are fixed to zero, and columns generated
    /// for the member afterwards need to satisfy it.
    ///
    /// # Return value
    ///
    /// The number of columns fixed to zero.
    ///
    /// # Errors
    ///
    /// If the opposite fix is already in place, if the member would be left without columns, or if
    /// a column that would need to be fixed is continuous. Nothing is modified in that case.
    pub fn fix_constraint_to_member(
        &mut self,
        member: usize,
        constraint: usize,
        value: bool,
    ) -> Result<usize, ColumnGenerationError> {
        self.check_member(member)?;
        self.check_constraint(constraint)?;

        let state = if value { FixState::One } else { FixState::Zero };
        match self.fixes[(member, constraint)] {
            current if current == state => return Ok(0),
            FixState::Unset => {},
            _ => return Err(ColumnGenerationError::AlreadyFixed { member, constraint }),
        }

        let row = self.constraint_row(constraint);
        let mut to_fix = Vec::new();
        let mut column_left = false;
        for &i in &self.columns_for_member[member] {
            let column = &self.master.pool()[i];
            if column.is_fixed() {
                column_left |= column.upper_bound() > 0.5;
            } else if column.has_row(row) == value {
                column_left = true;
            } else {
                to_fix.push(i);
            }
        }
        if !column_left {
            return Err(ColumnGenerationError::StrandedMember { member, constraint, value: u8::from(value) });
        }
        if to_fix.iter().any(|&i| !self.master.pool()[i].is_integer()) {
            return Err(ColumnGenerationError::NonIntegralColumn);
        }

        for &i in &to_fix {
            self.master.pool_mut()[i].fix(0)?;
        }
        self.fixes[(member, constraint)] = state;
        self.fixes_per_member[member] += 1;

        Ok(to_fix.len())
    }

    /// Fix the first active column with a value of at least one half to one.
    ///
    /// This is not reflected in the fix state of the member's constraints, but the member counts
    /// as fully fixed afterwards.
    fn fix_column(&mut self, active_columns: &[usize]) -> Result<usize, ColumnGenerationError> {
        for &i in active_columns {
            let column = &self.master.pool()[i];
            let value = column.solution_value;
            if column.upper_bound() != 1.0 || value < 0.5 || value >= 1.0 - INTEGRAL {
                continue;
            }
            let Some(member) = self.column_member(i) else { continue };

            self.master.pool_mut()[i].fix(1)?;
            info!("fixing column {i} to 1 for member {}, was {value}", self.member_name(member));
            self.events.push(FixEvent::ColumnFixed { fractional_value: value });
            self.fixes_per_member[member] = self.number_of_constraints();

            return Ok(1);
        }

        Ok(0)
    }

    /// Fix the largest column of the first member with more than one nonzero column, and all of
    /// its siblings to zero.
    ///
    /// Members without an unfixed nonzero column are skipped.
    ///
    /// # Return value
    ///
    /// The number of columns fixed, to one or to zero.
    ///
    /// # Errors
    ///
    /// If a column of the chosen member is continuous. Nothing is modified in that case.
    fn fix_column_as_last_resort(&mut self) -> Result<usize, ColumnGenerationError> {
        for (member, _) in self.members_remaining() {
            let pool = self.master.pool();
            let best = self.columns_for_member[member].iter()
                .copied()
                .filter(|&i| !pool[i].is_fixed() && pool[i].solution_value > NONZERO)
                .fold(None::<usize>, |best, i| match best {
                    Some(j) if pool[j].solution_value >= pool[i].solution_value => Some(j),
                    _ => Some(i),
                });
            let Some(best) = best else {
                trace!(member, "no unfixed nonzero column");
                continue;
            };

            let columns = self.columns_for_member[member].clone();
            if columns.iter().any(|&i| !pool[i].is_integer()) {
                return Err(ColumnGenerationError::NonIntegralColumn);
            }

            let value = pool[best].solution_value;
            info!("fixing column {best} to 1 for member {} as a last resort, was {value}", self.member_name(member));
            self.events.push(FixEvent::ColumnFixed { fractional_value: value });
            for &i in &columns {
                self.master.pool_mut()[i].fix(if i == best { 1 } else { 0 })?;
            }
            self.fixes_per_member[member] = self.number_of_constraints();

            return Ok(columns.len());
        }

        Ok(0)
    }

    /// Members with more than one nonzero column, with that count.
    fn members_remaining(&self) -> Vec<(usize, usize)> {
        let pool = self.master.pool();
        (0..self.number_of_groups())
            .map(|member| {
                let nonzeros = self.columns_for_member[member].iter()
                    .filter(|&&i| pool[i].solution_value > NONZERO)
                    .count();
                (member, nonzeros)
            })
            .filter(|&(_, nonzeros)| nonzeros > 1)
            .collect()
    }
}

#[cfg(test)]
mod test {
    use crate::algorithm::column_generation::{FixInformation, FixOutcome};
    use crate::algorithm::column_generation::config::FixingConfig;
    use crate::algorithm::column_generation::set_partitioning::{FixEvent, FixState, SetPartitioningProblem};
    use crate::algorithm::column_generation::set_partitioning::test::add_column;
    use crate::error::ColumnGenerationError;

    const LATE: FixInformation = FixInformation { iteration: 100, objective_change: -0.1 };

    fn expected_fixes(default: FixState, changes: &[(usize, FixState)]) -> Vec<FixState> {
        let mut fixes = vec![default; 20];
        for &(constraint, state) in changes {
            fixes[constraint] = state;
        }
        fixes
    }

    #[test]
    fn fix() {
        let mut problem = SetPartitioningProblem::new(1, 20);
        add_column(&mut problem, 0, &[11], 0.5);
        add_column(&mut problem, 0, &[11, 12, 13], 0.3);
        add_column(&mut problem, 0, &[12, 13, 14], 0.2);
        let all_columns = [0, 1, 2];

        // Not in the first iterations
        let information = FixInformation { iteration: 1, objective_change: -0.1 };
        assert_eq!(problem.fix_using_columns(&information, &all_columns), Ok(FixOutcome::Fixed(0)));
        // Not while the objective changes a lot
        let information = FixInformation { iteration: 100, objective_change: -10.0 };
        assert_eq!(problem.fix_using_columns(&information, &all_columns), Ok(FixOutcome::Fixed(0)));

        assert_eq!(problem.fix_using_columns(&LATE, &all_columns), Ok(FixOutcome::Fixed(1)));

        let pool = problem.master().pool();
        assert!(problem.column_allowed(0));
        assert!(!pool[0].is_fixed());
        assert_eq!(pool[0].solution_value, 0.5 / (0.3 + 0.5));
        assert!(problem.column_allowed(1));
        assert_eq!(pool[1].solution_value, 0.3 / (0.3 + 0.5));
        // Does not cover constraint 11
        assert!(!problem.column_allowed(2));
        assert!(pool[2].is_fixed());
        assert_eq!((pool[2].upper_bound(), pool[2].solution_value), (0.0, 0.0));

        assert!(!problem.member_fully_fixed(0));
        assert_eq!(problem.fixes_for_member(0), expected_fixes(FixState::Unset, &[(11, FixState::One)]));

        problem.unfix_all();
        assert_eq!(problem.fixes_for_member(0), expected_fixes(FixState::Unset, &[]));
        assert!((0..3).all(|column| problem.column_allowed(column)));
    }

    #[test]
    fn fix_to_zero() {
        let mut problem = SetPartitioningProblem::new(1, 20);
        add_column(&mut problem, 0, &[11], 0.5);
        add_column(&mut problem, 0, &[11, 12, 13], 0.3);
        add_column(&mut problem, 0, &[12, 13, 14], 0.2);
        add_column(&mut problem, 0, &[1, 2, 3, 11], 0.0);
        let all_columns = [0, 1, 2, 3];

        // Converge the coverage history
        let information = FixInformation { iteration: 1, objective_change: -0.1 };
        for _ in 0..100 {
            assert_eq!(problem.fix_using_columns(&information, &all_columns), Ok(FixOutcome::Fixed(0)));
        }

        assert_eq!(problem.fix_using_columns(&LATE, &all_columns), Ok(FixOutcome::Fixed(1)));
        assert!(problem.column_allowed(0));
        assert!(!problem.column_allowed(2));
        assert!(!problem.column_allowed(3));
        assert_eq!(
            problem.fixes_for_member(0),
            expected_fixes(
                FixState::Zero,
                &[(11, FixState::One), (12, FixState::Unset), (13, FixState::Unset), (14, FixState::Unset)],
            ),
        );

        problem.unfix_all();
        assert!(problem.column_allowed(2));
        assert!(problem.column_allowed(3));

        // The history was reset, so there are no fixes to zero
        assert_eq!(problem.fix_using_columns(&LATE, &all_columns), Ok(FixOutcome::Fixed(1)));
        assert!(!problem.column_allowed(2));
        assert!(problem.column_allowed(3));
    }

    #[test]
    fn fix_column() {
        let mut problem = SetPartitioningProblem::new(1, 20);
        add_column(&mut problem, 0, &[11], 0.5);
        add_column(&mut problem, 0, &[12, 13], 0.25);
        add_column(&mut problem, 0, &[12, 13, 14], 0.25);

        assert_eq!(problem.fix_using_columns(&LATE, &[0, 1, 2]), Ok(FixOutcome::Fixed(1)));

        let column = &problem.master().pool()[0];
        assert!(column.is_fixed());
        assert_eq!((column.lower_bound(), column.solution_value), (1.0, 1.0));
        assert!(problem.member_fully_fixed(0));
        // Not visible in the constraint fixes
        assert_eq!(problem.fixes_for_member(0), expected_fixes(FixState::Unset, &[]));
        assert!(matches!(problem.create_log_entry().events[..], [FixEvent::ColumnFixed { fractional_value }] if fractional_value == 0.5));

        problem.unfix_all();
        assert!(!problem.master().pool()[0].is_fixed());
    }

    #[test]
    fn fix_column_as_last_resort() {
        let mut problem = SetPartitioningProblem::new(1, 20);
        add_column(&mut problem, 0, &[11], 0.25);
        add_column(&mut problem, 0, &[11, 12, 13], 0.25);
        add_column(&mut problem, 0, &[12, 13, 14], 0.25);
        add_column(&mut problem, 0, &[14, 15], 0.25);

        assert_eq!(problem.fix_using_columns(&LATE, &[0, 1, 2, 3]), Ok(FixOutcome::Fixed(4)));

        let pool = problem.master().pool();
        assert!(pool[0].is_fixed());
        assert_eq!((pool[0].lower_bound(), pool[0].solution_value), (1.0, 1.0));
        assert!((1..4).all(|i| pool[i].solution_value == 0.0 && pool[i].upper_bound() == 0.0));
        assert!(problem.member_fully_fixed(0));
        assert_eq!(problem.fixes_for_member(0), expected_fixes(FixState::Unset, &[]));

        problem.unfix_all();
        assert!(!problem.master().pool()[0].is_fixed());
    }

    #[test]
    fn last_resort_takes_the_largest_column() {
        let mut problem = SetPartitioningProblem::new(1, 20);
        add_column(&mut problem, 0, &[11], 0.2);
        add_column(&mut problem, 0, &[12], 0.45);
        add_column(&mut problem, 0, &[13], 0.35);

        assert_eq!(problem.fix_using_columns(&LATE, &[0, 1, 2]), Ok(FixOutcome::Fixed(3)));
        assert_eq!(problem.master().pool()[1].lower_bound(), 1.0);
    }

    #[test]
    fn fix_done() {
        let mut problem = SetPartitioningProblem::new(1, 20);
        add_column(&mut problem, 0, &[], 1.0);

        assert_eq!(problem.fix_using_columns(&LATE, &[0]), Ok(FixOutcome::Exhausted));
        assert!(matches!(problem.create_log_entry().events[..], [FixEvent::IntegerSolution]));
    }

    #[test]
    fn custom_thresholds() {
        let config = FixingConfig::default().with_fix_threshold(0.9).with_minimum_iterations(0);
        let mut problem = SetPartitioningProblem::with_config(1, 2, config);
        add_column(&mut problem, 0, &[0], 0.8);
        add_column(&mut problem, 0, &[1], 0.2);

        let information = FixInformation { iteration: 1, objective_change: 0.0 };
        // Fixed once the threshold has decayed below 0.8
        assert_eq!(problem.fix_using_columns(&information, &[0, 1]), Ok(FixOutcome::Fixed(1)));
        assert_eq!(problem.fixes_for_member(0), &[FixState::One, FixState::Unset]);
    }

    #[test]
    fn conflicting_fixes() {
        let mut problem = SetPartitioningProblem::new(1, 2);
        add_column(&mut problem, 0, &[0], 0.5);
        add_column(&mut problem, 0, &[0, 1], 0.5);

        assert_eq!(problem.fix_constraint_to_member(0, 1, true), Ok(1));
        assert_eq!(problem.fix_constraint_to_member(0, 1, true), Ok(0));
        assert_eq!(
            problem.fix_constraint_to_member(0, 1, false),
            Err(ColumnGenerationError::AlreadyFixed { member: 0, constraint: 1 }),
        );
        // Column 1 is the only one left and it covers constraint 0
        assert_eq!(
            problem.fix_constraint_to_member(0, 0, false),
            Err(ColumnGenerationError::StrandedMember { member: 0, constraint: 0, value: 0 }),
        );
        assert_eq!(problem.fixes_for_member(0), &[FixState::Unset, FixState::One]);
        assert!(problem.fix_constraint_to_member(1, 0, true).is_err());
    }

    #[test]
    fn member_without_columns() {
        let mut problem = SetPartitioningProblem::new(2, 2);
        add_column(&mut problem, 0, &[0], 1.0);

        assert_eq!(
            problem.fix_constraint_to_member(1, 0, true),
            Err(ColumnGenerationError::StrandedMember { member: 1, constraint: 0, value: 1 }),
        );
        assert_eq!(problem.fixes_for_member(1), &[FixState::Unset, FixState::Unset]);
    }

    #[test]
    fn continuous_column_is_not_fixed() {
        let mut problem = SetPartitioningProblem::new(1, 2);
        add_column(&mut problem, 0, &[1], 0.25);
        add_column(&mut problem, 0, &[0], 0.5);
        add_column(&mut problem, 0, &[], 0.25);
        problem.master_mut().pool_mut()[2].set_integer(false).unwrap();

        // Columns 0 and 2 would be fixed to zero, but column 2 is continuous
        assert_eq!(problem.fix_constraint_to_member(0, 0, true), Err(ColumnGenerationError::NonIntegralColumn));
        assert!((0..3).all(|i| !problem.master().pool()[i].is_fixed()));
        assert_eq!(problem.fixes_for_member(0), &[FixState::Unset, FixState::Unset]);
        assert!(!problem.member_fully_fixed(0));
    }

    #[test]
    fn last_resort_skips_members_without_candidates() {
        let mut problem = SetPartitioningProblem::new(2, 20);
        // The nonzero columns of member 0 are all fixed already
        add_column(&mut problem, 0, &[11], 0.5);
        add_column(&mut problem, 0, &[12], 0.5);
        add_column(&mut problem, 1, &[13], 0.25);
        add_column(&mut problem, 1, &[14], 0.25);
        add_column(&mut problem, 1, &[15], 0.25);
        add_column(&mut problem, 1, &[16], 0.25);
        problem.master_mut().pool_mut()[0].fix(1).unwrap();
        problem.master_mut().pool_mut()[1].fix(1).unwrap();
        // Fixing sets the value, restore the fractional one
        problem.master_mut().pool_mut()[0].solution_value = 0.5;
        problem.master_mut().pool_mut()[1].solution_value = 0.5;

        assert_eq!(problem.fix_column_as_last_resort(), Ok(4));
        let pool = problem.master().pool();
        assert_eq!(pool[2].lower_bound(), 1.0);
        assert!((3..6).all(|i| pool[i].upper_bound() == 0.0));
        assert!(problem.member_fully_fixed(1));
    }

    #[test]
    fn stale_fix_state() {
        let mut problem = SetPartitioningProblem::new(1, 2);
        add_column(&mut problem, 0, &[0], 0.5);
        add_column(&mut problem, 0, &[1], 0.5);
        problem.fix_constraint_to_member(0, 0, true).unwrap();

        // A column violating the fix was added afterwards
        add_column(&mut problem, 0, &[1, 0], 0.0);
        add_column(&mut problem, 0, &[], 1.0);
        assert!(matches!(
            problem.compute_fractional_solution(&[0, 1, 2, 3]),
            Err(ColumnGenerationError::StaleFixState { member: 0, constraint: 0, fix: 1, .. }),
        ));
    }
}
