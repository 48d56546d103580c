//! # Integer programs
//!
//! A sparse model that is built incrementally and handed to an external solver. Building does
//! some light preprocessing:
//!
//! * duplicate variables in a constraint are added up and zero coefficients dropped;
//! * constraints over a single variable tighten that variable's bounds instead of adding a row;
//! * constraints without variables are checked immediately.
//!
//! The solver writes its primal and dual values back with `set_solution` and
//! `set_dual_solution`, after which they can be read through the handles.
use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::data::linear_program::constraint::Constraint;
use crate::data::linear_program::elements::VariableType;
use crate::data::linear_program::pseudo_boolean::PseudoBoolean;
use crate::data::linear_program::sum::{DualVariable, ModelId, Owner, Sum, Variable};
use crate::error::ModelError;

mod config;
mod diagnostics;
mod exists;
mod linearize;
mod modelling;
mod snapshot;

pub use config::ModelConfig;
pub use snapshot::{ModelSnapshot, RowSnapshot, VariableSnapshot};

/// Everything the model stores about a variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableData {
    /// Boolean, integer or real.
    pub variable_type: VariableType,
    /// Objective coefficient.
    pub cost: f64,
    /// Lower bound, possibly negative infinity.
    pub lower: f64,
    /// Upper bound, possibly infinity.
    pub upper: f64,
    /// Auxiliary variable introduced while modelling, not of interest to the user.
    pub is_helper: bool,
    /// May only be used with nonnegative coefficients in the objective and in upper bounding
    /// constraints.
    pub is_convex: bool,
}

/// A constraint `lower <= Σ coefficient · x <= upper`.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Lower bound, possibly negative infinity.
    pub lower: f64,
    /// Upper bound, possibly infinity.
    pub upper: f64,
    /// `(variable index, coefficient)` pairs, sorted by index, without duplicates or zeros.
    pub entries: Vec<(usize, f64)>,
}

#[derive(Debug, Clone, Default)]
enum Exists {
    #[default]
    Idle,
    /// The indicators introduced so far, the last one is attached to new constraints.
    Collecting(Vec<Variable>),
}

/// A mixed integer linear program, minimizing its objective.
#[derive(Debug)]
pub struct IntegerProgram {
    id: ModelId,
    config: ModelConfig,
    variables: Vec<VariableData>,
    rows: Vec<Row>,
    objective_constant: f64,
    primal: Vec<f64>,
    dual: Vec<f64>,
    pending_objectives: Vec<PseudoBoolean>,
    pending_constraints: Vec<(f64, PseudoBoolean, f64)>,
    monomials: BTreeMap<Vec<usize>, Sum>,
    exists: Exists,
}

impl Default for IntegerProgram {
    fn default() -> Self {
        Self::with_config(ModelConfig::default())
    }
}

impl IntegerProgram {
    /// An empty model with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty model.
    pub fn with_config(config: ModelConfig) -> Self {
        Self {
            id: ModelId::fresh(),
            config,
            variables: Vec::new(),
            rows: Vec::new(),
            objective_constant: 0.0,
            primal: Vec::new(),
            dual: Vec::new(),
            pending_objectives: Vec::new(),
            pending_constraints: Vec::new(),
            monomials: BTreeMap::new(),
            exists: Exists::Idle,
        }
    }

    /// Settings of this model.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn check_owner(&self, owner: Owner, what: &'static str) -> Result<(), ModelError> {
        match owner {
            Owner::Unbound => Ok(()),
            Owner::Model(id) if id == self.id => Ok(()),
            _ => Err(ModelError::ForeignHandle(what)),
        }
    }

    fn check_variable(&self, variable: Variable) -> Result<usize, ModelError> {
        self.check_owner(variable.owner(), "variable")?;
        let index = variable.index();
        if index < self.variables.len() {
            Ok(index)
        } else {
            Err(ModelError::UnknownVariable(index))
        }
    }

    /// Add a variable.
    ///
    /// Booleans get bounds `[0, 1]`, other variables are unbounded.
    pub fn add_variable(&mut self, variable_type: VariableType, cost: f64) -> Variable {
        let (lower, upper) = variable_type.default_bounds();
        self.variables.push(VariableData {
            variable_type,
            cost,
            lower,
            upper,
            is_helper: false,
            is_convex: false,
        });
        self.primal.push(f64::NAN);

        Variable::new(self.variables.len() - 1, self.id)
    }

    /// Add a boolean variable.
    pub fn add_boolean(&mut self, cost: f64) -> Variable {
        self.add_variable(VariableType::Boolean, cost)
    }

    /// Handle of the variable with the given index.
    pub fn variable(&self, index: usize) -> Result<Variable, ModelError> {
        if index < self.variables.len() {
            Ok(Variable::new(index, self.id))
        } else {
            Err(ModelError::UnknownVariable(index))
        }
    }

    /// Type the variable was created with.
    pub fn variable_type(&self, variable: Variable) -> Result<VariableType, ModelError> {
        let index = self.check_variable(variable)?;
        Ok(self.variables[index].variable_type)
    }

    /// Mark a variable as auxiliary.
    pub fn mark_variable_as_helper(&mut self, variable: Variable) -> Result<(), ModelError> {
        let index = self.check_variable(variable)?;
        self.variables[index].is_helper = true;
        Ok(())
    }

    /// All variables, by index.
    pub fn variables(&self) -> &[VariableData] {
        &self.variables
    }

    /// All rows, by index.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    fn check_convex_use(&self, index: usize, coefficient: f64, lower: f64) -> Result<(), ModelError> {
        if self.variables[index].is_convex {
            if coefficient < 0.0 {
                return Err(ModelError::NotConvex { variable: index, reason: "negative coefficient" });
            }
            if lower > f64::NEG_INFINITY {
                return Err(ModelError::NotConvex { variable: index, reason: "finite lower bound" });
            }
        }

        Ok(())
    }

    /// Add the constraint `lower <= sum <= upper`.
    ///
    /// # Return value
    ///
    /// The dual variable of the constraint. It is invalid when the constraint did not become a
    /// row, i.e. when it had no variables or was stored as a variable bound.
    ///
    /// # Errors
    ///
    /// If the sum belongs to a different model, if a constraint without variables is violated, or
    /// if a convex variable would be used the wrong way.
    pub fn add_constraint(&mut self, lower: f64, sum: &Sum, upper: f64) -> Result<DualVariable, ModelError> {
        self.check_owner(sum.owner(), "sum")?;

        let constant = sum.constant();
        let entries = sum.terms().iter().copied()
            .sorted_by_key(|&(index, _)| index)
            .coalesce(|(i, a), (j, b)| if i == j { Ok((i, a + b)) } else { Err(((i, a), (j, b))) })
            .filter(|&(_, coefficient)| coefficient != 0.0)
            .collect::<Vec<_>>();
        if let Some(&(index, _)) = entries.iter().find(|&&(index, _)| index >= self.variables.len()) {
            return Err(ModelError::UnknownVariable(index));
        }

        if entries.is_empty() {
            return if lower <= constant && constant <= upper {
                Ok(DualVariable::new(None, self.id))
            } else {
                Err(ModelError::AlwaysFalse { lower, value: constant, upper })
            };
        }

        let in_exists = matches!(self.exists, Exists::Collecting(_));
        if let &[(index, coefficient)] = entries.as_slice() && !in_exists {
            self.check_convex_use(index, coefficient, lower)?;

            let (new_lower, new_upper) = if coefficient > 0.0 {
                ((lower - constant) / coefficient, (upper - constant) / coefficient)
            } else {
                ((upper - constant) / coefficient, (lower - constant) / coefficient)
            };
            let variable = &mut self.variables[index];
            variable.lower = variable.lower.max(new_lower);
            variable.upper = variable.upper.min(new_upper);

            return Ok(DualVariable::new(None, self.id));
        }

        self.add_row(lower - constant, upper - constant, lower, entries)
    }

    fn add_row(
        &mut self,
        lower: f64,
        upper: f64,
        original_lower: f64,
        entries: Vec<(usize, f64)>,
    ) -> Result<DualVariable, ModelError> {
        let limit = self.config.finite_bound_limit;
        let mut bounded = true;
        let (mut minimum, mut maximum) = (0.0, 0.0);
        for &(index, coefficient) in &entries {
            self.check_convex_use(index, coefficient, original_lower)?;

            let variable = &self.variables[index];
            if variable.lower < -limit || variable.upper > limit {
                bounded = false;
            }
            if coefficient > 0.0 {
                minimum += coefficient * variable.lower;
                maximum += coefficient * variable.upper;
            } else {
                minimum += coefficient * variable.upper;
                maximum += coefficient * variable.lower;
            }
        }

        let row = self.rows.len();
        self.rows.push(Row { lower, upper, entries });
        self.dual.push(f64::NAN);

        let indicator = match &self.exists {
            Exists::Collecting(indicators) => indicators.last().copied(),
            Exists::Idle => None,
        };
        if let Some(indicator) = indicator {
            // The slack is free when the indicator is one and zero otherwise
            let big_m = if bounded { 2.0 * (maximum - minimum) } else { self.config.big_m_fallback };
            let slack = self.add_variable(VariableType::Real, 0.0);
            self.variables[slack.index()].is_helper = true;
            self.rows[row].entries.push((slack.index(), 1.0));

            let state = std::mem::take(&mut self.exists);
            let result = self.add(slack.at_most(big_m * indicator))
                .and_then(|_| self.add(slack.at_least(-big_m * indicator)));
            self.exists = state;
            result?;
        }
        trace!(row, entries = self.rows[row].entries.len(), "added row");

        Ok(DualVariable::new(Some(row), self.id))
    }

    /// Add a constraint built with `Sum::at_most` and friends.
    pub fn add(&mut self, constraint: Constraint) -> Result<DualVariable, ModelError> {
        self.add_constraint(constraint.lower(), constraint.sum(), constraint.upper())
    }

    /// Add several constraints, stopping at the first error.
    pub fn add_all(
        &mut self,
        constraints: impl IntoIterator<Item = Constraint>,
    ) -> Result<Vec<DualVariable>, ModelError> {
        constraints.into_iter().map(|constraint| self.add(constraint)).collect()
    }

    /// Tighten the bounds of a variable to `[lower, upper]`.
    ///
    /// # Errors
    ///
    /// If a boolean variable gets a bound other than 0 or 1, or if the bounds become empty.
    pub fn add_bounds(&mut self, lower: f64, variable: Variable, upper: f64) -> Result<(), ModelError> {
        let index = self.check_variable(variable)?;

        let data = &mut self.variables[index];
        if data.variable_type == VariableType::Boolean
            && !([0.0, 1.0].contains(&lower) && [0.0, 1.0].contains(&upper))
        {
            return Err(ModelError::BooleanBound { lower, upper });
        }
        let lower = lower.max(data.lower);
        let upper = upper.min(data.upper);
        if lower > upper {
            return Err(ModelError::EmptyBounds { lower, upper });
        }

        data.lower = lower;
        data.upper = upper;
        Ok(())
    }

    /// Add a linear expression to the objective.
    ///
    /// # Errors
    ///
    /// If the sum belongs to another model or has a negative coefficient for a convex variable.
    /// The objective is unchanged in that case.
    pub fn add_objective(&mut self, sum: &Sum) -> Result<(), ModelError> {
        self.check_owner(sum.owner(), "sum")?;
        for &(index, coefficient) in sum.terms() {
            let variable = self.variables.get(index).ok_or(ModelError::UnknownVariable(index))?;
            if variable.is_convex && coefficient < 0.0 {
                return Err(ModelError::NotConvex { variable: index, reason: "negative objective coefficient" });
            }
        }

        for &(index, coefficient) in sum.terms() {
            self.variables[index].cost += coefficient;
        }
        self.objective_constant += sum.constant();
        Ok(())
    }

    /// Set the cost of every variable to zero. The objective constant is kept.
    pub fn clear_objective(&mut self) {
        for variable in &mut self.variables {
            variable.cost = 0.0;
        }
    }

    /// Constant part of the objective.
    pub fn objective_constant(&self) -> f64 {
        self.objective_constant
    }

    /// Store the solver's value of variable `index`.
    pub fn set_solution(&mut self, index: usize, value: f64) -> Result<(), ModelError> {
        *self.primal.get_mut(index).ok_or(ModelError::UnknownVariable(index))? = value;
        Ok(())
    }

    /// Store the solver's dual value of row `index`.
    pub fn set_dual_solution(&mut self, index: usize, value: f64) -> Result<(), ModelError> {
        *self.dual.get_mut(index).ok_or(ModelError::UnknownRow(index))? = value;
        Ok(())
    }

    /// Forget the primal and dual solution.
    pub fn clear_solution(&mut self) {
        self.primal.fill(f64::NAN);
        self.dual.fill(f64::NAN);
    }

    /// Value of a variable in the current solution, NaN if there is none.
    pub fn solution(&self, variable: Variable) -> Result<f64, ModelError> {
        let index = self.check_variable(variable)?;
        Ok(self.primal[index])
    }

    /// Value of a boolean variable in the current solution.
    pub fn boolean_solution(&self, variable: Variable) -> Result<bool, ModelError> {
        self.solution(variable).map(|value| value > 0.5)
    }

    /// Value of a linear expression in the current solution.
    pub fn sum_solution(&self, sum: &Sum) -> Result<f64, ModelError> {
        self.check_owner(sum.owner(), "sum")?;
        sum.terms().iter().try_fold(sum.constant(), |total, &(index, coefficient)| {
            let value = self.primal.get(index).ok_or(ModelError::UnknownVariable(index))?;
            Ok(total + coefficient * value)
        })
    }

    /// Whether the solver provided a value for this dual variable.
    pub fn is_dual_available(&self, dual: DualVariable) -> bool {
        self.check_owner(dual.owner(), "dual variable").is_ok()
            && dual.row().and_then(|row| self.dual.get(row)).is_some_and(|value| !value.is_nan())
    }

    /// Dual value of a constraint.
    ///
    /// # Errors
    ///
    /// If the dual variable is invalid or no dual solution was set.
    pub fn dual_solution(&self, dual: DualVariable) -> Result<f64, ModelError> {
        self.check_owner(dual.owner(), "dual variable")?;
        if self.is_dual_available(dual) {
            dual.row().map(|row| self.dual[row]).ok_or(ModelError::UnavailableDual)
        } else {
            Err(ModelError::UnavailableDual)
        }
    }

    /// Objective value of the current solution, including the constant.
    pub fn entire_objective(&self) -> f64 {
        self.variables.iter()
            .zip(&self.primal)
            .fold(self.objective_constant, |total, (variable, value)| total + variable.cost * value)
    }
}

#[cfg(test)]
mod test {
    use crate::data::linear_program::constraint::Constraint;
    use crate::data::linear_program::elements::VariableType;
    use crate::data::linear_program::ip::IntegerProgram;
    use crate::data::linear_program::sum::Sum;
    use crate::error::ModelError;

    #[test]
    fn trivial_constraint() {
        let mut ip = IntegerProgram::new();
        let s = Sum::default();
        assert!(!ip.add(s.clone().at_most(1)).unwrap().is_valid());
        assert!(ip.add(s.clone().at_most(-1)).is_err());
        assert!(ip.add_constraint(-1.0, &s, -1.0).is_err());
        assert!(ip.add_constraint(1.0, &s, 1.0).is_err());

        let x = ip.add_boolean(0.0);
        assert!(!ip.add(x.at_most(1)).unwrap().is_valid());
        let y = ip.add_boolean(0.0);
        assert!(ip.add((x + y).at_most(1)).unwrap().is_valid());
        assert_eq!(ip.rows().len(), 1);
    }

    #[test]
    fn always_false() {
        let mut ip = IntegerProgram::new();
        assert_eq!(
            ip.add(Sum::from(1).equal_to(0)),
            Err(ModelError::AlwaysFalse { lower: 0.0, value: 1.0, upper: 0.0 }),
        );

        let x = ip.add_boolean(0.0);
        assert!(ip.add((0.0 * x).equal_to(1)).is_err());
        assert!(!ip.add(x.equal_to(1)).unwrap().is_valid());
        assert_eq!(ip.variables()[0].lower, 1.0);
    }

    #[test]
    fn single_variable_folding() {
        let mut ip = IntegerProgram::new();
        let x = ip.add_variable(VariableType::Real, 0.0);
        ip.add(x.at_least(1)).unwrap();
        assert_eq!((ip.variables()[0].lower, ip.variables()[0].upper), (1.0, f64::INFINITY));

        let y = ip.add_variable(VariableType::Real, 0.0);
        ip.add((-y).at_most(1)).unwrap();
        assert_eq!(ip.variables()[1].lower, -1.0);

        // 2x + 2x - y + y <= 10 is x <= 2.5
        ip.add((2.0 * x + 2.0 * x - y + y).at_most(10)).unwrap();
        assert_eq!(ip.variables()[0].upper, 2.5);
        assert!(ip.rows().is_empty());
    }

    #[test]
    fn constraints_compilation() {
        let mut ip = IntegerProgram::new();
        let x = ip.add_boolean(0.0);
        let y = ip.add_boolean(0.0);

        let constraints = vec![
            x.at_most(0), x.at_least(0), x.at_most(y), (x + y).at_most(0), (x + y).at_most(y),
            (x + y).at_least(0), (x + y).at_least(y), (x + y).at_most(x + y), (x + y).at_least(x + y),
            x.equal_to(0), x.equal_to(y), (x + y).equal_to(y), (x + y).equal_to(x + y),
        ];
        let duals = ip.add_all(constraints).unwrap();

        assert_eq!(duals.len(), 13);
        assert!(ip.check_invariants());
        // x = 0 was folded into the bounds
        assert_eq!(ip.variables()[0].upper, 0.0);
    }

    #[test]
    fn rows_are_deduplicated() {
        let mut ip = IntegerProgram::new();
        let x = ip.add_variable(VariableType::Real, 0.0);
        let y = ip.add_variable(VariableType::Real, 0.0);
        let z = ip.add_variable(VariableType::Real, 0.0);

        let dual = ip.add(Constraint::between(1.0, z + x + y + x - y + y + 3.0, 5.0)).unwrap();

        assert_eq!(dual.row(), Some(0));
        assert_eq!(ip.rows()[0].entries, vec![(0, 2.0), (1, 1.0), (2, 1.0)]);
        assert_eq!((ip.rows()[0].lower, ip.rows()[0].upper), (-2.0, 2.0));
        assert_eq!(ip.matrix_size(), 3);
    }

    #[test]
    fn different_models() {
        let mut first = IntegerProgram::new();
        let mut second = IntegerProgram::new();
        let x = first.add_boolean(0.0);
        let y = second.add_boolean(0.0);

        assert_eq!(first.add((x + y).at_least(1)), Err(ModelError::ForeignHandle("sum")));
        assert!(first.add_objective(&Sum::from(y)).is_err());
        assert!(second.add_bounds(0.0, x, 1.0).is_err());
        assert!(first.add((2.0 * y).at_least(8)).is_err());
        assert!(first.solution(y).is_err());
        assert!(first.add(x.at_most(1)).is_ok());
    }

    #[test]
    fn bounds() {
        let mut ip = IntegerProgram::new();
        let x = ip.add_boolean(0.0);
        assert_eq!(ip.add_bounds(0.0, x, 0.5), Err(ModelError::BooleanBound { lower: 0.0, upper: 0.5 }));
        ip.add_bounds(1.0, x, 1.0).unwrap();
        assert_eq!(ip.add_bounds(0.0, x, 0.0), Err(ModelError::EmptyBounds { lower: 1.0, upper: 0.0 }));

        let y = ip.add_variable(VariableType::Real, 0.0);
        ip.add(y.at_most(100)).unwrap();
        ip.add(y.at_least(-100)).unwrap();
        ip.add_bounds(-200.0, y, 200.0).unwrap();
        assert_eq!((ip.variables()[1].lower, ip.variables()[1].upper), (-100.0, 100.0));
    }

    #[test]
    fn objective() {
        let mut ip = IntegerProgram::new();
        let x = ip.add_variable(VariableType::Real, 1.0);
        let y = ip.add_variable(VariableType::Integer, 0.0);

        ip.add_objective(&(2.0 * x - y + 4.0)).unwrap();
        assert_eq!(ip.variables()[0].cost, 3.0);
        assert_eq!(ip.variables()[1].cost, -1.0);
        assert_eq!(ip.objective_constant(), 4.0);

        ip.set_solution(0, 1.0).unwrap();
        ip.set_solution(1, 2.0).unwrap();
        assert_eq!(ip.entire_objective(), 5.0);
        assert_eq!(ip.sum_solution(&(x + y)).unwrap(), 3.0);
        assert!(ip.boolean_solution(x).unwrap());

        ip.clear_objective();
        assert_eq!(ip.entire_objective(), 4.0);
        ip.clear_solution();
        assert!(ip.solution(x).unwrap().is_nan());
        assert_eq!(ip.set_solution(2, 0.0), Err(ModelError::UnknownVariable(2)));
    }

    #[test]
    fn dual_variables() {
        let mut ip = IntegerProgram::new();
        let x = ip.add_variable(VariableType::Real, 0.0);
        let y = ip.add_variable(VariableType::Real, 0.0);
        ip.add_objective(&(-x - 2.0 * y)).unwrap();
        ip.add(x.at_least(0)).unwrap();
        let invalid = ip.add(y.at_least(0)).unwrap();
        let dual = ip.add((x + y).at_most(1)).unwrap();

        assert!(dual.is_valid());
        assert!(!invalid.is_valid());
        assert!(!ip.is_dual_available(dual));
        assert_eq!(ip.dual_solution(dual), Err(ModelError::UnavailableDual));

        ip.set_dual_solution(0, -2.0).unwrap();
        assert!(ip.is_dual_available(dual));
        assert_eq!(ip.dual_solution(dual), Ok(-2.0));
        assert_eq!(ip.dual_solution(invalid), Err(ModelError::UnavailableDual));
        assert_eq!(ip.set_dual_solution(1, 0.0), Err(ModelError::UnknownRow(1)));
    }

    #[test]
    fn helper() {
        let mut ip = IntegerProgram::new();
        let x = ip.add_variable(VariableType::Integer, 0.0);
        ip.mark_variable_as_helper(x).unwrap();

        assert!(ip.variables()[0].is_helper);
        assert_eq!(ip.variable_type(x), Ok(VariableType::Integer));
        assert_eq!(ip.variable(0), Ok(x));
        assert!(ip.variable(1).is_err());
    }
}
