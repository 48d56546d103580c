//! # Nonlinear expressions
//!
//! Products of booleans are replaced by a fresh boolean constrained to equal the product. Maxima
//! and absolute values get a continuous helper that is bounded from below by every term; such a
//! helper is only exact when it is minimized, which is why it is marked convex.
use itertools::Itertools;
use tracing::trace;

use crate::data::linear_program::elements::VariableType;
use crate::data::linear_program::ip::IntegerProgram;
use crate::data::linear_program::pseudo_boolean::PseudoBoolean;
use crate::data::linear_program::sum::{Sum, Variable};
use crate::error::ModelError;

impl IntegerProgram {
    /// Queue a pseudo-boolean expression to be added to the objective.
    ///
    /// It takes effect when `linearize_pseudoboolean_terms` is called.
    pub fn add_pseudoboolean_objective(&mut self, objective: PseudoBoolean) -> Result<(), ModelError> {
        self.check_owner(objective.owner(), "pseudo-boolean expression")?;
        self.pending_objectives.push(objective);
        Ok(())
    }

    /// Queue the constraint `lower <= expression <= upper`.
    ///
    /// It takes effect when `linearize_pseudoboolean_terms` is called.
    pub fn add_pseudoboolean_constraint(
        &mut self,
        lower: f64,
        expression: PseudoBoolean,
        upper: f64,
    ) -> Result<(), ModelError> {
        self.check_owner(expression.owner(), "pseudo-boolean expression")?;
        self.pending_constraints.push((lower, expression, upper));
        Ok(())
    }

    /// A linear expression equal to the product of the given variables.
    ///
    /// The result is memoized per set of variables: the same product in any order maps to the same
    /// helper.
    ///
    /// # Errors
    ///
    /// If one of the variables does not have bounds within `{0, 1}`.
    pub fn linearize_pseudoboolean_term(&mut self, indices: &[usize]) -> Result<Sum, ModelError> {
        let monomial = indices.iter().copied().sorted().dedup().collect::<Vec<_>>();
        if let Some(sum) = self.monomials.get(&monomial) {
            return Ok(sum.clone());
        }

        for &index in &monomial {
            let variable = self.variables.get(index).ok_or(ModelError::UnknownVariable(index))?;
            let is_binary = |bound: f64| bound == 0.0 || bound == 1.0;
            if !is_binary(variable.lower) || !is_binary(variable.upper) {
                return Err(ModelError::NotPseudoBoolean(index));
            }
        }

        let result = match monomial.as_slice() {
            [] => Sum::from(1.0),
            &[index] => Sum::from(Variable::new(index, self.id)),
            _ => {
                let product = self.add_boolean(0.0);
                self.variables[product.index()].is_helper = true;
                let factors = monomial.iter().map(|&index| Variable::new(index, self.id)).collect::<Vec<_>>();
                for &factor in &factors {
                    self.add(product.at_most(factor))?;
                }
                let bound = 1.0 - factors.len() as f64;
                self.add(product.at_least(factors.into_iter().sum::<Sum>() + bound))?;
                trace!(factors = monomial.len(), product = product.index(), "linearized monomial");

                Sum::from(product)
            },
        };

        self.monomials.insert(monomial, result.clone());
        Ok(result)
    }

    fn linearize(&mut self, expression: &PseudoBoolean) -> Result<Sum, ModelError> {
        let mut sum = Sum::default();
        for (monomial, coefficient) in expression.monomials() {
            sum += self.linearize_pseudoboolean_term(monomial)? * coefficient;
        }
        Ok(sum)
    }

    /// Add all queued pseudo-boolean objectives and constraints to the model.
    pub fn linearize_pseudoboolean_terms(&mut self) -> Result<(), ModelError> {
        let mut objective = Sum::default();
        for expression in std::mem::take(&mut self.pending_objectives) {
            objective += self.linearize(&expression)?;
        }
        self.add_objective(&objective)?;

        for (lower, expression, upper) in std::mem::take(&mut self.pending_constraints) {
            let sum = self.linearize(&expression)?;
            self.add_constraint(lower, &sum, upper)?;
        }

        Ok(())
    }

    /// A helper that is at least each of the terms.
    ///
    /// Equals the maximum when it is minimized.
    pub fn max(&mut self, terms: &[Sum]) -> Result<Sum, ModelError> {
        for term in terms {
            self.check_owner(term.owner(), "sum")?;
        }

        let y = self.add_variable(VariableType::Real, 0.0);
        self.variables[y.index()].is_helper = true;
        for term in terms {
            self.add(y.at_least(term.clone()))?;
        }
        self.variables[y.index()].is_convex = true;

        Ok(Sum::from(y))
    }

    /// A helper that is at least `sum` and `-sum`.
    ///
    /// Equals the absolute value when it is minimized.
    pub fn abs(&mut self, sum: &Sum) -> Result<Sum, ModelError> {
        self.max(&[sum.clone(), -sum.clone()])
    }
}
