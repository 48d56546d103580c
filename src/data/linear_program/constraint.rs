//! # Constraints
//!
//! A constraint `lower <= sum <= upper`. They are usually built from a sum or variable with
//! `at_most`, `at_least` or `equal_to`, and added to a model with `IntegerProgram::add`.
use crate::data::linear_program::elements::ConstraintType;
use crate::data::linear_program::sum::{Sum, Variable};

/// A bounded linear expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    lower: f64,
    sum: Sum,
    upper: f64,
}

impl Constraint {
    /// Create a constraint comparing a sum to a right-hand side.
    pub fn new(sum: impl Into<Sum>, constraint_type: ConstraintType, rhs: f64) -> Self {
        let (lower, upper) = match constraint_type {
            ConstraintType::Equal => (rhs, rhs),
            ConstraintType::Greater => (rhs, f64::INFINITY),
            ConstraintType::Less => (f64::NEG_INFINITY, rhs),
        };

        Self { lower, sum: sum.into(), upper }
    }

    /// Create the constraint `lower <= sum <= upper`.
    pub fn between(lower: f64, sum: impl Into<Sum>, upper: f64) -> Self {
        Self { lower, sum: sum.into(), upper }
    }

    /// Lower bound, possibly negative infinity.
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// The constrained expression.
    pub fn sum(&self) -> &Sum {
        &self.sum
    }

    /// Upper bound, possibly infinity.
    pub fn upper(&self) -> f64 {
        self.upper
    }
}

impl Sum {
    /// The constraint `self <= rhs`.
    pub fn at_most(self, rhs: impl Into<Sum>) -> Constraint {
        Constraint::new(self - rhs, ConstraintType::Less, 0.0)
    }

    /// The constraint `self >= rhs`.
    pub fn at_least(self, rhs: impl Into<Sum>) -> Constraint {
        Constraint::new(self - rhs, ConstraintType::Greater, 0.0)
    }

    /// The constraint `self == rhs`.
    pub fn equal_to(self, rhs: impl Into<Sum>) -> Constraint {
        Constraint::new(self - rhs, ConstraintType::Equal, 0.0)
    }
}

impl Variable {
    /// The constraint `self <= rhs`.
    pub fn at_most(self, rhs: impl Into<Sum>) -> Constraint {
        Sum::from(self).at_most(rhs)
    }

    /// The constraint `self >= rhs`.
    pub fn at_least(self, rhs: impl Into<Sum>) -> Constraint {
        Sum::from(self).at_least(rhs)
    }

    /// The constraint `self == rhs`.
    pub fn equal_to(self, rhs: impl Into<Sum>) -> Constraint {
        Sum::from(self).equal_to(rhs)
    }
}
