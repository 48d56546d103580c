//! # Building blocks to describe linear programs.
use std::ops::{Neg, Not};

use num_traits::One;
use serde::{Deserialize, Serialize};

/// A `Constraint` is a type of (in)equality.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConstraintType {
    Equal,
    Greater,
    Less,
}

/// Direction of a bound.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BoundDirection {
    /// x >= b.
    Lower,
    /// x <= b.
    Upper,
}

impl BoundDirection {
    /// Convert a bound direction into a positive or negative one.
    ///
    /// Upper bounds need positive slacks, lower bounds need negative slacks.
    #[must_use]
    pub fn sign<F: One + Neg<Output = F>>(self) -> F {
        match self {
            BoundDirection::Lower => -F::one(),
            BoundDirection::Upper => F::one(),
        }
    }
}

impl Not for BoundDirection {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::Lower => Self::Upper,
            Self::Upper => Self::Lower,
        }
    }
}

/// The kind of values a variable can take.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum VariableType {
    /// Integral with bounds `[0, 1]`.
    Boolean,
    /// Integral, unbounded unless constrained.
    Integer,
    /// Continuous, unbounded unless constrained.
    Real,
}

impl VariableType {
    /// Whether values of this type need to be integral.
    pub fn is_integral(self) -> bool {
        match self {
            VariableType::Boolean | VariableType::Integer => true,
            VariableType::Real => false,
        }
    }

    /// Bounds of a freshly created variable.
    pub fn default_bounds(self) -> (f64, f64) {
        match self {
            VariableType::Boolean => (0.0, 1.0),
            VariableType::Integer | VariableType::Real => (f64::NEG_INFINITY, f64::INFINITY),
        }
    }
}

impl Default for VariableType {
    fn default() -> Self {
        VariableType::Real
    }
}
