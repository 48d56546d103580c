//! # Pseudo-boolean expressions
//!
//! Polynomials over 0/1 variables. Because `x * x = x` for such variables, a monomial is a set of
//! variable indices; it is stored as a sorted vector without duplicates. The empty monomial holds
//! the constant.
//!
//! A model linearizes these expressions on request, see
//! `IntegerProgram::linearize_pseudoboolean_terms`.
use std::collections::BTreeMap;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use itertools::Itertools;

use crate::data::linear_program::sum::{Owner, Sum, Variable};

/// A sum of monomials with coefficients.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PseudoBoolean {
    monomials: BTreeMap<Vec<usize>, f64>,
    owner: Owner,
}

impl PseudoBoolean {
    /// The zero polynomial.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `coefficient` times the product of `variables`.
    pub fn add_term(&mut self, coefficient: f64, variables: &[Variable]) {
        for variable in variables {
            self.owner = self.owner.combine(variable.owner());
        }
        let monomial = variables.iter().map(|variable| variable.index()).sorted().dedup().collect();
        self.add_monomial(monomial, coefficient);
    }

    fn add_monomial(&mut self, monomial: Vec<usize>, coefficient: f64) {
        let total = self.monomials.entry(monomial).or_insert(0.0);
        *total += coefficient;
        if *total == 0.0 {
            self.monomials.retain(|_, coefficient| *coefficient != 0.0);
        }
    }

    /// All monomials with a nonzero coefficient, ordered by their index sets.
    pub fn monomials(&self) -> impl Iterator<Item = (&[usize], f64)> {
        self.monomials.iter().map(|(monomial, &coefficient)| (monomial.as_slice(), coefficient))
    }

    /// Coefficient of the empty monomial.
    pub fn constant(&self) -> f64 {
        self.monomials.get(&Vec::new()).copied().unwrap_or(0.0)
    }

    /// Number of monomials with a nonzero coefficient, including the constant.
    pub fn len(&self) -> usize {
        self.monomials.len()
    }

    /// Whether this is the zero polynomial.
    pub fn is_empty(&self) -> bool {
        self.monomials.is_empty()
    }

    pub(crate) fn owner(&self) -> Owner {
        self.owner
    }
}

impl From<Sum> for PseudoBoolean {
    fn from(sum: Sum) -> Self {
        let mut result = Self { monomials: BTreeMap::new(), owner: sum.owner() };
        for &(index, coefficient) in sum.terms() {
            result.add_monomial(vec![index], coefficient);
        }
        if sum.constant() != 0.0 {
            result.add_monomial(Vec::new(), sum.constant());
        }
        result
    }
}

impl From<Variable> for PseudoBoolean {
    fn from(variable: Variable) -> Self {
        Sum::from(variable).into()
    }
}

impl From<f64> for PseudoBoolean {
    fn from(constant: f64) -> Self {
        Sum::from(constant).into()
    }
}

impl<R: Into<PseudoBoolean>> AddAssign<R> for PseudoBoolean {
    fn add_assign(&mut self, rhs: R) {
        let rhs = rhs.into();
        self.owner = self.owner.combine(rhs.owner);
        for (monomial, coefficient) in rhs.monomials {
            self.add_monomial(monomial, coefficient);
        }
    }
}

impl<R: Into<PseudoBoolean>> Add<R> for PseudoBoolean {
    type Output = PseudoBoolean;

    fn add(mut self, rhs: R) -> Self::Output {
        self += rhs;
        self
    }
}

impl<R: Into<PseudoBoolean>> Sub<R> for PseudoBoolean {
    type Output = PseudoBoolean;

    fn sub(mut self, rhs: R) -> Self::Output {
        self += -rhs.into();
        self
    }
}

impl Mul<f64> for PseudoBoolean {
    type Output = PseudoBoolean;

    fn mul(mut self, rhs: f64) -> Self::Output {
        if rhs == 0.0 {
            self.monomials.clear();
        }
        for coefficient in self.monomials.values_mut() {
            *coefficient *= rhs;
        }
        self
    }
}

impl Neg for PseudoBoolean {
    type Output = PseudoBoolean;

    fn neg(self) -> Self::Output {
        self * -1.0
    }
}

impl Mul for PseudoBoolean {
    type Output = PseudoBoolean;

    fn mul(self, rhs: PseudoBoolean) -> Self::Output {
        let mut result = PseudoBoolean { monomials: BTreeMap::new(), owner: self.owner.combine(rhs.owner) };
        for ((left, a), (right, b)) in self.monomials.iter().cartesian_product(&rhs.monomials) {
            let monomial = left.iter().merge(right).copied().dedup().collect();
            result.add_monomial(monomial, a * b);
        }
        result
    }
}

impl Mul for Variable {
    type Output = PseudoBoolean;

    fn mul(self, rhs: Variable) -> Self::Output {
        PseudoBoolean::from(self) * PseudoBoolean::from(rhs)
    }
}
