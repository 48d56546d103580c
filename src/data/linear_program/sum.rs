//! # Handles to variables and linear expressions
//!
//! A `Variable` is a lightweight handle into an `IntegerProgram`. Handles remember which model
//! created them; combining handles of two models yields a sum that every model rejects.
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_MODEL_ID: AtomicUsize = AtomicUsize::new(0);

/// Identity of a model, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId(usize);

impl ModelId {
    pub(crate) fn fresh() -> Self {
        Self(NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Which model an expression belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Owner {
    /// Only constants, usable with any model.
    #[default]
    Unbound,
    Model(ModelId),
    /// Handles of different models were combined.
    Mixed,
}

impl Owner {
    pub(crate) fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Owner::Unbound, owner) | (owner, Owner::Unbound) => owner,
            (Owner::Model(left), Owner::Model(right)) if left == right => self,
            _ => Owner::Mixed,
        }
    }
}

/// A variable of an `IntegerProgram`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variable {
    index: usize,
    model: ModelId,
}

impl Variable {
    pub(crate) fn new(index: usize, model: ModelId) -> Self {
        Self { index, model }
    }

    /// Column index of the variable in its model.
    pub fn index(self) -> usize {
        self.index
    }

    pub(crate) fn owner(self) -> Owner {
        Owner::Model(self.model)
    }
}

/// A linear combination of variables plus a constant.
///
/// Terms are kept in insertion order; the same variable may appear more than once, the model adds
/// up duplicates when the sum is used.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sum {
    terms: Vec<(usize, f64)>,
    constant: f64,
    owner: Owner,
}

impl Sum {
    /// Terms as `(variable index, coefficient)` pairs.
    pub fn terms(&self) -> &[(usize, f64)] {
        &self.terms
    }

    /// Constant part.
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Number of terms, duplicates counted separately.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the sum has no terms (it might have a constant).
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub(crate) fn owner(&self) -> Owner {
        self.owner
    }

    pub(crate) fn from_parts(terms: Vec<(usize, f64)>, constant: f64, owner: Owner) -> Self {
        Self { terms, constant, owner }
    }
}

impl From<Variable> for Sum {
    fn from(variable: Variable) -> Self {
        Self {
            terms: vec![(variable.index, 1.0)],
            constant: 0.0,
            owner: variable.owner(),
        }
    }
}

impl From<f64> for Sum {
    fn from(constant: f64) -> Self {
        Self { terms: Vec::new(), constant, owner: Owner::Unbound }
    }
}

impl From<i32> for Sum {
    fn from(constant: i32) -> Self {
        f64::from(constant).into()
    }
}

impl<R: Into<Sum>> AddAssign<R> for Sum {
    fn add_assign(&mut self, rhs: R) {
        let rhs = rhs.into();
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
        self.owner = self.owner.combine(rhs.owner);
    }
}

impl<R: Into<Sum>> SubAssign<R> for Sum {
    fn sub_assign(&mut self, rhs: R) {
        *self += -rhs.into();
    }
}

impl MulAssign<f64> for Sum {
    fn mul_assign(&mut self, rhs: f64) {
        for (_, coefficient) in &mut self.terms {
            *coefficient *= rhs;
        }
        self.constant *= rhs;
    }
}

impl<R: Into<Sum>> Add<R> for Sum {
    type Output = Sum;

    fn add(mut self, rhs: R) -> Self::Output {
        self += rhs;
        self
    }
}

impl<R: Into<Sum>> Sub<R> for Sum {
    type Output = Sum;

    fn sub(mut self, rhs: R) -> Self::Output {
        self -= rhs;
        self
    }
}

impl Mul<f64> for Sum {
    type Output = Sum;

    fn mul(mut self, rhs: f64) -> Self::Output {
        self *= rhs;
        self
    }
}

impl Neg for Sum {
    type Output = Sum;

    fn neg(self) -> Self::Output {
        self * -1.0
    }
}

impl<R: Into<Sum>> Add<R> for Variable {
    type Output = Sum;

    fn add(self, rhs: R) -> Self::Output {
        Sum::from(self) + rhs
    }
}

impl<R: Into<Sum>> Sub<R> for Variable {
    type Output = Sum;

    fn sub(self, rhs: R) -> Self::Output {
        Sum::from(self) - rhs
    }
}

impl Mul<f64> for Variable {
    type Output = Sum;

    fn mul(self, rhs: f64) -> Self::Output {
        Sum::from(self) * rhs
    }
}

impl Neg for Variable {
    type Output = Sum;

    fn neg(self) -> Self::Output {
        -Sum::from(self)
    }
}

impl Add<Sum> for f64 {
    type Output = Sum;

    fn add(self, rhs: Sum) -> Self::Output {
        rhs + self
    }
}

impl Add<Variable> for f64 {
    type Output = Sum;

    fn add(self, rhs: Variable) -> Self::Output {
        rhs + self
    }
}

impl Sub<Sum> for f64 {
    type Output = Sum;

    fn sub(self, rhs: Sum) -> Self::Output {
        -rhs + self
    }
}

impl Sub<Variable> for f64 {
    type Output = Sum;

    fn sub(self, rhs: Variable) -> Self::Output {
        -rhs + self
    }
}

impl Mul<Sum> for f64 {
    type Output = Sum;

    fn mul(self, rhs: Sum) -> Self::Output {
        rhs * self
    }
}

impl Mul<Variable> for f64 {
    type Output = Sum;

    fn mul(self, rhs: Variable) -> Self::Output {
        rhs * self
    }
}

impl std::iter::Sum for Sum {
    fn sum<I: Iterator<Item = Sum>>(iter: I) -> Self {
        iter.fold(Sum::default(), |total, sum| total + sum)
    }
}

impl std::iter::Sum<Variable> for Sum {
    fn sum<I: Iterator<Item = Variable>>(iter: I) -> Self {
        iter.fold(Sum::default(), |total, variable| total + variable)
    }
}

/// Reference to the dual value of a constraint.
///
/// Constraints over a single variable are stored as bounds of that variable and have no dual
/// value; their `DualVariable` is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DualVariable {
    row: Option<usize>,
    model: ModelId,
}

impl DualVariable {
    pub(crate) fn new(row: Option<usize>, model: ModelId) -> Self {
        Self { row, model }
    }

    /// Whether the constraint is stored as a row.
    pub fn is_valid(self) -> bool {
        self.row.is_some()
    }

    /// Index of the row, if any.
    pub fn row(self) -> Option<usize> {
        self.row
    }

    pub(crate) fn owner(self) -> Owner {
        Owner::Model(self.model)
    }
}
