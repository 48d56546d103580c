//! # Serializable models
//!
//! A plain data copy of a model that can be written with any `serde` format and handed to an
//! external solver. Infinite bounds and missing solution values become `None`, so that formats
//! without a representation for infinity or NaN can hold them.
use serde::{Deserialize, Serialize};

use crate::data::linear_program::elements::VariableType;
use crate::data::linear_program::ip::{IntegerProgram, Row, VariableData};
use crate::error::ModelError;

/// A variable of a `ModelSnapshot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSnapshot {
    /// Type of the variable.
    pub variable_type: VariableType,
    /// Objective coefficient.
    pub cost: f64,
    /// Lower bound, `None` if unbounded.
    pub lower: Option<f64>,
    /// Upper bound, `None` if unbounded.
    pub upper: Option<f64>,
    /// Whether the variable was introduced while modelling.
    #[serde(default)]
    pub is_helper: bool,
    /// Whether the variable needs to stay convex.
    #[serde(default)]
    pub is_convex: bool,
}

/// A row of a `ModelSnapshot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowSnapshot {
    /// Lower bound, `None` if unbounded.
    pub lower: Option<f64>,
    /// Upper bound, `None` if unbounded.
    pub upper: Option<f64>,
    /// `(variable index, coefficient)` pairs.
    pub entries: Vec<(usize, f64)>,
}

/// Everything needed to rebuild an `IntegerProgram`, including its current solution.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelSnapshot {
    /// All variables, by index.
    pub variables: Vec<VariableSnapshot>,
    /// All rows, by index.
    pub rows: Vec<RowSnapshot>,
    /// Constant part of the objective.
    #[serde(default)]
    pub objective_constant: f64,
    /// Primal values, may be shorter than the number of variables.
    #[serde(default)]
    pub primal: Vec<Option<f64>>,
    /// Dual values, may be shorter than the number of rows.
    #[serde(default)]
    pub dual: Vec<Option<f64>>,
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn known(value: f64) -> Option<f64> {
    (!value.is_nan()).then_some(value)
}

/// Values with `None` replaced by NaN, padded with NaN up to `len`.
fn expand(values: &[Option<f64>], len: usize) -> Vec<f64> {
    values.iter()
        .map(|value| value.unwrap_or(f64::NAN))
        .chain(std::iter::repeat(f64::NAN))
        .take(len)
        .collect()
}

impl IntegerProgram {
    /// Copy the model and its solution into plain data.
    pub fn snapshot(&self) -> ModelSnapshot {
        ModelSnapshot {
            variables: self.variables.iter()
                .map(|variable| VariableSnapshot {
                    variable_type: variable.variable_type,
                    cost: variable.cost,
                    lower: finite(variable.lower),
                    upper: finite(variable.upper),
                    is_helper: variable.is_helper,
                    is_convex: variable.is_convex,
                })
                .collect(),
            rows: self.rows.iter()
                .map(|row| RowSnapshot {
                    lower: finite(row.lower),
                    upper: finite(row.upper),
                    entries: row.entries.clone(),
                })
                .collect(),
            objective_constant: self.objective_constant,
            primal: self.primal.iter().copied().map(known).collect(),
            dual: self.dual.iter().copied().map(known).collect(),
        }
    }

    /// Rebuild a model from plain data.
    ///
    /// Handles created for the model the snapshot was taken from can not be used with the new
    /// model; get new ones through `variable`.
    ///
    /// # Errors
    ///
    /// If a row refers to a variable that does not exist, if bounds are not ordered, or if there
    /// are more solution values than variables or rows.
    pub fn from_snapshot(snapshot: ModelSnapshot) -> Result<Self, ModelError> {
        let ModelSnapshot { variables, rows, objective_constant, primal, dual } = snapshot;

        if primal.len() > variables.len() {
            return Err(ModelError::UnknownVariable(primal.len() - 1));
        }
        if dual.len() > rows.len() {
            return Err(ModelError::UnknownRow(dual.len() - 1));
        }

        let mut model = Self::new();
        for variable in variables {
            let lower = variable.lower.unwrap_or(f64::NEG_INFINITY);
            let upper = variable.upper.unwrap_or(f64::INFINITY);
            if lower > upper {
                return Err(ModelError::EmptyBounds { lower, upper });
            }
            model.variables.push(VariableData {
                variable_type: variable.variable_type,
                cost: variable.cost,
                lower,
                upper,
                is_helper: variable.is_helper,
                is_convex: variable.is_convex,
            });
        }
        for row in rows {
            let lower = row.lower.unwrap_or(f64::NEG_INFINITY);
            let upper = row.upper.unwrap_or(f64::INFINITY);
            if lower > upper {
                return Err(ModelError::EmptyBounds { lower, upper });
            }
            if let Some(&(index, _)) = row.entries.iter().find(|&&(index, _)| index >= model.variables.len()) {
                return Err(ModelError::UnknownVariable(index));
            }
            model.rows.push(Row { lower, upper, entries: row.entries });
        }

        model.objective_constant = objective_constant;
        model.primal = expand(&primal, model.variables.len());
        model.dual = expand(&dual, model.rows.len());

        Ok(model)
    }
}
