//! # Disjunctions
//!
//! An exists block requires at least one of several groups of constraints to hold. Every group
//! gets a boolean indicator; constraints added while the block is open get a slack variable that
//! may only be nonzero when the current indicator is one. Closing the block forbids all
//! indicators to be one at the same time.
use tracing::debug;

use crate::data::linear_program::ip::{Exists, IntegerProgram};
use crate::data::linear_program::sum::{Sum, Variable};
use crate::error::ModelError;

impl IntegerProgram {
    /// Open an exists block and start its first group.
    ///
    /// # Errors
    ///
    /// If a block is already open.
    pub fn start_exists(&mut self) -> Result<Variable, ModelError> {
        if matches!(self.exists, Exists::Collecting(_)) {
            return Err(ModelError::NestedExists);
        }

        self.exists = Exists::Collecting(Vec::new());
        self.next_exists()
    }

    /// Start the next group of the open block.
    ///
    /// # Return value
    ///
    /// The indicator of the new group, which is one when the group may be violated.
    pub fn next_exists(&mut self) -> Result<Variable, ModelError> {
        if !matches!(self.exists, Exists::Collecting(_)) {
            return Err(ModelError::NotInExists);
        }

        let indicator = self.add_boolean(0.0);
        self.variables[indicator.index()].is_helper = true;
        if let Exists::Collecting(indicators) = &mut self.exists {
            indicators.push(indicator);
        }
        Ok(indicator)
    }

    /// Close the open block: at least one group has to hold.
    pub fn end_exists(&mut self) -> Result<(), ModelError> {
        let Exists::Collecting(indicators) = std::mem::take(&mut self.exists) else {
            return Err(ModelError::NotInExists);
        };
        debug!(groups = indicators.len(), "closing exists block");

        let bound = indicators.len() as f64 - 1.0;
        let total = indicators.into_iter().sum::<Sum>();
        self.add(total.at_most(bound))?;
        Ok(())
    }

    /// Run `body` once for every alternative, each in its own group of one exists block.
    ///
    /// # Errors
    ///
    /// If a block is already open, or if `body` fails. The block is left open on failure of
    /// `body`.
    pub fn exists<I, F>(&mut self, alternatives: I, mut body: F) -> Result<(), ModelError>
    where
        I: IntoIterator,
        F: FnMut(&mut Self, I::Item) -> Result<(), ModelError>,
    {
        self.start_exists()?;
        for (i, alternative) in alternatives.into_iter().enumerate() {
            if i > 0 {
                self.next_exists()?;
            }
            body(self, alternative)?;
        }
        self.end_exists()
    }
}
