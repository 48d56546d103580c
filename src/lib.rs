//! # Column generation building blocks
//!
//! Three parts that together make up a column generation solver for rostering-type problems:
//!
//! * shortest paths in topologically sorted DAGs, with resources and run-length constraints, used
//! as pricing problems;
//! * a builder for integer programs that are handed to an external solver;
//! * the master problem side of column generation for set partitioning problems, with fixing and
//! rounding heuristics.
#![warn(missing_docs)]

pub mod algorithm;
pub mod data;
pub mod error;

#[cfg(test)]
mod tests;
