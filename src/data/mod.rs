//! # Storing of models in memory
//!
//! This module provides the data structures used to represent graphs and integer programs in
//! memory. Algorithms may introduce their specific data structures in `algorithm::my_algorithm`.

pub mod dag;
pub mod grid;
pub mod linear_program;
