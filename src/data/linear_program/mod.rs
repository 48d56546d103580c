//! # Representing integer programs
//!
//! Variables are handles into a model. Linear expressions over them (`Sum`) are combined with
//! operators into constraints, pseudo-Boolean expressions are linearized with helper variables
//! when they are added to an `IntegerProgram`.
pub mod constraint;
pub mod elements;
pub mod ip;
pub mod pseudo_boolean;
pub mod sum;
