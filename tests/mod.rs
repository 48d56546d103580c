//! # Integration tests
//!
//! Integration tests completely external from the crate. All code written in this module could be
//! written by an external user of the crate.
//!
//! The algorithms are compared against brute force on small random instances.
mod model;
mod shortest_path;
