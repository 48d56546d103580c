//! # Algorithms
pub mod column_generation;
pub mod shortest_path;
