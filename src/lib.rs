//! Random metric graph generation and TSP solvers.
//!
//! [`generator::Generator`] builds complete graphs that satisfy the
//! triangle inequality. Every algorithm implements [`solver::TspSolver`],
//! so the benchmark driver runs them side by side on the same instance.

pub mod benchmark;
pub mod brute_force;
pub mod christofides;
pub mod error;
pub mod euler;
pub mod generator;
pub mod genetic;
pub mod graph;
pub mod matching;
pub mod nearest_neighbour;
pub mod solver;
pub mod spanning_tree;

pub use error::{Result, TspError};
pub use graph::{Graph, NodeId, Weight};
pub use solver::{SolverResult, TspSolver};
