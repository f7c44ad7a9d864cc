use std::time::Duration;

use thiserror::Error;

use crate::graph::NodeId;

pub type Result<T> = std::result::Result<T, TspError>;

/// Everything a generator or solver call can fail with.
///
/// No variant carries a partial graph or tour: a failed call produces
/// nothing but the error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TspError {
    /// The instance cannot hold a Hamiltonian cycle (too small, or a
    /// stage of the solver could not complete on it).
    #[error("no tour exists on a graph with {nodes} node(s)")]
    InfeasibleInstance { nodes: usize },

    #[error("source node {node} is not in a graph with {nodes} node(s)")]
    UnknownSource { node: NodeId, nodes: usize },

    /// The metric generator ran out of full restarts.
    #[error("could not generate a metric graph on {nodes} nodes after {restarts} restarts")]
    GenerationInfeasible { nodes: usize, restarts: usize },

    #[error("{what} is limited to {limit}, instance needs {actual}")]
    ResourceExhausted {
        what: &'static str,
        limit: usize,
        actual: usize,
    },

    #[error("solver exceeded its time limit of {limit:?}")]
    Timeout { limit: Duration },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
