use crate::error::{Result, TspError};
use crate::graph::{Graph, NodeId};

/// A tour and its total weight.
///
/// `tour` starts at the requested source and repeats it as its last
/// element, so it holds `n + 1` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverResult {
    pub weight: u64,
    pub tour: Vec<NodeId>,
}

/// Common contract of every TSP algorithm the benchmark runs.
///
/// `solve` is a pure function of the graph and source: it must not mutate
/// shared state, and it fails with [`TspError::InfeasibleInstance`] on
/// graphs with fewer than two nodes.
pub trait TspSolver: Send + Sync {
    fn name(&self) -> &str;

    fn solve(&self, graph: &Graph, source: NodeId) -> Result<SolverResult>;
}

/// Rejects graphs without a cycle and sources outside the graph.
pub fn ensure_solvable(graph: &Graph, source: NodeId) -> Result<()> {
    let nodes = graph.node_count();
    if nodes < 2 {
        return Err(TspError::InfeasibleInstance { nodes });
    }
    if source >= nodes {
        return Err(TspError::UnknownSource {
            node: source,
            nodes,
        });
    }
    Ok(())
}

/// Rotates `cycle` (given without its closing node) so it begins at
/// `source`, then appends `source` to close it.
pub fn close_tour(cycle: &[NodeId], source: NodeId) -> Result<Vec<NodeId>> {
    let start = cycle
        .iter()
        .position(|&v| v == source)
        .ok_or(TspError::UnknownSource {
            node: source,
            nodes: cycle.len(),
        })?;
    let mut tour = Vec::with_capacity(cycle.len() + 1);
    tour.extend_from_slice(&cycle[start..]);
    tour.extend_from_slice(&cycle[..start]);
    tour.push(source);
    Ok(tour)
}

/// Checks every tour invariant: `n + 1` entries, starts and ends at
/// `source`, and visits each node exactly once in between.
pub fn is_valid_tour(graph: &Graph, source: NodeId, tour: &[NodeId]) -> bool {
    let n = graph.node_count();
    if tour.len() != n + 1 || tour.first() != Some(&source) || tour.last() != Some(&source) {
        return false;
    }
    let mut seen = vec![false; n];
    for &v in &tour[..n] {
        if v >= n || seen[v] {
            return false;
        }
        seen[v] = true;
    }
    true
}
