//! Christofides approximation, within 1.5x of the optimum on metric graphs.
//!
//! 1. minimum spanning tree `T`
//! 2. nodes of odd degree in `T`
//! 3. minimum-weight perfect matching `M` on those nodes
//! 4. multigraph `H = T + M`, parallel edges kept
//! 5. Eulerian circuit of `H` from node 0
//! 6. shortcut: keep each node the first time the circuit reaches it
//! 7. rotate the cycle to the source and close it

use log::debug;

use crate::error::{Result, TspError};
use crate::euler::MultiGraph;
use crate::graph::{Graph, NodeId};
use crate::matching::min_weight_perfect_matching;
use crate::solver::{close_tour, ensure_solvable, SolverResult, TspSolver};
use crate::spanning_tree::{minimum_spanning_tree, odd_degree_nodes};

#[derive(Debug, Clone, Copy, Default)]
pub struct Christofides;

impl TspSolver for Christofides {
    fn name(&self) -> &str {
        "Christofides"
    }

    fn solve(&self, graph: &Graph, source: NodeId) -> Result<SolverResult> {
        ensure_solvable(graph, source)?;
        let n = graph.node_count();

        let tree = minimum_spanning_tree(graph);
        let odd = odd_degree_nodes(n, &tree);
        let matching = min_weight_perfect_matching(graph, &odd)?;
        debug!(
            "christofides: {} tree edges, {} odd nodes, {} matched pairs",
            tree.len(),
            odd.len(),
            matching.len()
        );

        let mut multigraph = MultiGraph::new(n);
        multigraph.extend(tree);
        multigraph.extend(matching);
        let circuit = multigraph.eulerian_circuit(0)?;

        let cycle = shortcut(n, &circuit);
        if cycle.len() != n {
            return Err(TspError::InfeasibleInstance { nodes: n });
        }

        Ok(SolverResult {
            weight: graph.cycle_weight(&cycle),
            tour: close_tour(&cycle, source)?,
        })
    }
}

/// Drops repeated visits from a walk, keeping first occurrences in order.
fn shortcut(n: usize, walk: &[NodeId]) -> Vec<NodeId> {
    let mut seen = vec![false; n];
    walk.iter()
        .copied()
        .filter(|&v| !std::mem::replace(&mut seen[v], true))
        .collect()
}
