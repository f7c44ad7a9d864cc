use std::time::{Duration, Instant};

use log::debug;

use crate::error::{Result, TspError};
use crate::graph::{Graph, NodeId};
use crate::solver::{close_tour, ensure_solvable, SolverResult, TspSolver};

/// Permutations between two deadline checks.
const DEADLINE_STRIDE: u64 = 4096;

/// Exact solver that scores every ordering of the nodes.
///
/// All `n!` orderings are visited in lexicographic order, including
/// rotations and reflections of the same cycle. The first strict minimum
/// wins, so the result is stable across runs.
#[derive(Debug, Clone)]
pub struct BruteForce {
    /// Largest instance accepted.
    pub max_nodes: usize,
    pub time_limit: Option<Duration>,
}

impl Default for BruteForce {
    fn default() -> Self {
        Self {
            max_nodes: 9,
            time_limit: None,
        }
    }
}

impl TspSolver for BruteForce {
    fn name(&self) -> &str {
        "Brute Force"
    }

    fn solve(&self, graph: &Graph, source: NodeId) -> Result<SolverResult> {
        ensure_solvable(graph, source)?;
        let n = graph.node_count();
        if n > self.max_nodes {
            return Err(TspError::ResourceExhausted {
                what: "brute force node count",
                limit: self.max_nodes,
                actual: n,
            });
        }

        let deadline = self.time_limit.map(|limit| (Instant::now() + limit, limit));
        let mut perm: Vec<NodeId> = graph.nodes().collect();
        let mut best = perm.clone();
        let mut best_weight = graph.cycle_weight(&perm);
        let mut visited = 1u64;

        while next_permutation(&mut perm) {
            visited += 1;
            if let Some((at, limit)) = deadline {
                if visited % DEADLINE_STRIDE == 0 && Instant::now() >= at {
                    return Err(TspError::Timeout { limit });
                }
            }
            let weight = graph.cycle_weight(&perm);
            if weight < best_weight {
                best_weight = weight;
                best.copy_from_slice(&perm);
            }
        }
        debug!("brute force scored {} orderings of {} nodes", visited, n);

        Ok(SolverResult {
            weight: best_weight,
            tour: close_tour(&best, source)?,
        })
    }
}

/// Advances `perm` to the next lexicographic permutation. Returns `false`
/// once `perm` is the last one, leaving it untouched.
fn next_permutation(perm: &mut [NodeId]) -> bool {
    let Some(i) = perm.windows(2).rposition(|w| w[0] < w[1]) else {
        return false;
    };
    let Some(j) = perm.iter().rposition(|&v| v > perm[i]) else {
        return false;
    };
    perm.swap(i, j);
    perm[i + 1..].reverse();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{Generator, GeneratorConfig};
    use crate::graph::tests::square;
    use crate::solver::is_valid_tour;

    #[test]
    fn test_next_permutation_order() {
        let mut perm = vec![0, 1, 2];
        let mut seen = vec![perm.clone()];
        while next_permutation(&mut perm) {
            seen.push(perm.clone());
        }
        assert_eq!(
            seen,
            vec![
                vec![0, 1, 2],
                vec![0, 2, 1],
                vec![1, 0, 2],
                vec![1, 2, 0],
                vec![2, 0, 1],
                vec![2, 1, 0],
            ]
        );
    }

    #[test]
    fn test_square_optimum() {
        let result = BruteForce::default().solve(&square(), 0).unwrap();
        assert_eq!(result.weight, 11);
        assert_eq!(result.tour, vec![0, 1, 3, 2, 0]);
    }

    #[test]
    fn test_rotated_to_source() {
        let g = square();
        let result = BruteForce::default().solve(&g, 2).unwrap();
        assert_eq!(result.weight, 11);
        assert_eq!(result.tour, vec![2, 0, 1, 3, 2]);
        assert!(is_valid_tour(&g, 2, &result.tour));
    }

    #[test]
    fn test_two_nodes() {
        let g = Graph::from_edges(2, &[(0, 1, 7)]).unwrap();
        let result = BruteForce::default().solve(&g, 1).unwrap();
        assert_eq!(result.weight, 14);
        assert_eq!(result.tour, vec![1, 0, 1]);
    }

    #[test]
    fn test_rejects_tiny_and_large() {
        let solver = BruteForce::default();
        let gen = Generator::new(GeneratorConfig::default());
        assert_eq!(
            solver.solve(&gen.generate_seeded(1, 0).unwrap(), 0),
            Err(TspError::InfeasibleInstance { nodes: 1 })
        );
        assert!(matches!(
            solver.solve(&gen.generate_seeded(10, 0).unwrap(), 0),
            Err(TspError::ResourceExhausted { limit: 9, actual: 10, .. })
        ));
    }

    #[test]
    fn test_time_limit() {
        let g = Generator::new(GeneratorConfig::default())
            .generate_seeded(9, 4)
            .unwrap();
        let solver = BruteForce {
            max_nodes: 9,
            time_limit: Some(Duration::ZERO),
        };
        assert!(matches!(solver.solve(&g, 0), Err(TspError::Timeout { .. })));
    }

    #[test]
    fn test_deterministic() {
        let g = Generator::new(GeneratorConfig::default())
            .generate_seeded(7, 21)
            .unwrap();
        let solver = BruteForce::default();
        assert_eq!(solver.solve(&g, 3).unwrap(), solver.solve(&g, 3).unwrap());
    }
}
