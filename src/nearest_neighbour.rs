use crate::error::{Result, TspError};
use crate::graph::{Graph, NodeId, Weight};
use crate::solver::{close_tour, ensure_solvable, SolverResult, TspSolver};

/// Greedy tour: always move to the closest unvisited node.
///
/// Neighbours are scanned in ascending node id and only a strictly smaller
/// weight replaces the current choice, so ties go to the lowest id.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighbour;

impl TspSolver for NearestNeighbour {
    fn name(&self) -> &str {
        "Nearest Neighbour"
    }

    fn solve(&self, graph: &Graph, source: NodeId) -> Result<SolverResult> {
        ensure_solvable(graph, source)?;
        let n = graph.node_count();

        let mut visited = vec![false; n];
        let mut path = Vec::with_capacity(n);
        let mut current = source;
        let mut weight = 0u64;

        visited[current] = true;
        path.push(current);
        while path.len() < n {
            let nearest = graph
                .neighbours(current)
                .filter(|&(v, _)| !visited[v])
                .fold(None, |best: Option<(NodeId, Weight)>, (v, w)| match best {
                    Some((_, bw)) if bw <= w => best,
                    _ => Some((v, w)),
                });
            let Some((next, w)) = nearest else {
                return Err(TspError::InfeasibleInstance { nodes: n });
            };
            visited[next] = true;
            path.push(next);
            weight += u64::from(w);
            current = next;
        }
        weight += u64::from(graph.weight(current, source));

        Ok(SolverResult {
            weight,
            tour: close_tour(&path, source)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brute_force::BruteForce;
    use crate::generator::{Generator, GeneratorConfig};
    use crate::graph::tests::square;
    use crate::solver::is_valid_tour;

    #[test]
    fn test_square_takes_cheapest_first() {
        let result = NearestNeighbour.solve(&square(), 0).unwrap();
        assert_eq!(result.tour[1], 1);
        assert_eq!(result.tour, vec![0, 1, 3, 2, 0]);
        assert_eq!(result.weight, 11);
    }

    #[test]
    fn test_ties_go_to_lowest_id() {
        let g = Graph::from_edges(
            4,
            &[
                (0, 1, 3),
                (0, 2, 3),
                (0, 3, 3),
                (1, 2, 3),
                (1, 3, 3),
                (2, 3, 3),
            ],
        )
        .unwrap();
        let result = NearestNeighbour.solve(&g, 2).unwrap();
        assert_eq!(result.tour, vec![2, 0, 1, 3, 2]);
        assert_eq!(result.weight, 12);
    }

    #[test]
    fn test_weight_matches_tour() {
        let gen = Generator::new(GeneratorConfig::default());
        for seed in 0..20 {
            let g = gen.generate_seeded(15, seed).unwrap();
            let result = NearestNeighbour.solve(&g, 4).unwrap();
            assert!(is_valid_tour(&g, 4, &result.tour));
            assert_eq!(result.weight, g.tour_weight(&result.tour));
        }
    }

    #[test]
    fn test_never_beats_brute_force() {
        let gen = Generator::new(GeneratorConfig::default());
        for seed in 0..10 {
            let g = gen.generate_seeded(7, seed).unwrap();
            let exact = BruteForce::default().solve(&g, 0).unwrap();
            let greedy = NearestNeighbour.solve(&g, 0).unwrap();
            assert!(greedy.weight >= exact.weight);
        }
    }

    #[test]
    fn test_repeated_runs_agree() {
        let g = Generator::new(GeneratorConfig::default())
            .generate_seeded(20, 11)
            .unwrap();
        for source in [0, 7, 19] {
            assert_eq!(
                NearestNeighbour.solve(&g, source).unwrap(),
                NearestNeighbour.solve(&g, source).unwrap()
            );
        }
    }

    #[test]
    fn test_rejects_single_node() {
        let g = Graph::from_edges(1, &[]).unwrap();
        assert_eq!(
            NearestNeighbour.solve(&g, 0),
            Err(TspError::InfeasibleInstance { nodes: 1 })
        );
    }
}
