use std::time::{Duration, Instant};

use log::warn;

use crate::error::TspError;
use crate::graph::{Graph, NodeId};
use crate::solver::{SolverResult, TspSolver};

/// One solver call on one instance.
#[derive(Debug)]
pub struct Measurement {
    pub solver: String,
    pub elapsed: Duration,
    pub outcome: Result<SolverResult, TspError>,
    /// Whether the solver returns the exact optimum.
    pub exact: bool,
}

impl Measurement {
    pub fn weight(&self) -> Option<u64> {
        self.outcome.as_ref().ok().map(|r| r.weight)
    }
}

#[derive(Debug)]
pub struct InstanceReport {
    pub nodes: usize,
    pub measurements: Vec<Measurement>,
}

impl InstanceReport {
    /// Weight reported by the first exact solver that succeeded.
    pub fn optimum(&self) -> Option<u64> {
        self.measurements
            .iter()
            .filter(|m| m.exact)
            .find_map(Measurement::weight)
    }

    /// Optimality gap of `m` in percent, when both it and the optimum are
    /// known.
    pub fn gap(&self, m: &Measurement) -> Option<f64> {
        Some(optimality_gap(m.weight()?, self.optimum()?))
    }
}

/// Percentage by which `weight` exceeds `optimum`.
pub fn optimality_gap(weight: u64, optimum: u64) -> f64 {
    if optimum == 0 {
        return 0.0;
    }
    (weight as f64 - optimum as f64) / optimum as f64 * 100.0
}

/// A solver entry in a benchmark run.
pub struct Entry {
    pub solver: Box<dyn TspSolver>,
    pub exact: bool,
}

impl Entry {
    pub fn heuristic<S: TspSolver + 'static>(solver: S) -> Self {
        Self {
            solver: Box::new(solver),
            exact: false,
        }
    }

    pub fn exact<S: TspSolver + 'static>(solver: S) -> Self {
        Self {
            solver: Box::new(solver),
            exact: true,
        }
    }
}

/// Times every solver on `graph`. A failing solver is recorded and logged,
/// the remaining solvers still run.
pub fn run_instance(graph: &Graph, source: NodeId, entries: &[Entry]) -> InstanceReport {
    let measurements = entries
        .iter()
        .map(|entry| {
            let start = Instant::now();
            let outcome = entry.solver.solve(graph, source);
            let elapsed = start.elapsed();
            if let Err(e) = &outcome {
                warn!("{} failed on {} nodes: {}", entry.solver.name(), graph.node_count(), e);
            }
            Measurement {
                solver: entry.solver.name().to_string(),
                elapsed,
                outcome,
                exact: entry.exact,
            }
        })
        .collect();

    InstanceReport {
        nodes: graph.node_count(),
        measurements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brute_force::BruteForce;
    use crate::christofides::Christofides;
    use crate::generator::{Generator, GeneratorConfig};
    use crate::graph::tests::square;
    use crate::nearest_neighbour::NearestNeighbour;
    use crate::solver::is_valid_tour;

    fn entries() -> Vec<Entry> {
        vec![
            Entry::exact(BruteForce::default()),
            Entry::heuristic(Christofides),
            Entry::heuristic(NearestNeighbour),
        ]
    }

    #[test]
    fn test_gap() {
        assert_eq!(optimality_gap(11, 11), 0.0);
        assert!((optimality_gap(15, 12) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_square_report() {
        let report = run_instance(&square(), 0, &entries());
        assert_eq!(report.nodes, 4);
        assert_eq!(report.optimum(), Some(11));
        for m in &report.measurements {
            assert_eq!(report.gap(m), Some(0.0));
        }
    }

    #[test]
    fn test_brute_force_lower_bound() {
        let gen = Generator::new(GeneratorConfig::default());
        for seed in 0..15 {
            let g = gen.generate_seeded(8, seed).unwrap();
            let report = run_instance(&g, 0, &entries());
            let optimum = report.optimum().unwrap();
            for m in &report.measurements {
                let result = m.outcome.as_ref().unwrap();
                assert!(is_valid_tour(&g, 0, &result.tour));
                assert!(result.weight >= optimum);
                assert!(report.gap(m).unwrap() >= 0.0);
            }
        }
    }

    #[test]
    fn test_failure_is_recorded() {
        let g = Generator::new(GeneratorConfig::default())
            .generate_seeded(11, 0)
            .unwrap();
        let report = run_instance(&g, 0, &entries());
        assert!(report.measurements[0].outcome.is_err());
        assert_eq!(report.optimum(), None);
        assert!(report.measurements[1].weight().is_some());
        assert_eq!(report.gap(&report.measurements[1]), None);
    }
}
