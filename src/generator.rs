//! Random metric graph generator.
//!
//! Nodes are added one at a time. Every edge from the new node `k` to an
//! earlier node `j` is drawn at random and redrawn until it closes a valid
//! triangle with each node already adjacent to both `j` and `k`. A node
//! whose edges cannot all be placed is retried from scratch, and a node
//! that keeps failing restarts the whole graph.
//!
//! Edges of node `k` are placed towards `j = 0, 1, ..`, so when `(j, k)`
//! is drawn the nodes adjacent to both ends are exactly `0..j`. Any triple
//! `a < b < c` is therefore checked when its last edge `(b, c)` lands,
//! which makes the incremental check equivalent to a full metric check.

use log::{debug, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::{Result, TspError};
use crate::graph::{Graph, Weight};

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Smallest edge weight that may be drawn. Must be positive.
    pub min_weight: Weight,
    /// Largest edge weight that may be drawn, inclusive.
    pub max_weight: Weight,
    /// Draws per edge before the node attempt is abandoned.
    pub max_edge_retries: usize,
    /// Attempts per node before the whole graph is restarted.
    pub max_node_retries: usize,
    /// Full restarts allowed after the first attempt.
    pub max_restarts: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_weight: 1,
            max_weight: 10,
            max_edge_retries: 50,
            max_node_retries: 10,
            max_restarts: 1000,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_weight == 0 {
            return Err(TspError::InvalidConfig(
                "min_weight must be positive".to_string(),
            ));
        }
        if self.min_weight > self.max_weight {
            return Err(TspError::InvalidConfig(format!(
                "min_weight {} exceeds max_weight {}",
                self.min_weight, self.max_weight
            )));
        }
        if self.max_edge_retries == 0 || self.max_node_retries == 0 {
            return Err(TspError::InvalidConfig(
                "edge and node retry budgets must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn generate_seeded(&self, num_nodes: usize, seed: u64) -> Result<Graph> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.generate(num_nodes, &mut rng)
    }

    /// Generates a complete metric graph on `num_nodes` nodes.
    ///
    /// Zero or one node yields a trivial graph. Fails with
    /// [`TspError::GenerationInfeasible`] once `max_restarts` restarts have
    /// all failed.
    pub fn generate<R: Rng>(&self, num_nodes: usize, rng: &mut R) -> Result<Graph> {
        self.config.validate()?;

        for restart in 0..=self.config.max_restarts {
            match self.try_build(num_nodes, rng) {
                Some(rows) => {
                    debug!(
                        "generated metric graph on {} nodes after {} restart(s)",
                        num_nodes, restart
                    );
                    return Ok(Graph::from_lower_triangle(&rows));
                }
                None => debug!("restarting generation of {} nodes ({})", num_nodes, restart + 1),
            }
        }

        Err(TspError::GenerationInfeasible {
            nodes: num_nodes,
            restarts: self.config.max_restarts,
        })
    }

    /// One full attempt. `rows[k]` holds the weights of edges `(j, k)`,
    /// `j < k`.
    fn try_build<R: Rng>(&self, num_nodes: usize, rng: &mut R) -> Option<Vec<Vec<Weight>>> {
        let mut rows: Vec<Vec<Weight>> = Vec::with_capacity(num_nodes);
        for _ in 0..num_nodes {
            let row = self.add_node(&rows, rng)?;
            rows.push(row);
        }
        Some(rows)
    }

    fn add_node<R: Rng>(&self, rows: &[Vec<Weight>], rng: &mut R) -> Option<Vec<Weight>> {
        for retry in 0..self.config.max_node_retries {
            if let Some(row) = self.try_connect(rows, rng) {
                return Some(row);
            }
            trace!("node {} attempt {} failed", rows.len(), retry + 1);
        }
        trace!("giving up on node {}", rows.len());
        None
    }

    /// Draws every edge of the next node. The candidate row is only
    /// returned once complete, so a failed attempt leaves `rows` untouched.
    fn try_connect<R: Rng>(&self, rows: &[Vec<Weight>], rng: &mut R) -> Option<Vec<Weight>> {
        let k = rows.len();
        let mut row = Vec::with_capacity(k);
        for j in 0..k {
            let w = self.draw_edge(rows, &row, j, rng)?;
            row.push(w);
        }
        Some(row)
    }

    fn draw_edge<R: Rng>(
        &self,
        rows: &[Vec<Weight>],
        row: &[Weight],
        j: usize,
        rng: &mut R,
    ) -> Option<Weight> {
        let (lo, hi) = (self.config.min_weight, self.config.max_weight);
        (0..self.config.max_edge_retries).find_map(|_| {
            let w = rng.gen_range(lo..=hi);
            closes_triangles(&rows[j], row, w).then_some(w)
        })
    }
}

/// Whether edge `(j, k)` of weight `jk` keeps every triangle `{j, k, w}`
/// valid, for all `w` already adjacent to both ends. `to_j[w]` and `to_k[w]`
/// are the weights of `(w, j)` and `(w, k)`.
fn closes_triangles(to_j: &[Weight], to_k: &[Weight], jk: Weight) -> bool {
    let jk = u64::from(jk);
    to_j.iter().zip(to_k).all(|(&jw, &kw)| {
        let (jw, kw) = (u64::from(jw), u64::from(kw));
        jk + jw >= kw && jk + kw >= jw && jw + kw >= jk
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_complete(g: &Graph, cfg: &GeneratorConfig) {
        for u in g.nodes() {
            for v in g.nodes() {
                if u != v {
                    let w = g.weight(u, v);
                    assert!(w >= cfg.min_weight && w <= cfg.max_weight);
                    assert_eq!(w, g.weight(v, u));
                }
            }
        }
    }

    #[test]
    fn test_trivial_sizes() {
        let gen = Generator::new(GeneratorConfig::default());
        assert_eq!(gen.generate_seeded(0, 1).unwrap().node_count(), 0);
        assert_eq!(gen.generate_seeded(1, 1).unwrap().node_count(), 1);
    }

    #[test]
    fn test_three_nodes_always_succeed() {
        let cfg = GeneratorConfig {
            max_restarts: 0,
            ..GeneratorConfig::default()
        };
        let gen = Generator::new(cfg.clone());
        for seed in 0..200 {
            let g = gen.generate_seeded(3, seed).unwrap();
            assert_eq!(g.node_count(), 3);
            assert!(g.is_metric());
            assert_complete(&g, &cfg);
        }
    }

    #[test]
    fn test_thirty_nodes() {
        let cfg = GeneratorConfig::default();
        let gen = Generator::new(cfg.clone());
        let g = gen.generate_seeded(30, 7).unwrap();
        assert_eq!(g.node_count(), 30);
        assert!(g.is_metric());
        assert_complete(&g, &cfg);
    }

    #[test]
    fn test_same_seed_same_graph() {
        let gen = Generator::new(GeneratorConfig::default());
        assert_eq!(
            gen.generate_seeded(12, 99).unwrap(),
            gen.generate_seeded(12, 99).unwrap()
        );
    }

    #[test]
    fn test_exhausted_restarts() {
        let gen = Generator::new(GeneratorConfig {
            min_weight: 1,
            max_weight: 1000,
            max_edge_retries: 1,
            max_node_retries: 1,
            max_restarts: 2,
        });
        assert_eq!(
            gen.generate_seeded(25, 3),
            Err(TspError::GenerationInfeasible {
                nodes: 25,
                restarts: 2
            })
        );
    }

    #[test]
    fn test_invalid_config() {
        let bad = [
            GeneratorConfig {
                min_weight: 0,
                ..GeneratorConfig::default()
            },
            GeneratorConfig {
                min_weight: 5,
                max_weight: 4,
                ..GeneratorConfig::default()
            },
            GeneratorConfig {
                max_edge_retries: 0,
                ..GeneratorConfig::default()
            },
        ];
        for cfg in bad {
            let gen = Generator::new(cfg);
            assert!(matches!(
                gen.generate_seeded(4, 0),
                Err(TspError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_closes_triangles() {
        // w(0,j)=2, w(0,k)=3: the new edge must lie in [1, 5].
        assert!(closes_triangles(&[2], &[3], 1));
        assert!(closes_triangles(&[2], &[3], 5));
        assert!(!closes_triangles(&[2], &[3], 6));
        assert!(!closes_triangles(&[2], &[8], 5));
        assert!(closes_triangles(&[], &[], 10));
    }

    proptest! {
        #[test]
        fn prop_generated_graph_is_metric(seed in any::<u64>(), n in 0usize..14) {
            let cfg = GeneratorConfig::default();
            let g = Generator::new(cfg.clone()).generate_seeded(n, seed).unwrap();
            prop_assert_eq!(g.node_count(), n);
            prop_assert!(g.is_metric(), "violation {:?}", g.triangle_violation());
            assert_complete(&g, &cfg);
        }

        #[test]
        fn prop_wide_range_is_metric(seed in any::<u64>(), n in 2usize..10) {
            let cfg = GeneratorConfig {
                min_weight: 1,
                max_weight: 100,
                max_restarts: 10_000,
                ..GeneratorConfig::default()
            };
            let g = Generator::new(cfg.clone()).generate_seeded(n, seed).unwrap();
            prop_assert!(g.is_metric(), "violation {:?}", g.triangle_violation());
            assert_complete(&g, &cfg);
        }
    }
}
