use log::debug;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::error::{Result, TspError};
use crate::graph::{Graph, NodeId};
use crate::solver::{close_tour, ensure_solvable, SolverResult, TspSolver};

#[derive(Debug, Clone, Copy, PartialEq, clap::ValueEnum)]
pub enum Crossover {
    /// Prefix of the first parent, rest in the second parent's order.
    SinglePoint,
    /// Slice of the first parent kept in place, the gaps filled in the
    /// second parent's order starting after the slice.
    Order,
}

/// Permutation genetic algorithm over closed tours.
///
/// Seeded, so two runs with the same settings return the same tour.
#[derive(Debug, Clone)]
pub struct GeneticAlgorithm {
    pub population_size: usize,
    pub generations: usize,
    pub crossover_prob: f64,
    pub crossover: Crossover,
    pub mutation_prob: f64,
    pub tournament_size: usize,
    /// Best individuals copied unchanged into the next generation.
    pub elitism: usize,
    pub seed: u64,
}

impl Default for GeneticAlgorithm {
    fn default() -> Self {
        Self {
            population_size: 200,
            generations: 1000,
            crossover_prob: 0.9,
            crossover: Crossover::SinglePoint,
            mutation_prob: 0.1,
            tournament_size: 3,
            elitism: 5,
            seed: 0,
        }
    }
}

impl TspSolver for GeneticAlgorithm {
    fn name(&self) -> &str {
        "Genetic Algorithm"
    }

    fn solve(&self, graph: &Graph, source: NodeId) -> Result<SolverResult> {
        ensure_solvable(graph, source)?;
        self.validate()?;

        let (best, progress) = self.run(graph);
        if let Some((generation, min, max, avg)) = progress.last() {
            debug!(
                "genetic: generation {} min={} max={} avg={:.2}",
                generation, min, max, avg
            );
        }

        Ok(SolverResult {
            weight: graph.cycle_weight(&best),
            tour: close_tour(&best, source)?,
        })
    }
}

impl GeneticAlgorithm {
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 || self.tournament_size == 0 {
            return Err(TspError::InvalidConfig(
                "population and tournament sizes must be positive".to_string(),
            ));
        }
        if self.elitism > self.population_size {
            return Err(TspError::InvalidConfig(format!(
                "elitism {} exceeds population size {}",
                self.elitism, self.population_size
            )));
        }
        if !(0.0..=1.0).contains(&self.crossover_prob) || !(0.0..=1.0).contains(&self.mutation_prob)
        {
            return Err(TspError::InvalidConfig(
                "probabilities must lie in [0, 1]".to_string(),
            ));
        }
        Ok(())
    }

    /// Evolves a population and returns the best cycle ever seen, without
    /// its closing node, plus `(generation, min, max, avg)` per generation.
    pub fn run(&self, graph: &Graph) -> (Vec<NodeId>, Vec<(usize, u64, u64, f64)>) {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut population = self.initialize_population(graph.node_count(), &mut rng);
        let mut weights = evaluate(graph, &population);
        let mut progress = Vec::with_capacity(self.generations);

        let (mut best, mut best_weight) = fittest(&population, &weights);

        for i in 0..self.generations {
            population = self.evolve(&population, &weights, &mut rng);
            weights = evaluate(graph, &population);

            let min = weights.iter().copied().min().unwrap_or(u64::MAX);
            let max = weights.iter().copied().max().unwrap_or(0);
            let avg = weights.iter().sum::<u64>() as f64 / weights.len() as f64;
            progress.push((i, min, max, avg));

            if min < best_weight {
                (best, best_weight) = fittest(&population, &weights);
            }
        }

        (best, progress)
    }

    fn initialize_population<R: Rng>(&self, n: usize, rng: &mut R) -> Vec<Vec<NodeId>> {
        (0..self.population_size)
            .map(|_| {
                let mut ind: Vec<NodeId> = (0..n).collect();
                ind.shuffle(rng);
                ind
            })
            .collect()
    }

    fn evolve<R: Rng>(
        &self,
        population: &[Vec<NodeId>],
        weights: &[u64],
        rng: &mut R,
    ) -> Vec<Vec<NodeId>> {
        let mut ranked: Vec<usize> = (0..population.len()).collect();
        ranked.sort_by_key(|&i| weights[i]);

        let mut new_population: Vec<Vec<NodeId>> = ranked
            .iter()
            .take(self.elitism)
            .map(|&i| population[i].clone())
            .collect();

        while new_population.len() < self.population_size {
            let parent1 = self.tournament_selection(population, weights, rng);
            let parent2 = self.tournament_selection(population, weights, rng);
            let mut offspring = self.crossover(parent1, parent2, rng);
            self.mutate(&mut offspring, rng);
            new_population.push(offspring);
        }

        new_population
    }

    fn tournament_selection<'p, R: Rng>(
        &self,
        population: &'p [Vec<NodeId>],
        weights: &[u64],
        rng: &mut R,
    ) -> &'p [NodeId] {
        let mut best = rng.gen_range(0..population.len());
        for _ in 1..self.tournament_size {
            let idx = rng.gen_range(0..population.len());
            if weights[idx] < weights[best] {
                best = idx;
            }
        }
        &population[best]
    }

    fn crossover<R: Rng>(&self, parent1: &[NodeId], parent2: &[NodeId], rng: &mut R) -> Vec<NodeId> {
        let n = parent1.len();
        if n < 2 || rng.gen::<f64>() >= self.crossover_prob {
            return parent1.to_vec();
        }

        let mut taken = vec![false; n];
        match self.crossover {
            Crossover::SinglePoint => {
                let point = rng.gen_range(1..n);
                let mut child = parent1[..point].to_vec();
                for &v in &child {
                    taken[v] = true;
                }
                child.extend(parent2.iter().copied().filter(|&v| !taken[v]));
                child
            }
            Crossover::Order => {
                let a = rng.gen_range(0..n - 1);
                let b = rng.gen_range(a + 1..n);
                let mut child = vec![0; n];
                for i in a..=b {
                    child[i] = parent1[i];
                    taken[parent1[i]] = true;
                }
                let mut fill = parent2
                    .iter()
                    .cycle()
                    .skip(b + 1)
                    .take(n)
                    .copied()
                    .filter(|&v| !taken[v]);
                for i in (b + 1..n).chain(0..a) {
                    // Exactly n - (b - a + 1) nodes pass the filter.
                    if let Some(v) = fill.next() {
                        child[i] = v;
                    }
                }
                child
            }
        }
    }

    fn mutate<R: Rng>(&self, individual: &mut [NodeId], rng: &mut R) {
        if individual.len() < 2 || rng.gen::<f64>() >= self.mutation_prob {
            return;
        }
        let p1 = rng.gen_range(0..individual.len());
        let mut p2 = rng.gen_range(0..individual.len());
        while p2 == p1 {
            p2 = rng.gen_range(0..individual.len());
        }
        individual.swap(p1, p2);
    }
}

fn evaluate(graph: &Graph, population: &[Vec<NodeId>]) -> Vec<u64> {
    population.iter().map(|ind| graph.cycle_weight(ind)).collect()
}

fn fittest(population: &[Vec<NodeId>], weights: &[u64]) -> (Vec<NodeId>, u64) {
    weights
        .iter()
        .enumerate()
        .min_by_key(|&(_, &w)| w)
        .map(|(i, &w)| (population[i].clone(), w))
        .unwrap_or_default()
}
