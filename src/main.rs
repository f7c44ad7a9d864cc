use std::process;

use clap::Parser;
use log::{error, info, LevelFilter};
use rand::{rngs::StdRng, SeedableRng};

use metric_tsp::benchmark::{run_instance, Entry};
use metric_tsp::brute_force::BruteForce;
use metric_tsp::christofides::Christofides;
use metric_tsp::generator::{Generator, GeneratorConfig};
use metric_tsp::genetic::{Crossover, GeneticAlgorithm};
use metric_tsp::nearest_neighbour::NearestNeighbour;

#[derive(Parser)]
#[command(name = "metric-tsp")]
#[command(about = "Benchmark TSP solvers on random metric graphs")]
struct Args {
    /// Instance sizes to benchmark
    #[arg(long, num_args = 1.., default_values_t = [5usize, 6, 7, 8, 9])]
    nodes: Vec<usize>,

    /// Graphs generated per instance size
    #[arg(long, default_value_t = 10)]
    graphs: usize,

    /// Node every tour starts from
    #[arg(long, default_value_t = 0)]
    source: usize,

    /// RNG seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// smallest edge weight
    #[arg(long, default_value_t = 1)]
    min_weight: u32,

    /// largest edge weight
    #[arg(long, default_value_t = 10)]
    max_weight: u32,

    /// draws per edge before a node is retried
    #[arg(long, default_value_t = 50)]
    edge_retries: usize,

    /// attempts per node before the graph is restarted
    #[arg(long, default_value_t = 10)]
    node_retries: usize,

    /// full restarts before generation gives up
    #[arg(long, default_value_t = 1000)]
    max_restarts: usize,

    /// largest instance brute force is run on
    #[arg(long, default_value_t = 9)]
    brute_force_limit: usize,

    /// number of generations (GA)
    #[arg(long, default_value_t = 1000)]
    generations: usize,

    /// population size (GA)
    #[arg(long, default_value_t = 200)]
    pop_size: usize,

    /// crossover operator (GA)
    #[arg(long, value_enum, default_value_t = Crossover::SinglePoint)]
    crossover: Crossover,

    /// leave the genetic algorithm out
    #[arg(long)]
    skip_genetic: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(&args) {
        error!("{e}");
        process::exit(1);
    }
}

fn run(args: &Args) -> metric_tsp::Result<()> {
    let generator = Generator::new(GeneratorConfig {
        min_weight: args.min_weight,
        max_weight: args.max_weight,
        max_edge_retries: args.edge_retries,
        max_node_retries: args.node_retries,
        max_restarts: args.max_restarts,
    });
    generator.config().validate()?;

    let mut rng = StdRng::seed_from_u64(args.seed);

    println!("{}", "=".repeat(70));
    println!("TSP ALGORITHMS BENCHMARK");
    println!("{}", "=".repeat(70));

    for &num_nodes in &args.nodes {
        let entries = solvers(args, num_nodes);
        info!(
            "{} graph(s) of {} nodes, {} solver(s)",
            args.graphs,
            num_nodes,
            entries.len()
        );

        for graph_num in 0..args.graphs {
            let graph = generator.generate(num_nodes, &mut rng)?;

            println!("\nGraph #{} ({} nodes)", graph_num + 1, num_nodes);
            let report = run_instance(&graph, args.source, &entries);
            for m in &report.measurements {
                match (&m.outcome, report.gap(m)) {
                    (Ok(result), Some(gap)) if !m.exact => println!(
                        "  {:<20} {:>10.4}s  weight {:>5}  gap {:>6.2}%",
                        m.solver,
                        m.elapsed.as_secs_f64(),
                        result.weight,
                        gap
                    ),
                    (Ok(result), _) => println!(
                        "  {:<20} {:>10.4}s  weight {:>5}",
                        m.solver,
                        m.elapsed.as_secs_f64(),
                        result.weight
                    ),
                    (Err(e), _) => println!("  {:<20} failed: {}", m.solver, e),
                }
            }
        }
    }

    Ok(())
}

/// Solvers run on instances of `num_nodes`. Brute force is left out above
/// its limit.
fn solvers(args: &Args, num_nodes: usize) -> Vec<Entry> {
    let mut entries = Vec::new();
    if num_nodes <= args.brute_force_limit {
        entries.push(Entry::exact(BruteForce {
            max_nodes: args.brute_force_limit,
            time_limit: None,
        }));
    } else {
        info!("skipping brute force on {} nodes (too large)", num_nodes);
    }
    entries.push(Entry::heuristic(Christofides));
    entries.push(Entry::heuristic(NearestNeighbour));
    if !args.skip_genetic {
        entries.push(Entry::heuristic(GeneticAlgorithm {
            population_size: args.pop_size,
            generations: args.generations,
            crossover: args.crossover,
            seed: args.seed,
            ..GeneticAlgorithm::default()
        }));
    }
    entries
}
