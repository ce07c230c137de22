//! This module contains the multi-start driver: [`solve`] is the single entry
//! point of the engine.
//! * A wave consists of W workers on OS threads; each worker constructs a
//!   starting tour from a random node, refines it with 2-opt, runs the
//!   configured metaheuristic until the deadline, and finally offers its best
//!   tour to the shared [`IncumbentRegistry`] under the mutex.
//! * In fixed-time mode, fresh waves are spawned until the deadline; otherwise
//!   a single wave runs.
//! * The genetic algorithm manages its own parallelism and time budget, so it
//!   runs once instead of in waves.
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::{Algorithm, Construction, SolverConfig};
use super::construction::{farthest_insertion, nearest_neighborhood};
use super::heuristics::genetic::GeneticSolver;
use super::heuristics::simulated_annealing::SimulatedAnnealingSolver;
use super::heuristics::tabu_search::TabuSearchSolver;
use super::heuristics::vns::VnsSolver;
use super::heuristics::Metaheuristic;
use super::incumbent::{Cost, IncumbentRegistry};
use super::instance::TspInstance;
use super::refinement::greedy_refinement;
use super::NodeIdx;

/// The result of a [`solve`] run: the incumbent at the deadline.
pub struct Solution {
    cost: Cost,
    nodes: Vec<NodeIdx>,
    elapsed: Duration,
}

impl Solution {
    /// The cost of the best tour found.
    pub fn get_cost(&self) -> Cost {
        self.cost
    }

    /// The best tour found, starting at node 0 and following the cycle.
    pub fn get_nodes(&self) -> &Vec<NodeIdx> {
        &self.nodes
    }

    /// Wall-clock time of the whole run.
    pub fn get_elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Renders the solution as a JSON object (using [`serde_json`]).
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "cost": match self.cost {
                Cost::Integer(value) => serde_json::json!(value),
                Cost::Float(value) => serde_json::json!(value),
            },
            "tour": &self.nodes,
            "elapsed_seconds": self.elapsed.as_secs_f64(),
        })
    }
}

/// Searches for a minimum-cost tour of the instance within the configured
/// deadline and returns the incumbent when it is reached.
///
/// The configuration is validated before any work starts; an invalid
/// configuration (fewer than 3 nodes, no workers, zero deadline, inconsistent
/// population parameters) is reported synchronously as an error. A worker
/// panic aborts the whole search.
pub fn solve(tsp_instance: Arc<TspInstance>, config: &SolverConfig) -> Result<Solution> {
    config.validate(&tsp_instance)?;

    let start_time = Instant::now();
    let deadline = start_time + config.deadline;
    let registry = IncumbentRegistry::new(tsp_instance.is_integer_mode());

    info!(
        "solve: {:?} with {:?} construction, {} workers, {:?} budget",
        config.algorithm, config.construction, config.num_workers, config.deadline
    );

    match config.algorithm {
        Algorithm::Genetic => {
            let solver = GeneticSolver::initialize(tsp_instance.clone(), config);
            let mut rng = seeded_rng(config.seed, 1);
            solver.solve(&registry, deadline, &mut rng, config.seed)?;
        }
        _ => {
            let mut wave: u64 = 0;
            loop {
                run_wave(&tsp_instance, config, &registry, deadline, wave);
                wave += 1;

                if !config.fixed_time_mode || Instant::now() >= deadline {
                    break;
                }
                info!(
                    "wave {} finished, incumbent {}, spawning next wave",
                    wave,
                    registry.best_cost()
                );
            }
        }
    }

    let (cost, mut nodes) = registry
        .snapshot()
        .expect("at least one worker must finish with a tour");

    // report the cycle starting at node 0
    let zero_position = nodes
        .iter()
        .position(|&v| v == 0)
        .expect("tour must contain node 0");
    nodes.rotate_left(zero_position);

    Ok(Solution {
        cost,
        nodes,
        elapsed: start_time.elapsed(),
    })
}

/// Spawns one wave of W workers and joins them. A panicking worker propagates
/// through the scope and aborts the run.
fn run_wave(
    tsp_instance: &Arc<TspInstance>,
    config: &SolverConfig,
    registry: &IncumbentRegistry,
    deadline: Instant,
    wave: u64,
) {
    thread::scope(|scope| {
        for worker_id in 0..config.num_workers {
            let ordinal = wave * config.num_workers as u64 + worker_id as u64 + 1;
            scope.spawn(move || {
                run_worker(tsp_instance, config, registry, deadline, ordinal);
            });
        }
    });
}

/// One worker: construct, refine, improve until the deadline, then offer the
/// result to the registry.
fn run_worker(
    tsp_instance: &Arc<TspInstance>,
    config: &SolverConfig,
    registry: &IncumbentRegistry,
    deadline: Instant,
    ordinal: u64,
) {
    let mut rng = seeded_rng(config.seed, ordinal);
    let first_node = rng.gen_range(0..tsp_instance.get_number_of_nodes());

    let mut tour = match config.construction {
        Construction::NearestNeighborhood => {
            nearest_neighborhood(tsp_instance, first_node, config.grasp, &mut rng)
        }
        Construction::FarthestInsertion => {
            farthest_insertion(tsp_instance, Some(first_node), config.grasp, &mut rng)
        }
    };
    greedy_refinement(&mut tour);

    // in fixed-time mode the waves themselves are the search: every wave is a
    // fresh construct-and-refine restart, and the driver keeps spawning waves
    // until the deadline
    if !config.fixed_time_mode && Instant::now() < deadline {
        tour = match config.algorithm {
            Algorithm::Vns => {
                VnsSolver::initialize(tsp_instance.clone(), config.uniform_perturbation)
                    .solve(tour, deadline, &mut rng)
            }
            Algorithm::TabuSearch => {
                TabuSearchSolver::initialize(tsp_instance.clone(), config.reactive_tenure)
                    .solve(tour, deadline, &mut rng)
            }
            Algorithm::SimulatedAnnealing => {
                SimulatedAnnealingSolver::initialize(tsp_instance.clone())
                    .solve(tour, deadline, &mut rng)
            }
            Algorithm::Genetic => unreachable!("genetic runs outside the wave driver"),
        };
    }

    registry.challenge(&tour);
}

/// The RNG of a worker (or of the genetic epoch loop): seeded with
/// `base_seed · ordinal` for reproducible runs, from entropy when the base
/// seed is 0.
fn seeded_rng(base_seed: u64, ordinal: u64) -> StdRng {
    if base_seed == 0 {
        StdRng::from_entropy()
    } else {
        StdRng::seed_from_u64(base_seed.wrapping_mul(ordinal))
    }
}
