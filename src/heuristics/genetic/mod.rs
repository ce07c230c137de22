//! This module contains the [`GeneticSolver`], a steady-state
//! [genetic algorithm](https://en.wikipedia.org/wiki/Genetic_algorithm) over a
//! fixed-size [`Population`] of tours.
//! * The population is built in parallel by W workers (nearest-neighborhood +
//!   2-opt with distinct seeds).
//! * Every epoch replaces the next slots of the worst-K batch: every 5th epoch
//!   with offspring of an order-preserving crossover, the others with reversal
//!   mutants. Each new member is refined with 2-opt before it enters.
//! * Parents are drawn by roulette on inverse fitness; the aggregates needed
//!   for the roulette are maintained incrementally.
//! * The global incumbent is challenged whenever a replacement produces a new
//!   population best.
mod population;

pub use population::Population;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use log::debug;
use rand::rngs::StdRng;

use crate::config::SolverConfig;
use crate::incumbent::IncumbentRegistry;
use crate::instance::TspInstance;
use crate::refinement::greedy_refinement;
use crate::tour::Tour;
use crate::NodeIdx;

/// A steady-state genetic solver. Owns the whole time budget of a run: the
/// driver calls [`solve`][GeneticSolver::solve] once instead of spawning
/// multi-start waves.
pub struct GeneticSolver {
    tsp_instance: Arc<TspInstance>,
    population_size: usize,
    worst_batch: usize,
    num_workers: usize,
    grasp: bool,
}

impl GeneticSolver {
    /// Creates a new [`GeneticSolver`] for the given instance and configuration.
    pub fn initialize(tsp_instance: Arc<TspInstance>, config: &SolverConfig) -> Self {
        Self {
            tsp_instance,
            population_size: config.population_size,
            worst_batch: config.worst_batch,
            num_workers: config.num_workers,
            grasp: config.grasp,
        }
    }

    /// Runs initialization and evolution until the deadline. The best tour is
    /// reported through the registry.
    pub fn solve(
        &self,
        registry: &IncumbentRegistry,
        deadline: Instant,
        rng: &mut StdRng,
        base_seed: u64,
    ) -> Result<()> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.num_workers)
            .build()
            .context("cannot build the population construction pool")?;

        let mut population = pool.install(|| {
            Population::initialize(
                &self.tsp_instance,
                self.population_size,
                self.grasp,
                base_seed,
            )
        });

        registry.challenge(population.get_best());
        debug!(
            "genetic: population ready, best {:0.2}, average {:0.2}",
            population.get_best().get_total_distance(),
            population.average_fitness()
        );

        let mut epoch: u64 = 0;
        let mut cursor = 0;

        while Instant::now() < deadline {
            if cursor % self.worst_batch == 0 {
                cursor = 0;
                population.update_worst(self.worst_batch);
            }

            if epoch % 5 == 0 {
                self.crossover_epoch(&mut population, &mut cursor, registry, rng);
                debug!(
                    "genetic: crossover epoch {}, incumbent {}, average {:0.2}",
                    epoch,
                    registry.best_cost(),
                    population.average_fitness()
                );
            } else {
                self.mutation_epoch(&mut population, &mut cursor, registry, rng);
                debug!(
                    "genetic: mutation epoch {}, incumbent {}, average {:0.2}",
                    epoch,
                    registry.best_cost(),
                    population.average_fitness()
                );
            }

            epoch += 1;
        }

        Ok(())
    }

    /// One crossover epoch: K/2 parent pairs, two offspring each, every
    /// offspring refined and placed into the next worst slot.
    fn crossover_epoch(
        &self,
        population: &mut Population,
        cursor: &mut usize,
        registry: &IncumbentRegistry,
        rng: &mut StdRng,
    ) {
        for _ in 0..self.worst_batch / 2 {
            let dad = population.roulette(rng);
            let mom = population.roulette(rng);

            let (offspring1, offspring2) = order_crossover(
                population.get_members()[dad].get_nodes(),
                population.get_members()[mom].get_nodes(),
            );

            for nodes in [offspring1, offspring2] {
                let mut tour = Tour::new(nodes, self.tsp_instance.clone());
                greedy_refinement(&mut tour);

                let slot = population.worst_slot(*cursor);
                if population.replace(slot, tour) {
                    registry.challenge(population.get_best());
                }
                *cursor += 1;
            }
        }
    }

    /// One mutation epoch: K parents, each mutated by reversing the second half
    /// of its tour, refined, and placed into the next worst slot.
    fn mutation_epoch(
        &self,
        population: &mut Population,
        cursor: &mut usize,
        registry: &IncumbentRegistry,
        rng: &mut StdRng,
    ) {
        for _ in 0..self.worst_batch {
            let dad = population.roulette(rng);
            let nodes = reversal_mutant(population.get_members()[dad].get_nodes());

            let mut tour = Tour::new(nodes, self.tsp_instance.clone());
            greedy_refinement(&mut tour);

            let slot = population.worst_slot(*cursor);
            if population.replace(slot, tour) {
                registry.challenge(population.get_best());
            }
            *cursor += 1;
        }
    }
}

/// Order-preserving crossover producing two offspring.
/// * Offspring 1 copies the second half of `dad` in place and fills the first
///   half with `mom`'s nodes in `mom`'s order, skipping duplicates.
/// * Offspring 2 is symmetric: `mom`'s first half in place, tail filled from
///   `dad`.
fn order_crossover(dad: &[NodeIdx], mom: &[NodeIdx]) -> (Vec<NodeIdx>, Vec<NodeIdx>) {
    let n = dad.len();
    let begin = n / 2;

    let mut offspring1 = vec![0; n];
    let mut taken1 = vec![false; n];
    for j in begin..n {
        offspring1[j] = dad[j];
        taken1[dad[j]] = true;
    }
    let mut fill1 = 0;
    for &node in mom {
        if !taken1[node] {
            offspring1[fill1] = node;
            fill1 += 1;
        }
    }

    let head = n - begin;
    let mut offspring2 = vec![0; n];
    let mut taken2 = vec![false; n];
    for j in 0..head {
        offspring2[j] = mom[j];
        taken2[mom[j]] = true;
    }
    let mut fill2 = head;
    for &node in dad {
        if !taken2[node] {
            offspring2[fill2] = node;
            fill2 += 1;
        }
    }

    (offspring1, offspring2)
}

/// Reversal mutation: the parent's tour with the fixed range `[N/2, N)`
/// reversed.
fn reversal_mutant(parent: &[NodeIdx]) -> Vec<NodeIdx> {
    let mut nodes = parent.to_vec();
    let begin = nodes.len() / 2;
    nodes[begin..].reverse();
    nodes
}
