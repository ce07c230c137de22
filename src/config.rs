//! This module contains the [`SolverConfig`], i.e., everything the
//! [driver][crate::solver] needs to know besides the instance itself.
use std::time::Duration;

use anyhow::{bail, Result};

use super::instance::TspInstance;

/// The metaheuristic run by every worker after construction and refinement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    /// Variable neighborhood search with k-shift kicks.
    Vns,
    /// Tabu search with a circular buffer of forbidden edges.
    TabuSearch,
    /// Simulated annealing with a magnitude-factored acceptance rule.
    SimulatedAnnealing,
    /// Steady-state genetic algorithm with order crossover and reversal mutation.
    Genetic,
}

/// The constructive heuristic used for starting tours.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Construction {
    /// Append the cheapest unvisited neighbor until the cycle closes.
    NearestNeighborhood,
    /// Insert the node of minimum extra mileage into the growing cycle.
    FarthestInsertion,
}

/// Configuration of a [`solve`][crate::solver::solve] run.
///
/// `Default` yields a 4-worker VNS with nearest-neighborhood construction, a
/// 10 second deadline, and entropy seeding.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// The metaheuristic to run.
    pub algorithm: Algorithm,
    /// The constructive heuristic for starting tours.
    pub construction: Construction,
    /// Randomize the constructors by choosing uniformly among the top-3 candidates.
    pub grasp: bool,
    /// Number of parallel workers (W ≥ 1).
    pub num_workers: usize,
    /// Keep spawning construct-and-refine waves until the deadline instead of
    /// running a single wave of metaheuristic workers.
    pub fixed_time_mode: bool,
    /// VNS perturbation sampling: uniform (`true`) or weighted by normalized
    /// inverse kick cost (`false`).
    pub uniform_perturbation: bool,
    /// Tabu buffer policy: reactive tenure (`true`) or fixed tenure (`false`).
    pub reactive_tenure: bool,
    /// Wall-clock budget of the whole search.
    pub deadline: Duration,
    /// Base RNG seed; 0 means entropy seeding.
    pub seed: u64,
    /// Genetic only: number of population members.
    pub population_size: usize,
    /// Genetic only: number of worst members replaced per batch (even, ≥ 2).
    pub worst_batch: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            algorithm: Algorithm::Vns,
            construction: Construction::NearestNeighborhood,
            grasp: false,
            num_workers: 4,
            fixed_time_mode: false,
            uniform_perturbation: true,
            reactive_tenure: false,
            deadline: Duration::from_secs(10),
            seed: 0,
            population_size: 1000,
            worst_batch: 10,
        }
    }
}

impl SolverConfig {
    /// Checks the configuration against the given instance. Called by
    /// [`solve`][crate::solver::solve] before any work starts.
    pub fn validate(&self, instance: &TspInstance) -> Result<()> {
        if instance.get_number_of_nodes() < 3 {
            bail!(
                "invalid config: instance must have at least 3 nodes, got {}",
                instance.get_number_of_nodes()
            );
        }
        if self.num_workers < 1 {
            bail!("invalid config: worker count must be at least 1");
        }
        if self.deadline.is_zero() {
            bail!("invalid config: deadline must be positive");
        }
        if self.algorithm == Algorithm::Genetic {
            if self.worst_batch < 2 || self.worst_batch % 2 != 0 {
                bail!(
                    "invalid config: worst batch must be even and at least 2, got {}",
                    self.worst_batch
                );
            }
            if self.population_size <= self.worst_batch {
                bail!(
                    "invalid config: population size {} must exceed the worst batch {}",
                    self.population_size,
                    self.worst_batch
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> TspInstance {
        TspInstance::new(vec![0.0, 3.0, 0.0], vec![0.0, 0.0, 4.0], true)
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(SolverConfig::default().validate(&triangle()).is_ok());
    }

    #[test]
    fn test_rejects_tiny_instance() {
        let instance = TspInstance::new(vec![0.0, 1.0], vec![0.0, 0.0], false);
        assert!(SolverConfig::default().validate(&instance).is_err());
    }

    #[test]
    fn test_rejects_zero_workers_and_zero_deadline() {
        let mut config = SolverConfig {
            num_workers: 0,
            ..SolverConfig::default()
        };
        assert!(config.validate(&triangle()).is_err());

        config.num_workers = 1;
        config.deadline = Duration::ZERO;
        assert!(config.validate(&triangle()).is_err());
    }

    #[test]
    fn test_rejects_odd_worst_batch() {
        let config = SolverConfig {
            algorithm: Algorithm::Genetic,
            worst_batch: 7,
            ..SolverConfig::default()
        };
        assert!(config.validate(&triangle()).is_err());
    }
}
