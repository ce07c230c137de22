//! This module contains the implementation of the metaheuristics.

use std::time::Instant;

use rand::rngs::StdRng;

use super::tour::Tour;

pub mod genetic;
pub mod simulated_annealing;
pub mod tabu_search;
pub mod vns;

/// All deadline-driven single-tour metaheuristics implement this trait.
/// ([`GeneticSolver`][genetic::GeneticSolver] is population-based and runs
/// through its own entry point instead.)
pub trait Metaheuristic {
    /// Improves the given (already refined) tour until the deadline and returns
    /// the best tour seen. The deadline is polled at iteration boundaries, so
    /// the last iteration is allowed to finish.
    fn solve(&self, initial_tour: Tour, deadline: Instant, rng: &mut StdRng) -> Tour;
}
