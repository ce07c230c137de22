//! This module contains the [`SimulatedAnnealingSolver`] implementing the
//! [simulated annealing metaheuristic](https://en.wikipedia.org/wiki/Simulated_annealing).
//! * Moves are swaps of a random node with the node 1 or 2 positions further
//!   along the tour.
//! * An improvement is always accepted (and followed by a 2-opt descent); a
//!   worsening move is accepted with probability e<sup>-∆/t</sup>, and the
//!   first accepted worsening move ends the inner loop and cools the schedule.
//! * The temperature follows `t = α^outer · t_max + t_min` and jumps back to
//!   `t_max` once it gets within 0.1 of `t_min`, so the search keeps reheating
//!   until the deadline.
//! * The acceptance probability is evaluated in a magnitude-factored way (see
//!   [`accept_worsening`]) so that it stays meaningful for large ∆/t.
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::Rng;

use crate::instance::TspInstance;
use crate::refinement::greedy_refinement;
use crate::tour::Tour;
use crate::Distance;

use super::Metaheuristic;

/// Geometric cooling factor of the temperature schedule.
pub const COOLING_FACTOR: f64 = 0.99;
/// Temperature the schedule starts from and reheats to.
pub const T_MAX: f64 = 5000.0;
/// Temperature floor; the schedule resets before reaching it.
pub const T_MIN: f64 = 100.0;

/// A simulated annealing solver with the fixed reheating schedule above.
pub struct SimulatedAnnealingSolver {
    tsp_instance: Arc<TspInstance>,
}

impl SimulatedAnnealingSolver {
    /// Creates a new [`SimulatedAnnealingSolver`] for the given instance.
    pub fn initialize(tsp_instance: Arc<TspInstance>) -> Self {
        Self { tsp_instance }
    }
}

impl Metaheuristic for SimulatedAnnealingSolver {
    fn solve(&self, initial_tour: Tour, deadline: Instant, rng: &mut StdRng) -> Tour {
        let n = self.tsp_instance.get_number_of_nodes();

        let mut best_tour = initial_tour.clone();
        let mut current = initial_tour;
        let mut temperature = T_MAX;
        let mut outer_iteration: i32 = 0;

        while Instant::now() < deadline {
            // inner loop: ends once a single worsening move is accepted
            loop {
                let first = rng.gen_range(0..n);
                let offset = if rng.gen_range(0..100) < 50 { 1 } else { 2 };
                let second = (first + offset) % n;

                let delta = current.swap_step_delta(first, offset);

                if delta < 0.0 {
                    current.swap_positions(first, second, delta);
                    greedy_refinement(&mut current);

                    if current.get_total_distance() < best_tour.get_total_distance() {
                        best_tour = current.clone();
                    }
                } else if delta > 0.0 && accept_worsening(delta, temperature, rng) {
                    current.swap_positions(first, second, delta);
                    break;
                }

                if Instant::now() >= deadline {
                    break;
                }
            }

            temperature = COOLING_FACTOR.powi(outer_iteration + 1) * T_MAX + T_MIN;
            if temperature - T_MIN < 0.1 {
                temperature = T_MAX;
                outer_iteration = 0;
            }
            outer_iteration += 1;
        }

        best_tour
    }
}

/// Decides whether to accept a worsening move of cost increase `delta` at the
/// given temperature, with overall probability e<sup>-∆/t</sup>.
///
/// The exponent is factored by powers of ten: with `x = ln 10`,
/// `m = ⌊(∆/t)/x⌋` and `c = exp(∆/t − m·x)`, acceptance requires m independent
/// Bernoulli(1/10) trials to all succeed, followed by a uniform draw below
/// `10/(10·c)`. This keeps the decision tractable when ∆/t is far beyond what
/// a single uniform draw could resolve.
pub fn accept_worsening(delta: Distance, temperature: f64, rng: &mut StdRng) -> bool {
    let exponent = delta / temperature;
    let magnitude = (exponent / std::f64::consts::LN_10).floor() as u32;
    let coefficient = (exponent - magnitude as f64 * std::f64::consts::LN_10).exp();

    for _ in 0..magnitude {
        if rng.gen_range(0..100) >= 10 {
            return false;
        }
    }

    let range = (10.0 * coefficient) as u32;
    rng.gen_range(0..range.max(1)) < 10
}
