//! This module contains the [`VnsSolver`] implementing a
//! [variable neighborhood search](https://en.wikipedia.org/wiki/Variable_neighborhood_search)
//! with k-shift kicks.
//! * The neighborhoods are indexed by the shift width k: neighborhood k swaps a
//!   node with the node k positions further along the tour.
//! * For each k (from 1 up to ⌈N/2⌉), the single best-improving k-shift is
//!   attempted; on success the kicked tour is refined with 2-opt and, if it
//!   beats the best tour seen by this solver, the search restarts at k = 1.
//! * If every k fails, the current local minimum is perturbed by one random
//!   swap, either sampled uniformly or weighted by normalized inverse kick
//!   cost, and the k-loop starts over.
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::Rng;

use crate::instance::TspInstance;
use crate::refinement::greedy_refinement;
use crate::tour::Tour;

use super::Metaheuristic;

/// A variable neighborhood search over the k-shift neighborhoods.
/// * `uniform_perturbation` selects how the escape swap is sampled once all
///   neighborhoods fail: uniformly, or proportionally to the normalized inverse
///   cost of the kicks evaluated in the failed sweep.
pub struct VnsSolver {
    tsp_instance: Arc<TspInstance>,
    uniform_perturbation: bool,
}

impl VnsSolver {
    /// Creates a new [`VnsSolver`] for the given instance.
    pub fn initialize(tsp_instance: Arc<TspInstance>, uniform_perturbation: bool) -> Self {
        Self {
            tsp_instance,
            uniform_perturbation,
        }
    }
}

impl Metaheuristic for VnsSolver {
    fn solve(&self, initial_tour: Tour, deadline: Instant, rng: &mut StdRng) -> Tour {
        let n = self.tsp_instance.get_number_of_nodes();
        let max_k = (n as f64 / 2.0).ceil() as usize;

        let mut best_tour = initial_tour.clone();
        let mut local_min = initial_tour;

        while Instant::now() < deadline {
            // inverse kick costs of the sweep, per (k, i); only tracked when the
            // perturbation is cost-weighted
            let mut inverse_costs = if self.uniform_perturbation {
                Vec::new()
            } else {
                vec![vec![0.0; n]; max_k]
            };
            let mut inverse_costs_sum = if self.uniform_perturbation {
                0.0
            } else {
                1.0 / local_min.get_total_distance()
            };

            let mut improved = false;
            let mut k = 1;
            while k <= max_k && Instant::now() < deadline {
                let mut kicked = local_min.clone();
                let kick_accepted = min_kopt_sequence(
                    &mut kicked,
                    k,
                    inverse_costs.get_mut(k - 1).map(|row| row.as_mut_slice()),
                    &mut inverse_costs_sum,
                );

                if kick_accepted {
                    greedy_refinement(&mut kicked);

                    if kicked.get_total_distance() < best_tour.get_total_distance() {
                        best_tour = kicked.clone();
                        local_min = kicked;
                        improved = true;
                        break;
                    }
                }
                k += 1;
            }

            if !improved && Instant::now() < deadline {
                self.perturb(&mut local_min, &inverse_costs, inverse_costs_sum, rng);
            }
        }

        best_tour
    }
}

impl VnsSolver {
    /// Applies one random swap to escape the current local minimum.
    ///
    /// Uniform mode draws the position and the shift width directly (a shift of
    /// 0 is an accepted null perturbation). Weighted mode walks the inverse
    /// kick costs of the last failed sweep and picks a (k, i) pair with
    /// probability proportional to its normalized inverse cost.
    fn perturb(
        &self,
        local_min: &mut Tour,
        inverse_costs: &[Vec<f64>],
        inverse_costs_sum: f64,
        rng: &mut StdRng,
    ) {
        let n = self.tsp_instance.get_number_of_nodes();

        let (first, step) = if self.uniform_perturbation {
            (rng.gen_range(0..n), rng.gen_range(0..n - 2))
        } else {
            let mut pick = None;
            'sweep: for (i, row) in inverse_costs.iter().enumerate() {
                for (j, &inverse_cost) in row.iter().enumerate() {
                    let bucket = ((inverse_costs_sum / inverse_cost) * 1000.0) as u64;
                    let choice = rng.gen_range(0..bucket.max(1));
                    if (choice as f64) < 1000.0 {
                        pick = Some((j, i + 1));
                        break 'sweep;
                    }
                }
            }
            pick.unwrap_or((0, 1))
        };

        let second = (first + step) % n;
        let delta = local_min.swap_step_delta(first, step);
        local_min.swap_positions(first, second, delta);
    }
}

/// Applies the best-improving k-shift kick to the tour: the swap of `v[i]` with
/// `v[(i+k) mod N]` minimizing the change of the incident edges (2 edges, or 4
/// when k > 2). Returns `false` (leaving the tour untouched) when no kick
/// improves.
///
/// When `inverse_costs` is given, the inverse of every kick's resulting cost is
/// recorded there and added to `inverse_costs_sum` for the weighted
/// perturbation.
fn min_kopt_sequence(
    tour: &mut Tour,
    k: usize,
    inverse_costs: Option<&mut [f64]>,
    inverse_costs_sum: &mut f64,
) -> bool {
    let n = tour.get_nodes().len();
    let tour_distance = tour.get_total_distance();

    let mut best_delta = 0.0;
    let mut best_index = None;

    let mut inverse_costs = inverse_costs;
    for i in 0..n {
        let delta = tour.swap_step_delta(i, k);

        if let Some(row) = inverse_costs.as_deref_mut() {
            row[i] = 1.0 / (delta + tour_distance);
            *inverse_costs_sum += row[i];
        }

        if delta < best_delta {
            best_delta = delta;
            best_index = Some(i);
        }
    }

    match best_index {
        Some(i) => {
            tour.swap_positions(i, (i + k) % n, best_delta);
            true
        }
        None => false,
    }
}
