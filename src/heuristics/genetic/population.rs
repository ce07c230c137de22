//! The [`Population`] of the genetic solver: the members together with the
//! aggregates that keep selection O(P) without rescans.
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::construction::nearest_neighborhood;
use crate::instance::TspInstance;
use crate::refinement::greedy_refinement;
use crate::tour::Tour;
use crate::Distance;

/// Scaling constant of the inverse-fitness aggregate: each member contributes
/// `1000 / fitness` to [`sum_inverse_prob`][Population::get_sum_inverse_prob].
pub const INVERSE_PROB_SCALE: f64 = 1000.0;

/// A fixed-size population of tours. Kept in sync on every replacement:
/// * `sum_fitness` — the sum of all member fitnesses (= tour costs),
/// * `sum_inverse_prob` — Σ 1000/fitness, the roulette normalizer,
/// * `best_index` — the fittest member,
/// * `worst` — the indices picked for replacement, refreshed per batch.
pub struct Population {
    members: Vec<Tour>,
    sum_fitness: f64,
    sum_inverse_prob: f64,
    best_index: usize,
    worst: Vec<usize>,
}

impl Population {
    /// Builds the initial population in parallel (on the current rayon pool):
    /// member i is a nearest-neighborhood tour starting at node `i mod N`,
    /// seeded with `base_seed + i + 1`, refined with 2-opt.
    pub fn initialize(
        tsp_instance: &Arc<TspInstance>,
        population_size: usize,
        grasp: bool,
        base_seed: u64,
    ) -> Population {
        let n = tsp_instance.get_number_of_nodes();

        let members: Vec<Tour> = (0..population_size)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(i as u64 + 1));
                let mut tour = nearest_neighborhood(tsp_instance, i % n, grasp, &mut rng);
                greedy_refinement(&mut tour);
                tour
            })
            .collect();

        let sum_fitness = members.iter().map(|m| m.get_total_distance()).sum();
        let sum_inverse_prob = members
            .iter()
            .map(|m| INVERSE_PROB_SCALE / m.get_total_distance())
            .sum();
        let best_index = Population::fittest_index(&members);

        Population {
            members,
            sum_fitness,
            sum_inverse_prob,
            best_index,
            worst: Vec::new(),
        }
    }

    fn fittest_index(members: &[Tour]) -> usize {
        let mut best_index = 0;
        for (i, member) in members.iter().enumerate() {
            if member.get_total_distance() < members[best_index].get_total_distance() {
                best_index = i;
            }
        }
        best_index
    }

    /// Roulette selection on inverse fitness: draws a uniform point and walks
    /// the members accumulating `100000000 / (sum_inverse_prob · fitness)`
    /// until the point is passed. The member ranges accumulate to exactly
    /// 100000 over the whole population, which is the draw range.
    pub fn roulette(&self, rng: &mut StdRng) -> usize {
        let point = rng.gen_range(0.0..100_000.0);

        let mut sum_ranges = 0.0;
        for (j, member) in self.members.iter().enumerate() {
            let range = 100_000_000.0 / (self.sum_inverse_prob * member.get_total_distance());
            if sum_ranges + range > point {
                return j;
            }
            sum_ranges += range;
        }
        self.members.len() - 1
    }

    /// Replaces the member in `slot` and updates all aggregates. Returns `true`
    /// if the new member is the fittest of the population.
    pub fn replace(&mut self, slot: usize, tour: Tour) -> bool {
        let old_fitness = self.members[slot].get_total_distance();
        let new_fitness = tour.get_total_distance();

        self.sum_inverse_prob += INVERSE_PROB_SCALE / new_fitness - INVERSE_PROB_SCALE / old_fitness;
        self.sum_fitness += new_fitness - old_fitness;
        self.members[slot] = tour;

        if slot == self.best_index {
            // the previous best was replaced; rescan
            self.best_index = Population::fittest_index(&self.members);
            return self.best_index == slot;
        }
        if new_fitness < self.members[self.best_index].get_total_distance() {
            self.best_index = slot;
            return true;
        }
        false
    }

    /// Refills the replacement set with the indices of the K highest-fitness
    /// members, in ascending fitness order.
    pub fn update_worst(&mut self, batch_size: usize) {
        let mut indices: Vec<usize> = (0..self.members.len()).collect();
        indices.sort_by(|&a, &b| {
            self.members[a]
                .get_total_distance()
                .partial_cmp(&self.members[b].get_total_distance())
                .unwrap()
        });
        self.worst = indices[self.members.len() - batch_size..].to_vec();
    }

    /// The replacement slot for the given batch cursor.
    pub fn worst_slot(&self, cursor: usize) -> usize {
        self.worst[cursor]
    }

    /// The members of the population.
    pub fn get_members(&self) -> &Vec<Tour> {
        &self.members
    }

    /// The fittest member.
    pub fn get_best(&self) -> &Tour {
        &self.members[self.best_index]
    }

    /// The sum of all member fitnesses.
    pub fn get_sum_fitness(&self) -> f64 {
        self.sum_fitness
    }

    /// The roulette normalizer Σ 1000/fitness.
    pub fn get_sum_inverse_prob(&self) -> f64 {
        self.sum_inverse_prob
    }

    /// The average member fitness.
    pub fn average_fitness(&self) -> Distance {
        self.sum_fitness / self.members.len() as f64
    }
}
