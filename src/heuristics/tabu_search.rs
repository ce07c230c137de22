//! This module contains the [`TabuSearchSolver`] implementing a
//! [tabu search](https://en.wikipedia.org/wiki/Tabu_search) over the 2-opt
//! neighborhood.
//! * A tabu is an *edge* that was recently removed from the tour, kept in a
//!   circular buffer ([`TabuList`]) of capacity ⌈N/5⌉; a 2-opt move is
//!   forbidden while an edge it would add is in the buffer.
//! * Each iteration applies the best legal 2-opt move unconditionally (the
//!   diversification step, which may worsen the tour) and, whenever that move
//!   improved, descends to a local minimum with a tabu-aware first-improvement
//!   refinement.
//! * The buffer either keeps a fixed tenure (drop the oldest when full) or, in
//!   reactive mode, compresses itself back towards ⌈N/10⌉ entries while the
//!   refinement keeps finding improvements.
use std::sync::Arc;
use std::time::Instant;

use log::warn;
use rand::rngs::StdRng;

use crate::instance::TspInstance;
use crate::refinement::{reverse_segment, COST_EPS};
use crate::tour::Tour;
use crate::{Distance, NodeIdx};

use super::Metaheuristic;

/// An undirected edge of the tour, stored as a node pair.
type TabuEdge = (NodeIdx, NodeIdx);

/// A circular buffer of forbidden edges with head and tail indices. The
/// occupancy is tracked by the solver (it drives the reactive policy).
pub struct TabuList {
    slots: Vec<Option<TabuEdge>>,
    start: usize,
    end: usize,
}

impl TabuList {
    /// Creates an empty buffer of the given capacity (the maximum tenure).
    pub fn new(capacity: usize) -> TabuList {
        TabuList {
            slots: vec![None; capacity],
            start: 0,
            end: capacity - 1,
        }
    }

    /// Appends an edge, overwriting the oldest slot once the buffer is full.
    /// `logically_full` forces the head to advance as if the buffer were full.
    pub fn push(&mut self, edge: TabuEdge, logically_full: bool) {
        let capacity = self.slots.len();
        self.end = (self.end + 1) % capacity;
        self.slots[self.end] = Some(edge);
        if self.end == self.start || logically_full {
            self.start = (self.start + 1) % capacity;
        }
    }

    /// Reactive compression: clears the two slots at the head, advances the
    /// head past them, and appends the edge at the tail.
    pub fn push_compressing(&mut self, edge: TabuEdge) {
        let capacity = self.slots.len();
        self.slots[self.start] = None;
        self.slots[(self.start + 1) % capacity] = None;
        self.start = (self.start + 2) % capacity;
        self.end = (self.end + 1) % capacity;
        self.slots[self.end] = Some(edge);
    }

    /// Whether the (unordered) edge between the two nodes is forbidden.
    pub fn contains(&self, node1: NodeIdx, node2: NodeIdx) -> bool {
        self.slots
            .iter()
            .flatten()
            .any(|&(a, b)| (a == node1 && b == node2) || (a == node2 && b == node1))
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.slots.iter().flatten().count()
    }
}

/// A tabu search over the 2-opt neighborhood in successor representation.
pub struct TabuSearchSolver {
    tsp_instance: Arc<TspInstance>,
    reactive_tenure: bool,
}

impl TabuSearchSolver {
    /// Creates a new [`TabuSearchSolver`] for the given instance; with
    /// `reactive_tenure` the buffer grows and shrinks between ⌈N/10⌉ and
    /// ⌈N/5⌉ entries instead of keeping a fixed tenure.
    pub fn initialize(tsp_instance: Arc<TspInstance>, reactive_tenure: bool) -> Self {
        Self {
            tsp_instance,
            reactive_tenure,
        }
    }
}

impl Metaheuristic for TabuSearchSolver {
    fn solve(&self, initial_tour: Tour, deadline: Instant, _rng: &mut StdRng) -> Tour {
        let n = self.tsp_instance.get_number_of_nodes();
        let min_tenure = (n as f64 / 10.0).ceil() as usize;
        let max_tenure = (n as f64 / 5.0).ceil() as usize;

        let mut succ = initial_tour.to_successors();
        let mut actual_cost = initial_tour.get_total_distance();
        let mut best_tour = initial_tour;

        let mut tabu_list = TabuList::new(max_tenure);
        let mut num_tabu_edges = 0;

        while Instant::now() < deadline {
            match self.diversification_move(&mut succ, &tabu_list) {
                Some((delta, removed_edge1, removed_edge2)) => {
                    tabu_list.push(removed_edge1, false);
                    tabu_list.push(removed_edge2, false);
                    if num_tabu_edges < max_tenure {
                        num_tabu_edges += 2;
                    }

                    actual_cost += delta;

                    if delta < 0.0 {
                        self.tabu_refinement(
                            &mut succ,
                            &mut tabu_list,
                            min_tenure,
                            &mut num_tabu_edges,
                            &mut actual_cost,
                        );
                    }
                }
                None => {
                    // every move is tabu: a no-op iteration, time advances
                    warn!("tabu search: no legal 2-opt move in this sweep");
                }
            }

            if actual_cost < best_tour.get_total_distance() {
                best_tour = Tour::new_pre_computed(
                    linearize(&succ),
                    actual_cost,
                    self.tsp_instance.clone(),
                );
            }
        }

        best_tour
    }
}

impl TabuSearchSolver {
    /// Applies the best legal 2-opt move — improving or not — and returns its
    /// delta together with the two removed edges. A move is legal if neither
    /// edge it would add is in the tabu list and its delta is meaningfully
    /// nonzero. Returns `None` when no legal move exists.
    fn diversification_move(
        &self,
        succ: &mut [NodeIdx],
        tabu_list: &TabuList,
    ) -> Option<(Distance, TabuEdge, TabuEdge)> {
        let n = self.tsp_instance.get_number_of_nodes();

        let mut delta_min = Distance::INFINITY;
        let mut best_pair = None;

        for i in 0..n {
            for j in 0..n {
                if j != i && j != succ[i] && succ[j] != i && succ[j] != succ[i] {
                    if tabu_list.contains(i, j) || tabu_list.contains(succ[i], succ[j]) {
                        continue;
                    }

                    let delta = self.tsp_instance.get_distance(i, j)
                        + self.tsp_instance.get_distance(succ[i], succ[j])
                        - self.tsp_instance.get_distance(i, succ[i])
                        - self.tsp_instance.get_distance(j, succ[j]);

                    if delta.abs() > 0.1 && delta < delta_min {
                        delta_min = delta;
                        best_pair = Some((i, j));
                    }
                }
            }
        }

        let (i, j) = best_pair?;
        let removed_edge1 = (i, succ[i]);
        let removed_edge2 = (j, succ[j]);
        reverse_segment(succ, i, j);

        Some((delta_min, removed_edge1, removed_edge2))
    }

    /// First-improvement 2-opt descent that skips moves adding a tabu edge.
    /// Every accepted improvement pushes the two removed edges into the buffer,
    /// following the fixed or reactive tenure policy.
    fn tabu_refinement(
        &self,
        succ: &mut [NodeIdx],
        tabu_list: &mut TabuList,
        min_tenure: usize,
        num_tabu_edges: &mut usize,
        actual_cost: &mut Distance,
    ) {
        let n = self.tsp_instance.get_number_of_nodes();
        let max_tenure = tabu_list.slots.len();

        loop {
            let check_cost = *actual_cost;

            for i in 0..n {
                let cost_i_succ = self.tsp_instance.get_distance(i, succ[i]);

                for j in 0..n {
                    if j != i && j != succ[i] && succ[j] != i && succ[j] != succ[i] {
                        if tabu_list.contains(i, j) || tabu_list.contains(succ[i], succ[j]) {
                            continue;
                        }

                        let delta = self.tsp_instance.get_distance(i, j)
                            + self.tsp_instance.get_distance(succ[i], succ[j])
                            - cost_i_succ
                            - self.tsp_instance.get_distance(j, succ[j]);

                        if delta < 0.0 {
                            self.remember_removed_edges(
                                tabu_list,
                                (i, succ[i]),
                                (j, succ[j]),
                                min_tenure,
                                max_tenure,
                                num_tabu_edges,
                            );

                            *actual_cost += delta;
                            reverse_segment(succ, i, j);
                            break;
                        }
                    }
                }
            }

            if (check_cost - *actual_cost).abs() <= COST_EPS {
                break;
            }
        }
    }

    fn remember_removed_edges(
        &self,
        tabu_list: &mut TabuList,
        edge1: TabuEdge,
        edge2: TabuEdge,
        min_tenure: usize,
        max_tenure: usize,
        num_tabu_edges: &mut usize,
    ) {
        if self.reactive_tenure {
            if *num_tabu_edges > min_tenure {
                tabu_list.push_compressing(edge1);
                *num_tabu_edges -= 1;
                tabu_list.push_compressing(edge2);
                *num_tabu_edges -= 1;
            } else if *num_tabu_edges == min_tenure {
                tabu_list.push(edge1, true);
                tabu_list.push(edge2, true);
            } else {
                tabu_list.push(edge1, false);
                tabu_list.push(edge2, false);
                *num_tabu_edges += 2;
            }
        } else {
            tabu_list.push(edge1, false);
            tabu_list.push(edge2, false);
            if *num_tabu_edges < max_tenure {
                *num_tabu_edges += 2;
            }
        }
    }
}

/// The visit sequence of a successor map, starting at node 0.
fn linearize(succ: &[NodeIdx]) -> Vec<NodeIdx> {
    let mut nodes = Vec::with_capacity(succ.len());
    let mut next = 0;
    for _ in 0..succ.len() {
        nodes.push(next);
        next = succ[next];
    }
    nodes
}
