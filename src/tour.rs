//! This module contains the [`Tour`], i.e., a cyclic permutation of all nodes of
//! the [`TspInstance`], in its visit-sequence form together with conversions to
//! and from the successor-map form.
use std::sync::Arc;

use itertools::Itertools;

use super::{instance::TspInstance, Distance, NodeIdx};

/// A tour of a [`TspInstance`]: every node index between 0 and N-1 appears
/// exactly once, and the cached `total_distance` equals the cost of the cyclic
/// visit sequence.
///
/// The equivalent successor form (`succ[node] = next node`) is produced by
/// [`to_successors`][Tour::to_successors]; both conversions are O(N).
#[derive(Clone)]
pub struct Tour {
    nodes: Vec<NodeIdx>,
    total_distance: Distance,
    tsp_instance: Arc<TspInstance>,
}

impl Tour {
    /// Creates a new [`Tour`] with the given nodes and computes the total distance.
    pub fn new(nodes: Vec<NodeIdx>, tsp_instance: Arc<TspInstance>) -> Tour {
        let total_distance = nodes
            .iter()
            .circular_tuple_windows()
            .map(|(&i, &j)| tsp_instance.get_distance(i, j))
            .sum();

        Tour::new_pre_computed(nodes, total_distance, tsp_instance)
    }

    /// Creates a new [`Tour`] with a total distance the caller has already
    /// accounted for (constructors and refiners track costs incrementally).
    pub(crate) fn new_pre_computed(
        nodes: Vec<NodeIdx>,
        total_distance: Distance,
        tsp_instance: Arc<TspInstance>,
    ) -> Tour {
        Tour {
            nodes,
            total_distance,
            tsp_instance,
        }
    }

    /// Creates a [`Tour`] from a successor map by walking the cycle starting at
    /// node 0.
    pub fn from_successors(succ: &[NodeIdx], tsp_instance: Arc<TspInstance>) -> Tour {
        let mut nodes = Vec::with_capacity(succ.len());
        let mut next = 0;
        for _ in 0..succ.len() {
            nodes.push(next);
            next = succ[next];
        }
        Tour::new(nodes, tsp_instance)
    }

    /// Returns the `nodes` of the tour.
    pub fn get_nodes(&self) -> &Vec<NodeIdx> {
        &self.nodes
    }

    /// Returns the `total_distance` of the tour.
    pub fn get_total_distance(&self) -> Distance {
        self.total_distance
    }

    /// Returns the instance this tour belongs to.
    pub fn get_instance(&self) -> &Arc<TspInstance> {
        &self.tsp_instance
    }

    /// Returns the successor map of the tour: `succ[node]` is the node visited
    /// right after `node`.
    pub fn to_successors(&self) -> Vec<NodeIdx> {
        let n = self.nodes.len();
        let mut succ = vec![0; n];
        for i in 0..n {
            succ[self.nodes[i]] = self.nodes[(i + 1) % n];
        }
        succ
    }

    /// Rotates the visit sequence in place so that it starts at the given node.
    /// The cycle (and therefore the total distance) is unchanged.
    pub fn rotate_to_start(&mut self, node: NodeIdx) {
        let position = self
            .nodes
            .iter()
            .position(|&v| v == node)
            .expect("node not contained in tour");
        self.nodes.rotate_left(position);
    }

    /// Computes the cost change of swapping the node at position `first` with
    /// the node `step` positions further along the tour (cyclically), without
    /// applying the swap.
    ///
    /// Two edges change when `step` ≤ 2 (the edges between the swapped nodes
    /// keep their total length); four edges change otherwise.
    pub fn swap_step_delta(&self, first: usize, step: usize) -> Distance {
        let n = self.nodes.len();
        let step = step % n;
        if step == n - 1 {
            // swapping with the cyclic predecessor: the same swap seen from the
            // other end, one position earlier
            return self.swap_step_delta((first + n - 1) % n, 1);
        }
        let second = (first + step) % n;
        let nodes = &self.nodes;
        let d = |a: NodeIdx, b: NodeIdx| self.tsp_instance.get_distance(a, b);

        let before_first = nodes[(first + n - 1) % n];
        let after_second = nodes[(second + 1) % n];

        let mut delta = d(before_first, nodes[second]) + d(nodes[first], after_second)
            - d(before_first, nodes[first])
            - d(nodes[second], after_second);

        if step > 2 {
            let after_first = nodes[(first + 1) % n];
            let before_second = nodes[(second + n - 1) % n];
            delta += d(nodes[second], after_first) + d(before_second, nodes[first])
                - d(nodes[first], after_first)
                - d(before_second, nodes[second]);
        }

        delta
    }

    /// Swaps the nodes at positions `i` and `j` and adds the pre-computed cost
    /// change (see [`swap_step_delta`][Tour::swap_step_delta]) to the total.
    pub fn swap_positions(&mut self, i: usize, j: usize, delta: Distance) {
        self.nodes.swap(i, j);
        self.total_distance += delta;
    }
}
