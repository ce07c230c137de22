//! This module contains [`greedy_refinement`], the first-improvement 2-opt
//! local search that turns any tour into a 2-opt local optimum. It operates on
//! the successor representation of the tour.
use super::{tour::Tour, NodeIdx};

/// Cost changes below this threshold count as zero; guards the sweep loop
/// against floating-point drift.
pub(crate) const COST_EPS: f64 = 1e-10;

/// Applies the 2-opt move that removes the edges `(i, succ[i])` and
/// `(j, succ[j])` and reconnects the cycle as `(i, j)` and
/// `(succ[i], succ[j])`, by reversing the segment from `succ[i]` to `j`
/// inclusive.
pub(crate) fn reverse_segment(succ: &mut [NodeIdx], i: NodeIdx, j: NodeIdx) {
    let first_of_segment = succ[i];
    let mut segment = Vec::new();
    let mut next = first_of_segment;
    while next != j {
        segment.push(next);
        next = succ[next];
    }
    segment.push(j);

    let after_segment = succ[j];
    succ[i] = j;
    for w in (1..segment.len()).rev() {
        succ[segment[w]] = segment[w - 1];
    }
    succ[first_of_segment] = after_segment;
}

/// Refines the tour to a 2-opt local optimum with first-improvement sweeps.
///
/// Every ordered pair `(i, j)` with `i ≠ j`, `j ≠ succ[i]`, `succ[j] ≠ i` and
/// `succ[j] ≠ succ[i]` is a candidate; its cost change is
/// `d(i,j) + d(succ[i],succ[j]) − d(i,succ[i]) − d(j,succ[j])`. The first
/// negative candidate per node is applied and the sweep moves on. Sweeps repeat
/// until one of them leaves the cost unchanged (up to floating-point drift).
///
/// Afterwards the visit sequence is rebuilt starting from node 0.
pub fn greedy_refinement(tour: &mut Tour) {
    let tsp_instance = tour.get_instance().clone();
    let n = tsp_instance.get_number_of_nodes();

    let mut succ = tour.to_successors();
    let mut total_distance = tour.get_total_distance();

    loop {
        let check_distance = total_distance;

        for i in 0..n {
            let cost_i_succ = tsp_instance.get_distance(i, succ[i]);

            for j in 0..n {
                if j != i && j != succ[i] && succ[j] != i && succ[j] != succ[i] {
                    let delta = tsp_instance.get_distance(i, j)
                        + tsp_instance.get_distance(succ[i], succ[j])
                        - cost_i_succ
                        - tsp_instance.get_distance(j, succ[j]);

                    if delta < 0.0 {
                        reverse_segment(&mut succ, i, j);
                        total_distance += delta;
                        break;
                    }
                }
            }
        }

        if (check_distance - total_distance).abs() <= COST_EPS {
            break;
        }
    }

    // rebuild the visit sequence starting from node 0
    let mut nodes = Vec::with_capacity(n);
    let mut next = 0;
    for _ in 0..n {
        nodes.push(next);
        next = succ[next];
    }

    *tour = Tour::new_pre_computed(nodes, total_distance, tsp_instance);
}
