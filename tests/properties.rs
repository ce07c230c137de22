//! Property tests for the structural invariants: every emitted tour is a
//! permutation with a consistent cost, refinement reaches 2-opt local optima,
//! conversions round-trip, and the tabu buffer stays bounded.
use std::sync::Arc;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use tour_solve::construction::{farthest_insertion, nearest_neighborhood};
use tour_solve::heuristics::tabu_search::TabuList;
use tour_solve::instance::TspInstance;
use tour_solve::refinement::greedy_refinement;
use tour_solve::tour::Tour;

fn arb_points() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((0.0f64..1000.0, 0.0f64..1000.0), 3..40)
}

fn instance_from(points: &[(f64, f64)], integer_mode: bool) -> Arc<TspInstance> {
    Arc::new(TspInstance::new(
        points.iter().map(|p| p.0).collect(),
        points.iter().map(|p| p.1).collect(),
        integer_mode,
    ))
}

fn assert_permutation_with_consistent_cost(tour: &Tour, instance: &Arc<TspInstance>) {
    let n = instance.get_number_of_nodes();
    let mut seen = vec![false; n];
    for &node in tour.get_nodes() {
        assert!(!seen[node]);
        seen[node] = true;
    }
    assert!(seen.iter().all(|&s| s));

    let recomputed = Tour::new(tour.get_nodes().clone(), instance.clone());
    assert!((tour.get_total_distance() - recomputed.get_total_distance()).abs() < 1e-6);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn constructors_emit_valid_tours(
        points in arb_points(),
        seed in 1u64..10_000,
        grasp in any::<bool>(),
        integer_mode in any::<bool>(),
    ) {
        let instance = instance_from(&points, integer_mode);
        let n = instance.get_number_of_nodes();
        let mut rng = StdRng::seed_from_u64(seed);
        let first_node = (seed as usize) % n;

        let nn = nearest_neighborhood(&instance, first_node, grasp, &mut rng);
        assert_permutation_with_consistent_cost(&nn, &instance);
        prop_assert_eq!(nn.get_nodes()[0], first_node);

        let insertion = farthest_insertion(&instance, Some(first_node), grasp, &mut rng);
        assert_permutation_with_consistent_cost(&insertion, &instance);
    }

    #[test]
    fn refinement_reaches_two_opt_local_optimum(
        points in arb_points(),
        seed in 1u64..10_000,
    ) {
        let instance = instance_from(&points, false);
        let n = instance.get_number_of_nodes();
        let mut rng = StdRng::seed_from_u64(seed);

        let mut tour = nearest_neighborhood(&instance, (seed as usize) % n, false, &mut rng);
        let cost_before = tour.get_total_distance();
        greedy_refinement(&mut tour);

        prop_assert!(tour.get_total_distance() <= cost_before + 1e-9);
        assert_permutation_with_consistent_cost(&tour, &instance);

        // no remaining 2-opt move improves
        let succ = tour.to_successors();
        for i in 0..n {
            for j in 0..n {
                if j != i && j != succ[i] && succ[j] != i && succ[j] != succ[i] {
                    let delta = instance.get_distance(i, j)
                        + instance.get_distance(succ[i], succ[j])
                        - instance.get_distance(i, succ[i])
                        - instance.get_distance(j, succ[j]);
                    prop_assert!(delta >= -1e-10);
                }
            }
        }
    }

    #[test]
    fn successor_conversion_round_trips(
        points in arb_points(),
        seed in 1u64..10_000,
    ) {
        let instance = instance_from(&points, false);
        let n = instance.get_number_of_nodes();
        let mut rng = StdRng::seed_from_u64(seed);

        let tour = nearest_neighborhood(&instance, (seed as usize) % n, true, &mut rng);
        let succ = tour.to_successors();

        // the successor map is a single cycle covering all nodes
        let mut node = 0;
        let mut visited = vec![false; n];
        for _ in 0..n {
            prop_assert!(!visited[node]);
            visited[node] = true;
            node = succ[node];
        }
        prop_assert_eq!(node, 0);

        // rebuilding from successors preserves the cycle and the cost
        let rebuilt = Tour::from_successors(&succ, instance.clone());
        prop_assert_eq!(rebuilt.to_successors(), succ);
        prop_assert!(
            (rebuilt.get_total_distance() - tour.get_total_distance()).abs() < 1e-6
        );
    }

    #[test]
    fn swap_delta_agrees_with_recomputation(
        points in arb_points(),
        first in 0usize..40,
        step in 0usize..20,
    ) {
        let instance = instance_from(&points, false);
        let n = instance.get_number_of_nodes();
        let first = first % n;

        let tour = Tour::new((0..n).collect(), instance.clone());
        let delta = tour.swap_step_delta(first, step);

        let mut swapped = tour.get_nodes().clone();
        swapped.swap(first, (first + step) % n);
        let recomputed = Tour::new(swapped, instance);

        prop_assert!(
            (tour.get_total_distance() + delta - recomputed.get_total_distance()).abs() < 1e-6
        );
    }

    #[test]
    fn tabu_list_never_exceeds_capacity(
        capacity in 1usize..20,
        edges in prop::collection::vec((0usize..50, 0usize..50), 1..200),
    ) {
        let mut tabu_list = TabuList::new(capacity);
        for (round, &edge) in edges.iter().enumerate() {
            if round % 7 == 3 && capacity >= 2 {
                tabu_list.push_compressing(edge);
            } else {
                tabu_list.push(edge, false);
            }
            prop_assert!(tabu_list.occupied() <= capacity);
            prop_assert!(tabu_list.contains(edge.0, edge.1));
        }
    }
}
