//! End-to-end scenarios: every algorithm against small instances with known
//! optima, the berlin52 TSPLIB instance, distance-mode consistency, and
//! single-worker determinism.
use std::sync::Arc;
use std::time::Duration;

use tour_solve::config::{Algorithm, Construction, SolverConfig};
use tour_solve::instance::TspInstance;
use tour_solve::solver::{solve, Solution};
use tour_solve::tour::Tour;

fn triangle(integer_mode: bool) -> Arc<TspInstance> {
    Arc::new(TspInstance::new(
        vec![0.0, 3.0, 0.0],
        vec![0.0, 0.0, 4.0],
        integer_mode,
    ))
}

fn unit_square() -> Arc<TspInstance> {
    Arc::new(TspInstance::new(
        vec![0.0, 1.0, 1.0, 0.0],
        vec![0.0, 0.0, 1.0, 1.0],
        false,
    ))
}

/// 10 points on the boundary of a 3x4 rectangle; the optimal tour is the
/// perimeter of length 14.
fn rectangle_grid() -> Arc<TspInstance> {
    Arc::new(TspInstance::new(
        vec![0.0, 1.0, 2.0, 3.0, 3.0, 3.0, 2.0, 1.0, 0.0, 0.0],
        vec![0.0, 0.0, 0.0, 0.0, 2.0, 4.0, 4.0, 4.0, 4.0, 2.0],
        true,
    ))
}

fn assert_valid_solution(solution: &Solution, instance: &Arc<TspInstance>) {
    let n = instance.get_number_of_nodes();
    let mut seen = vec![false; n];
    for &node in solution.get_nodes() {
        assert!(!seen[node], "node {} appears twice", node);
        seen[node] = true;
    }
    assert!(seen.iter().all(|&s| s), "not all nodes are visited");
    assert_eq!(solution.get_nodes()[0], 0);

    let recomputed = Tour::new(solution.get_nodes().clone(), instance.clone());
    assert!(
        (solution.get_cost().as_float() - recomputed.get_total_distance()).abs() < 1.0,
        "reported cost {} does not match the tour ({})",
        solution.get_cost(),
        recomputed.get_total_distance()
    );
}

#[test]
fn triangle_all_algorithms_integer() {
    for algorithm in [
        Algorithm::Vns,
        Algorithm::TabuSearch,
        Algorithm::SimulatedAnnealing,
        Algorithm::Genetic,
    ] {
        let instance = triangle(true);
        let config = SolverConfig {
            algorithm,
            num_workers: 2,
            deadline: Duration::from_millis(200),
            seed: 1,
            population_size: 12,
            worst_batch: 4,
            ..SolverConfig::default()
        };
        let solution = solve(instance.clone(), &config).unwrap();

        assert_eq!(
            solution.get_cost().unwrap_integer(),
            12,
            "{:?} missed the triangle optimum",
            algorithm
        );
        assert_valid_solution(&solution, &instance);
    }
}

#[test]
fn triangle_real_mode() {
    let instance = triangle(false);
    let config = SolverConfig {
        num_workers: 1,
        deadline: Duration::from_millis(100),
        seed: 1,
        ..SolverConfig::default()
    };
    let solution = solve(instance, &config).unwrap();
    assert_eq!(solution.get_cost().unwrap_float(), 12.0);
}

#[test]
fn square_both_constructions_reach_optimum() {
    for construction in [
        Construction::NearestNeighborhood,
        Construction::FarthestInsertion,
    ] {
        let instance = unit_square();
        let config = SolverConfig {
            construction,
            num_workers: 2,
            deadline: Duration::from_millis(200),
            seed: 2,
            ..SolverConfig::default()
        };
        let solution = solve(instance.clone(), &config).unwrap();

        assert!(
            (solution.get_cost().unwrap_float() - 4.0).abs() < 1e-9,
            "{:?} missed the square optimum ({})",
            construction,
            solution.get_cost()
        );
        assert_valid_solution(&solution, &instance);
    }
}

#[test]
fn rectangle_grid_all_metaheuristics() {
    for algorithm in [
        Algorithm::Vns,
        Algorithm::TabuSearch,
        Algorithm::SimulatedAnnealing,
        Algorithm::Genetic,
    ] {
        let instance = rectangle_grid();
        let config = SolverConfig {
            algorithm,
            num_workers: 2,
            deadline: Duration::from_secs(1),
            seed: 1,
            population_size: 20,
            worst_batch: 4,
            ..SolverConfig::default()
        };
        let solution = solve(instance.clone(), &config).unwrap();

        assert_eq!(
            solution.get_cost().unwrap_integer(),
            14,
            "{:?} missed the perimeter tour",
            algorithm
        );
        assert_valid_solution(&solution, &instance);
    }
}

#[test]
fn berlin52_vns_within_three_percent() {
    let instance = Arc::new(
        TspInstance::from_tsplib_file("resources/tsp_test_instances/berlin52.tsp", true).unwrap(),
    );
    let config = SolverConfig {
        algorithm: Algorithm::Vns,
        num_workers: 4,
        deadline: Duration::from_secs(10),
        seed: 1,
        ..SolverConfig::default()
    };
    let solution = solve(instance.clone(), &config).unwrap();

    // known optimum of berlin52 is 7542
    assert!(
        solution.get_cost().unwrap_integer() <= (7542.0 * 1.03) as i64,
        "berlin52 vns cost {} is worse than 3% over the optimum",
        solution.get_cost()
    );
    assert_valid_solution(&solution, &instance);
}

#[test]
fn berlin52_genetic_within_ten_percent() {
    let instance = Arc::new(
        TspInstance::from_tsplib_file("resources/tsp_test_instances/berlin52.tsp", true).unwrap(),
    );
    let config = SolverConfig {
        algorithm: Algorithm::Genetic,
        num_workers: 4,
        deadline: Duration::from_secs(10),
        seed: 1,
        population_size: 500,
        worst_batch: 10,
        ..SolverConfig::default()
    };
    let solution = solve(instance.clone(), &config).unwrap();

    assert!(
        solution.get_cost().unwrap_integer() <= (7542.0 * 1.10) as i64,
        "berlin52 genetic cost {} is worse than 10% over the optimum",
        solution.get_cost()
    );
    assert_valid_solution(&solution, &instance);
}

#[test]
fn integer_mode_equals_rounded_real_mode_per_edge() {
    // same 20 points, both distance modes: each integer edge cost must be the
    // rounded real edge cost (a property of the oracle, not of any tour)
    let xs: Vec<f64> = (0..20).map(|i| ((i * 37) % 101) as f64 / 3.0).collect();
    let ys: Vec<f64> = (0..20).map(|i| ((i * 53) % 97) as f64 / 7.0).collect();

    let real = TspInstance::new(xs.clone(), ys.clone(), false);
    let rounded = TspInstance::new(xs, ys, true);

    for i in 0..20 {
        for j in 0..20 {
            assert_eq!(
                rounded.get_distance(i, j),
                real.get_distance(i, j).round(),
                "edge ({}, {})",
                i,
                j
            );
        }
    }
}

#[test]
fn single_worker_seeded_runs_are_identical() {
    // seed != 0 and W = 1: the search is a deterministic function of the seed
    // up to deadline timing, so a quickly-reached optimum makes runs identical
    let run = || {
        let config = SolverConfig {
            num_workers: 1,
            deadline: Duration::from_millis(500),
            seed: 1,
            ..SolverConfig::default()
        };
        solve(rectangle_grid(), &config).unwrap()
    };

    let first = run();
    let second = run();

    assert_eq!(first.get_nodes(), second.get_nodes());
    assert_eq!(
        first.get_cost().unwrap_integer(),
        second.get_cost().unwrap_integer()
    );
}
