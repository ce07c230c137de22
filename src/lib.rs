#![warn(missing_docs)]
//! This library provides a multi-start metaheuristic engine for the symmetric
//! Euclidean Traveling Salesman Problem (TSP).
//!
//! # Overview
//! ### Search pipeline
//! Given the coordinates of N points in the plane, the engine searches for a
//! minimum-cost Hamiltonian cycle within a wall-clock deadline:
//! - randomized [constructive starting tours][construction] (nearest-neighborhood and
//!   farthest-insertion, optionally randomized in GRASP fashion),
//! - a first-improvement [2-opt refiner][refinement],
//! - four [metaheuristics][heuristics]: [VNS][heuristics::vns] with k-shift kicks,
//!   [tabu search][heuristics::tabu_search] with a circular tabu buffer,
//!   [simulated annealing][heuristics::simulated_annealing] with a
//!   magnitude-factored acceptance rule, and a steady-state
//!   [genetic algorithm][heuristics::genetic] with order crossover and reversal
//!   mutation,
//! - a [multi-start driver][solver] that runs independent workers on OS threads and
//!   reconciles a single global [incumbent] under a mutex.
//!
//! ### Distance modes
//! Edge costs are either exact Euclidean distances or distances rounded to the
//! nearest integer (the TSPLIB `EUC_2D` convention), selected when the
//! [`TspInstance`][instance::TspInstance] is created.
//!
//! # How to use this library
//! Build a [`TspInstance`][instance::TspInstance] from coordinates (or a TSPLIB
//! file), pick a [`SolverConfig`][config::SolverConfig], and call
//! [`solve`][solver::solve]:
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tour_solve::config::{Algorithm, SolverConfig};
//! use tour_solve::instance::TspInstance;
//! use tour_solve::solver::solve;
//!
//! // right triangle with legs 3 and 4: the only tour has cost 12
//! let instance = Arc::new(TspInstance::new(
//!     vec![0.0, 3.0, 0.0],
//!     vec![0.0, 0.0, 4.0],
//!     true,
//! ));
//! let config = SolverConfig {
//!     algorithm: Algorithm::Vns,
//!     num_workers: 1,
//!     deadline: Duration::from_millis(100),
//!     seed: 1,
//!     ..SolverConfig::default()
//! };
//!
//! let solution = solve(instance, &config).unwrap();
//! assert_eq!(solution.get_cost().unwrap_integer(), 12);
//! assert_eq!(solution.get_nodes()[0], 0);
//! ```
//!
//! The engine makes no exactness guarantees; it reports the best tour found
//! when the deadline is reached. Asymmetric and non-Euclidean instances are
//! not supported.

pub mod config;
pub mod construction;
pub mod heuristics;
pub mod incumbent;
pub mod instance;
pub mod refinement;
pub mod solver;
pub mod tour;

/// A node index.
pub type NodeIdx = usize;

/// Distance between nodes.
pub type Distance = f64;
