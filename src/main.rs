use std::env;
use std::sync::Arc;
use std::time::Duration;

use tour_solve::config::{Algorithm, Construction, SolverConfig};
use tour_solve::instance::TspInstance;
use tour_solve::solver::solve;

/// With this main function, you can run a metaheuristic solver with a provided
/// TSPLIB file.
fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 || args.len() > 5 {
        print_usage(args[0].as_str());
        std::process::exit(1);
    }

    let algorithm = match args[1].as_str() {
        "vns" => Algorithm::Vns,
        "tabu_search" => Algorithm::TabuSearch,
        "simulated_annealing" => Algorithm::SimulatedAnnealing,
        "genetic" => Algorithm::Genetic,
        _ => {
            eprintln!("Unknown solver: {}", args[1]);
            print_usage(args[0].as_str());
            std::process::exit(1);
        }
    };

    let deadline_seconds: u64 = args
        .get(3)
        .map(|arg| arg.parse().expect("deadline must be a number of seconds"))
        .unwrap_or(10);
    let num_workers: usize = args
        .get(4)
        .map(|arg| arg.parse().expect("worker count must be a number"))
        .unwrap_or(4);

    let tsp_instance = Arc::new(TspInstance::from_tsplib_file(&args[2], true).unwrap());

    let config = SolverConfig {
        algorithm,
        construction: Construction::NearestNeighborhood,
        num_workers,
        deadline: Duration::from_secs(deadline_seconds),
        ..SolverConfig::default()
    };

    let solution = solve(tsp_instance, &config).unwrap();

    println!("\nFinal tour: {:?}", solution.get_nodes());
    println!("Total cost: {}", solution.get_cost());
    println!(
        "\nRunning time: {:0.2}sec",
        solution.get_elapsed().as_secs_f64()
    );
}

fn print_usage(program_name: &str) {
    eprintln!(
        "Usage: {} <solver> <tsplib_file> [deadline_seconds] [num_workers]",
        program_name
    );
    eprintln!("  <solver>: vns | tabu_search | simulated_annealing | genetic");
}
