//! This module contains the [`TspInstance`], i.e., the point coordinates together
//! with the distance oracle.
use std::{
    fs::File,
    io::{BufRead, BufReader},
};

use anyhow::{bail, Context, Result};

use super::{Distance, NodeIdx};

type Coordinate = f64;
type NodeCount = usize;

/// A symmetric Euclidean TSP instance: N points in the plane and a distance mode.
/// Distances are computed on demand (no matrix is cached).
/// * In integer mode, every edge cost is rounded to the nearest integer (the
///   TSPLIB `EUC_2D` convention).
/// * Immutable after creation; shared between workers as `Arc<TspInstance>`.
pub struct TspInstance {
    number_of_nodes: NodeCount,
    x_coords: Vec<Coordinate>,
    y_coords: Vec<Coordinate>,
    integer_mode: bool,
}

// methods
impl TspInstance {
    /// Returns the distance between two nodes. Pure and symmetric; the distance
    /// of a node to itself is 0.
    pub fn get_distance(&self, from: NodeIdx, to: NodeIdx) -> Distance {
        let dx = self.x_coords[from] - self.x_coords[to];
        let dy = self.y_coords[from] - self.y_coords[to];
        let distance = (dx * dx + dy * dy).sqrt();
        if self.integer_mode {
            distance.round()
        } else {
            distance
        }
    }

    /// Returns the number of nodes in the instance.
    pub fn get_number_of_nodes(&self) -> NodeCount {
        self.number_of_nodes
    }

    /// Returns `true` if edge costs are rounded to the nearest integer.
    pub fn is_integer_mode(&self) -> bool {
        self.integer_mode
    }
}

// static
impl TspInstance {
    /// Creates a new [`TspInstance`] from the given coordinates.
    pub fn new(
        x_coords: Vec<Coordinate>,
        y_coords: Vec<Coordinate>,
        integer_mode: bool,
    ) -> TspInstance {
        assert_eq!(x_coords.len(), y_coords.len());
        TspInstance {
            number_of_nodes: x_coords.len(),
            x_coords,
            y_coords,
            integer_mode,
        }
    }

    /// Loads a [`TspInstance`] from a [TSPLIB
    /// file](http://comopt.ifi.uni-heidelberg.de/software/TSPLIB95/). Only
    /// symmetric coordinate instances (`TYPE: TSP` with a `NODE_COORD_SECTION`)
    /// are supported.
    pub fn from_tsplib_file(file_path: &str, integer_mode: bool) -> Result<TspInstance> {
        let file = File::open(file_path)
            .with_context(|| format!("cannot open TSPLIB file {}", file_path))?;
        let reader = BufReader::new(file);
        let mut line_iter = reader.lines().map(|l| l.unwrap().trim().to_string());

        let mut number_of_nodes: NodeCount = 0;
        let mut tsp_type: String = "".to_string();

        for line in line_iter.by_ref() {
            if line.starts_with("TYPE") {
                tsp_type = line.split(':').collect::<Vec<&str>>()[1].trim().to_string();
            }

            if line.starts_with("DIMENSION") {
                number_of_nodes = line.split(':').collect::<Vec<&str>>()[1].trim().parse()?;
                break;
            }
        }

        if tsp_type != "TSP" {
            bail!("unsupported TSPLIB type: {}", tsp_type);
        }

        for line in line_iter.by_ref() {
            if line.starts_with("NODE_COORD_SECTION") {
                break;
            }
        }

        let mut x_coords = Vec::with_capacity(number_of_nodes);
        let mut y_coords = Vec::with_capacity(number_of_nodes);
        for _ in 0..number_of_nodes {
            let line = line_iter.next().context("error reading node coordinates")?;
            let values = line.split_whitespace().collect::<Vec<&str>>();

            x_coords.push(values[1].parse()?);
            y_coords.push(values[2].parse()?);
        }

        Ok(TspInstance::new(x_coords, y_coords, integer_mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_oracle() {
        let instance = TspInstance::new(vec![0.0, 3.0, 0.0], vec![0.0, 0.0, 4.0], false);

        assert_eq!(instance.get_number_of_nodes(), 3);
        assert_eq!(instance.get_distance(0, 1), 3.0);
        assert_eq!(instance.get_distance(0, 2), 4.0);
        assert_eq!(instance.get_distance(1, 2), 5.0);
        assert_eq!(instance.get_distance(2, 1), 5.0);
        assert_eq!(instance.get_distance(1, 1), 0.0);
    }

    #[test]
    fn test_integer_mode_rounds_to_nearest() {
        let real = TspInstance::new(vec![0.0, 1.0, 1.0], vec![0.0, 1.0, 0.0], false);
        let rounded = TspInstance::new(vec![0.0, 1.0, 1.0], vec![0.0, 1.0, 0.0], true);

        assert_eq!(real.get_distance(0, 1), 2.0_f64.sqrt());
        assert_eq!(rounded.get_distance(0, 1), 1.0);
        assert_eq!(rounded.get_distance(0, 2), 1.0);
    }

    #[test]
    fn tsplib_tsp_file_test() {
        let instance =
            TspInstance::from_tsplib_file("resources/tsp_test_instances/berlin52.tsp", false)
                .unwrap();
        assert_eq!(instance.get_number_of_nodes(), 52);

        let distance_between_0_and_1 = (540.0 * 540.0 + 390.0 * 390.0 as Distance).sqrt();
        assert_eq!(instance.get_distance(0, 1), distance_between_0_and_1);
        assert_eq!(instance.get_distance(1, 0), distance_between_0_and_1);
    }
}
