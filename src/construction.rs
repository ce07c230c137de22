//! This module contains the constructive heuristics that produce starting
//! tours: [`nearest_neighborhood`] and [`farthest_insertion`], each with an
//! optional GRASP mode that chooses uniformly among the best three candidates
//! instead of greedily taking the best one.
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;

use super::{instance::TspInstance, tour::Tour, Distance, NodeIdx};

/// The best three candidates seen during a greedy scan, ordered by cost.
/// Shifts worse candidates down as better ones arrive.
struct TopThree {
    costs: [Distance; 3],
    candidates: [Option<NodeIdx>; 3],
}

impl TopThree {
    fn new() -> TopThree {
        TopThree {
            costs: [Distance::INFINITY; 3],
            candidates: [None; 3],
        }
    }

    fn offer(&mut self, cost: Distance, candidate: NodeIdx) {
        if cost < self.costs[0] {
            self.costs[2] = self.costs[1];
            self.costs[1] = self.costs[0];
            self.costs[0] = cost;
            self.candidates[2] = self.candidates[1];
            self.candidates[1] = self.candidates[0];
            self.candidates[0] = Some(candidate);
        } else if cost < self.costs[1] {
            self.costs[2] = self.costs[1];
            self.costs[1] = cost;
            self.candidates[2] = self.candidates[1];
            self.candidates[1] = Some(candidate);
        } else if cost < self.costs[2] {
            self.costs[2] = cost;
            self.candidates[2] = Some(candidate);
        }
    }

    /// Uniform choice among the candidates that exist (3, 2, or 1).
    fn pick(&self, rng: &mut StdRng) -> Option<(Distance, NodeIdx)> {
        let available = self.candidates.iter().flatten().count();
        if available == 0 {
            return None;
        }
        let choice = rng.gen_range(0..available);
        Some((self.costs[choice], self.candidates[choice].unwrap()))
    }

    fn best(&self) -> Option<(Distance, NodeIdx)> {
        self.candidates[0].map(|candidate| (self.costs[0], candidate))
    }
}

/// Builds a tour with the nearest-neighborhood heuristic: starting from
/// `first_node`, repeatedly append the unvisited neighbor of minimum cost and
/// finally close the cycle.
///
/// With `grasp`, each step chooses uniformly among the three cheapest
/// unvisited neighbors (or fewer when fewer remain).
pub fn nearest_neighborhood(
    tsp_instance: &Arc<TspInstance>,
    first_node: NodeIdx,
    grasp: bool,
    rng: &mut StdRng,
) -> Tour {
    let n = tsp_instance.get_number_of_nodes();
    let mut nodes = Vec::with_capacity(n);
    let mut visited = vec![false; n];
    let mut total_distance = 0.0;
    let mut current_node = first_node;

    visited[current_node] = true;
    nodes.push(current_node);

    for _ in 1..n {
        let mut top = TopThree::new();
        for (next_node, visited) in visited.iter().enumerate() {
            if !visited {
                top.offer(tsp_instance.get_distance(current_node, next_node), next_node);
            }
        }

        let (distance, next_node) = if grasp {
            top.pick(rng).expect("unvisited node must exist")
        } else {
            top.best().expect("unvisited node must exist")
        };

        nodes.push(next_node);
        visited[next_node] = true;
        total_distance += distance;
        current_node = next_node;
    }

    total_distance += tsp_instance.get_distance(current_node, first_node);

    Tour::new_pre_computed(nodes, total_distance, tsp_instance.clone())
}

/// An edge of the partial cycle maintained by [`farthest_insertion`], with its
/// cached cost.
struct PartialEdge {
    from: NodeIdx,
    to: NodeIdx,
    cost: Distance,
}

/// Builds a tour with the farthest-insertion heuristic.
///
/// The seed edge is the farthest partner of `first_node` when one is given
/// (the multi-start case), otherwise the globally farthest pair. Each step
/// inserts the unvisited node `h` into the edge `(a, b)` minimizing the extra
/// mileage `d(h,a) + d(h,b) - d(a,b)`, splitting the edge in two.
///
/// With `grasp`, the step chooses uniformly among the three smallest extra
/// mileages while more than two nodes remain unplaced.
pub fn farthest_insertion(
    tsp_instance: &Arc<TspInstance>,
    first_node: Option<NodeIdx>,
    grasp: bool,
    rng: &mut StdRng,
) -> Tour {
    let n = tsp_instance.get_number_of_nodes();

    let (seed_a, seed_b) = match first_node {
        Some(start) => {
            let mut max_distance = 0.0;
            let mut partner = if start == 0 { 1 } else { 0 };
            for j in 0..n {
                if j != start {
                    let distance = tsp_instance.get_distance(start, j);
                    if distance > max_distance {
                        max_distance = distance;
                        partner = j;
                    }
                }
            }
            (start, partner)
        }
        None => {
            let mut max_distance = 0.0;
            let mut pair = (0, 1);
            for i in 0..n {
                for j in i + 1..n {
                    let distance = tsp_instance.get_distance(i, j);
                    if distance > max_distance {
                        max_distance = distance;
                        pair = (i, j);
                    }
                }
            }
            pair
        }
    };

    let seed_cost = tsp_instance.get_distance(seed_a, seed_b);
    let mut visited_nodes = vec![seed_a, seed_b];
    let mut visited = vec![false; n];
    visited[seed_a] = true;
    visited[seed_b] = true;

    let mut edges = vec![
        PartialEdge {
            from: seed_a,
            to: seed_b,
            cost: seed_cost,
        },
        PartialEdge {
            from: seed_b,
            to: seed_a,
            cost: seed_cost,
        },
    ];

    let mut total_distance = seed_cost * 2.0;

    while visited_nodes.len() < n {
        // for every unvisited node, its cheapest insertion edge; then the best
        // (or GRASP top-3) of those
        let mut top = TopThree::new();
        let mut best_edge_of = vec![0; n];
        for h in 0..n {
            if visited[h] {
                continue;
            }
            let mut min_delta = Distance::INFINITY;
            let mut min_edge = 0;
            for (k, edge) in edges.iter().enumerate() {
                let delta = tsp_instance.get_distance(h, edge.from)
                    + tsp_instance.get_distance(h, edge.to)
                    - edge.cost;
                if delta < min_delta {
                    min_delta = delta;
                    min_edge = k;
                }
            }
            best_edge_of[h] = min_edge;
            top.offer(min_delta, h);
        }

        let use_grasp = grasp && visited_nodes.len() < n - 2;
        let (delta, node) = if use_grasp {
            top.pick(rng).expect("unvisited node must exist")
        } else {
            top.best().expect("unvisited node must exist")
        };
        let edge_index = best_edge_of[node];

        total_distance += delta;

        // insert the node right after the from-endpoint of the split edge
        let position = visited_nodes
            .iter()
            .position(|&v| v == edges[edge_index].from)
            .expect("edge endpoint must be visited");
        visited_nodes.insert(position + 1, node);
        visited[node] = true;

        // split edge (from, to) into (from, node) and (node, to)
        let old_to = edges[edge_index].to;
        edges[edge_index].to = node;
        edges[edge_index].cost = tsp_instance.get_distance(edges[edge_index].from, node);
        edges.push(PartialEdge {
            from: node,
            to: old_to,
            cost: tsp_instance.get_distance(node, old_to),
        });
    }

    Tour::new_pre_computed(visited_nodes, total_distance, tsp_instance.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn unit_square() -> Arc<TspInstance> {
        Arc::new(TspInstance::new(
            vec![0.0, 1.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0, 1.0],
            false,
        ))
    }

    fn assert_is_permutation(tour: &Tour, n: usize) {
        let mut seen = vec![false; n];
        for &node in tour.get_nodes() {
            assert!(!seen[node], "node {} appears twice", node);
            seen[node] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_nearest_neighborhood_on_square() {
        let instance = unit_square();
        let mut rng = StdRng::seed_from_u64(1);
        let tour = nearest_neighborhood(&instance, 0, false, &mut rng);

        assert_is_permutation(&tour, 4);
        assert_eq!(tour.get_nodes()[0], 0);
        // walking the square never crosses the diagonal
        assert_eq!(tour.get_total_distance(), 4.0);
    }

    #[test]
    fn test_nearest_neighborhood_respects_first_node() {
        let instance = unit_square();
        let mut rng = StdRng::seed_from_u64(1);
        let tour = nearest_neighborhood(&instance, 2, false, &mut rng);

        assert_is_permutation(&tour, 4);
        assert_eq!(tour.get_nodes()[0], 2);
    }

    #[test]
    fn test_farthest_insertion_on_square() {
        let instance = unit_square();
        let mut rng = StdRng::seed_from_u64(1);
        let tour = farthest_insertion(&instance, None, false, &mut rng);

        assert_is_permutation(&tour, 4);
        assert!((tour.get_total_distance() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_farthest_insertion_multi_start_seed_pair() {
        let instance = unit_square();
        let mut rng = StdRng::seed_from_u64(1);
        let tour = farthest_insertion(&instance, Some(1), false, &mut rng);

        assert_is_permutation(&tour, 4);
        // the seed edge connects node 1 with its farthest partner, node 3
        assert_eq!(tour.get_nodes()[0], 1);
        assert!((tour.get_total_distance() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_grasp_tours_are_valid() {
        let instance = Arc::new(TspInstance::new(
            vec![0.0, 2.0, 5.0, 1.0, 4.0, 3.0, 0.5],
            vec![0.0, 1.0, 2.0, 4.0, 0.0, 3.0, 2.5],
            false,
        ));
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let nn = nearest_neighborhood(&instance, (seed as usize) % 7, true, &mut rng);
            assert_is_permutation(&nn, 7);

            let ins = farthest_insertion(&instance, Some((seed as usize) % 7), true, &mut rng);
            assert_is_permutation(&ins, 7);
        }
    }

    #[test]
    fn test_reported_cost_matches_recomputation() {
        let instance = Arc::new(TspInstance::new(
            vec![0.0, 2.0, 5.0, 1.0, 4.0, 3.0],
            vec![0.0, 1.0, 2.0, 4.0, 0.0, 3.0],
            true,
        ));
        let mut rng = StdRng::seed_from_u64(7);

        for tour in [
            nearest_neighborhood(&instance, 3, false, &mut rng),
            farthest_insertion(&instance, None, false, &mut rng),
        ] {
            let recomputed = Tour::new(tour.get_nodes().clone(), instance.clone());
            assert!(
                (tour.get_total_distance() - recomputed.get_total_distance()).abs() < 1e-9
            );
        }
    }
}
