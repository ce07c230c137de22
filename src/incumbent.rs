//! This module contains the [`Cost`] scalar and the [`IncumbentRegistry`], the
//! single shared record of the best tour seen so far.
use std::cmp::Ordering;
use std::fmt;
use std::sync::Mutex;

use log::info;

use super::{tour::Tour, Distance, NodeIdx};

/// A tour cost: an integer in integer-distance mode, a float otherwise.
/// Ordered within a variant; mixed comparisons go through the float value.
#[derive(Debug, Clone, Copy)]
pub enum Cost {
    /// An integer cost (integer-distance mode).
    Integer(i64),
    /// A floating point cost.
    Float(f64),
}

impl Cost {
    /// Converts a raw distance into a [`Cost`] of the given mode. Integer mode
    /// truncates (per-edge costs are already whole numbers there).
    pub fn from_distance(distance: Distance, integer_mode: bool) -> Cost {
        if integer_mode {
            Cost::Integer(distance as i64)
        } else {
            Cost::Float(distance)
        }
    }

    /// Unwraps [`Cost::Integer`]. Panics if other variant.
    pub fn unwrap_integer(self) -> i64 {
        match self {
            Cost::Integer(i) => i,
            _ => panic!("Expected Cost::Integer, got {:?}", self),
        }
    }

    /// Unwraps [`Cost::Float`]. Panics if other variant.
    pub fn unwrap_float(self) -> f64 {
        match self {
            Cost::Float(f) => f,
            _ => panic!("Expected Cost::Float, got {:?}", self),
        }
    }

    /// The cost as a float, regardless of variant.
    pub fn as_float(self) -> f64 {
        match self {
            Cost::Integer(i) => i as f64,
            Cost::Float(f) => f,
        }
    }
}

impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cost::Integer(a), Cost::Integer(b)) => a == b,
            _ => self.as_float() == other.as_float(),
        }
    }
}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Cost::Integer(a), Cost::Integer(b)) => a.partial_cmp(b),
            _ => self.as_float().partial_cmp(&other.as_float()),
        }
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Cost::Integer(i) => write!(f, "{}", i),
            Cost::Float(x) => write!(f, "{:0.2}", x),
        }
    }
}

struct Incumbent {
    best_cost: Cost,
    best_nodes: Vec<NodeIdx>,
}

/// The shared incumbent: best cost and best tour, guarded by a single mutex.
/// * Starts at +∞ with no tour and only ever improves.
/// * Workers hold the lock for the duration of a compare-and-copy; the stored
///   node sequence is always a copy, never aliased to a worker's working tour.
pub struct IncumbentRegistry {
    integer_mode: bool,
    incumbent: Mutex<Incumbent>,
}

impl IncumbentRegistry {
    /// Creates an empty registry for the given distance mode.
    pub fn new(integer_mode: bool) -> IncumbentRegistry {
        let initial = if integer_mode {
            Cost::Integer(i64::MAX)
        } else {
            Cost::Float(Distance::INFINITY)
        };
        IncumbentRegistry {
            integer_mode,
            incumbent: Mutex::new(Incumbent {
                best_cost: initial,
                best_nodes: Vec::new(),
            }),
        }
    }

    /// Offers a tour to the registry. Updates the incumbent and returns `true`
    /// if the tour is strictly better; ties keep the earlier holder.
    pub fn challenge(&self, tour: &Tour) -> bool {
        let cost = Cost::from_distance(tour.get_total_distance(), self.integer_mode);
        let mut incumbent = self.incumbent.lock().expect("incumbent mutex poisoned");
        if cost < incumbent.best_cost {
            incumbent.best_cost = cost;
            incumbent.best_nodes.clear();
            incumbent.best_nodes.extend_from_slice(tour.get_nodes());
            info!("new incumbent: {}", cost);
            true
        } else {
            false
        }
    }

    /// The best cost seen so far (+∞ if no tour was offered yet).
    pub fn best_cost(&self) -> Cost {
        self.incumbent
            .lock()
            .expect("incumbent mutex poisoned")
            .best_cost
    }

    /// Copies the incumbent out of the registry, or `None` if no tour was
    /// offered yet.
    pub fn snapshot(&self) -> Option<(Cost, Vec<NodeIdx>)> {
        let incumbent = self.incumbent.lock().expect("incumbent mutex poisoned");
        if incumbent.best_nodes.is_empty() {
            None
        } else {
            Some((incumbent.best_cost, incumbent.best_nodes.clone()))
        }
    }
}
