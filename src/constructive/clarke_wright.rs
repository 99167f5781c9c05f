//! Clarke-Wright savings construction with recharge-aware savings.
//!
//! # Algorithm
//!
//! Every node starts on its own tour (depot → node → depot). Each pass
//! computes, for every pair of tours, the savings of linking one endpoint of
//! the first to one endpoint of the second:
//!
//! ```text
//! s(i, j) = c(i, 0) + c(0, j) - c(i, j)
//! ```
//!
//! where `c` includes the recharge time of the hop (see
//! [`calculate_savings`]). Candidates are sorted by decreasing savings and
//! the first one whose merged tour passes every constraint is applied. The
//! pass then restarts on the updated plan. Construction ends when a pass
//! finds no feasible merge.
//!
//! # Complexity
//!
//! O(n³ log n) in the worst case: up to n merges, each preceded by an
//! O(n² log n) savings pass.
//!
//! # Reference
//!
//! Clarke, G. & Wright, J.W. (1964). "Scheduling of Vehicles from a Central
//! Depot to a Number of Delivery Points", *Operations Research* 12(4), 568-581.

use tracing::{debug, instrument};

use crate::error::CevrpError;
use crate::evaluation::{calculate_savings, is_feasible, IMPROVEMENT_EPSILON};
use crate::models::{Node, ProblemInstance, Tour, TourPlan, Vehicle};

/// Which endpoints of the two tours a saving links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Splice {
    /// first(a) with first(b): `rev(a) ++ b`
    FirstFirst,
    /// last(a) with first(b): `a ++ b`
    LastFirst,
    /// last(b) with first(a): `b ++ a`
    FirstLast,
    /// last(a) with last(b): `a ++ rev(b)`
    LastLast,
}

/// A savings value for merging tours `a` and `b` (plan positions, `a < b`).
#[derive(Debug)]
struct Saving {
    a: usize,
    b: usize,
    splice: Splice,
    value: f64,
}

impl Saving {
    fn merged(&self, tours: &[Tour]) -> Tour {
        let (a, b) = (&tours[self.a], &tours[self.b]);
        match self.splice {
            Splice::FirstFirst => a.reversed().merge(b),
            Splice::LastFirst => a.merge(b),
            Splice::FirstLast => b.merge(a),
            Splice::LastLast => a.merge(&b.reversed()),
        }
    }
}

fn endpoints(tour: &Tour) -> (&Node, &Node) {
    let interior = tour.interior();
    (&interior[0], &interior[interior.len() - 1])
}

/// Positive savings for every endpoint combination of every tour pair,
/// sorted by decreasing value.
fn savings_pass(tours: &[Tour], vehicle: &Vehicle) -> Vec<Saving> {
    let mut savings = Vec::new();
    for a in 0..tours.len() {
        for b in (a + 1)..tours.len() {
            let (first_a, last_a) = endpoints(&tours[a]);
            let (first_b, last_b) = endpoints(&tours[b]);
            let multi_a = tours[a].interior().len() > 1;
            let multi_b = tours[b].interior().len() > 1;

            let mut push = |splice, i: &Node, j: &Node| {
                let value = calculate_savings(i, j, vehicle);
                if value > IMPROVEMENT_EPSILON {
                    savings.push(Saving { a, b, splice, value });
                }
            };
            push(Splice::FirstFirst, first_a, first_b);
            if multi_a {
                push(Splice::LastFirst, last_a, first_b);
            }
            if multi_b {
                push(Splice::FirstLast, last_b, first_a);
            }
            if multi_a && multi_b {
                push(Splice::LastLast, last_a, last_b);
            }
        }
    }
    savings.sort_by(|x, y| y.value.total_cmp(&x.value));
    savings
}

/// Builds a tour plan over `nodes` with the Clarke-Wright savings heuristic.
///
/// Depot entries in `nodes` are ignored. Every merge is checked against all
/// four constraints using `vehicle` and `battery_threshold`, so the result is
/// feasible whenever every singleton tour is.
///
/// Merges are oriented so the two linked endpoints become neighbors. Only a
/// last-to-first link is the plain splice `a[..len-1] ++ b[1..]` of
/// [`Tour::merge`]; the other links reverse one of the tours first, e.g. a
/// first-to-first link of `[D, a, b, D]` and `[D, c, d, D]` yields
/// `[D, b, a, c, d, D]`.
///
/// # Errors
///
/// Returns [`CevrpError::Tour`] if `depot` is not a depot node.
///
/// # Examples
///
/// ```
/// use u_cevrp::models::{BatteryProfile, Node, Vehicle};
/// use u_cevrp::constructive::clarke_wright;
///
/// let nodes = vec![
///     Node::new(1, 10, 0.0, 1.0, 0.0),
///     Node::new(2, 10, 0.0, 2.0, 0.0),
///     Node::new(3, 10, 0.0, 3.0, 0.0),
/// ];
/// let vehicle = Vehicle::new(0, 30, BatteryProfile::new(100.0, 1.0, 10.0), 100.0);
///
/// let plan = clarke_wright(&nodes, &Node::depot(), &vehicle, 3.0).unwrap();
/// assert_eq!(plan.len(), 1);
/// assert!((plan.tours()[0].total_distance() - 6.0).abs() < 1e-10);
/// ```
#[instrument(skip_all, fields(nodes = nodes.len()))]
pub fn clarke_wright(
    nodes: &[Node],
    depot: &Node,
    vehicle: &Vehicle,
    battery_threshold: f64,
) -> Result<TourPlan, CevrpError> {
    let mut tours = nodes
        .iter()
        .filter(|n| !n.is_depot())
        .map(|n| Tour::around(depot, n))
        .collect::<Result<Vec<_>, _>>()?;

    loop {
        let savings = savings_pass(&tours, vehicle);
        let accepted = savings.iter().find_map(|s| {
            let merged = s.merged(&tours);
            is_feasible(&merged, vehicle, battery_threshold).then_some((s, merged))
        });

        let Some((saving, merged)) = accepted else {
            break;
        };
        debug!(
            savings = saving.value,
            splice = ?saving.splice,
            tour = %merged,
            "merged tours"
        );
        tours.swap_remove(saving.b);
        tours.swap_remove(saving.a);
        tours.push(merged);
    }

    debug!(tours = tours.len(), "construction finished");
    Ok(TourPlan::new(tours))
}

impl ProblemInstance {
    /// Clarke-Wright construction over a subset of this instance's nodes,
    /// evaluated with the reference vehicle.
    pub fn clarke_wright(&self, nodes: &[Node]) -> Result<TourPlan, CevrpError> {
        clarke_wright(
            nodes,
            self.depot(),
            self.reference_vehicle(),
            self.battery_threshold(),
        )
    }
}
