//! Clarke-Wright savings with a recharge-time term, and the tour-replacement
//! savings used as the acceptance oracle by every local search operator.

use super::costs::{get_weighted_costs_of_tour, CostWeights};
use crate::models::{Node, Tour, Vehicle};

/// Savings oracle: `(old, new, vehicle, battery_threshold) -> cost(old) - cost(new)`.
pub type SavingsFn<'a> = &'a dyn Fn(&Tour, &Tour, &Vehicle, f64) -> f64;

/// Smallest savings that count as an improvement. Equal-cost tours summed in
/// a different order differ by rounding noise well below this.
pub const IMPROVEMENT_EPSILON: f64 = 1e-9;

/// Time needed to recharge the energy spent over `distance`.
pub fn edge_recharging_cost(distance: f64, vehicle: &Vehicle) -> f64 {
    let battery = vehicle.battery();
    distance * battery.consumption_rate / battery.charging_rate
}

fn link_cost(distance: f64, vehicle: &Vehicle, service_time: f64) -> f64 {
    distance + edge_recharging_cost(distance, vehicle) + service_time
}

/// Savings of serving `i` and `j` consecutively instead of via the depot.
///
/// ```text
/// s(i, j) = c(i, 0) + c(0, j) - c(i, j)
/// c(a, b) = d(a, b) + d(a, b)·consumption/charging + service time(s)
/// ```
///
/// The depot link carries the service time of its customer, the direct
/// link carries both.
///
/// # Examples
///
/// ```
/// use u_cevrp::models::{BatteryProfile, Node, Vehicle};
/// use u_cevrp::evaluation::calculate_savings;
///
/// let v = Vehicle::new(1, 10, BatteryProfile::new(100.0, 1.0, 1.0), 100.0);
/// let i = Node::new(1, 1, 0.0, 3.0, 0.0);
/// let j = Node::new(2, 1, 0.0, 0.0, 4.0);
/// // d(i,0)=3, d(0,j)=4, d(i,j)=5; recharge doubles each term
/// assert!((calculate_savings(&i, &j, &v) - 4.0).abs() < 1e-10);
/// ```
pub fn calculate_savings(i: &Node, j: &Node, vehicle: &Vehicle) -> f64 {
    let depot = Node::depot();
    let d_i0 = i.distance_to(&depot);
    let d_0j = depot.distance_to(j);
    let d_ij = i.distance_to(j);

    let cost_i0 = link_cost(d_i0, vehicle, i.service_time());
    let cost_0j = link_cost(d_0j, vehicle, j.service_time());
    let cost_ij = link_cost(d_ij, vehicle, i.service_time() + j.service_time());
    cost_i0 + cost_0j - cost_ij
}

/// Cost reduction from replacing `old` with `new`, with unit weights.
///
/// Positive means `new` is cheaper.
pub fn get_savings(old: &Tour, new: &Tour, vehicle: &Vehicle, battery_threshold: f64) -> f64 {
    get_weighted_savings(old, new, vehicle, battery_threshold, &CostWeights::default())
}

/// Cost reduction from replacing `old` with `new` under explicit weights.
pub fn get_weighted_savings(
    old: &Tour,
    new: &Tour,
    vehicle: &Vehicle,
    battery_threshold: f64,
    weights: &CostWeights,
) -> f64 {
    let old_total = get_weighted_costs_of_tour(old, vehicle, battery_threshold, weights).total;
    let new_total = get_weighted_costs_of_tour(new, vehicle, battery_threshold, weights).total;
    old_total - new_total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BatteryProfile;
    use proptest::prelude::*;

    fn vehicle() -> Vehicle {
        Vehicle::new(1, 100, BatteryProfile::new(1000.0, 1.0, 100.0), 1000.0)
    }

    fn tour(coords: &[(f64, f64)]) -> Tour {
        let d = Node::depot();
        let mut nodes = vec![d.clone()];
        nodes.extend(
            coords
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| Node::new(i + 1, 1, 0.5, x, y)),
        );
        nodes.push(d);
        Tour::new(nodes).expect("valid")
    }

    #[test]
    fn test_edge_recharging_cost() {
        assert!((edge_recharging_cost(50.0, &vehicle()) - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_collinear_nodes_save_the_return_trip() {
        let v = vehicle();
        let i = Node::new(1, 1, 0.0, 10.0, 0.0);
        let j = Node::new(2, 1, 0.0, 20.0, 0.0);
        // 10 + 20 - 10 = 20, plus recharge 0.2
        assert!((calculate_savings(&i, &j, &v) - 20.2).abs() < 1e-10);
    }

    #[test]
    fn test_service_time_cancels_out() {
        let v = vehicle();
        let i = Node::new(1, 1, 7.0, 10.0, 0.0);
        let j = Node::new(2, 1, 3.0, 0.0, 10.0);
        let bare_i = Node::new(1, 1, 0.0, 10.0, 0.0);
        let bare_j = Node::new(2, 1, 0.0, 0.0, 10.0);
        let with_service = calculate_savings(&i, &j, &v);
        let without = calculate_savings(&bare_i, &bare_j, &v);
        assert!((with_service - without).abs() < 1e-10);
    }

    #[test]
    fn test_get_savings_sign() {
        let v = vehicle();
        let zigzag = tour(&[(10.0, 0.0), (0.0, 10.0), (10.0, 1.0)]);
        let straight = tour(&[(10.0, 0.0), (10.0, 1.0), (0.0, 10.0)]);
        assert!(get_savings(&zigzag, &straight, &v, 0.0) > 0.0);
        assert!(get_savings(&straight, &zigzag, &v, 0.0) < 0.0);
        assert_eq!(get_savings(&zigzag, &zigzag, &v, 0.0), 0.0);
    }

    #[test]
    fn test_weighted_savings_ignores_demand_when_zeroed() {
        let v = vehicle();
        let a = tour(&[(10.0, 0.0)]);
        let b = tour(&[(10.0, 0.0), (11.0, 0.0)]);
        let w = CostWeights::default().with_demand(0.0);
        let unit = get_savings(&a, &b, &v, 0.0);
        let weighted = get_weighted_savings(&a, &b, &v, 0.0, &w);
        assert!((weighted - unit - 1.0).abs() < 1e-10);
    }

    proptest! {
        #[test]
        fn prop_get_savings_is_antisymmetric(
            a in prop::collection::vec((-50.0f64..50.0, -50.0f64..50.0), 1..6),
            b in prop::collection::vec((-50.0f64..50.0, -50.0f64..50.0), 1..6),
            threshold in 0.0f64..100.0,
        ) {
            let v = vehicle();
            let ta = tour(&a);
            let tb = tour(&b);
            let forward = get_savings(&ta, &tb, &v, threshold);
            let backward = get_savings(&tb, &ta, &v, threshold);
            prop_assert!((forward + backward).abs() < 1e-9);
        }
    }
}
