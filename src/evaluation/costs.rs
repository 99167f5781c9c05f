//! Tour cost model.
//!
//! The total cost of a tour is the weighted sum of four components:
//!
//! ```text
//! total = w_dis·distance + w_brc·battery_recharging + w_srv·service_time + w_dmd·demand
//! ```
//!
//! With the default unit weights this is the plain sum. Demand is a load
//! quantity rather than a distance or a time, so its weight is kept explicit.

use serde::{Deserialize, Serialize};

use crate::models::{Node, Tour, Vehicle};

/// A component of the tour cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CostType {
    Distance,
    BatteryRecharging,
    ServiceTime,
    Demand,
    Total,
}

impl CostType {
    /// All components in reporting order.
    pub const ALL: [CostType; 5] = [
        CostType::Distance,
        CostType::BatteryRecharging,
        CostType::ServiceTime,
        CostType::Demand,
        CostType::Total,
    ];

    /// Short label used in plot annotations.
    pub fn printable(self) -> &'static str {
        match self {
            CostType::Distance => "dis",
            CostType::BatteryRecharging => "brc",
            CostType::ServiceTime => "srv",
            CostType::Demand => "dmd",
            CostType::Total => "tot",
        }
    }
}

/// Cost components of one tour.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub distance: f64,
    pub battery_recharging: f64,
    pub service_time: f64,
    pub demand: f64,
    /// Weighted sum of the other four.
    pub total: f64,
}

impl CostBreakdown {
    pub fn get(&self, cost_type: CostType) -> f64 {
        match cost_type {
            CostType::Distance => self.distance,
            CostType::BatteryRecharging => self.battery_recharging,
            CostType::ServiceTime => self.service_time,
            CostType::Demand => self.demand,
            CostType::Total => self.total,
        }
    }
}

/// Weights of the cost components in the tour total.
///
/// # Examples
///
/// ```
/// use u_cevrp::evaluation::CostWeights;
///
/// let w = CostWeights::default().with_demand(0.0);
/// assert_eq!(w.total(10.0, 2.0, 3.0, 4.0), 15.0);
/// assert_eq!(CostWeights::default().total(10.0, 2.0, 3.0, 4.0), 19.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostWeights {
    pub distance: f64,
    pub battery_recharging: f64,
    pub service_time: f64,
    pub demand: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            distance: 1.0,
            battery_recharging: 1.0,
            service_time: 1.0,
            demand: 1.0,
        }
    }
}

impl CostWeights {
    pub fn with_distance(mut self, w: f64) -> Self {
        self.distance = w;
        self
    }

    pub fn with_battery_recharging(mut self, w: f64) -> Self {
        self.battery_recharging = w;
        self
    }

    pub fn with_service_time(mut self, w: f64) -> Self {
        self.service_time = w;
        self
    }

    pub fn with_demand(mut self, w: f64) -> Self {
        self.demand = w;
        self
    }

    /// Weighted sum of the four components.
    pub fn total(&self, distance: f64, battery_recharging: f64, service_time: f64, demand: f64) -> f64 {
        self.distance * distance
            + self.battery_recharging * battery_recharging
            + self.service_time * service_time
            + self.demand * demand
    }
}

/// Summed edge length of a node chain.
pub fn chain_distance(nodes: &[Node]) -> f64 {
    nodes.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

/// Time spent recharging while driving along `nodes`.
///
/// Simulates a fully charged copy of `vehicle` over each edge in order.
/// Whenever the level drops below `battery_threshold` after an edge, the
/// battery is refilled and `(capacity - level) / charging_rate` is added.
/// Otherwise the partial charge carries over to the next edge.
///
/// # Examples
///
/// ```
/// use u_cevrp::models::{BatteryProfile, Node, Vehicle};
/// use u_cevrp::evaluation::battery_recharging_cost;
///
/// let v = Vehicle::new(1, 10, BatteryProfile::new(20.0, 1.0, 2.0), 100.0);
/// let chain = [Node::depot(), Node::new(1, 0, 0.0, 12.0, 0.0), Node::depot()];
/// // after the first hop 8 < 10 remains: refill 12 units at rate 2
/// // after the return hop 8 < 10 again: another 6
/// assert!((battery_recharging_cost(&chain, &v, 10.0) - 12.0).abs() < 1e-10);
/// ```
pub fn battery_recharging_cost(nodes: &[Node], vehicle: &Vehicle, battery_threshold: f64) -> f64 {
    let mut battery = vehicle.recharged();
    let mut cost = 0.0;
    for w in nodes.windows(2) {
        battery.discharge_edge(&w[0], &w[1]);
        if battery.current_battery_level() < battery_threshold {
            cost += battery.recharge_time();
            battery.recharge();
        }
    }
    cost
}

/// Weighted cost breakdown of an arbitrary node chain.
///
/// Service time and demand are summed over every node, depot included.
pub fn chain_costs(
    nodes: &[Node],
    vehicle: &Vehicle,
    battery_threshold: f64,
    weights: &CostWeights,
) -> CostBreakdown {
    let distance = chain_distance(nodes);
    let battery_recharging = battery_recharging_cost(nodes, vehicle, battery_threshold);
    let service_time: f64 = nodes.iter().map(Node::service_time).sum();
    let demand: f64 = nodes.iter().map(|n| f64::from(n.demand())).sum();
    CostBreakdown {
        distance,
        battery_recharging,
        service_time,
        demand,
        total: weights.total(distance, battery_recharging, service_time, demand),
    }
}

/// Cost breakdown of a tour with unit weights.
///
/// # Examples
///
/// ```
/// use u_cevrp::models::{BatteryProfile, Node, Tour, Vehicle};
/// use u_cevrp::evaluation::get_costs_of_tour;
///
/// let d = Node::depot();
/// let tour = Tour::new(vec![d.clone(), Node::new(1, 2, 1.5, 3.0, 4.0), d]).unwrap();
/// let v = Vehicle::new(1, 10, BatteryProfile::new(1000.0, 1.0, 1.0), 100.0);
///
/// let costs = get_costs_of_tour(&tour, &v, 0.0);
/// assert!((costs.distance - 10.0).abs() < 1e-10);
/// assert_eq!(costs.battery_recharging, 0.0);
/// assert!((costs.total - 13.5).abs() < 1e-10);
/// ```
pub fn get_costs_of_tour(tour: &Tour, vehicle: &Vehicle, battery_threshold: f64) -> CostBreakdown {
    chain_costs(tour.nodes(), vehicle, battery_threshold, &CostWeights::default())
}

/// Cost breakdown of a tour with explicit weights.
pub fn get_weighted_costs_of_tour(
    tour: &Tour,
    vehicle: &Vehicle,
    battery_threshold: f64,
    weights: &CostWeights,
) -> CostBreakdown {
    chain_costs(tour.nodes(), vehicle, battery_threshold, weights)
}
