//! Tour costs, Clarke-Wright savings, and feasibility constraints.
//!
//! - [`get_costs_of_tour`] — distance, recharging, service time and demand breakdown
//! - [`calculate_savings`] / [`get_savings`] — construction metric and acceptance oracle
//! - [`ConstraintValidator`] — depot count, capacity, distance and battery checks

mod constraints;
mod costs;
mod savings;

pub use constraints::{is_feasible, Constraint, ConstraintCheck, ConstraintValidator};
pub use costs::{
    battery_recharging_cost, chain_costs, chain_distance, get_costs_of_tour,
    get_weighted_costs_of_tour, CostBreakdown, CostType, CostWeights,
};
pub use savings::{
    calculate_savings, edge_recharging_cost, get_savings, get_weighted_savings, SavingsFn,
    IMPROVEMENT_EPSILON,
};
