//! Domain model types for electric vehicle routing.
//!
//! Nodes and vehicles are created once per instance. Tours are created in
//! large numbers during search: every trial move works on a deep copy.

mod node;
mod problem;
mod tour;
mod tour_plan;
mod vehicle;

pub use node::{Node, DEPOT_ID};
pub use problem::ProblemInstance;
pub use tour::Tour;
pub use tour_plan::TourPlan;
pub use vehicle::{BatteryProfile, Vehicle};
