//! Variable Neighborhood Search / Descent driver.
//!
//! - [`CevrpOptimizer`] — Iterates the neighborhoods until the plan cost stagnates
//! - [`VnsConfig`] — Iteration caps, trial counts, sampling budgets and cost weights
//! - [`OptimizationResult`] — Final tours, cost history and forced outliers

mod config;
mod optimizer;
mod result;

pub use crate::local_search::SamplingBudget;
pub use config::VnsConfig;
pub use optimizer::{optimize, CevrpOptimizer};
pub use result::{OptimizationResult, TourReport};
