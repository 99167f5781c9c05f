//! # u-cevrp
//!
//! Capacitated electric-vehicle routing (CEVRP): savings-based construction
//! and a variable neighborhood search over battery-, capacity- and
//! distance-constrained tours.
//!
//! ## Modules
//!
//! - [`models`] — Domain model types (Node, Vehicle, Tour, TourPlan, ProblemInstance)
//! - [`distance`] — Pluggable distance functions
//! - [`evaluation`] — Cost breakdowns, savings, and the constraint validator
//! - [`constructive`] — Clarke-Wright savings construction
//! - [`local_search`] — Neighborhood operators (2-opt, cross-exchange, λ-interchange, sequential insertion)
//! - [`vns`] — VNS/VND driver and its configuration
//! - [`clustering`] — Boundary to an external clustering oracle
//! - `io` — JSON records (feature `json`)
//!
//! ## Example
//!
//! ```
//! use u_cevrp::clustering::{build_cluster_plans, SingleCluster};
//! use u_cevrp::models::{BatteryProfile, Node, ProblemInstance, Vehicle};
//! use u_cevrp::vns::{CevrpOptimizer, SamplingBudget, VnsConfig};
//! use std::time::Duration;
//!
//! let nodes = vec![
//!     Node::new(1, 1, 0.0, 10.0, 0.0),
//!     Node::new(2, 1, 0.0, 20.0, 0.0),
//!     Node::new(3, 1, 0.0, 0.0, 10.0),
//!     Node::new(4, 1, 0.0, 0.0, 20.0),
//! ];
//! let vehicle = Vehicle::new(1, 10, BatteryProfile::new(1000.0, 1.0, 100.0), 1000.0);
//! let problem = ProblemInstance::new(nodes, vec![vehicle]).unwrap();
//!
//! let clusters = problem.cluster_nodes(&SingleCluster, 15.0, 2).unwrap();
//! let plans = build_cluster_plans(&problem, &clusters).unwrap();
//!
//! let budget = SamplingBudget::new(200, Duration::from_millis(20));
//! let config = VnsConfig::default()
//!     .with_two_opt_sampling(budget)
//!     .with_cross_exchange_sampling(budget)
//!     .with_seed(42);
//! let result = CevrpOptimizer::new(&problem, config)
//!     .optimize(plans.into_values(), clusters.outliers)
//!     .unwrap();
//! assert_eq!(result.total_demand(), 4);
//! ```

pub mod clustering;
pub mod constructive;
pub mod distance;
pub mod error;
pub mod evaluation;
#[cfg(feature = "json")]
pub mod io;
pub mod local_search;
pub mod models;
pub mod vns;

pub use error::{CevrpError, TourError};
