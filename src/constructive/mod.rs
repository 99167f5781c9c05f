//! Constructive heuristics for building initial tour plans.
//!
//! - [`clarke_wright`] — Clarke-Wright savings merge (1964) with recharge-aware
//!   savings and full constraint checks on every merge

mod clarke_wright;

pub use clarke_wright::clarke_wright;
