//! Distance functions.
//!
//! Every [`Node`](crate::models::Node) carries a [`DistanceFn`]. Euclidean
//! distance is the default.

mod metric;

pub use metric::{euclidean, manhattan, max_pairwise_distance, DistanceFn};
