//! Error types.
//!
//! Structural faults (malformed tours, bad index lists, lookups of nodes that
//! are not present) are errors. Infeasible candidates and sampling timeouts
//! are ordinary search outcomes and never show up here.

use thiserror::Error;

/// A structural violation on a [`Tour`](crate::models::Tour) or a move request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TourError {
    #[error("tour must start and end at the depot (first: {first:?}, last: {last:?})")]
    MissingDepotBoundary {
        first: Option<usize>,
        last: Option<usize>,
    },
    #[error("tour needs at least two nodes, got {0}")]
    TooShort(usize),
    #[error("index {index} is out of bounds for a tour of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("replacing {expected} positions requires {expected} nodes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("indices {0:?} are not equally spaced")]
    NotEquallySpaced(Vec<usize>),
    #[error("node {node_id} is not part of tour {tour_id}")]
    NodeNotFound { node_id: usize, tour_id: u64 },
    #[error("({from}, {to}) is not an edge of tour {tour_id}")]
    EdgeNotFound { from: usize, to: usize, tour_id: u64 },
    #[error("nodes {0:?} are not a chain of subsequent nodes")]
    NotAChain(Vec<usize>),
    #[error("sub-chain {0:?} must not contain the depot")]
    ChainContainsDepot(Vec<usize>),
    #[error("sub-chains must not both consist of a single node")]
    SingletonChains,
    #[error("edge at position {0} touches the depot")]
    EdgeTouchesDepot(usize),
}

/// Errors raised while setting up or running an optimization.
#[derive(Error, Debug)]
pub enum CevrpError {
    #[error(transparent)]
    Tour(#[from] TourError),
    #[error("at least one vehicle is required")]
    NoVehicle,
    #[error("depot must sit at the origin, got ({x}, {y})")]
    DepotNotAtOrigin { x: f64, y: f64 },
    #[error("node id {0} is used more than once")]
    DuplicateNode(usize),
    #[error("node id {0} does not exist")]
    UnknownNode(usize),
    #[error("need {expected} demand and service time records, got {demands} and {service_times}")]
    MismatchedAttributes {
        expected: usize,
        demands: usize,
        service_times: usize,
    },
    #[error("clusterer returned {actual} labels for {expected} nodes")]
    ClusterLabelCount { expected: usize, actual: usize },
    #[cfg(feature = "json")]
    #[error("invalid problem instance json")]
    Json(#[from] serde_json::Error),
}
