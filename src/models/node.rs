//! Customer and depot nodes.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::distance::{euclidean, DistanceFn};
use crate::error::CevrpError;

/// Reserved id of the depot.
pub const DEPOT_ID: usize = 0;

fn default_distance() -> DistanceFn {
    euclidean
}

/// A customer location (or the depot) in a CEVRP instance.
///
/// Equality and hashing use the node id only, so two values with the same id
/// are interchangeable regardless of their other fields.
///
/// # Examples
///
/// ```
/// use u_cevrp::models::Node;
///
/// let depot = Node::depot();
/// assert!(depot.is_depot());
/// assert_eq!(depot.demand(), 0);
///
/// let c = Node::new(1, 4, 2.0, 3.0, 4.0);
/// assert!((c.distance_to(&depot) - 5.0).abs() < 1e-10);
/// assert_eq!(c, Node::new(1, 99, 0.0, -1.0, -1.0));
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct Node {
    id: usize,
    demand: u32,
    service_time: f64,
    x: f64,
    y: f64,
    #[serde(skip, default = "default_distance")]
    distance: DistanceFn,
}

impl Node {
    /// Creates a node measured with Euclidean distance.
    pub fn new(id: usize, demand: u32, service_time: f64, x: f64, y: f64) -> Self {
        Self {
            id,
            demand,
            service_time,
            x,
            y,
            distance: euclidean,
        }
    }

    /// The depot: id 0 at the origin, no demand, no service time.
    pub fn depot() -> Self {
        Self::new(DEPOT_ID, 0, 0.0, 0.0, 0.0)
    }

    /// Replaces the distance function of this node.
    pub fn with_distance(mut self, distance: DistanceFn) -> Self {
        self.distance = distance;
        self
    }

    /// Creates customers with consecutive ids starting at `first_id`.
    ///
    /// `demands` and `service_times` need at least one entry per location.
    ///
    /// # Errors
    ///
    /// [`CevrpError::MismatchedAttributes`] if either attribute list is
    /// shorter than `locations`.
    pub fn batch(
        first_id: usize,
        locations: &[(f64, f64)],
        demands: &[u32],
        service_times: &[f64],
    ) -> Result<Vec<Node>, CevrpError> {
        if demands.len() < locations.len() || service_times.len() < locations.len() {
            return Err(CevrpError::MismatchedAttributes {
                expected: locations.len(),
                demands: demands.len(),
                service_times: service_times.len(),
            });
        }
        Ok(locations
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Node::new(first_id + i, demands[i], service_times[i], x, y))
            .collect())
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn demand(&self) -> u32 {
        self.demand
    }

    pub fn service_time(&self) -> f64 {
        self.service_time
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Returns `true` for the reserved depot id.
    pub fn is_depot(&self) -> bool {
        self.id == DEPOT_ID
    }

    /// Distance to `other`, measured with this node's distance function.
    pub fn distance_to(&self, other: &Node) -> f64 {
        (self.distance)(self, other)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("demand", &self.demand)
            .field("service_time", &self.service_time)
            .field("x", &self.x)
            .field("y", &self.y)
            .finish()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (d{}, st{}, x{}, y{})",
            self.id, self.demand, self.service_time, self.x, self.y
        )
    }
}
