//! Initial partition of the customers by an external clustering oracle.
//!
//! The crate does not implement a clustering algorithm. A [`NodeClusterer`]
//! (DBSCAN or anything else) labels the customer coordinates; the labels are
//! turned into [`NodeClusters`], and every non-outlier cluster gets its own
//! Clarke-Wright construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CevrpError;
use crate::models::{Node, ProblemInstance, TourPlan};

/// Label assigned to a point by a clustering oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClusterLabel {
    /// Assigned to no cluster.
    Outlier,
    Cluster(usize),
}

impl ClusterLabel {
    /// Maps DBSCAN-style integer labels, where any negative value marks noise.
    ///
    /// ```
    /// use u_cevrp::clustering::ClusterLabel;
    ///
    /// assert_eq!(ClusterLabel::from_raw(-1), ClusterLabel::Outlier);
    /// assert_eq!(ClusterLabel::from_raw(2), ClusterLabel::Cluster(2));
    /// ```
    pub fn from_raw(label: i64) -> Self {
        usize::try_from(label).map_or(ClusterLabel::Outlier, ClusterLabel::Cluster)
    }

    pub fn is_outlier(self) -> bool {
        self == ClusterLabel::Outlier
    }
}

/// Clustering oracle over planar points.
///
/// Implementations return exactly one label per input point. `eps` is the
/// neighborhood radius and `min_samples` the minimum cluster size. Plain
/// functions and closures with the same signature implement the trait.
pub trait NodeClusterer {
    fn cluster(&self, points: &[(f64, f64)], eps: f64, min_samples: usize) -> Vec<ClusterLabel>;
}

impl<F> NodeClusterer for F
where
    F: Fn(&[(f64, f64)], f64, usize) -> Vec<ClusterLabel>,
{
    fn cluster(&self, points: &[(f64, f64)], eps: f64, min_samples: usize) -> Vec<ClusterLabel> {
        self(points, eps, min_samples)
    }
}

/// Puts every point into cluster 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleCluster;

impl NodeClusterer for SingleCluster {
    fn cluster(&self, points: &[(f64, f64)], _eps: f64, _min_samples: usize) -> Vec<ClusterLabel> {
        vec![ClusterLabel::Cluster(0); points.len()]
    }
}

/// Replays a precomputed labelling, e.g. one read from disk.
#[derive(Debug, Clone, Default)]
pub struct FixedLabels(pub Vec<ClusterLabel>);

impl NodeClusterer for FixedLabels {
    fn cluster(&self, _points: &[(f64, f64)], _eps: f64, _min_samples: usize) -> Vec<ClusterLabel> {
        self.0.clone()
    }
}

/// Customers grouped by cluster label, noise kept apart.
#[derive(Debug, Clone, Default)]
pub struct NodeClusters {
    pub clusters: BTreeMap<usize, Vec<Node>>,
    pub outliers: Vec<Node>,
}

impl NodeClusters {
    /// Groups `nodes` by the label at the same position.
    ///
    /// # Errors
    ///
    /// [`CevrpError::ClusterLabelCount`] unless there is one label per node.
    pub fn from_labels(nodes: &[Node], labels: &[ClusterLabel]) -> Result<Self, CevrpError> {
        if nodes.len() != labels.len() {
            return Err(CevrpError::ClusterLabelCount {
                expected: nodes.len(),
                actual: labels.len(),
            });
        }
        let mut grouped = NodeClusters::default();
        for (node, label) in nodes.iter().zip(labels) {
            match label {
                ClusterLabel::Outlier => grouped.outliers.push(node.clone()),
                ClusterLabel::Cluster(c) => grouped.clusters.entry(*c).or_default().push(node.clone()),
            }
        }
        Ok(grouped)
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

impl ProblemInstance {
    /// Clusters the customers (depot excluded) with `clusterer`.
    ///
    /// # Errors
    ///
    /// [`CevrpError::ClusterLabelCount`] if the oracle returns the wrong
    /// number of labels.
    pub fn cluster_nodes<C: NodeClusterer + ?Sized>(
        &self,
        clusterer: &C,
        eps: f64,
        min_samples: usize,
    ) -> Result<NodeClusters, CevrpError> {
        let points: Vec<(f64, f64)> = self.customers().iter().map(|n| (n.x(), n.y())).collect();
        let labels = clusterer.cluster(&points, eps, min_samples);
        NodeClusters::from_labels(self.customers(), &labels)
    }
}

/// One Clarke-Wright plan per non-outlier cluster, keyed by cluster label.
///
/// ```
/// use u_cevrp::clustering::{build_cluster_plans, SingleCluster};
/// use u_cevrp::models::{BatteryProfile, Node, ProblemInstance, Vehicle};
///
/// let nodes = vec![Node::new(1, 1, 0.0, 10.0, 0.0), Node::new(2, 1, 0.0, 20.0, 0.0)];
/// let vehicle = Vehicle::new(1, 10, BatteryProfile::new(1000.0, 1.0, 100.0), 1000.0);
/// let problem = ProblemInstance::new(nodes, vec![vehicle]).unwrap();
///
/// let clusters = problem.cluster_nodes(&SingleCluster, 5.0, 2).unwrap();
/// let plans = build_cluster_plans(&problem, &clusters).unwrap();
/// assert_eq!(plans[&0].total_demand(), 2);
/// ```
pub fn build_cluster_plans(
    problem: &ProblemInstance,
    clusters: &NodeClusters,
) -> Result<BTreeMap<usize, TourPlan>, CevrpError> {
    let mut plans = BTreeMap::new();
    for (&label, nodes) in &clusters.clusters {
        let plan = problem.clarke_wright(nodes)?;
        info!(cluster = label, nodes = nodes.len(), tours = plan.len(), "constructed cluster plan");
        plans.insert(label, plan);
    }
    Ok(plans)
}
