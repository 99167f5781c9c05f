//! Planar distance metrics.

use crate::models::Node;

/// Distance between two nodes.
///
/// Stored per node as a plain function pointer, so copies of a node share
/// the same metric.
pub type DistanceFn = fn(&Node, &Node) -> f64;

/// Euclidean distance between the coordinates of two nodes.
///
/// # Examples
///
/// ```
/// use u_cevrp::models::Node;
/// use u_cevrp::distance::euclidean;
///
/// let a = Node::depot();
/// let b = Node::new(1, 0, 0.0, 3.0, 4.0);
/// assert!((euclidean(&a, &b) - 5.0).abs() < 1e-10);
/// ```
pub fn euclidean(a: &Node, b: &Node) -> f64 {
    let dx = b.x() - a.x();
    let dy = b.y() - a.y();
    (dx * dx + dy * dy).sqrt()
}

/// Manhattan (L1) distance between the coordinates of two nodes.
pub fn manhattan(a: &Node, b: &Node) -> f64 {
    (b.x() - a.x()).abs() + (b.y() - a.y()).abs()
}

/// Largest distance between any two of the given nodes, measured with the
/// first node's metric. Zero for fewer than two nodes.
pub fn max_pairwise_distance(nodes: &[Node]) -> f64 {
    let mut max = 0.0_f64;
    for (i, a) in nodes.iter().enumerate() {
        for b in &nodes[i + 1..] {
            max = max.max(a.distance_to(b));
        }
    }
    max
}
