//! Depot-bounded tours.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;

use super::{Node, Vehicle};
use crate::error::TourError;
use crate::evaluation::{self, CostBreakdown};

static NEXT_TOUR_ID: AtomicU64 = AtomicU64::new(1);

fn next_tour_id() -> u64 {
    NEXT_TOUR_ID.fetch_add(1, Ordering::Relaxed)
}

fn check_boundary(nodes: &[Node]) -> Result<(), TourError> {
    if nodes.len() < 2 {
        return Err(TourError::TooShort(nodes.len()));
    }
    let first = &nodes[0];
    let last = &nodes[nodes.len() - 1];
    if !first.is_depot() || !last.is_depot() {
        return Err(TourError::MissingDepotBoundary {
            first: Some(first.id()),
            last: Some(last.id()),
        });
    }
    Ok(())
}

/// Returns `true` if `indices` is an arithmetic progression with a non-zero
/// step (ascending or descending). Single indices always qualify.
fn is_arithmetic_progression(indices: &[usize]) -> bool {
    if indices.len() < 2 {
        return true;
    }
    let step = indices[1] as isize - indices[0] as isize;
    step != 0
        && indices
            .windows(2)
            .all(|w| w[1] as isize - w[0] as isize == step)
}

/// An ordered cycle of nodes that starts and ends at the depot.
///
/// Every tour gets a process-unique id on construction. Equality and hashing
/// use this id; compare [`node_ids`](Tour::node_ids) to compare routes.
/// Mutation goes through explicit range or index replacement, and every
/// mutation is rejected if it would break the depot boundary.
///
/// # Examples
///
/// ```
/// use u_cevrp::models::{Node, Tour};
///
/// let d = Node::depot();
/// let a = Node::new(1, 2, 0.0, 3.0, 0.0);
/// let b = Node::new(2, 3, 0.0, 3.0, 4.0);
/// let tour = Tour::new(vec![d.clone(), a, b, d]).unwrap();
///
/// assert_eq!(tour.node_ids(), vec![0, 1, 2, 0]);
/// assert_eq!(tour.edges().count(), 3);
/// assert!((tour.total_distance() - 12.0).abs() < 1e-10);
/// assert_eq!(tour.total_demand(), 5);
///
/// assert!(Tour::new(vec![Node::new(1, 0, 0.0, 1.0, 1.0)]).is_err());
/// ```
#[derive(Debug)]
pub struct Tour {
    id: u64,
    nodes: Vec<Node>,
}

impl Tour {
    /// Creates a tour from a node sequence.
    ///
    /// # Errors
    ///
    /// [`TourError::TooShort`] for fewer than two nodes and
    /// [`TourError::MissingDepotBoundary`] if the sequence does not begin and
    /// end at the depot.
    pub fn new(nodes: Vec<Node>) -> Result<Self, TourError> {
        check_boundary(&nodes)?;
        Ok(Self {
            id: next_tour_id(),
            nodes,
        })
    }

    /// Creates the trivial tour `depot → node → depot`.
    pub fn around(depot: &Node, node: &Node) -> Result<Self, TourError> {
        Self::new(vec![depot.clone(), node.clone(), depot.clone()])
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes including both depot visits.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no customer lies between the two depot visits.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 2
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// The nodes between the leading and trailing depot visit.
    pub fn interior(&self) -> &[Node] {
        &self.nodes[1..self.nodes.len() - 1]
    }

    pub fn contains(&self, node: &Node) -> bool {
        self.nodes.contains(node)
    }

    /// First index of `node` in this tour.
    pub fn position(&self, node: &Node) -> Option<usize> {
        self.nodes.iter().position(|n| n == node)
    }

    pub fn node_ids(&self) -> Vec<usize> {
        self.nodes.iter().map(Node::id).collect()
    }

    /// Consecutive node pairs in travel order.
    pub fn edges(&self) -> impl Iterator<Item = (&Node, &Node)> + '_ {
        self.nodes.windows(2).map(|w| (&w[0], &w[1]))
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn total_distance(&self) -> f64 {
        evaluation::chain_distance(&self.nodes)
    }

    pub fn total_demand(&self) -> u32 {
        self.nodes.iter().map(Node::demand).sum()
    }

    pub fn total_service_time(&self) -> f64 {
        self.nodes.iter().map(Node::service_time).sum()
    }

    /// Time spent recharging while driving this tour; see
    /// [`battery_recharging_cost`](crate::evaluation::battery_recharging_cost).
    pub fn battery_recharging_cost(&self, vehicle: &Vehicle, battery_threshold: f64) -> f64 {
        evaluation::battery_recharging_cost(&self.nodes, vehicle, battery_threshold)
    }

    /// Cost breakdown with unit weights.
    pub fn costs(&self, vehicle: &Vehicle, battery_threshold: f64) -> CostBreakdown {
        evaluation::get_costs_of_tour(self, vehicle, battery_threshold)
    }

    fn index_of(&self, node: &Node) -> Result<usize, TourError> {
        self.position(node).ok_or(TourError::NodeNotFound {
            node_id: node.id(),
            tour_id: self.id,
        })
    }

    fn edge_index_of(&self, from: &Node, to: &Node) -> Result<usize, TourError> {
        self.nodes
            .windows(2)
            .position(|w| &w[0] == from && &w[1] == to)
            .ok_or(TourError::EdgeNotFound {
                from: from.id(),
                to: to.id(),
                tour_id: self.id,
            })
    }

    /// The node `amount` steps after `node`, wrapping around the sequence.
    pub fn next_node(&self, node: &Node, amount: isize) -> Result<&Node, TourError> {
        let index = self.index_of(node)? as isize;
        let len = self.nodes.len() as isize;
        Ok(&self.nodes[(index + amount).rem_euclid(len) as usize])
    }

    /// The node `amount` steps before `node`, wrapping around the sequence.
    pub fn previous_node(&self, node: &Node, amount: isize) -> Result<&Node, TourError> {
        self.next_node(node, -amount)
    }

    /// The edge `amount` steps after the edge `(from, to)`, wrapping around.
    pub fn next_edge(
        &self,
        from: &Node,
        to: &Node,
        amount: isize,
    ) -> Result<(&Node, &Node), TourError> {
        let index = self.edge_index_of(from, to)? as isize;
        let count = self.edge_count() as isize;
        let i = (index + amount).rem_euclid(count) as usize;
        Ok((&self.nodes[i], &self.nodes[i + 1]))
    }

    /// The edge `amount` steps before the edge `(from, to)`, wrapping around.
    pub fn previous_edge(
        &self,
        from: &Node,
        to: &Node,
        amount: isize,
    ) -> Result<(&Node, &Node), TourError> {
        self.next_edge(from, to, -amount)
    }

    /// Distance along the window of `symmetric_length` nodes on each side of
    /// `node`, clamped to the tour.
    pub fn subtour_distance(&self, node: &Node, symmetric_length: usize) -> Result<f64, TourError> {
        let index = self.index_of(node)?;
        let start = index.saturating_sub(symmetric_length);
        let end = (index + symmetric_length + 1).min(self.nodes.len());
        Ok(evaluation::chain_distance(&self.nodes[start..end]))
    }

    /// Index range spanned by `chain`, which must be a run of consecutive
    /// nodes of this tour.
    ///
    /// # Errors
    ///
    /// [`TourError::NodeNotFound`] if a node is missing and
    /// [`TourError::NotAChain`] if the nodes are not adjacent.
    pub fn chain_range(&self, chain: &[Node]) -> Result<Range<usize>, TourError> {
        if chain.is_empty() {
            return Err(TourError::NotAChain(Vec::new()));
        }
        let mut indices = chain
            .iter()
            .map(|n| self.index_of(n))
            .collect::<Result<Vec<_>, _>>()?;
        indices.sort_unstable();
        if indices.windows(2).any(|w| w[1] != w[0] + 1) {
            return Err(TourError::NotAChain(chain.iter().map(Node::id).collect()));
        }
        Ok(indices[0]..indices[indices.len() - 1] + 1)
    }

    /// A uniformly drawn customer of this tour, `None` for an empty tour.
    pub fn random_interior_node<R: Rng>(&self, rng: &mut R) -> Option<&Node> {
        if self.is_empty() {
            return None;
        }
        Some(&self.nodes[rng.random_range(1..self.nodes.len() - 1)])
    }

    fn mutate(&mut self, edit: impl FnOnce(&mut Vec<Node>)) -> Result<(), TourError> {
        let mut candidate = self.nodes.clone();
        edit(&mut candidate);
        check_boundary(&candidate)?;
        self.nodes = candidate;
        Ok(())
    }

    fn check_range(&self, range: &Range<usize>) -> Result<(), TourError> {
        let len = self.nodes.len();
        if range.start > range.end || range.end > len {
            return Err(TourError::IndexOutOfBounds {
                index: range.end.max(range.start),
                len,
            });
        }
        Ok(())
    }

    /// Overwrites the contiguous `range` position by position.
    ///
    /// # Errors
    ///
    /// Fails if the range is out of bounds, if `replacement` has a different
    /// length, or if the result would not be depot-bounded.
    pub fn replace_range(&mut self, range: Range<usize>, replacement: &[Node]) -> Result<(), TourError> {
        self.check_range(&range)?;
        if replacement.len() != range.len() {
            return Err(TourError::LengthMismatch {
                expected: range.len(),
                actual: replacement.len(),
            });
        }
        self.mutate(|nodes| nodes[range].clone_from_slice(replacement))
    }

    /// Overwrites the positions in `indices`, which must form an arithmetic
    /// progression (ascending or descending).
    ///
    /// # Errors
    ///
    /// [`TourError::NotEquallySpaced`] for any other index set, plus the
    /// bound, length and boundary checks of [`replace_range`](Tour::replace_range).
    pub fn replace_indices(&mut self, indices: &[usize], replacement: &[Node]) -> Result<(), TourError> {
        if !is_arithmetic_progression(indices) {
            return Err(TourError::NotEquallySpaced(indices.to_vec()));
        }
        if indices.len() != replacement.len() {
            return Err(TourError::LengthMismatch {
                expected: indices.len(),
                actual: replacement.len(),
            });
        }
        let len = self.nodes.len();
        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(TourError::IndexOutOfBounds { index, len });
        }
        self.mutate(|nodes| {
            for (&i, node) in indices.iter().zip(replacement) {
                nodes[i] = node.clone();
            }
        })
    }

    /// Removes the nodes in `range`.
    pub fn remove_range(&mut self, range: Range<usize>) -> Result<(), TourError> {
        self.check_range(&range)?;
        self.mutate(|nodes| {
            nodes.drain(range);
        })
    }

    /// Inserts `inserted` so that its first node ends up at `index`.
    pub fn insert_nodes(&mut self, index: usize, inserted: &[Node]) -> Result<(), TourError> {
        let len = self.nodes.len();
        if index > len {
            return Err(TourError::IndexOutOfBounds { index, len });
        }
        self.mutate(|nodes| {
            nodes.splice(index..index, inserted.iter().cloned());
        })
    }

    /// Inserts a single node at `index`.
    pub fn insert(&mut self, index: usize, node: Node) -> Result<(), TourError> {
        self.insert_nodes(index, std::slice::from_ref(&node))
    }

    /// Removes the first occurrence of `node`.
    pub fn remove_node(&mut self, node: &Node) -> Result<(), TourError> {
        let index = self.index_of(node)?;
        self.remove_range(index..index + 1)
    }

    /// Concatenates two tours through a shared depot visit:
    /// `self[..len-1] ++ other[1..]`.
    pub fn merge(&self, other: &Tour) -> Tour {
        let mut nodes = Vec::with_capacity(self.nodes.len() + other.nodes.len() - 2);
        nodes.extend_from_slice(&self.nodes[..self.nodes.len() - 1]);
        nodes.extend_from_slice(&other.nodes[1..]);
        Tour {
            id: next_tour_id(),
            nodes,
        }
    }

    /// The same visits in opposite order, under a new tour id.
    pub fn reversed(&self) -> Tour {
        Tour {
            id: next_tour_id(),
            nodes: self.nodes.iter().rev().cloned().collect(),
        }
    }

    /// A full copy with fresh node values and a new tour id.
    pub fn deep_copy(&self) -> Tour {
        Tour {
            id: next_tour_id(),
            nodes: self.nodes.clone(),
        }
    }
}

impl PartialEq for Tour {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Tour {}

impl Hash for Tour {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Tour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self.nodes.iter().map(|n| n.id().to_string()).collect();
        write!(f, "{}", ids.join(" - "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn customers() -> Vec<Node> {
        (1..=9)
            .map(|i| Node::new(i, i as u32, i as f64, i as f64, i as f64))
            .collect()
    }

    fn tour_of(ids: &[usize]) -> Tour {
        let c = customers();
        let mut nodes = vec![Node::depot()];
        nodes.extend(ids.iter().map(|&i| c[i - 1].clone()));
        nodes.push(Node::depot());
        Tour::new(nodes).expect("depot-bounded")
    }

    #[test]
    fn test_boundary_validation() {
        let c = customers();
        assert_eq!(Tour::new(vec![]).unwrap_err(), TourError::TooShort(0));
        assert!(matches!(
            Tour::new(vec![Node::depot(), c[0].clone()]),
            Err(TourError::MissingDepotBoundary { .. })
        ));
        assert!(Tour::new(vec![Node::depot(), Node::depot()]).is_ok());
    }

    #[test]
    fn test_unique_ids() {
        let a = tour_of(&[1, 2]);
        let b = tour_of(&[1, 2]);
        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
        assert_eq!(a.node_ids(), b.node_ids());
    }

    #[test]
    fn test_len_and_interior() {
        let t = tour_of(&[1, 2, 3]);
        assert_eq!(t.len(), 5);
        assert_eq!(t.interior().len(), 3);
        assert!(!t.is_empty());
        assert!(Tour::new(vec![Node::depot(), Node::depot()]).expect("valid").is_empty());
    }

    #[test]
    fn test_aggregates() {
        let t = tour_of(&[1, 2, 3]);
        assert_eq!(t.total_demand(), 6);
        assert!((t.total_service_time() - 6.0).abs() < 1e-10);
        // 0 -> (1,1) -> (2,2) -> (3,3) -> 0
        let expected = 3.0 * 2f64.sqrt() + 18f64.sqrt();
        assert!((t.total_distance() - expected).abs() < 1e-10);
    }

    #[test]
    fn test_edges() {
        let t = tour_of(&[1, 2]);
        let edges: Vec<(usize, usize)> = t.edges().map(|(a, b)| (a.id(), b.id())).collect();
        assert_eq!(edges, vec![(0, 1), (1, 2), (2, 0)]);
    }

    #[test]
    fn test_next_and_previous_node_wrap() {
        let c = customers();
        let t = tour_of(&[1, 2, 3]);
        assert_eq!(t.next_node(&c[0], 1).expect("present").id(), 2);
        assert_eq!(t.next_node(&c[2], 1).expect("present").id(), 0);
        assert_eq!(t.previous_node(&c[0], 1).expect("present").id(), 0);
        assert_eq!(t.previous_node(&c[0], 2).expect("present").id(), 0);
        assert!(t.next_node(&c[5], 1).is_err());
    }

    #[test]
    fn test_next_edge_wrap() {
        let c = customers();
        let t = tour_of(&[1, 2]);
        let (a, b) = t.next_edge(&c[1], &Node::depot(), 1).expect("edge");
        assert_eq!((a.id(), b.id()), (0, 1));
        let (a, b) = t.previous_edge(&c[0], &c[1], 1).expect("edge");
        assert_eq!((a.id(), b.id()), (0, 1));
        assert!(matches!(
            t.next_edge(&Node::depot(), &c[1], 1),
            Err(TourError::EdgeNotFound { .. })
        ));
    }

    #[test]
    fn test_chain_range() {
        let c = customers();
        let t = tour_of(&[1, 2, 3, 4]);
        assert_eq!(t.chain_range(&c[1..3]).expect("chain"), 2..4);
        assert_eq!(t.chain_range(&[c[2].clone(), c[1].clone()]).expect("chain"), 2..4);
        assert_eq!(
            t.chain_range(&[c[0].clone(), c[2].clone()]).unwrap_err(),
            TourError::NotAChain(vec![1, 3])
        );
        assert!(matches!(
            t.chain_range(&c[7..8]),
            Err(TourError::NodeNotFound { node_id: 8, .. })
        ));
    }

    #[test]
    fn test_replace_range() {
        let c = customers();
        let mut t = tour_of(&[1, 2, 3]);
        t.replace_range(2..4, &[c[7].clone(), c[8].clone()]).expect("valid");
        assert_eq!(t.node_ids(), vec![0, 1, 8, 9, 0]);

        assert!(matches!(
            t.replace_range(1..3, &c[..1]),
            Err(TourError::LengthMismatch { expected: 2, actual: 1 })
        ));
        assert!(matches!(
            t.replace_range(4..6, &c[..2]),
            Err(TourError::IndexOutOfBounds { .. })
        ));
        assert!(matches!(
            t.replace_range(0..1, &c[..1]),
            Err(TourError::MissingDepotBoundary { .. })
        ));
        assert_eq!(t.node_ids(), vec![0, 1, 8, 9, 0]);
    }

    #[test]
    fn test_replace_indices_equally_spaced() {
        let c = customers();
        let mut t = tour_of(&[2, 3, 4, 5]);
        t.replace_indices(&[1, 3], &[c[6].clone(), c[7].clone()]).expect("valid");
        assert_eq!(t.node_ids(), vec![0, 7, 3, 8, 5, 0]);

        t.replace_indices(&[4, 2], &[c[0].clone(), c[1].clone()]).expect("descending");
        assert_eq!(t.node_ids(), vec![0, 7, 2, 8, 1, 0]);
    }

    #[test]
    fn test_replace_indices_rejects_irregular_spacing() {
        let c = customers();
        let mut t = tour_of(&[2, 3, 4, 5]);
        assert_eq!(
            t.replace_indices(&[1, 2, 4], &c[..3]).unwrap_err(),
            TourError::NotEquallySpaced(vec![1, 2, 4])
        );
        assert_eq!(
            t.replace_indices(&[2, 2], &c[..2]).unwrap_err(),
            TourError::NotEquallySpaced(vec![2, 2])
        );
        assert_eq!(t.node_ids(), vec![0, 2, 3, 4, 5, 0]);
    }

    #[test]
    fn test_insert_and_remove() {
        let c = customers();
        let mut t = tour_of(&[1, 2]);
        t.insert(2, c[5].clone()).expect("valid");
        assert_eq!(t.node_ids(), vec![0, 1, 6, 2, 0]);
        t.remove_node(&c[0]).expect("present");
        assert_eq!(t.node_ids(), vec![0, 6, 2, 0]);
        t.insert_nodes(3, &c[2..4]).expect("valid");
        assert_eq!(t.node_ids(), vec![0, 6, 2, 3, 4, 0]);
        t.remove_range(1..3).expect("valid");
        assert_eq!(t.node_ids(), vec![0, 3, 4, 0]);
        assert!(t.insert(0, c[0].clone()).is_err());
        assert!(t.remove_node(&c[8]).is_err());
    }

    #[test]
    fn test_merge() {
        let a = tour_of(&[1, 2]);
        let b = tour_of(&[3, 4]);
        let merged = a.merge(&b);
        assert_eq!(merged.node_ids(), vec![0, 1, 2, 3, 4, 0]);
        assert_eq!(merged.total_demand(), a.total_demand() + b.total_demand());
    }

    #[test]
    fn test_reversed() {
        let d = Node::depot();
        let tour = Tour::new(vec![
            d.clone(),
            Node::new(1, 1, 0.0, 1.0, 0.0),
            Node::new(2, 1, 0.0, 2.0, 0.0),
            d,
        ])
        .expect("valid");
        let back = tour.reversed();
        assert_eq!(back.node_ids(), vec![0, 2, 1, 0]);
        assert_ne!(back, tour);
    }

    #[test]
    fn test_deep_copy() {
        let t = tour_of(&[1, 2]);
        let copy = t.deep_copy();
        assert_ne!(t.id(), copy.id());
        assert_eq!(t.node_ids(), copy.node_ids());
    }

    #[test]
    fn test_subtour_distance() {
        let c = customers();
        let t = tour_of(&[1, 2, 3]);
        let d = t.subtour_distance(&c[1], 1).expect("present");
        assert!((d - 2.0 * 2f64.sqrt()).abs() < 1e-10);
        let clamped = t.subtour_distance(&c[0], 5).expect("present");
        assert!((clamped - t.total_distance()).abs() < 1e-10);
    }

    #[test]
    fn test_random_interior_node() {
        let mut rng = StdRng::seed_from_u64(7);
        let t = tour_of(&[1, 2, 3]);
        for _ in 0..20 {
            let n = t.random_interior_node(&mut rng).expect("non-empty");
            assert!(!n.is_depot());
        }
        let empty = Tour::new(vec![Node::depot(), Node::depot()]).expect("valid");
        assert!(empty.random_interior_node(&mut rng).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(tour_of(&[1, 2]).to_string(), "0 - 1 - 2 - 0");
    }
}
