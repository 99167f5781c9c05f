//! Inter-route λ-interchange (λ = 1) at matching edge positions.
//!
//! Edge `(a1, a2)` of the first tour and edge `(b1, b2)` of the second swap
//! places node for node: the first tour gets `(b1, b2)` where `(a1, a2)` was,
//! and the second gets `(a1, a2)`.
//!
//! # Reference
//!
//! Osman, I.H. (1993). "Metastrategy simulated annealing and tabu search
//! algorithms for the vehicle routing problem", *Annals of Operations
//! Research* 41, 421-451.

use super::neighborhood::{MoveOutcome, NeighborhoodMove};
use crate::error::TourError;
use crate::models::{Node, Tour};

/// The two nodes of the depot-free edge at positions `edge`.
fn edge_nodes(tour: &Tour, edge: [usize; 2]) -> Result<[Node; 2], TourError> {
    let len = tour.len();
    if let Some(&index) = edge.iter().find(|&&i| i >= len) {
        return Err(TourError::IndexOutOfBounds { index, len });
    }
    let nodes = tour.nodes();
    if edge[1] != edge[0] + 1 {
        return Err(TourError::NotAChain(vec![
            nodes[edge[0]].id(),
            nodes[edge[1]].id(),
        ]));
    }
    let pair = [nodes[edge[0]].clone(), nodes[edge[1]].clone()];
    if pair.iter().any(Node::is_depot) {
        return Err(TourError::EdgeTouchesDepot(edge[0]));
    }
    Ok(pair)
}

/// Start positions of the depot-free edges of `tour`.
pub fn interior_edge_starts(tour: &Tour) -> std::ops::Range<usize> {
    1..tour.len().saturating_sub(2).max(1)
}

/// Swaps edge `first` of `mv.tour_1()` with edge `second` of `mv.tour_2()`,
/// subject to the move's acceptance rule.
///
/// Edges are given as positions `[i, i + 1]`.
///
/// # Errors
///
/// [`TourError::IndexOutOfBounds`], [`TourError::NotAChain`] for
/// non-adjacent positions, and [`TourError::EdgeTouchesDepot`].
pub fn lambda_interchange(
    mv: &NeighborhoodMove<'_>,
    first: [usize; 2],
    second: [usize; 2],
) -> Result<MoveOutcome<(Tour, Tour)>, TourError> {
    let edge_1 = edge_nodes(mv.tour_1(), first)?;
    let edge_2 = edge_nodes(mv.tour_2(), second)?;

    let mut candidate_1 = mv.tour_1().deep_copy();
    candidate_1.replace_indices(&first, &edge_2)?;
    let mut candidate_2 = mv.tour_2().deep_copy();
    candidate_2.replace_indices(&second, &edge_1)?;

    Ok(mv.apply_and_swap_on_savings(candidate_1, candidate_2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::get_savings;
    use crate::local_search::{AcceptancePolicy, Selection};
    use crate::models::{BatteryProfile, Vehicle};

    fn vehicle() -> Vehicle {
        Vehicle::new(1, 100, BatteryProfile::new(1000.0, 1.0, 10.0), 1000.0)
    }

    fn tour(nodes: &[Node]) -> Tour {
        let d = Node::depot();
        let mut seq = vec![d.clone()];
        seq.extend_from_slice(nodes);
        seq.push(d);
        Tour::new(seq).expect("valid")
    }

    fn interchange(
        t1: &Tour,
        t2: &Tour,
        first: [usize; 2],
        second: [usize; 2],
        policy: AcceptancePolicy,
    ) -> Result<MoveOutcome<(Tour, Tour)>, TourError> {
        let v = vehicle();
        NeighborhoodMove::new(t1, t2, Selection::Edges { first, second }, &v, 1e6, &get_savings)
            .with_policy(policy)
            .apply()
    }

    fn n(id: usize, x: f64, y: f64) -> Node {
        Node::new(id, 1, 0.0, x, y)
    }

    #[test]
    fn test_swaps_matching_endpoints() {
        let t1 = tour(&[n(1, 1.0, 0.0), n(2, 2.0, 0.0), n(3, 3.0, 0.0)]);
        let t2 = tour(&[n(4, 0.0, 1.0), n(5, 0.0, 2.0), n(6, 0.0, 3.0)]);
        let (a, b) = interchange(&t1, &t2, [2, 3], [1, 2], AcceptancePolicy::Unconditional)
            .expect("valid")
            .into_result()
            .expect("feasible");
        assert_eq!(a.node_ids(), vec![0, 1, 4, 5, 0]);
        assert_eq!(b.node_ids(), vec![0, 2, 3, 6, 0]);
    }

    #[test]
    fn test_improving_interchange() {
        // each tour holds one edge that belongs to the other side
        let t1 = tour(&[n(1, 10.0, 0.0), n(2, -10.0, 0.0), n(3, -10.0, 1.0)]);
        let t2 = tour(&[n(4, -10.0, 2.0), n(5, 10.0, 1.0), n(6, 10.0, 2.0)]);
        let outcome =
            interchange(&t1, &t2, [2, 3], [2, 3], AcceptancePolicy::OnSavings).expect("valid");
        let (a, b) = outcome.into_result().expect("improving");
        assert_eq!(a.node_ids(), vec![0, 1, 5, 6, 0]);
        assert_eq!(b.node_ids(), vec![0, 4, 2, 3, 0]);

        let back = interchange(&a, &b, [2, 3], [2, 3], AcceptancePolicy::OnSavings).expect("valid");
        assert!(!back.is_accepted());
    }

    #[test]
    fn test_rejects_malformed_edges() {
        let t1 = tour(&[n(1, 1.0, 0.0), n(2, 2.0, 0.0)]);
        let t2 = tour(&[n(3, 0.0, 1.0), n(4, 0.0, 2.0)]);
        let policy = AcceptancePolicy::Unconditional;
        assert_eq!(
            interchange(&t1, &t2, [0, 1], [1, 2], policy).err(),
            Some(TourError::EdgeTouchesDepot(0))
        );
        assert!(matches!(
            interchange(&t1, &t2, [1, 3], [1, 2], policy),
            Err(TourError::NotAChain(_))
        ));
        assert!(matches!(
            interchange(&t1, &t2, [1, 2], [4, 5], policy),
            Err(TourError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_interior_edge_starts() {
        let t = tour(&[n(1, 1.0, 0.0), n(2, 2.0, 0.0), n(3, 3.0, 0.0)]);
        assert_eq!(interior_edge_starts(&t), 1..3);
        assert!(interior_edge_starts(&tour(&[n(1, 1.0, 0.0)])).is_empty());
    }
}
