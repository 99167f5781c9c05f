//! Inter-route cross-exchange of two sub-chains.
//!
//! # Algorithm
//!
//! Given a contiguous, depot-free sub-chain from each tour, the chains trade
//! places. With chains of different length the longer donor is trimmed to
//! the recipient's slot length, and its remainder is inserted right after
//! that slot:
//!
//! ```text
//! T1 = [0, a, b, c, 0], chain (a b c)      T1' = [0, x, 0]
//! T2 = [0, x, y, 0],    chain (x)      ->  T2' = [0, a, b, c, y, 0]
//! ```
//!
//! The total number of nodes over both tours is unchanged.
//!
//! # Reference
//!
//! Taillard, É., Badeau, P., Gendreau, M., Guertin, F. & Potvin, J.-Y.
//! (1997). "A Tabu Search Heuristic for the Vehicle Routing Problem with Soft
//! Time Windows", *Transportation Science* 31(2), 170-186.

use std::ops::Range;

use super::neighborhood::{MoveOutcome, NeighborhoodMove};
use crate::error::TourError;
use crate::models::{Node, Tour};

fn ids(chain: &[Node]) -> Vec<usize> {
    chain.iter().map(Node::id).collect()
}

/// Moves `long[long_slot]` into `short[short_slot]` and vice versa, where
/// `long_slot` is at least as long as `short_slot`.
fn transplant(
    long: &Tour,
    long_slot: Range<usize>,
    short: &Tour,
    short_slot: Range<usize>,
) -> Result<(Tour, Tour), TourError> {
    let long_chain = long.nodes()[long_slot.clone()].to_vec();
    let short_chain = short.nodes()[short_slot.clone()].to_vec();
    let k = short_chain.len();

    let mut long_new = long.deep_copy();
    long_new.replace_range(long_slot.start..long_slot.start + k, &short_chain)?;
    long_new.remove_range(long_slot.start + k..long_slot.end)?;

    let mut short_new = short.deep_copy();
    short_new.replace_range(short_slot.clone(), &long_chain[..k])?;
    short_new.insert_nodes(short_slot.end, &long_chain[k..])?;

    Ok((long_new, short_new))
}

/// Candidate tours after exchanging `tour_1[slot_1]` and `tour_2[slot_2]`.
fn exchange_chains(
    tour_1: &Tour,
    slot_1: Range<usize>,
    tour_2: &Tour,
    slot_2: Range<usize>,
) -> Result<(Tour, Tour), TourError> {
    if slot_1.len() >= slot_2.len() {
        transplant(tour_1, slot_1, tour_2, slot_2)
    } else {
        let (new_2, new_1) = transplant(tour_2, slot_2, tour_1, slot_1)?;
        Ok((new_1, new_2))
    }
}

/// Exchanges sub-chain `first` of `mv.tour_1()` with sub-chain `second` of
/// `mv.tour_2()`, subject to the move's acceptance rule.
///
/// # Errors
///
/// - [`TourError::ChainContainsDepot`] if a chain includes the depot
/// - [`TourError::SingletonChains`] if both chains hold a single node
/// - [`TourError::NodeNotFound`] / [`TourError::NotAChain`] if a chain is not
///   a run of consecutive nodes of its tour
pub fn cross_exchange(
    mv: &NeighborhoodMove<'_>,
    first: &[Node],
    second: &[Node],
) -> Result<MoveOutcome<(Tour, Tour)>, TourError> {
    for chain in [first, second] {
        if chain.iter().any(Node::is_depot) {
            return Err(TourError::ChainContainsDepot(ids(chain)));
        }
    }
    if first.len() == 1 && second.len() == 1 {
        return Err(TourError::SingletonChains);
    }
    let slot_1 = mv.tour_1().chain_range(first)?;
    let slot_2 = mv.tour_2().chain_range(second)?;
    let (candidate_1, candidate_2) = exchange_chains(mv.tour_1(), slot_1, mv.tour_2(), slot_2)?;
    Ok(mv.apply_and_swap_on_savings(candidate_1, candidate_2))
}
