//! Intra-route 2-opt move on randomly sampled sections.
//!
//! # Algorithm
//!
//! Two disjoint 2-node sections `(a1, b1)` and `(a2, b2)` are drawn at
//! random, `(a1, b1)` being the earlier one. They are reconnected as
//! `(a1, a2)` and `(b1, b2)`, which swaps `b1` and `a2` in the tour:
//!
//! ```text
//! ... a1 b1 ... a2 b2 ...  ->  ... a1 a2 ... b1 b2 ...
//! ```
//!
//! A reconnection is taken if it is feasible and its savings exceed
//! [`IMPROVEMENT_EPSILON`]. Each iteration samples until it finds one or the
//! sampling budget runs out; an exhausted budget ends the move early. Every
//! iteration starts from the last accepted tour.

use rand::Rng;

use super::neighborhood::MoveOutcome;
use super::sections::{random_tour_sections, SamplingBudget};
use crate::error::TourError;
use crate::evaluation::{is_feasible, SavingsFn, IMPROVEMENT_EPSILON};
use crate::models::{Tour, Vehicle};

const SECTION_LENGTH: usize = 2;

/// Reconnects the sections starting at `first` and `second` in a copy of `tour`.
fn reconnect(tour: &Tour, first: usize, second: usize) -> Result<Tour, TourError> {
    let (earlier, later) = if first < second {
        (first, second)
    } else {
        (second, first)
    };
    let b1 = earlier + 1;
    let a2 = later;
    let nodes = tour.nodes();
    let mut candidate = tour.deep_copy();
    candidate.replace_indices(&[b1, a2], &[nodes[a2].clone(), nodes[b1].clone()])?;
    Ok(candidate)
}

/// Improves `tour` with up to `iterations` accepted 2-opt reconnections.
///
/// Returns [`MoveOutcome::Rejected`] when no improving feasible
/// reconnection was found in the first iteration, including for tours with
/// fewer than two customers.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use rand::{rngs::StdRng, SeedableRng};
/// use u_cevrp::models::{BatteryProfile, Node, Tour, Vehicle};
/// use u_cevrp::evaluation::get_savings;
/// use u_cevrp::local_search::{two_opt_move, SamplingBudget};
///
/// let d = Node::depot();
/// let tour = Tour::new(vec![
///     d.clone(),
///     Node::new(1, 1, 0.0, 1.0, 0.0),
///     Node::new(3, 1, 0.0, 3.0, 0.0),
///     Node::new(2, 1, 0.0, 2.0, 0.0),
///     Node::new(4, 1, 0.0, 4.0, 0.0),
///     d,
/// ]).unwrap();
/// let v = Vehicle::new(1, 10, BatteryProfile::new(100.0, 1.0, 10.0), 100.0);
/// let budget = SamplingBudget::new(1_000, Duration::from_secs(1));
/// let mut rng = StdRng::seed_from_u64(42);
///
/// let outcome = two_opt_move(&tour, &v, 4.0, &get_savings, 10, &budget, &mut rng).unwrap();
/// let improved = outcome.into_result().unwrap();
/// assert!(improved.total_distance() < tour.total_distance());
/// ```
pub fn two_opt_move<R: Rng>(
    tour: &Tour,
    vehicle: &Vehicle,
    battery_threshold: f64,
    savings: SavingsFn<'_>,
    iterations: usize,
    budget: &SamplingBudget,
    rng: &mut R,
) -> Result<MoveOutcome<Tour>, TourError> {
    if tour.len() < 2 * SECTION_LENGTH {
        return Ok(MoveOutcome::Rejected);
    }

    let mut best: Option<Tour> = None;
    let mut total_savings = 0.0;
    for _ in 0..iterations {
        let base = best.as_ref().unwrap_or(tour);
        let found = budget.sample(|| {
            let (a, b) = random_tour_sections(base, SECTION_LENGTH, budget, rng)?;
            let candidate = match reconnect(base, a.start, b.start) {
                Ok(candidate) => candidate,
                Err(e) => return Some(Err(e)),
            };
            if !is_feasible(&candidate, vehicle, battery_threshold) {
                return None;
            }
            let saved = savings(base, &candidate, vehicle, battery_threshold);
            (saved > IMPROVEMENT_EPSILON).then_some(Ok((candidate, saved)))
        });
        let Some(found) = found else {
            break;
        };
        let (candidate, saved) = found?;
        total_savings += saved;
        best = Some(candidate);
    }

    Ok(match best {
        Some(result) => MoveOutcome::Accepted {
            result,
            savings: total_savings,
        },
        None => MoveOutcome::Rejected,
    })
}
