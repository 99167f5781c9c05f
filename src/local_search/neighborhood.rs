//! Neighborhood tags, move descriptors, and the shared acceptance rule.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{cross_exchange, lambda_interchange};
use crate::error::TourError;
use crate::evaluation::{is_feasible, SavingsFn, IMPROVEMENT_EPSILON};
use crate::models::{Node, Tour, Vehicle};

/// The neighborhoods of the search, in the order the driver visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Neighborhood {
    /// Intra-route reconnection of two 2-node sections.
    TwoOptMove,
    /// Inter-route exchange of two sub-chains.
    CrossExchange,
    /// Inter-route exchange of two edges at matching positions.
    TwoLambdaInterchange,
    /// Placement of unassigned nodes and relocation of placed ones.
    SequentialInsertion,
}

impl Neighborhood {
    pub const ORDER: [Neighborhood; 4] = [
        Neighborhood::TwoOptMove,
        Neighborhood::CrossExchange,
        Neighborhood::TwoLambdaInterchange,
        Neighborhood::SequentialInsertion,
    ];

    pub fn first() -> Self {
        Self::ORDER[0]
    }

    /// The following neighborhood, `None` after the last one.
    ///
    /// ```
    /// use u_cevrp::local_search::Neighborhood;
    ///
    /// assert_eq!(Neighborhood::first().next(), Some(Neighborhood::CrossExchange));
    /// assert_eq!(Neighborhood::SequentialInsertion.next(), None);
    /// ```
    pub fn next(self) -> Option<Self> {
        let index = Self::ORDER.iter().position(|&n| n == self)?;
        Self::ORDER.get(index + 1).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Neighborhood::TwoOptMove => "TWO_OPT_MOVE",
            Neighborhood::CrossExchange => "CROSS_EXCHANGE",
            Neighborhood::TwoLambdaInterchange => "TWO_LAMBDA_INTERCHANGE",
            Neighborhood::SequentialInsertion => "SEQUENTIAL_INSERTION",
        }
    }

    /// Whether the neighborhood works on pairs of distinct tours.
    pub fn is_inter_route(self) -> bool {
        matches!(
            self,
            Neighborhood::CrossExchange | Neighborhood::TwoLambdaInterchange
        )
    }
}

impl fmt::Display for Neighborhood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// When a feasible candidate replaces the original tours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcceptancePolicy {
    /// Summed savings over both tours must exceed [`IMPROVEMENT_EPSILON`].
    #[default]
    OnSavings,
    /// Any feasible candidate is taken.
    ///
    /// The VNS driver never selects this. It is a hook for callers that want
    /// to force an exchange, e.g. to seed a plan before improving it.
    Unconditional,
}

/// What an inter-route move exchanges.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Contiguous depot-free sub-chains, one per tour.
    Chains { first: Vec<Node>, second: Vec<Node> },
    /// Position pairs `[i, i + 1]` of one depot-free edge per tour.
    Edges { first: [usize; 2], second: [usize; 2] },
}

impl Selection {
    /// The neighborhood that consumes this selection.
    pub fn neighborhood(&self) -> Neighborhood {
        match self {
            Selection::Chains { .. } => Neighborhood::CrossExchange,
            Selection::Edges { .. } => Neighborhood::TwoLambdaInterchange,
        }
    }
}

/// Result of a move attempt.
#[derive(Debug)]
pub enum MoveOutcome<T> {
    /// The candidate was taken. `savings` is the summed cost reduction.
    Accepted { result: T, savings: f64 },
    /// No candidate was taken; the inputs stay as they are.
    Rejected,
}

impl<T> MoveOutcome<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, MoveOutcome::Accepted { .. })
    }

    /// Savings of an accepted move, `0.0` otherwise.
    pub fn savings(&self) -> f64 {
        match self {
            MoveOutcome::Accepted { savings, .. } => *savings,
            MoveOutcome::Rejected => 0.0,
        }
    }

    pub fn into_result(self) -> Option<T> {
        match self {
            MoveOutcome::Accepted { result, .. } => Some(result),
            MoveOutcome::Rejected => None,
        }
    }
}

/// One inter-route move attempt: two tours, what to exchange between them,
/// and how to judge the candidate.
///
/// The descriptor only borrows; every candidate is built on copies.
pub struct NeighborhoodMove<'a> {
    tour_1: &'a Tour,
    tour_2: &'a Tour,
    selection: Selection,
    vehicle: &'a Vehicle,
    battery_threshold: f64,
    savings: SavingsFn<'a>,
    policy: AcceptancePolicy,
}

impl<'a> NeighborhoodMove<'a> {
    pub fn new(
        tour_1: &'a Tour,
        tour_2: &'a Tour,
        selection: Selection,
        vehicle: &'a Vehicle,
        battery_threshold: f64,
        savings: SavingsFn<'a>,
    ) -> Self {
        Self {
            tour_1,
            tour_2,
            selection,
            vehicle,
            battery_threshold,
            savings,
            policy: AcceptancePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: AcceptancePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn tour_1(&self) -> &'a Tour {
        self.tour_1
    }

    pub fn tour_2(&self) -> &'a Tour {
        self.tour_2
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn vehicle(&self) -> &'a Vehicle {
        self.vehicle
    }

    pub fn battery_threshold(&self) -> f64 {
        self.battery_threshold
    }

    pub fn policy(&self) -> AcceptancePolicy {
        self.policy
    }

    /// Runs the operator matching the selection.
    ///
    /// # Errors
    ///
    /// Any structural fault in the selection; see the operators.
    pub fn apply(&self) -> Result<MoveOutcome<(Tour, Tour)>, TourError> {
        match &self.selection {
            Selection::Chains { first, second } => cross_exchange(self, first, second),
            Selection::Edges { first, second } => lambda_interchange(self, *first, *second),
        }
    }

    /// Savings oracle applied to `old -> new`.
    pub fn savings_of(&self, old: &Tour, new: &Tour) -> f64 {
        (self.savings)(old, new, self.vehicle, self.battery_threshold)
    }

    /// Accepts `(candidate_1, candidate_2)` in place of `(tour_1, tour_2)` if
    /// both are feasible and the policy agrees.
    pub fn apply_and_swap_on_savings(
        &self,
        candidate_1: Tour,
        candidate_2: Tour,
    ) -> MoveOutcome<(Tour, Tour)> {
        if !is_feasible(&candidate_1, self.vehicle, self.battery_threshold)
            || !is_feasible(&candidate_2, self.vehicle, self.battery_threshold)
        {
            return MoveOutcome::Rejected;
        }
        let savings = self.savings_of(self.tour_1, &candidate_1)
            + self.savings_of(self.tour_2, &candidate_2);
        if savings > IMPROVEMENT_EPSILON || self.policy == AcceptancePolicy::Unconditional {
            MoveOutcome::Accepted {
                result: (candidate_1, candidate_2),
                savings,
            }
        } else {
            MoveOutcome::Rejected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::get_savings;
    use crate::models::BatteryProfile;

    fn vehicle(capacity: u32) -> Vehicle {
        Vehicle::new(1, capacity, BatteryProfile::new(1000.0, 1.0, 100.0), 1000.0)
    }

    fn tour(ids_and_coords: &[(usize, f64, f64)]) -> Tour {
        let d = Node::depot();
        let mut nodes = vec![d.clone()];
        nodes.extend(ids_and_coords.iter().map(|&(id, x, y)| Node::new(id, 1, 0.0, x, y)));
        nodes.push(d);
        Tour::new(nodes).expect("valid")
    }

    #[test]
    fn test_order_and_names() {
        let mut visited = vec![Neighborhood::first()];
        while let Some(n) = visited[visited.len() - 1].next() {
            visited.push(n);
        }
        assert_eq!(visited, Neighborhood::ORDER.to_vec());
        assert_eq!(Neighborhood::CrossExchange.to_string(), "CROSS_EXCHANGE");
        assert!(Neighborhood::TwoLambdaInterchange.is_inter_route());
        assert!(!Neighborhood::TwoOptMove.is_inter_route());
    }

    #[test]
    fn test_accepts_only_positive_savings() {
        let v = vehicle(10);
        let near = tour(&[(1, 1.0, 0.0)]);
        let far = tour(&[(2, 50.0, 0.0)]);
        let selection = Selection::Edges { first: [1, 2], second: [1, 2] };
        let mv = NeighborhoodMove::new(&far, &near, selection, &v, 1000.0, &get_savings);

        // same nodes: zero savings
        let outcome = mv.apply_and_swap_on_savings(far.deep_copy(), near.deep_copy());
        assert!(!outcome.is_accepted());
        assert_eq!(outcome.savings(), 0.0);

        let shorter = tour(&[(2, 40.0, 0.0)]);
        let outcome = mv.apply_and_swap_on_savings(shorter, near.deep_copy());
        assert!(outcome.is_accepted());
        assert!((outcome.savings() - 20.0 * (1.0 + 0.01)).abs() < 1e-9);
    }

    #[test]
    fn test_rounding_noise_is_not_an_improvement() {
        let v = vehicle(10);
        let a = tour(&[(1, 3.0, 4.0)]);
        let b = tour(&[(2, -7.0, 1.0)]);
        let selection = Selection::Edges { first: [1, 2], second: [1, 2] };
        let noise = |_: &Tour, _: &Tour, _: &Vehicle, _: f64| 1e-12;
        let mv = NeighborhoodMove::new(&a, &b, selection.clone(), &v, 1000.0, &noise);
        assert!(!mv.apply_and_swap_on_savings(a.deep_copy(), b.deep_copy()).is_accepted());

        let mv = NeighborhoodMove::new(&a, &b, selection, &v, 1000.0, &noise)
            .with_policy(AcceptancePolicy::Unconditional);
        assert!(mv.apply_and_swap_on_savings(a.deep_copy(), b.deep_copy()).is_accepted());
    }

    #[test]
    fn test_unconditional_still_requires_feasibility() {
        let v = vehicle(1);
        let a = tour(&[(1, 1.0, 0.0)]);
        let b = tour(&[(2, 2.0, 0.0)]);
        let selection = Selection::Edges { first: [1, 2], second: [1, 2] };
        let mv = NeighborhoodMove::new(&a, &b, selection, &v, 1000.0, &get_savings)
            .with_policy(AcceptancePolicy::Unconditional);

        let worse = tour(&[(1, 30.0, 0.0)]);
        assert!(mv
            .apply_and_swap_on_savings(worse, b.deep_copy())
            .is_accepted());

        let overloaded = tour(&[(1, 1.0, 0.0), (3, 1.0, 1.0)]);
        assert!(!mv
            .apply_and_swap_on_savings(overloaded, b.deep_copy())
            .is_accepted());
    }

    #[test]
    fn test_selection_neighborhood() {
        let chains = Selection::Chains { first: vec![], second: vec![] };
        assert_eq!(chains.neighborhood(), Neighborhood::CrossExchange);
    }
}
