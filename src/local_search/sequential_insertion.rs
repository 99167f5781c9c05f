//! Sequential insertion of unassigned nodes and relocation of placed ones.
//!
//! # Algorithm
//!
//! Candidates are ranked outliers first, then already placed customers, each
//! group by decreasing distance to the depot: far nodes are the hardest to
//! place later. For every candidate, each tour that does not yet contain it
//! is tried. Within a tour the candidate goes in front of one of the tour's
//! customers, and positions are tried in increasing cost of the short chain
//! `candidate -> customer`. The first feasible position wins.
//!
//! An outlier only needs a feasible slot. A placed customer is relocated
//! only if its source tour stays feasible without it, the summed savings of
//! both tours exceed the improvement tolerance, and it has not reached its
//! relocation cap. Source tours left without customers are removed from the plan.

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::error::TourError;
use crate::evaluation::{
    chain_costs, get_savings, is_feasible, CostWeights, SavingsFn, IMPROVEMENT_EPSILON,
};
use crate::models::{Node, Tour, TourPlan, Vehicle};

/// How often each node has been relocated between tours.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelocationLedger {
    moves: HashMap<usize, usize>,
}

impl RelocationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, node_id: usize) -> usize {
        self.moves.get(&node_id).copied().unwrap_or(0)
    }

    pub fn record(&mut self, node_id: usize) {
        *self.moves.entry(node_id).or_insert(0) += 1;
    }

    pub fn can_relocate(&self, node_id: usize, cap: usize) -> bool {
        self.count(node_id) < cap
    }
}

/// Result of one sequential insertion pass.
#[derive(Debug)]
pub struct InsertionOutcome {
    /// The updated plan.
    pub plan: TourPlan,
    /// Outliers for which no feasible slot exists.
    pub outliers: Vec<Node>,
    /// Ids of outliers placed during this pass.
    pub placed: Vec<usize>,
    /// Number of customers moved between tours.
    pub relocated: usize,
}

impl InsertionOutcome {
    pub fn is_improved(&self) -> bool {
        !self.placed.is_empty() || self.relocated > 0
    }
}

/// Sequential insertion operator.
///
/// # Examples
///
/// ```
/// use u_cevrp::models::{BatteryProfile, Node, Tour, TourPlan, Vehicle};
/// use u_cevrp::evaluation::get_savings;
/// use u_cevrp::local_search::{RelocationLedger, SequentialInsertion};
///
/// let d = Node::depot();
/// let a = Node::new(1, 1, 0.0, 10.0, 0.0);
/// let far = Node::new(2, 1, 0.0, 40.0, 0.0);
/// let plan = TourPlan::new(vec![Tour::around(&d, &a).unwrap()]);
/// let v = Vehicle::new(1, 10, BatteryProfile::new(1000.0, 1.0, 10.0), 1000.0);
///
/// let op = SequentialInsertion::new(&v, 100.0, &get_savings);
/// let outcome = op.run(&[a], vec![far], &plan, &mut RelocationLedger::new()).unwrap();
/// assert!(outcome.outliers.is_empty());
/// assert_eq!(outcome.plan.tours()[0].node_ids(), vec![0, 2, 1, 0]);
/// ```
pub struct SequentialInsertion<'a> {
    vehicle: &'a Vehicle,
    battery_threshold: f64,
    savings: SavingsFn<'a>,
    weights: CostWeights,
    max_relocations_per_node: usize,
}

impl<'a> SequentialInsertion<'a> {
    pub fn new(vehicle: &'a Vehicle, battery_threshold: f64, savings: SavingsFn<'a>) -> Self {
        Self {
            vehicle,
            battery_threshold,
            savings,
            weights: CostWeights::default(),
            max_relocations_per_node: 3,
        }
    }

    /// Weights used to rank insertion positions.
    pub fn with_weights(mut self, weights: CostWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_max_relocations_per_node(mut self, cap: usize) -> Self {
        self.max_relocations_per_node = cap;
        self
    }

    fn feasible(&self, tour: &Tour) -> bool {
        is_feasible(tour, self.vehicle, self.battery_threshold)
    }

    /// Outliers, then the remaining clients, each by decreasing depot distance.
    fn priority_order(clients: &[Node], outliers: &[Node]) -> Vec<Node> {
        let depot = Node::depot();
        let by_distance = |nodes: &mut Vec<Node>| {
            nodes.sort_by(|a, b| depot.distance_to(b).total_cmp(&depot.distance_to(a)));
        };
        let mut order = outliers.to_vec();
        by_distance(&mut order);
        let mut placed: Vec<Node> = clients
            .iter()
            .filter(|c| !c.is_depot() && !outliers.contains(c))
            .cloned()
            .collect();
        by_distance(&mut placed);
        order.extend(placed);
        order
    }

    /// Insertion positions in `tour` (insert before the node there), cheapest
    /// partial chain first.
    fn ranked_positions(&self, client: &Node, tour: &Tour) -> Vec<usize> {
        let mut ranked: Vec<(usize, f64)> = (1..tour.len() - 1)
            .map(|p| {
                let chain = [client.clone(), tour.nodes()[p].clone()];
                let cost = chain_costs(&chain, self.vehicle, self.battery_threshold, &self.weights);
                (p, cost.total)
            })
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked.into_iter().map(|(p, _)| p).collect()
    }

    /// First acceptable `(tour index, candidate)` for `client`.
    ///
    /// `source` holds the client's current tour index and that tour without
    /// the client, for relocations.
    fn find_slot(
        &self,
        client: &Node,
        plan: &TourPlan,
        source: Option<&(usize, Tour)>,
    ) -> Result<Option<(usize, Tour)>, TourError> {
        for (index, tour) in plan.iter().enumerate() {
            if tour.contains(client) {
                continue;
            }
            for position in self.ranked_positions(client, tour) {
                let mut candidate = tour.deep_copy();
                candidate.insert(position, client.clone())?;
                if !self.feasible(&candidate) {
                    continue;
                }
                if let Some((src, shrunk)) = source {
                    let saved = (self.savings)(&plan.tours()[*src], shrunk, self.vehicle, self.battery_threshold)
                        + (self.savings)(tour, &candidate, self.vehicle, self.battery_threshold);
                    if saved <= IMPROVEMENT_EPSILON {
                        continue;
                    }
                }
                return Ok(Some((index, candidate)));
            }
        }
        Ok(None)
    }

    /// Runs one pass over `outliers` and the placed nodes among `clients`.
    ///
    /// `plan` is left untouched; the outcome carries a modified copy.
    ///
    /// # Errors
    ///
    /// Only structural faults while editing tours, which indicate a corrupt
    /// plan.
    #[instrument(skip_all, fields(clients = clients.len(), outliers = outliers.len()))]
    pub fn run(
        &self,
        clients: &[Node],
        outliers: Vec<Node>,
        plan: &TourPlan,
        ledger: &mut RelocationLedger,
    ) -> Result<InsertionOutcome, TourError> {
        let mut plan = plan.deep_copy();
        let mut outliers = outliers;
        let mut placed = Vec::new();
        let mut relocated = 0;

        for client in Self::priority_order(clients, &outliers) {
            let source = if outliers.contains(&client) {
                None
            } else {
                let Some(index) = plan.position_of_node(&client) else {
                    continue;
                };
                if !ledger.can_relocate(client.id(), self.max_relocations_per_node) {
                    continue;
                }
                let mut shrunk = plan.tours()[index].deep_copy();
                shrunk.remove_node(&client)?;
                if !self.feasible(&shrunk) {
                    continue;
                }
                Some((index, shrunk))
            };

            let Some((target, candidate)) = self.find_slot(&client, &plan, source.as_ref())? else {
                continue;
            };
            plan.replace_at(target, candidate)?;

            match source {
                Some((index, shrunk)) => {
                    let emptied = shrunk.is_empty();
                    plan.replace_at(index, shrunk)?;
                    if emptied {
                        plan.remove_at(index);
                    }
                    ledger.record(client.id());
                    relocated += 1;
                    debug!(node = client.id(), emptied, "relocated customer");
                }
                None => {
                    outliers.retain(|o| o != &client);
                    placed.push(client.id());
                    debug!(node = client.id(), "placed outlier");
                }
            }
        }

        Ok(InsertionOutcome {
            plan,
            outliers,
            placed,
            relocated,
        })
    }
}

/// One insertion pass with unit-weight savings and a fresh relocation ledger.
///
/// Returns the outliers that could not be placed and the updated plan.
pub fn sequential_insertion(
    clients: &[Node],
    outliers: Vec<Node>,
    plan: &TourPlan,
    vehicle: &Vehicle,
    battery_threshold: f64,
) -> Result<(Vec<Node>, TourPlan), TourError> {
    let outcome = SequentialInsertion::new(vehicle, battery_threshold, &get_savings).run(
        clients,
        outliers,
        plan,
        &mut RelocationLedger::new(),
    )?;
    Ok((outcome.outliers, outcome.plan))
}
