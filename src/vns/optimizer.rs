//! VNS/VND driver over the four neighborhoods.
//!
//! # Algorithm
//!
//! The working set is the concatenation of all per-cluster tour plans plus
//! the unresolved outliers. Each top-level iteration walks the neighborhoods
//! in [`Neighborhood::ORDER`]:
//!
//! 1. 2-opt on every tour
//! 2. cross-exchange over every ordered pair of distinct tours
//! 3. λ-interchange over every ordered pair of distinct tours
//! 4. sequential insertion of outliers and relocation of customers
//!
//! The first neighborhood that accepts a move ends the iteration, and the
//! next one starts again at 2-opt. Otherwise the walk advances. After each
//! iteration the plan cost, rounded to two decimals, is recorded. The search
//! stops once the last `stagnation_window` costs are equal (after at least
//! `min_iterations`) or `max_iterations` is reached. Outliers that never
//! found a feasible slot are then served by their own depot-node-depot tour.
//!
//! # Reference
//!
//! Mladenović, N. & Hansen, P. (1997). "Variable neighborhood search",
//! *Computers & Operations Research* 24(11), 1097-1100.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument, warn};

use super::config::VnsConfig;
use super::result::OptimizationResult;
use crate::error::CevrpError;
use crate::evaluation::{get_weighted_costs_of_tour, get_weighted_savings, CostWeights, SavingsFn};
use crate::local_search::{
    interior_edge_starts, random_tour_section, two_opt_move, MoveOutcome, Neighborhood,
    NeighborhoodMove, RelocationLedger, SamplingBudget, Selection, SequentialInsertion,
};
use crate::models::{Node, ProblemInstance, Tour, TourPlan, Vehicle};

/// Mutable state of one run. Operators only ever see copies of it.
struct SearchState {
    tours: Vec<Tour>,
    outliers: Vec<Node>,
    ledger: RelocationLedger,
}

fn round_cost(cost: f64) -> f64 {
    (cost * 100.0).round() / 100.0
}

fn plan_cost(tours: &[Tour], vehicle: &Vehicle, battery_threshold: f64, weights: &CostWeights) -> f64 {
    tours
        .iter()
        .map(|t| get_weighted_costs_of_tour(t, vehicle, battery_threshold, weights).total)
        .sum()
}

/// Two depot-free sub-chains, one per tour, not both single nodes.
fn sample_chains<R: Rng>(
    tour_1: &Tour,
    tour_2: &Tour,
    budget: &SamplingBudget,
    rng: &mut R,
) -> Option<(Vec<Node>, Vec<Node>)> {
    let customers_1 = tour_1.interior().len();
    let customers_2 = tour_2.interior().len();
    budget.sample(|| {
        let len_1 = rng.random_range(1..=customers_1);
        let len_2 = rng.random_range(1..=customers_2);
        if len_1 == 1 && len_2 == 1 {
            return None;
        }
        let section_1 = random_tour_section(tour_1, len_1, rng)?;
        let section_2 = random_tour_section(tour_2, len_2, rng)?;
        Some((
            tour_1.nodes()[section_1].to_vec(),
            tour_2.nodes()[section_2].to_vec(),
        ))
    })
}

/// VNS/VND optimizer bound to one problem instance.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_cevrp::local_search::SamplingBudget;
/// use u_cevrp::models::{BatteryProfile, Node, ProblemInstance, Vehicle};
/// use u_cevrp::vns::{CevrpOptimizer, VnsConfig};
///
/// let nodes = vec![
///     Node::new(1, 1, 0.0, 10.0, 0.0),
///     Node::new(2, 1, 0.0, 20.0, 0.0),
///     Node::new(3, 1, 0.0, 0.0, 10.0),
/// ];
/// let vehicle = Vehicle::new(1, 10, BatteryProfile::new(1000.0, 1.0, 100.0), 1000.0);
/// let problem = ProblemInstance::new(nodes, vec![vehicle]).unwrap();
/// let plan = problem.clarke_wright(problem.customers()).unwrap();
///
/// let budget = SamplingBudget::new(100, Duration::from_millis(20));
/// let config = VnsConfig::default()
///     .with_max_iterations(10)
///     .with_two_opt_sampling(budget)
///     .with_cross_exchange_sampling(budget)
///     .with_seed(1);
/// let result = CevrpOptimizer::new(&problem, config)
///     .optimize(vec![plan], Vec::new())
///     .unwrap();
/// assert_eq!(result.total_demand(), 3);
/// ```
pub struct CevrpOptimizer<'a> {
    problem: &'a ProblemInstance,
    config: VnsConfig,
}

impl<'a> CevrpOptimizer<'a> {
    pub fn new(problem: &'a ProblemInstance, config: VnsConfig) -> Self {
        Self { problem, config }
    }

    pub fn config(&self) -> &VnsConfig {
        &self.config
    }

    fn vehicle(&self) -> &'a Vehicle {
        self.problem.reference_vehicle()
    }

    fn threshold(&self) -> f64 {
        self.problem.battery_threshold()
    }

    fn is_stagnant(&self, history: &[f64]) -> bool {
        let window = self.config.stagnation_window.max(1);
        history.len() >= self.config.min_iterations
            && history.len() >= window
            && history[history.len() - window..]
                .windows(2)
                .all(|w| w[0] == w[1])
    }

    /// Improves the concatenation of `plans` and places `outliers`.
    ///
    /// # Errors
    ///
    /// Only structural faults raised by an operator; infeasible candidates
    /// and exhausted sampling budgets are ordinary outcomes.
    #[instrument(skip_all, fields(outliers = outliers.len()))]
    pub fn optimize(
        &self,
        plans: impl IntoIterator<Item = TourPlan>,
        outliers: Vec<Node>,
    ) -> Result<OptimizationResult, CevrpError> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let weights = self.config.cost_weights;
        let weighted = |old: &Tour, new: &Tour, vehicle: &Vehicle, threshold: f64| {
            get_weighted_savings(old, new, vehicle, threshold, &weights)
        };
        let savings: SavingsFn<'_> = &weighted;

        let mut state = SearchState {
            tours: plans.into_iter().flat_map(TourPlan::into_tours).collect(),
            outliers,
            ledger: RelocationLedger::new(),
        };
        info!(
            tours = state.tours.len(),
            outliers = state.outliers.len(),
            cost = plan_cost(&state.tours, self.vehicle(), self.threshold(), &weights),
            "starting optimization"
        );

        let mut history = Vec::new();
        let mut iterations = 0;
        while iterations < self.config.max_iterations {
            iterations += 1;
            let mut neighborhood = Some(Neighborhood::first());
            while let Some(current) = neighborhood {
                let accepted = self.explore(current, &mut state, savings, &mut rng)?;
                if accepted > 0 {
                    debug!(neighborhood = %current, accepted, iteration = iterations, "improved");
                    break;
                }
                warn!(neighborhood = %current, iteration = iterations, "no improving move");
                neighborhood = current.next();
            }

            let cost = round_cost(plan_cost(&state.tours, self.vehicle(), self.threshold(), &weights));
            history.push(cost);
            info!(
                iteration = iterations,
                cost,
                tours = state.tours.len(),
                outliers = state.outliers.len(),
                "iteration finished"
            );
            if self.is_stagnant(&history) {
                debug!(iteration = iterations, "cost stagnated");
                break;
            }
        }

        let forced = std::mem::take(&mut state.outliers);
        for outlier in &forced {
            warn!(node = outlier.id(), "forcing outlier into its own tour");
            state.tours.push(Tour::around(self.problem.depot(), outlier)?);
        }

        let total_cost = plan_cost(&state.tours, self.vehicle(), self.threshold(), &weights);
        info!(
            iterations,
            tours = state.tours.len(),
            forced = forced.len(),
            cost = total_cost,
            "optimization finished"
        );
        Ok(OptimizationResult::new(
            state.tours,
            history,
            forced,
            iterations,
            total_cost,
        ))
    }

    /// Runs one neighborhood and returns the number of accepted moves.
    fn explore<R: Rng>(
        &self,
        neighborhood: Neighborhood,
        state: &mut SearchState,
        savings: SavingsFn<'_>,
        rng: &mut R,
    ) -> Result<usize, CevrpError> {
        match neighborhood {
            Neighborhood::TwoOptMove => self.two_opt_pass(&mut state.tours, savings, rng),
            Neighborhood::CrossExchange => self.cross_exchange_pass(&mut state.tours, savings, rng),
            Neighborhood::TwoLambdaInterchange => {
                self.interchange_pass(&mut state.tours, savings, rng)
            }
            Neighborhood::SequentialInsertion => self.insertion_pass(state, savings),
        }
    }

    fn two_opt_pass<R: Rng>(
        &self,
        tours: &mut [Tour],
        savings: SavingsFn<'_>,
        rng: &mut R,
    ) -> Result<usize, CevrpError> {
        let mut accepted = 0;
        for tour in tours.iter_mut() {
            let outcome = two_opt_move(
                tour,
                self.vehicle(),
                self.threshold(),
                savings,
                self.config.two_opt_iterations,
                &self.config.two_opt_sampling,
                rng,
            )?;
            if let MoveOutcome::Accepted { result, savings } = outcome {
                debug!(tour = tour.id(), savings, "2-opt");
                *tour = result;
                accepted += 1;
            }
        }
        Ok(accepted)
    }

    fn cross_exchange_pass<R: Rng>(
        &self,
        tours: &mut [Tour],
        savings: SavingsFn<'_>,
        rng: &mut R,
    ) -> Result<usize, CevrpError> {
        let mut accepted = 0;
        for i in 0..tours.len() {
            for j in 0..tours.len() {
                if i == j {
                    continue;
                }
                for _ in 0..self.config.cross_exchange_trials {
                    let (c1, c2) = (tours[i].interior().len(), tours[j].interior().len());
                    if c1 == 0 || c2 == 0 || (c1 == 1 && c2 == 1) {
                        break;
                    }
                    let Some((first, second)) = sample_chains(
                        &tours[i],
                        &tours[j],
                        &self.config.cross_exchange_sampling,
                        rng,
                    ) else {
                        warn!(tour_1 = tours[i].id(), tour_2 = tours[j].id(), "chain sampling timed out");
                        break;
                    };
                    let outcome = NeighborhoodMove::new(
                        &tours[i],
                        &tours[j],
                        Selection::Chains { first, second },
                        self.vehicle(),
                        self.threshold(),
                        savings,
                    )
                    .apply()?;
                    if let MoveOutcome::Accepted { result: (t1, t2), savings } = outcome {
                        debug!(tour_1 = %t1, tour_2 = %t2, savings, "cross-exchange");
                        tours[i] = t1;
                        tours[j] = t2;
                        accepted += 1;
                    }
                }
            }
        }
        Ok(accepted)
    }

    fn interchange_pass<R: Rng>(
        &self,
        tours: &mut [Tour],
        savings: SavingsFn<'_>,
        rng: &mut R,
    ) -> Result<usize, CevrpError> {
        let mut accepted = 0;
        for i in 0..tours.len() {
            for j in 0..tours.len() {
                if i == j {
                    continue;
                }
                let (edges_1, edges_2) = (interior_edge_starts(&tours[i]), interior_edge_starts(&tours[j]));
                if edges_1.is_empty() || edges_2.is_empty() {
                    continue;
                }
                for _ in 0..self.config.interchange_trials {
                    let a = rng.random_range(edges_1.clone());
                    let b = rng.random_range(edges_2.clone());
                    let outcome = NeighborhoodMove::new(
                        &tours[i],
                        &tours[j],
                        Selection::Edges {
                            first: [a, a + 1],
                            second: [b, b + 1],
                        },
                        self.vehicle(),
                        self.threshold(),
                        savings,
                    )
                    .apply()?;
                    if let MoveOutcome::Accepted { result: (t1, t2), savings } = outcome {
                        debug!(tour_1 = %t1, tour_2 = %t2, savings, "λ-interchange");
                        tours[i] = t1;
                        tours[j] = t2;
                        accepted += 1;
                    }
                }
            }
        }
        Ok(accepted)
    }

    fn insertion_pass(&self, state: &mut SearchState, savings: SavingsFn<'_>) -> Result<usize, CevrpError> {
        let clients: Vec<Node> = state
            .tours
            .iter()
            .flat_map(|t| t.interior().iter().cloned())
            .collect();
        let plan = TourPlan::new(std::mem::take(&mut state.tours));
        let operator = SequentialInsertion::new(self.vehicle(), self.threshold(), savings)
            .with_weights(self.config.cost_weights)
            .with_max_relocations_per_node(self.config.max_relocations_per_node);
        let outcome = operator.run(&clients, state.outliers.clone(), &plan, &mut state.ledger);
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                state.tours = plan.into_tours();
                return Err(e.into());
            }
        };
        let accepted = outcome.placed.len() + outcome.relocated;
        state.tours = outcome.plan.into_tours();
        state.outliers = outcome.outliers;
        Ok(accepted)
    }
}

/// Runs the optimizer with the default configuration over per-cluster plans
/// and returns the final flat list of tours.
///
/// # Errors
///
/// See [`CevrpOptimizer::optimize`].
pub fn optimize(
    plans_by_cluster: BTreeMap<usize, TourPlan>,
    problem: &ProblemInstance,
    outliers: Vec<Node>,
) -> Result<Vec<Tour>, CevrpError> {
    CevrpOptimizer::new(problem, VnsConfig::default())
        .optimize(plans_by_cluster.into_values(), outliers)
        .map(OptimizationResult::into_tours)
}
