//! Optimization results and per-tour reports.

use serde::{Deserialize, Serialize};

use crate::evaluation::{get_costs_of_tour, CostBreakdown};
use crate::models::{Node, Tour, TourPlan, Vehicle};

/// Read-only view of one tour for reporting and plotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourReport {
    pub tour_id: u64,
    pub node_ids: Vec<usize>,
    pub costs: CostBreakdown,
}

impl TourReport {
    pub fn new(tour: &Tour, vehicle: &Vehicle, battery_threshold: f64) -> Self {
        Self {
            tour_id: tour.id(),
            node_ids: tour.node_ids(),
            costs: get_costs_of_tour(tour, vehicle, battery_threshold),
        }
    }
}

/// Outcome of a VNS/VND run.
#[derive(Debug)]
pub struct OptimizationResult {
    tours: Vec<Tour>,
    cost_history: Vec<f64>,
    forced_outliers: Vec<Node>,
    iterations: usize,
    total_cost: f64,
}

impl OptimizationResult {
    pub(crate) fn new(
        tours: Vec<Tour>,
        cost_history: Vec<f64>,
        forced_outliers: Vec<Node>,
        iterations: usize,
        total_cost: f64,
    ) -> Self {
        Self {
            tours,
            cost_history,
            forced_outliers,
            iterations,
            total_cost,
        }
    }

    /// Final tours, forced singleton tours included.
    pub fn tours(&self) -> &[Tour] {
        &self.tours
    }

    pub fn into_tours(self) -> Vec<Tour> {
        self.tours
    }

    pub fn into_plan(self) -> TourPlan {
        TourPlan::new(self.tours)
    }

    /// Plan cost after every iteration, rounded to two decimals.
    pub fn cost_history(&self) -> &[f64] {
        &self.cost_history
    }

    /// Outliers that never found a feasible slot and got their own tour.
    pub fn forced_outliers(&self) -> &[Node] {
        &self.forced_outliers
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Weighted cost of the final tours.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn total_demand(&self) -> u32 {
        self.tours.iter().map(Tour::total_demand).sum()
    }

    /// Per-tour cost breakdowns with unit weights.
    pub fn report(&self, vehicle: &Vehicle, battery_threshold: f64) -> Vec<TourReport> {
        self.tours
            .iter()
            .map(|t| TourReport::new(t, vehicle, battery_threshold))
            .collect()
    }
}
