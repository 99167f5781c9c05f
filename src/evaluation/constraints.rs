//! Tour feasibility constraints.
//!
//! Each constraint is a pure predicate over `(tour, vehicle, battery_threshold)`.
//! The set is closed: new checks are added as [`Constraint`] variants.

use std::fmt;

use crate::models::{Tour, Vehicle};

/// Signature shared by every constraint predicate.
pub type ConstraintCheck = fn(&Tour, &Vehicle, f64) -> bool;

/// A feasibility constraint on a single tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// The depot occurs exactly twice.
    DepotCount,
    /// Summed demand fits the commodity capacity.
    TourCapacity,
    /// Summed edge length stays within the vehicle distance threshold.
    TotalDistance,
    /// No single hop consumes more than the battery reserve.
    BatteryCapacity,
}

impl Constraint {
    pub const ALL: [Constraint; 4] = [
        Constraint::DepotCount,
        Constraint::TourCapacity,
        Constraint::TotalDistance,
        Constraint::BatteryCapacity,
    ];

    /// The predicate implementing this constraint.
    pub fn check(self) -> ConstraintCheck {
        match self {
            Constraint::DepotCount => depot_count,
            Constraint::TourCapacity => tour_capacity,
            Constraint::TotalDistance => total_distance,
            Constraint::BatteryCapacity => battery_capacity,
        }
    }

    pub fn is_satisfied(self, tour: &Tour, vehicle: &Vehicle, battery_threshold: f64) -> bool {
        (self.check())(tour, vehicle, battery_threshold)
    }

    pub fn name(self) -> &'static str {
        match self {
            Constraint::DepotCount => "DEPOT_COUNT",
            Constraint::TourCapacity => "TOUR_CAPACITY",
            Constraint::TotalDistance => "TOTAL_DISTANCE",
            Constraint::BatteryCapacity => "BATTERY_CAPACITY",
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn depot_count(tour: &Tour, _vehicle: &Vehicle, _battery_threshold: f64) -> bool {
    tour.nodes().iter().filter(|n| n.is_depot()).count() == 2
}

fn tour_capacity(tour: &Tour, vehicle: &Vehicle, _battery_threshold: f64) -> bool {
    tour.total_demand() <= vehicle.commodity_capacity()
}

fn total_distance(tour: &Tour, vehicle: &Vehicle, _battery_threshold: f64) -> bool {
    tour.total_distance() <= vehicle.distance_threshold()
}

fn battery_capacity(tour: &Tour, vehicle: &Vehicle, battery_threshold: f64) -> bool {
    let rate = vehicle.battery().consumption_rate;
    tour.edges()
        .all(|(a, b)| a.distance_to(b) * rate <= battery_threshold)
}

/// Evaluates a set of constraints against candidate tours.
///
/// # Examples
///
/// ```
/// use u_cevrp::models::{BatteryProfile, Node, Tour, Vehicle};
/// use u_cevrp::evaluation::{Constraint, ConstraintValidator};
///
/// let d = Node::depot();
/// let tour = Tour::new(vec![d.clone(), Node::new(1, 8, 0.0, 3.0, 4.0), d]).unwrap();
/// let v = Vehicle::new(1, 5, BatteryProfile::new(100.0, 1.0, 1.0), 100.0);
///
/// let validator = ConstraintValidator::default();
/// assert!(!validator.is_feasible(&tour, &v, 10.0));
/// assert_eq!(validator.violations(&tour, &v, 10.0), vec![Constraint::TourCapacity]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintValidator {
    constraints: Vec<Constraint>,
}

impl Default for ConstraintValidator {
    fn default() -> Self {
        Self::new(Constraint::ALL.to_vec())
    }
}

impl ConstraintValidator {
    pub fn new(constraints: Vec<Constraint>) -> Self {
        Self { constraints }
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn is_feasible(&self, tour: &Tour, vehicle: &Vehicle, battery_threshold: f64) -> bool {
        self.constraints
            .iter()
            .all(|c| c.is_satisfied(tour, vehicle, battery_threshold))
    }

    /// Constraints the tour breaks, in validator order.
    pub fn violations(&self, tour: &Tour, vehicle: &Vehicle, battery_threshold: f64) -> Vec<Constraint> {
        self.constraints
            .iter()
            .copied()
            .filter(|c| !c.is_satisfied(tour, vehicle, battery_threshold))
            .collect()
    }
}

/// Checks all four constraints.
pub fn is_feasible(tour: &Tour, vehicle: &Vehicle, battery_threshold: f64) -> bool {
    Constraint::ALL
        .iter()
        .all(|c| c.is_satisfied(tour, vehicle, battery_threshold))
}
