//! Electric vehicle with a battery simulator.

use serde::{Deserialize, Serialize};

use super::Node;

/// Static battery characteristics of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryProfile {
    /// Full charge.
    pub capacity: f64,
    /// Charge consumed per unit distance.
    pub consumption_rate: f64,
    /// Charge restored per unit time.
    pub charging_rate: f64,
}

impl BatteryProfile {
    pub fn new(capacity: f64, consumption_rate: f64, charging_rate: f64) -> Self {
        Self {
            capacity,
            consumption_rate,
            charging_rate,
        }
    }
}

/// A vehicle template that doubles as a battery simulator.
///
/// `current_battery_level` is the only mutable state. Cost computations walk
/// a tour on a [`recharged`](Vehicle::recharged) copy and never touch the
/// template itself.
///
/// # Examples
///
/// ```
/// use u_cevrp::models::{BatteryProfile, Vehicle};
///
/// let template = Vehicle::new(1, 100, BatteryProfile::new(50.0, 2.0, 10.0), 300.0);
/// let mut sim = template.recharged();
/// sim.discharge(10.0);
/// assert_eq!(sim.current_battery_level(), 30.0);
/// assert_eq!(sim.charge_deficit(), 20.0);
/// assert_eq!(sim.recharge_time(), 2.0);
/// assert_eq!(template.current_battery_level(), 50.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    id: usize,
    commodity_capacity: u32,
    distance_threshold: f64,
    battery: BatteryProfile,
    current_battery_level: f64,
}

impl Vehicle {
    /// Creates a fully charged vehicle.
    pub fn new(
        id: usize,
        commodity_capacity: u32,
        battery: BatteryProfile,
        distance_threshold: f64,
    ) -> Self {
        Self {
            id,
            commodity_capacity,
            distance_threshold,
            battery,
            current_battery_level: battery.capacity,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Maximum total demand a tour may carry.
    pub fn commodity_capacity(&self) -> u32 {
        self.commodity_capacity
    }

    /// Maximum total distance of a tour.
    pub fn distance_threshold(&self) -> f64 {
        self.distance_threshold
    }

    pub fn battery(&self) -> &BatteryProfile {
        &self.battery
    }

    pub fn current_battery_level(&self) -> f64 {
        self.current_battery_level
    }

    /// Restores the battery to full capacity.
    pub fn recharge(&mut self) -> &mut Self {
        self.current_battery_level = self.battery.capacity;
        self
    }

    /// Returns a fully charged copy of this vehicle.
    pub fn recharged(&self) -> Self {
        let mut copy = self.clone();
        copy.recharge();
        copy
    }

    /// Consumes the charge needed to travel `distance`.
    pub fn discharge(&mut self, distance: f64) -> &mut Self {
        self.current_battery_level -= distance * self.battery.consumption_rate;
        self
    }

    /// Consumes the charge needed to travel from `from` to `to`.
    pub fn discharge_edge(&mut self, from: &Node, to: &Node) -> &mut Self {
        self.discharge(from.distance_to(to))
    }

    /// Charge missing to a full battery.
    pub fn charge_deficit(&self) -> f64 {
        self.battery.capacity - self.current_battery_level
    }

    /// Time needed to refill the current deficit.
    pub fn recharge_time(&self) -> f64 {
        self.charge_deficit() / self.battery.charging_rate
    }
}
