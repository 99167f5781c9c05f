//! JSON records for problem instances and optimization results.

use serde::{Deserialize, Serialize};

use crate::error::CevrpError;
use crate::models::{BatteryProfile, Node, ProblemInstance, Vehicle};
use crate::vns::{OptimizationResult, TourReport};

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename = "Vehicle")]
pub struct JsonVehicle {
    pub id: usize,
    pub capacity: u32,
    pub battery: BatteryProfile,
    pub distance_threshold: f64,
}

impl From<&Vehicle> for JsonVehicle {
    fn from(value: &Vehicle) -> Self {
        JsonVehicle {
            id: value.id(),
            capacity: value.commodity_capacity(),
            battery: *value.battery(),
            distance_threshold: value.distance_threshold(),
        }
    }
}

impl From<JsonVehicle> for Vehicle {
    fn from(value: JsonVehicle) -> Self {
        Vehicle::new(value.id, value.capacity, value.battery, value.distance_threshold)
    }
}

/// `{ "nodes": [...], "vehicles": [...] }`
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename = "ProblemInstance")]
pub struct JsonProblemInstance {
    pub nodes: Vec<Node>,
    pub vehicles: Vec<JsonVehicle>,
}

#[derive(Serialize)]
#[serde(rename = "OptimizationResult")]
pub struct JsonOptimizationResult<'a> {
    pub iterations: usize,
    pub total_cost: f64,
    pub cost_history: &'a [f64],
    pub forced_outliers: Vec<usize>,
    pub tours: Vec<TourReport>,
}

impl ProblemInstance {
    /// Reads an instance from its JSON record.
    ///
    /// ```
    /// use u_cevrp::models::ProblemInstance;
    ///
    /// let json = r#"{
    ///     "nodes": [{ "id": 1, "demand": 2, "service_time": 0.5, "x": 3.0, "y": 4.0 }],
    ///     "vehicles": [{
    ///         "id": 1,
    ///         "capacity": 10,
    ///         "battery": { "capacity": 100.0, "consumption_rate": 1.0, "charging_rate": 5.0 },
    ///         "distance_threshold": 500.0
    ///     }]
    /// }"#;
    /// let problem = ProblemInstance::from_json(json).unwrap();
    /// assert_eq!(problem.nodes().len(), 2);
    /// assert_eq!(problem.reference_vehicle().commodity_capacity(), 10);
    /// ```
    ///
    /// # Errors
    ///
    /// [`CevrpError::Json`] for malformed input, and every error of
    /// [`ProblemInstance::new`].
    pub fn from_json(json: &str) -> Result<Self, CevrpError> {
        let record: JsonProblemInstance = serde_json::from_str(json)?;
        ProblemInstance::new(
            record.nodes,
            record.vehicles.into_iter().map(Vehicle::from).collect(),
        )
    }

    /// JSON record of this instance.
    pub fn to_json(&self) -> Result<String, CevrpError> {
        let record = JsonProblemInstance {
            nodes: self.nodes().to_vec(),
            vehicles: self.vehicles().iter().map(JsonVehicle::from).collect(),
        };
        Ok(serde_json::to_string_pretty(&record)?)
    }
}

impl OptimizationResult {
    /// Dumps the result with per-tour cost reports for `problem`.
    pub fn to_json(&self, problem: &ProblemInstance) -> Result<String, CevrpError> {
        let record = JsonOptimizationResult {
            iterations: self.iterations(),
            total_cost: self.total_cost(),
            cost_history: self.cost_history(),
            forced_outliers: self.forced_outliers().iter().map(Node::id).collect(),
            tours: self.report(problem.reference_vehicle(), problem.battery_threshold()),
        };
        Ok(serde_json::to_string_pretty(&record)?)
    }
}
