//! CEVRP problem instance.

use std::collections::HashSet;

use super::{Node, Vehicle};
use crate::distance::max_pairwise_distance;
use crate::error::CevrpError;

/// Nodes, vehicle roster and the derived battery threshold of one instance.
///
/// The depot is always stored first and is inserted if the node list lacks
/// it. Only the first vehicle (the reference vehicle) is used for cost and
/// feasibility evaluation.
///
/// # Examples
///
/// ```
/// use u_cevrp::models::{BatteryProfile, Node, ProblemInstance, Vehicle};
///
/// let nodes = vec![
///     Node::new(1, 1, 0.0, 10.0, 0.0),
///     Node::new(2, 1, 0.0, 0.0, 10.0),
/// ];
/// let vehicle = Vehicle::new(1, 10, BatteryProfile::new(1000.0, 2.0, 100.0), 1000.0);
/// let problem = ProblemInstance::new(nodes, vec![vehicle]).unwrap();
///
/// assert!(problem.depot().is_depot());
/// assert_eq!(problem.customers().len(), 2);
/// // longest customer-to-customer hop (√200) times the consumption rate
/// assert!((problem.battery_threshold() - 2.0 * 200f64.sqrt()).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct ProblemInstance {
    nodes: Vec<Node>,
    vehicles: Vec<Vehicle>,
    battery_threshold: f64,
}

impl ProblemInstance {
    /// Creates an instance.
    ///
    /// # Errors
    ///
    /// [`CevrpError::NoVehicle`] for an empty roster,
    /// [`CevrpError::DuplicateNode`] if two nodes share an id, and
    /// [`CevrpError::DepotNotAtOrigin`] for a depot node away from `(0, 0)`.
    /// Savings and insertion ranking measure against the origin.
    pub fn new(mut nodes: Vec<Node>, vehicles: Vec<Vehicle>) -> Result<Self, CevrpError> {
        if vehicles.is_empty() {
            return Err(CevrpError::NoVehicle);
        }
        let mut seen = HashSet::with_capacity(nodes.len());
        for node in &nodes {
            if !seen.insert(node.id()) {
                return Err(CevrpError::DuplicateNode(node.id()));
            }
        }
        if let Some(depot) = nodes.iter().find(|n| n.is_depot()) {
            if depot.x() != 0.0 || depot.y() != 0.0 {
                return Err(CevrpError::DepotNotAtOrigin {
                    x: depot.x(),
                    y: depot.y(),
                });
            }
        }
        match nodes.iter().position(Node::is_depot) {
            Some(0) => {}
            Some(pos) => {
                let depot = nodes.remove(pos);
                nodes.insert(0, depot);
            }
            None => nodes.insert(0, Node::depot()),
        }
        let mut problem = Self {
            nodes,
            vehicles,
            battery_threshold: 0.0,
        };
        problem.battery_threshold = problem.compute_battery_threshold();
        Ok(problem)
    }

    /// Reserve needed to always cover the longest customer-to-customer hop.
    fn compute_battery_threshold(&self) -> f64 {
        max_pairwise_distance(self.customers())
            * self.reference_vehicle().battery().consumption_rate
    }

    /// All nodes, depot first.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All nodes except the depot.
    pub fn customers(&self) -> &[Node] {
        &self.nodes[1..]
    }

    pub fn depot(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// The vehicle used as cost and feasibility template.
    pub fn reference_vehicle(&self) -> &Vehicle {
        &self.vehicles[0]
    }

    pub fn battery_threshold(&self) -> f64 {
        self.battery_threshold
    }

    /// Looks up a node by id.
    pub fn node_by_id(&self, id: usize) -> Result<&Node, CevrpError> {
        self.nodes
            .iter()
            .find(|n| n.id() == id)
            .ok_or(CevrpError::UnknownNode(id))
    }

    /// Adds a customer and recomputes the battery threshold.
    pub fn add_node(&mut self, node: Node) -> Result<(), CevrpError> {
        if self.nodes.contains(&node) {
            return Err(CevrpError::DuplicateNode(node.id()));
        }
        self.nodes.push(node);
        self.battery_threshold = self.compute_battery_threshold();
        Ok(())
    }

    pub fn add_vehicle(&mut self, vehicle: Vehicle) {
        self.vehicles.push(vehicle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BatteryProfile;

    fn vehicle() -> Vehicle {
        Vehicle::new(1, 10, BatteryProfile::new(100.0, 1.0, 10.0), 100.0)
    }

    #[test]
    fn test_inserts_depot() {
        let p = ProblemInstance::new(vec![Node::new(1, 1, 0.0, 1.0, 0.0)], vec![vehicle()])
            .expect("valid");
        assert_eq!(p.nodes().len(), 2);
        assert!(p.depot().is_depot());
        assert_eq!(p.customers()[0].id(), 1);
    }

    #[test]
    fn test_moves_depot_to_front() {
        let nodes = vec![Node::new(1, 1, 0.0, 1.0, 0.0), Node::depot()];
        let p = ProblemInstance::new(nodes, vec![vehicle()]).expect("valid");
        assert_eq!(p.nodes().len(), 2);
        assert!(p.depot().is_depot());
    }

    #[test]
    fn test_requires_vehicle() {
        assert!(matches!(
            ProblemInstance::new(vec![], vec![]),
            Err(CevrpError::NoVehicle)
        ));
    }

    #[test]
    fn test_rejects_duplicates() {
        let nodes = vec![Node::new(1, 1, 0.0, 1.0, 0.0), Node::new(1, 2, 0.0, 2.0, 0.0)];
        assert!(matches!(
            ProblemInstance::new(nodes, vec![vehicle()]),
            Err(CevrpError::DuplicateNode(1))
        ));
    }

    #[test]
    fn test_rejects_depot_away_from_origin() {
        let nodes = vec![Node::new(0, 0, 0.0, 5.0, -2.0), Node::new(1, 1, 0.0, 1.0, 0.0)];
        assert!(matches!(
            ProblemInstance::new(nodes, vec![vehicle()]),
            Err(CevrpError::DepotNotAtOrigin { x, y }) if x == 5.0 && y == -2.0
        ));
    }

    #[test]
    fn test_battery_threshold_ignores_depot() {
        let nodes = vec![Node::new(1, 1, 0.0, 50.0, 0.0), Node::new(2, 1, 0.0, 53.0, 4.0)];
        let p = ProblemInstance::new(nodes, vec![vehicle()]).expect("valid");
        assert!((p.battery_threshold() - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_add_node_and_lookup() {
        let mut p = ProblemInstance::new(vec![Node::new(1, 1, 0.0, 0.0, 3.0)], vec![vehicle()])
            .expect("valid");
        assert_eq!(p.battery_threshold(), 0.0);
        p.add_node(Node::new(2, 1, 0.0, 4.0, 0.0)).expect("new id");
        assert!((p.battery_threshold() - 5.0).abs() < 1e-10);
        assert!(p.add_node(Node::new(2, 1, 0.0, 9.0, 9.0)).is_err());
        assert_eq!(p.node_by_id(2).expect("exists").x(), 4.0);
        assert!(matches!(p.node_by_id(7), Err(CevrpError::UnknownNode(7))));
        p.add_vehicle(vehicle());
        assert_eq!(p.vehicles().len(), 2);
    }
}
