//! Collections of tours.

use super::{Node, Tour, Vehicle};
use crate::error::TourError;
use crate::evaluation::{chain_costs, CostWeights};

/// A set of tours covering (part of) the customers of an instance.
///
/// Tours are looked up by identity, by the node they contain, or by
/// position.
///
/// # Examples
///
/// ```
/// use u_cevrp::models::{Node, Tour, TourPlan};
///
/// let d = Node::depot();
/// let a = Node::new(1, 1, 0.0, 1.0, 0.0);
/// let b = Node::new(2, 1, 0.0, 2.0, 0.0);
/// let plan = TourPlan::new(vec![Tour::around(&d, &a).unwrap(), Tour::around(&d, &b).unwrap()]);
///
/// assert_eq!(plan.len(), 2);
/// assert_eq!(plan.tour_of(&b).unwrap().node_ids(), vec![0, 2, 0]);
/// assert_eq!(plan.total_demand(), 2);
/// ```
#[derive(Debug, Default)]
pub struct TourPlan {
    tours: Vec<Tour>,
}

impl TourPlan {
    pub fn new(tours: Vec<Tour>) -> Self {
        Self { tours }
    }

    pub fn tours(&self) -> &[Tour] {
        &self.tours
    }

    pub fn into_tours(self) -> Vec<Tour> {
        self.tours
    }

    pub fn len(&self) -> usize {
        self.tours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tours.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tour> {
        self.tours.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Tour> {
        self.tours.get(index)
    }

    pub fn contains(&self, tour: &Tour) -> bool {
        self.tours.contains(tour)
    }

    /// Position of `tour` (by identity).
    pub fn position_of(&self, tour: &Tour) -> Option<usize> {
        self.tours.iter().position(|t| t == tour)
    }

    /// Position of the tour that contains `node`.
    pub fn position_of_node(&self, node: &Node) -> Option<usize> {
        self.tours.iter().position(|t| t.contains(node))
    }

    /// The tour that currently contains `node`.
    pub fn tour_of(&self, node: &Node) -> Option<&Tour> {
        self.tours.iter().find(|t| t.contains(node))
    }

    pub fn add(&mut self, tour: Tour) {
        self.tours.push(tour);
    }

    /// Removes `tour` (by identity) and returns it.
    pub fn remove(&mut self, tour: &Tour) -> Option<Tour> {
        let index = self.position_of(tour)?;
        Some(self.tours.remove(index))
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Tour> {
        (index < self.tours.len()).then(|| self.tours.remove(index))
    }

    /// Replaces the tour at `index` and returns the previous one.
    pub fn replace_at(&mut self, index: usize, tour: Tour) -> Result<Tour, TourError> {
        let len = self.tours.len();
        let slot = self
            .tours
            .get_mut(index)
            .ok_or(TourError::IndexOutOfBounds { index, len })?;
        Ok(std::mem::replace(slot, tour))
    }

    /// Edge lists of every tour, keyed by tour id.
    pub fn edges(&self) -> Vec<(u64, Vec<(usize, usize)>)> {
        self.tours
            .iter()
            .map(|t| (t.id(), t.edges().map(|(a, b)| (a.id(), b.id())).collect()))
            .collect()
    }

    pub fn total_demand(&self) -> u32 {
        self.tours.iter().map(Tour::total_demand).sum()
    }

    /// Summed weighted cost of all tours.
    pub fn total_cost(&self, vehicle: &Vehicle, battery_threshold: f64, weights: &CostWeights) -> f64 {
        self.tours
            .iter()
            .map(|t| chain_costs(t.nodes(), vehicle, battery_threshold, weights).total)
            .sum()
    }

    /// Deep copy of every tour (new tour ids).
    pub fn deep_copy(&self) -> TourPlan {
        TourPlan::new(self.tours.iter().map(Tour::deep_copy).collect())
    }
}

impl From<Vec<Tour>> for TourPlan {
    fn from(tours: Vec<Tour>) -> Self {
        Self::new(tours)
    }
}

impl<'a> IntoIterator for &'a TourPlan {
    type Item = &'a Tour;
    type IntoIter = std::slice::Iter<'a, Tour>;

    fn into_iter(self) -> Self::IntoIter {
        self.tours.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BatteryProfile;

    fn plan() -> (TourPlan, Vec<Node>) {
        let d = Node::depot();
        let nodes: Vec<Node> = (1..=4)
            .map(|i| Node::new(i, 1, 0.0, i as f64, 0.0))
            .collect();
        let t1 = Tour::new(vec![d.clone(), nodes[0].clone(), nodes[1].clone(), d.clone()]).expect("valid");
        let t2 = Tour::new(vec![d.clone(), nodes[2].clone(), nodes[3].clone(), d]).expect("valid");
        (TourPlan::new(vec![t1, t2]), nodes)
    }

    #[test]
    fn test_lookup() {
        let (plan, nodes) = plan();
        assert_eq!(plan.position_of_node(&nodes[3]), Some(1));
        assert_eq!(plan.tour_of(&nodes[0]).expect("present").node_ids(), vec![0, 1, 2, 0]);
        assert!(plan.tour_of(&Node::new(9, 0, 0.0, 0.0, 0.0)).is_none());
        let first = plan.get(0).expect("present");
        assert!(plan.contains(first));
        assert_eq!(plan.position_of(first), Some(0));
    }

    #[test]
    fn test_add_remove_replace() {
        let (mut plan, nodes) = plan();
        let d = Node::depot();
        let copy = plan.get(0).expect("present").deep_copy();
        assert!(!plan.contains(&copy));

        let removed = plan.replace_at(0, copy).expect("in range");
        assert_eq!(removed.node_ids(), vec![0, 1, 2, 0]);
        assert!(plan.replace_at(5, Tour::around(&d, &nodes[0]).expect("valid")).is_err());

        let stranger = plan.get(1).expect("present").deep_copy();
        assert!(plan.remove(&stranger).is_none());
        let removed = plan.remove_at(1).expect("in range");
        assert_eq!(removed.node_ids(), vec![0, 3, 4, 0]);
        assert_eq!(plan.total_demand(), 2);

        plan.add(Tour::around(&d, &Node::new(5, 2, 0.0, 5.0, 0.0)).expect("valid"));
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.total_demand(), 4);
    }

    #[test]
    fn test_edges_and_cost() {
        let (plan, _) = plan();
        let edges = plan.edges();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].1, vec![(0, 1), (1, 2), (2, 0)]);

        let v = Vehicle::new(1, 10, BatteryProfile::new(1000.0, 1.0, 1.0), 1000.0);
        // distances 4 + 8, demand 2 + 2
        let cost = plan.total_cost(&v, 10.0, &CostWeights::default());
        assert!((cost - 16.0).abs() < 1e-10);
    }

    #[test]
    fn test_deep_copy() {
        let (plan, _) = plan();
        let copy = plan.deep_copy();
        assert_eq!(copy.len(), plan.len());
        for (a, b) in plan.iter().zip(copy.iter()) {
            assert_ne!(a.id(), b.id());
            assert_eq!(a.node_ids(), b.node_ids());
        }
    }
}
