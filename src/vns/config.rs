//! VNS/VND driver configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::evaluation::CostWeights;
use crate::local_search::SamplingBudget;

/// Configuration parameters for the VNS/VND driver.
///
/// # Examples
///
/// ```
/// use u_cevrp::vns::VnsConfig;
///
/// let config = VnsConfig::default()
///     .with_max_iterations(20)
///     .with_interchange_trials(10)
///     .with_seed(7);
/// assert_eq!(config.max_iterations, 20);
/// assert_eq!(config.interchange_trials, 10);
/// assert_eq!(config.seed, Some(7));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VnsConfig {
    /// Hard cap on top-level iterations.
    pub max_iterations: usize,
    /// Iterations to run before stagnation may stop the search.
    pub min_iterations: usize,
    /// Number of trailing iterations whose rounded plan cost must be equal
    /// to count as stagnation.
    pub stagnation_window: usize,
    /// Accepted reconnections per tour and 2-opt pass.
    pub two_opt_iterations: usize,
    /// Sampling limits for one 2-opt reconnection.
    pub two_opt_sampling: SamplingBudget,
    /// Cross-exchange attempts per ordered tour pair.
    pub cross_exchange_trials: usize,
    /// Sampling limits for drawing a valid pair of sub-chains.
    pub cross_exchange_sampling: SamplingBudget,
    /// λ-interchange attempts per ordered tour pair.
    pub interchange_trials: usize,
    /// How often sequential insertion may move one placed customer.
    pub max_relocations_per_node: usize,
    /// Weights of the cost components.
    pub cost_weights: CostWeights,
    /// Random seed (None for OS entropy).
    pub seed: Option<u64>,
}

impl Default for VnsConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            min_iterations: 5,
            stagnation_window: 3,
            two_opt_iterations: 100,
            two_opt_sampling: SamplingBudget::new(10_000, Duration::from_secs(1)),
            cross_exchange_trials: 50,
            cross_exchange_sampling: SamplingBudget::new(10_000, Duration::from_secs(2)),
            interchange_trials: 100,
            max_relocations_per_node: 3,
            cost_weights: CostWeights::default(),
            seed: None,
        }
    }
}

impl VnsConfig {
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_min_iterations(mut self, n: usize) -> Self {
        self.min_iterations = n;
        self
    }

    pub fn with_stagnation_window(mut self, n: usize) -> Self {
        self.stagnation_window = n;
        self
    }

    pub fn with_two_opt_iterations(mut self, n: usize) -> Self {
        self.two_opt_iterations = n;
        self
    }

    pub fn with_two_opt_sampling(mut self, budget: SamplingBudget) -> Self {
        self.two_opt_sampling = budget;
        self
    }

    pub fn with_cross_exchange_trials(mut self, n: usize) -> Self {
        self.cross_exchange_trials = n;
        self
    }

    pub fn with_cross_exchange_sampling(mut self, budget: SamplingBudget) -> Self {
        self.cross_exchange_sampling = budget;
        self
    }

    /// Sets the λ-interchange retry count per tour pair.
    pub fn with_interchange_trials(mut self, n: usize) -> Self {
        self.interchange_trials = n;
        self
    }

    pub fn with_max_relocations_per_node(mut self, n: usize) -> Self {
        self.max_relocations_per_node = n;
        self
    }

    pub fn with_cost_weights(mut self, weights: CostWeights) -> Self {
        self.cost_weights = weights;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = VnsConfig::default();
        assert_eq!(c.max_iterations, 100);
        assert_eq!(c.min_iterations, 5);
        assert_eq!(c.stagnation_window, 3);
        assert_eq!(c.cross_exchange_sampling.timeout, Duration::from_secs(2));
        assert_eq!(c.two_opt_sampling.timeout, Duration::from_secs(1));
        assert_eq!(c.cost_weights, CostWeights::default());
        assert!(c.seed.is_none());
    }

    #[test]
    fn test_builders() {
        let budget = SamplingBudget::new(10, Duration::from_millis(5));
        let c = VnsConfig::default()
            .with_min_iterations(2)
            .with_stagnation_window(4)
            .with_two_opt_iterations(3)
            .with_two_opt_sampling(budget)
            .with_cross_exchange_trials(1)
            .with_cross_exchange_sampling(budget)
            .with_max_relocations_per_node(0)
            .with_cost_weights(CostWeights::default().with_demand(0.0));
        assert_eq!(c.min_iterations, 2);
        assert_eq!(c.stagnation_window, 4);
        assert_eq!(c.two_opt_iterations, 3);
        assert_eq!(c.two_opt_sampling, budget);
        assert_eq!(c.cross_exchange_trials, 1);
        assert_eq!(c.cross_exchange_sampling.max_attempts, 10);
        assert_eq!(c.max_relocations_per_node, 0);
        assert_eq!(c.cost_weights.demand, 0.0);
    }
}
