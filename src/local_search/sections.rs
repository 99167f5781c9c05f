//! Bounded random sampling of tour sections.

use std::ops::Range;
use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::Tour;

/// Limits on a random-sampling retry loop.
///
/// Sampling stops at whichever comes first: `max_attempts` draws or
/// `timeout` of wall-clock time. Running out is not an error, it means no
/// candidate was found this round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingBudget {
    pub max_attempts: usize,
    pub timeout: Duration,
}

impl Default for SamplingBudget {
    fn default() -> Self {
        Self {
            max_attempts: 10_000,
            timeout: Duration::from_secs(1),
        }
    }
}

impl SamplingBudget {
    pub fn new(max_attempts: usize, timeout: Duration) -> Self {
        Self {
            max_attempts,
            timeout,
        }
    }

    /// Calls `attempt` until it yields a value or the budget runs out.
    ///
    /// The first attempt always runs, even with a zero timeout.
    ///
    /// ```
    /// use std::time::Duration;
    /// use u_cevrp::local_search::SamplingBudget;
    ///
    /// let budget = SamplingBudget::new(5, Duration::from_secs(1));
    /// let mut calls = 0;
    /// let found: Option<()> = budget.sample(|| { calls += 1; None });
    /// assert!(found.is_none());
    /// assert_eq!(calls, 5);
    /// ```
    pub fn sample<T>(&self, mut attempt: impl FnMut() -> Option<T>) -> Option<T> {
        let started = Instant::now();
        for _ in 0..self.max_attempts {
            if let Some(found) = attempt() {
                return Some(found);
            }
            if started.elapsed() >= self.timeout {
                break;
            }
        }
        None
    }
}

/// Two distinct, non-overlapping index ranges of `section_length` nodes
/// each, in the order they were drawn.
///
/// Sections may include the depot positions. Returns `None` if the tour is
/// too short to hold two disjoint sections or the budget ran out.
pub fn random_tour_sections<R: Rng>(
    tour: &Tour,
    section_length: usize,
    budget: &SamplingBudget,
    rng: &mut R,
) -> Option<(Range<usize>, Range<usize>)> {
    if section_length == 0 || tour.len() < 2 * section_length {
        return None;
    }
    let last_start = tour.len() - section_length;
    budget.sample(|| {
        let r1 = rng.random_range(0..=last_start);
        let r2 = rng.random_range(0..=last_start);
        (r1.abs_diff(r2) >= section_length)
            .then(|| (r1..r1 + section_length, r2..r2 + section_length))
    })
}

/// A depot-free index range of `section_length` consecutive customers.
///
/// Returns `None` if the tour has fewer customers than `section_length`.
pub fn random_tour_section<R: Rng>(
    tour: &Tour,
    section_length: usize,
    rng: &mut R,
) -> Option<Range<usize>> {
    let customers = tour.interior().len();
    if section_length == 0 || section_length > customers {
        return None;
    }
    let start = rng.random_range(1..=customers - section_length + 1);
    Some(start..start + section_length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Node;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tour(customers: usize) -> Tour {
        let d = Node::depot();
        let mut nodes = vec![d.clone()];
        nodes.extend((1..=customers).map(|i| Node::new(i, 1, 0.0, i as f64, 0.0)));
        nodes.push(d);
        Tour::new(nodes).expect("valid")
    }

    #[test]
    fn test_sections_are_disjoint() {
        let t = tour(6);
        let mut rng = StdRng::seed_from_u64(7);
        let budget = SamplingBudget::default();
        for length in 1..=4 {
            for _ in 0..50 {
                let (a, b) = random_tour_sections(&t, length, &budget, &mut rng).expect("fits");
                assert_eq!(a.len(), length);
                assert_eq!(b.len(), length);
                assert!(a.end <= b.start || b.end <= a.start);
                assert!(a.end <= t.len() && b.end <= t.len());
            }
        }
    }

    #[test]
    fn test_sections_on_short_tour() {
        let mut rng = StdRng::seed_from_u64(1);
        let budget = SamplingBudget::default();
        assert!(random_tour_sections(&tour(1), 2, &budget, &mut rng).is_none());
        assert!(random_tour_sections(&tour(2), 2, &budget, &mut rng).is_some());
        assert!(random_tour_sections(&tour(2), 0, &budget, &mut rng).is_none());
    }

    #[test]
    fn test_section_is_depot_free() {
        let t = tour(5);
        let mut rng = StdRng::seed_from_u64(3);
        for length in 1..=5 {
            for _ in 0..50 {
                let r = random_tour_section(&t, length, &mut rng).expect("fits");
                assert_eq!(r.len(), length);
                assert!(t.nodes()[r].iter().all(|n| !n.is_depot()));
            }
        }
        assert!(random_tour_section(&t, 6, &mut rng).is_none());
    }

    #[test]
    fn test_budget_stops_on_success() {
        let budget = SamplingBudget::new(100, Duration::from_secs(1));
        let mut calls = 0;
        let found = budget.sample(|| {
            calls += 1;
            (calls == 3).then_some(calls)
        });
        assert_eq!(found, Some(3));
    }

    #[test]
    fn test_zero_timeout_tries_once() {
        let budget = SamplingBudget::new(100, Duration::ZERO);
        let mut calls = 0;
        let found: Option<()> = budget.sample(|| {
            calls += 1;
            None
        });
        assert!(found.is_none());
        assert_eq!(calls, 1);
    }
}
