//! Generating unit parameters.

use serde::{Deserialize, Serialize};

/// Static description of one generating unit.
///
/// Cost curve: `c0 + c1·p + c2·p²` while online. Minimum up and down times
/// are equal by construction of [`crate::UcProblem`]; [`UnitSpec::tau`]
/// exposes the shared value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub index: usize,
    pub p_min: f64,
    pub p_max: f64,
    pub c0: f64,
    pub c1: f64,
    pub c2: f64,
    pub min_up_time: usize,
    pub min_down_time: usize,
    pub startup_cost: f64,
}

impl UnitSpec {
    /// Production cost at output `p` (MW) while online.
    pub fn cost_at(&self, p: f64) -> f64 {
        self.c0 + self.c1 * p + self.c2 * p * p
    }

    /// Marginal cost `dC/dp` at output `p`.
    pub fn marginal_cost(&self, p: f64) -> f64 {
        self.c1 + 2.0 * self.c2 * p
    }

    /// Minimum up/down time shared by both directions.
    pub fn tau(&self) -> usize {
        self.min_up_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> UnitSpec {
        UnitSpec {
            index: 0,
            p_min: 10.0,
            p_max: 50.0,
            c0: 100.0,
            c1: 20.0,
            c2: 0.05,
            min_up_time: 3,
            min_down_time: 3,
            startup_cost: 500.0,
        }
    }

    #[test]
    fn test_cost_curve() {
        let u = unit();
        assert!((u.cost_at(0.0) - 100.0).abs() < 1e-12);
        assert!((u.cost_at(20.0) - (100.0 + 400.0 + 20.0)).abs() < 1e-9);
    }

    #[test]
    fn test_marginal_cost() {
        let u = unit();
        assert!((u.marginal_cost(10.0) - 21.0).abs() < 1e-12);
    }
}
