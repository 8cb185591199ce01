//! Classic lambda iteration.
//!
//! Every online unit runs where its marginal cost equals the system price
//! `λ`, clamped to its limits. Total output is monotone in `λ`, so bisection
//! on `λ` finds the price that meets demand. Units with linear cost
//! (`c2 = 0`) are bang-bang in `λ`; the last bracket is blended so the
//! balance holds exactly.

use ucnet_core::{UcResult, UnitSpec};

use super::{DispatchBackend, DispatchProblem, DispatchResult};

#[derive(Debug, Clone)]
pub struct LambdaDispatch {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for LambdaDispatch {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-9,
        }
    }
}

fn output_at(unit: &UnitSpec, lambda: f64) -> f64 {
    if unit.c2 > 0.0 {
        ((lambda - unit.c1) / (2.0 * unit.c2)).clamp(unit.p_min, unit.p_max)
    } else if lambda > unit.c1 {
        unit.p_max
    } else {
        unit.p_min
    }
}

fn outputs_at(problem: &DispatchProblem<'_>, lambda: f64) -> Vec<f64> {
    problem.units.iter().map(|u| output_at(u, lambda)).collect()
}

impl DispatchBackend for LambdaDispatch {
    fn id(&self) -> &str {
        "lambda"
    }

    fn solve(&self, problem: &DispatchProblem<'_>) -> UcResult<DispatchResult> {
        if !problem.is_feasible() {
            return Ok(DispatchResult::Infeasible);
        }

        let demand = problem.demand;
        let mut lo = problem
            .units
            .iter()
            .map(|u| u.marginal_cost(u.p_min))
            .fold(f64::INFINITY, f64::min)
            - 1.0;
        let mut hi = problem
            .units
            .iter()
            .map(|u| u.marginal_cost(u.p_max))
            .fold(f64::NEG_INFINITY, f64::max)
            + 1.0;

        for _ in 0..self.max_iterations {
            let mid = 0.5 * (lo + hi);
            let total: f64 = outputs_at(problem, mid).iter().sum();
            if (total - demand).abs() <= self.tolerance {
                lo = mid;
                hi = mid;
                break;
            }
            if total < demand {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        // Output is non-decreasing in λ: `lo` is short of demand, `hi` covers it.
        let out_lo = outputs_at(problem, lo);
        let out_hi = outputs_at(problem, hi);
        let total_lo: f64 = out_lo.iter().sum();
        let total_hi: f64 = out_hi.iter().sum();
        let frac = if total_hi - total_lo > f64::EPSILON {
            ((demand - total_lo) / (total_hi - total_lo)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let output_mw: Vec<f64> = out_lo
            .iter()
            .zip(&out_hi)
            .map(|(a, b)| a + frac * (b - a))
            .collect();

        let cost = problem.cost_of(&output_mw);
        Ok(DispatchResult::Optimal { cost, output_mw })
    }
}
