//! Dispatch as a convex QP solved by Clarabel.
//!
//! Clarabel solves `min ½xᵀPx + qᵀx  s.t.  Ax + s = b, s ∈ K`. With one
//! variable per online unit:
//!
//! - `P = diag(2·c2)`, `q = c1` (the constant `Σ c0` is added afterwards)
//! - row 0: `Σ p = demand` in the zero cone
//! - rows `1+2j`, `2+2j`: `p_j ≤ p_max_j` and `-p_j ≤ -p_min_j` in the
//!   nonnegative cone

use clarabel::{
    algebra::CscMatrix,
    solver::{DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT},
};
use ucnet_core::{UcError, UcResult};

use super::{DispatchBackend, DispatchProblem, DispatchResult};

#[derive(Debug, Clone)]
pub struct ClarabelDispatch {
    pub max_iterations: u32,
    pub tolerance: f64,
}

impl Default for ClarabelDispatch {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-8,
        }
    }
}

impl DispatchBackend for ClarabelDispatch {
    fn id(&self) -> &str {
        "clarabel"
    }

    fn solve(&self, problem: &DispatchProblem<'_>) -> UcResult<DispatchResult> {
        // Skip the interior-point run when the bounds already rule it out.
        if !problem.is_feasible() {
            return Ok(DispatchResult::Infeasible);
        }

        let n = problem.units.len();
        let n_rows = 1 + 2 * n;

        let mut p_col_ptr = Vec::with_capacity(n + 1);
        let mut p_row_idx = Vec::with_capacity(n);
        let mut p_values = Vec::with_capacity(n);
        p_col_ptr.push(0);
        for (j, unit) in problem.units.iter().enumerate() {
            if unit.c2 > 0.0 {
                p_row_idx.push(j);
                p_values.push(2.0 * unit.c2);
            }
            p_col_ptr.push(p_row_idx.len());
        }

        let mut col_ptr = Vec::with_capacity(n + 1);
        let mut row_idx = Vec::with_capacity(3 * n);
        let mut values = Vec::with_capacity(3 * n);
        col_ptr.push(0);
        for j in 0..n {
            row_idx.extend([0, 1 + 2 * j, 2 + 2 * j]);
            values.extend([1.0, 1.0, -1.0]);
            col_ptr.push(row_idx.len());
        }

        let q: Vec<f64> = problem.units.iter().map(|u| u.c1).collect();
        let mut b = Vec::with_capacity(n_rows);
        b.push(problem.demand);
        for unit in &problem.units {
            b.push(unit.p_max);
            b.push(-unit.p_min);
        }
        let cones = [
            SupportedConeT::ZeroConeT(1),
            SupportedConeT::NonnegativeConeT(2 * n),
        ];

        let p_mat = CscMatrix::new(n, n, p_col_ptr, p_row_idx, p_values);
        let a_mat = CscMatrix::new(n_rows, n, col_ptr, row_idx, values);

        let settings = DefaultSettingsBuilder::default()
            .verbose(false)
            .max_iter(self.max_iterations)
            .tol_gap_abs(self.tolerance)
            .tol_gap_rel(self.tolerance)
            .tol_feas(self.tolerance)
            .build()
            .map_err(|e| UcError::Solver(format!("Clarabel settings error: {:?}", e)))?;

        let mut solver = DefaultSolver::new(&p_mat, &q, &a_mat, &b, &cones, settings)
            .map_err(|e| UcError::Solver(format!("Clarabel initialization failed: {:?}", e)))?;
        solver.solve();

        let sol = &solver.solution;
        match sol.status {
            SolverStatus::Solved | SolverStatus::AlmostSolved => {
                let output_mw: Vec<f64> = problem
                    .units
                    .iter()
                    .zip(&sol.x)
                    .map(|(u, &p)| p.clamp(u.p_min, u.p_max))
                    .collect();
                let cost = problem.cost_of(&output_mw);
                Ok(DispatchResult::Optimal { cost, output_mw })
            }
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                Ok(DispatchResult::Infeasible)
            }
            status => Err(UcError::Solver(format!(
                "Clarabel returned status {:?}",
                status
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ucnet_core::UnitSpec;

    fn unit(index: usize, p_min: f64, p_max: f64, c1: f64, c2: f64) -> UnitSpec {
        UnitSpec {
            index,
            p_min,
            p_max,
            c0: 100.0,
            c1,
            c2,
            min_up_time: 1,
            min_down_time: 1,
            startup_cost: 0.0,
        }
    }

    #[test]
    fn test_equal_incremental_cost() {
        // Equal marginals would need p1 = 52.9, so p1 climbs until p2 hits
        // its minimum of 20.
        let units = [unit(0, 10.0, 50.0, 20.0, 0.05), unit(1, 20.0, 80.0, 25.0, 0.02)];
        let problem = DispatchProblem::new(units.iter().collect(), 60.0);

        let DispatchResult::Optimal { cost, output_mw } =
            ClarabelDispatch::default().solve(&problem).unwrap()
        else {
            panic!("expected optimal dispatch");
        };
        assert!((output_mw[0] - 40.0).abs() < 1e-4, "p1 = {}", output_mw[0]);
        assert!((output_mw[1] - 20.0).abs() < 1e-4, "p2 = {}", output_mw[1]);
        let expected = 100.0 + 20.0 * 40.0 + 0.05 * 1600.0 + 100.0 + 25.0 * 20.0 + 0.02 * 400.0;
        assert!((cost - expected).abs() < 1e-3);
    }

    #[test]
    fn test_linear_costs_fill_cheapest_first() {
        let units = [unit(0, 0.0, 10.0, 5.0, 0.0), unit(1, 0.0, 10.0, 1.0, 0.0)];
        let problem = DispatchProblem::new(units.iter().collect(), 12.0);

        let DispatchResult::Optimal { output_mw, .. } =
            ClarabelDispatch::default().solve(&problem).unwrap()
        else {
            panic!("expected optimal dispatch");
        };
        assert!((output_mw[1] - 10.0).abs() < 1e-4);
        assert!((output_mw[0] - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_demand_above_capacity_is_infeasible() {
        let units = [unit(0, 10.0, 50.0, 20.0, 0.05)];
        let problem = DispatchProblem::new(units.iter().collect(), 60.0);
        assert_eq!(
            ClarabelDispatch::default().solve(&problem).unwrap(),
            DispatchResult::Infeasible
        );
    }
}
