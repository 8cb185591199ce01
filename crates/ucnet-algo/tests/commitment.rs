//! End-to-end commitment tests on small hand-checked instances

use ucnet_algo::{CommitmentSolver, SolveOutcome};
use ucnet_core::{
    ConflictHorizon, DemandProfile, DispatchBackendKind, InfeasiblePolicy, NetworkOptions,
    UcError, UcProblem, UnitSpec,
};

fn single_unit(demand: Vec<f64>, c0: f64, tau: usize) -> UcProblem {
    UcProblem::new(
        vec![UnitSpec {
            index: 0,
            p_min: 0.0,
            p_max: 10.0,
            c0,
            c1: 1.0,
            c2: 0.0,
            min_up_time: tau,
            min_down_time: tau,
            startup_cost: 100.0,
        }],
        DemandProfile::new(demand),
        "0".parse().unwrap(),
    )
    .unwrap()
}

fn options() -> NetworkOptions {
    NetworkOptions::default().with_workers(2)
}

fn states(outcome: &SolveOutcome) -> Vec<String> {
    outcome
        .solution()
        .expect("optimal outcome")
        .states()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[test]
fn single_unit_two_periods() {
    let problem = single_unit(vec![5.0, 5.0], 0.0, 2);
    let report = CommitmentSolver::new(options()).solve(&problem).unwrap();

    // Pruning leaves one state per period, and no window fits the horizon.
    assert_eq!(report.build.nodes_per_period, vec![1, 1]);
    assert!(report.conflicts.is_empty());

    let solution = report.outcome.solution().unwrap();
    assert!((solution.objective - 110.0).abs() < 1e-6);
    assert_eq!(states(&report.outcome), vec!["1", "1"]);
    assert!((solution.total_startup_cost() - 100.0).abs() < 1e-9);
    assert!((solution.total_dispatch_cost() - 10.0).abs() < 1e-6);
    assert_eq!(solution.active_arcs().count(), 3);
    assert_eq!(solution.flows.len(), report.network.arc_count());
    assert!(!solution.uses_penalty());
}

#[test]
fn shutdown_is_taken_without_binding_window() {
    // tau = 2 with the truncated horizon forbids nothing in 3 periods
    let problem = single_unit(vec![5.0, 0.0, 5.0], 200.0, 2);
    let report = CommitmentSolver::new(options()).solve(&problem).unwrap();

    assert_eq!(states(&report.outcome), vec!["1", "0", "1"]);
    let objective = report.outcome.solution().unwrap().objective;
    assert!((objective - 610.0).abs() < 1e-6);
}

#[test]
fn full_horizon_keeps_unit_online() {
    let problem = single_unit(vec![5.0, 0.0, 5.0], 200.0, 2);
    let opts = options().with_conflict_horizon(ConflictHorizon::Full);
    let report = CommitmentSolver::new(opts).solve(&problem).unwrap();

    assert!(!report.conflicts.is_empty());
    assert_eq!(states(&report.outcome), vec!["1", "1", "1"]);
    let objective = report.outcome.solution().unwrap().objective;
    assert!((objective - 710.0).abs() < 1e-6);
}

#[test]
fn longer_min_up_time_binds_under_truncation() {
    let problem = single_unit(vec![5.0, 0.0, 5.0], 200.0, 3);
    let report = CommitmentSolver::new(options()).solve(&problem).unwrap();

    assert_eq!(states(&report.outcome), vec!["1", "1", "1"]);
    let objective = report.outcome.solution().unwrap().objective;
    assert!((objective - 710.0).abs() < 1e-6);
}

#[test]
fn demand_above_capacity_is_infeasible() {
    let problem = single_unit(vec![5.0, 50.0], 0.0, 1);
    let report = CommitmentSolver::new(options()).solve(&problem).unwrap();

    assert_eq!(report.build.nodes_per_period, vec![1, 0]);
    assert!(matches!(report.outcome, SolveOutcome::Infeasible));
}

#[test]
fn unpruned_network_routes_through_penalty() {
    let problem = single_unit(vec![5.0, 50.0], 0.0, 1);
    let opts = options().with_pruning(false);
    let report = CommitmentSolver::new(opts.clone()).solve(&problem).unwrap();

    let solution = report.outcome.solution().unwrap();
    assert!(solution.uses_penalty());
    assert!(solution.objective >= opts.penalty_cost);
    assert_eq!(report.build.penalized_nodes, 3);
}

#[test]
fn reject_policy_aborts_construction() {
    let problem = single_unit(vec![5.0, 50.0], 0.0, 1);
    let opts = options()
        .with_pruning(false)
        .with_infeasible_policy(InfeasiblePolicy::Reject);
    let err = CommitmentSolver::new(opts).solve(&problem).err().unwrap();
    assert!(matches!(err, UcError::Dispatch(_)));
}

#[test]
fn invalid_penalty_is_rejected_before_building() {
    let problem = single_unit(vec![5.0], 0.0, 1);
    let mut opts = options();
    opts.penalty_cost = -1.0;
    let err = CommitmentSolver::new(opts).solve(&problem).err().unwrap();
    assert!(matches!(err, UcError::Config(_)));
}

#[test]
fn backends_and_modes_agree_on_two_unit_fleet() {
    let unit = |index, p_min, p_max, c0, c1, c2, tau, startup_cost| UnitSpec {
        index,
        p_min,
        p_max,
        c0,
        c1,
        c2,
        min_up_time: tau,
        min_down_time: tau,
        startup_cost,
    };
    let problem = UcProblem::new(
        vec![
            unit(0, 10.0, 50.0, 100.0, 20.0, 0.01, 2, 300.0),
            unit(1, 20.0, 80.0, 80.0, 25.0, 0.02, 1, 150.0),
        ],
        DemandProfile::new(vec![60.0, 90.0, 40.0, 25.0]),
        "10".parse().unwrap(),
    )
    .unwrap();

    let mut objectives = Vec::new();
    for backend in [DispatchBackendKind::Clarabel, DispatchBackendKind::Lambda] {
        for evaluation in [ucnet_core::EvaluationMode::Eager, ucnet_core::EvaluationMode::Lazy] {
            let opts = options()
                .with_dispatch_backend(backend)
                .with_evaluation(evaluation);
            let report = CommitmentSolver::new(opts).solve(&problem).unwrap();
            let solution = report.outcome.solution().unwrap();
            assert_eq!(solution.schedule.len(), 4);
            for (period, scheduled) in solution.schedule.iter().enumerate() {
                let total: f64 = scheduled.output_mw.iter().sum();
                assert!((total - problem.demand().at(period)).abs() < 1e-4);
            }
            objectives.push(solution.objective);
        }
    }
    for pair in objectives.windows(2) {
        assert!((pair[0] - pair[1]).abs() < 1e-3 * pair[0].abs().max(1.0));
    }
}
