//! `ucnet inspect`

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tabwriter::TabWriter;
use ucnet_algo::{BuildStats, CommitmentSolver, TemporalConflictGenerator, WorkerPool};
use ucnet_cli::cli::{NetworkArgs, OutputFormat};

use crate::commands::util::{emit, load_problem};

#[derive(Debug, Serialize)]
struct InspectOutput<'a> {
    units: usize,
    periods: usize,
    nodes: usize,
    build: &'a BuildStats,
    conflict_sets: usize,
    forbidden_arcs: usize,
}

pub fn handle(problem_path: &Path, overrides: &NetworkArgs, format: OutputFormat) -> Result<()> {
    let (problem, options) = load_problem(problem_path, overrides)?;
    let solver = CommitmentSolver::new(options);
    let (network, build) = solver
        .build_network(&problem)
        .context("building commitment network")?;

    let pool = WorkerPool::new(solver.options().workers)?;
    let conflicts = TemporalConflictGenerator::new(&problem, solver.options().conflict_horizon)
        .generate(&network, &pool)?;

    let summary = InspectOutput {
        units: problem.n_units(),
        periods: problem.n_periods(),
        nodes: network.node_count(),
        build: &build,
        conflict_sets: conflicts.len(),
        forbidden_arcs: conflicts.iter().map(|c| c.forbidden.len()).sum(),
    };

    let text = match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&summary)?;
            json.push('\n');
            json
        }
        OutputFormat::Table => {
            let mut buf = Vec::new();
            let mut tw = TabWriter::new(&mut buf);
            writeln!(tw, "Units\t{}", summary.units)?;
            writeln!(tw, "Periods\t{}", summary.periods)?;
            writeln!(tw, "Candidate nodes\t{}", build.candidate_nodes)?;
            writeln!(
                tw,
                "Pruned nodes\t{} ({:.1}%)",
                build.pruned_nodes,
                build.pruned_percent()
            )?;
            writeln!(tw, "Nodes (incl. source/sink)\t{}", summary.nodes)?;
            writeln!(tw, "Arcs\t{}", build.arcs)?;
            writeln!(tw, "Penalized nodes\t{}", build.penalized_nodes)?;
            writeln!(tw, "Conflict sets\t{}", summary.conflict_sets)?;
            writeln!(tw, "Forbidden arc refs\t{}", summary.forbidden_arcs)?;
            for (period, count) in build.nodes_per_period.iter().enumerate() {
                writeln!(tw, "Period {period}\t{count} states")?;
            }
            tw.flush()?;
            drop(tw);
            String::from_utf8(buf)?
        }
    };
    emit(&text, None)
}
