//! `ucnet solve`

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;
use tabwriter::TabWriter;
use tracing::{info, warn};
use ucnet_algo::{CommitmentSolver, SolveOutcome, SolveReport};
use ucnet_cli::cli::{NetworkArgs, OutputFormat};

use crate::commands::util::{emit, load_problem};

pub fn handle(
    problem_path: &Path,
    overrides: &NetworkArgs,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let (problem, options) = load_problem(problem_path, overrides)?;
    info!(
        "Loaded {}: {} units, {} periods",
        problem_path.display(),
        problem.n_units(),
        problem.n_periods()
    );

    let report = CommitmentSolver::new(options)
        .solve(&problem)
        .context("solving unit commitment")?;

    if let Some(solution) = report.outcome.solution() {
        if solution.uses_penalty() {
            warn!("optimal path uses penalized nodes; demand is not met in some periods");
        }
    }

    let text = match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&report.summary())?;
            json.push('\n');
            json
        }
        OutputFormat::Table => render_table(&report)?,
    };
    emit(&text, output)
}

fn render_table(report: &SolveReport) -> Result<String> {
    let mut out = String::new();
    let solution = match &report.outcome {
        SolveOutcome::Infeasible => {
            writeln!(out, "Status: infeasible")?;
            writeln!(
                out,
                "Nodes per period: {:?}",
                report.build.nodes_per_period
            )?;
            return Ok(out);
        }
        SolveOutcome::Optimal(solution) => solution,
    };

    writeln!(out, "Status: optimal")?;
    writeln!(out, "Objective: {:.4}", solution.objective)?;
    writeln!(
        out,
        "Dispatch cost: {:.4}  Startup cost: {:.4}",
        solution.total_dispatch_cost(),
        solution.total_startup_cost()
    )?;
    writeln!(
        out,
        "Model: {} variables, {} constraints ({} conflict)",
        solution.stats.variables,
        solution.stats.constraints(),
        solution.stats.conflict_constraints
    )?;
    writeln!(out)?;

    let mut buf = Vec::new();
    let mut tw = TabWriter::new(&mut buf);
    writeln!(tw, "Period\tState\tDispatch\tStartup\tOutput (MW)")?;
    for period in &solution.schedule {
        let outputs = period
            .output_mw
            .iter()
            .map(|p| format!("{p:.2}"))
            .collect::<Vec<_>>()
            .join(" ");
        let marker = if period.penalized { " (penalty)" } else { "" };
        writeln!(
            tw,
            "{}\t{}\t{:.4}{}\t{:.4}\t{}",
            period.period, period.state, period.dispatch_cost, marker, period.transition_cost, outputs
        )?;
    }
    tw.flush()?;
    drop(tw);
    out.push_str(&String::from_utf8(buf)?);
    Ok(out)
}
