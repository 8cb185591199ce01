//! `ucnet validate`

use anyhow::Result;
use std::path::Path;
use tracing::info;
use ucnet_cli::cli::NetworkArgs;
use ucnet_core::combinations::combination_count;

use crate::commands::util::load_problem;

pub fn handle(problem_path: &Path) -> Result<()> {
    let (problem, options) = load_problem(problem_path, &NetworkArgs::default())?;
    info!("Validated {}", problem_path.display());
    println!(
        "OK: {} units, {} periods, {} combinations per period (backend {}, horizon {})",
        problem.n_units(),
        problem.n_periods(),
        combination_count(problem.n_units()),
        options.dispatch_backend,
        options.conflict_horizon
    );
    Ok(())
}
