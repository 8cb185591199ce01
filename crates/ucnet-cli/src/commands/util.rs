use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use ucnet_cli::cli::NetworkArgs;
use ucnet_core::{EvaluationMode, InfeasiblePolicy, NetworkOptions, ProblemConfig, UcProblem};

/// Worker count for a `--threads` value.
pub fn parse_threads(spec: &str) -> Result<usize> {
    if spec.eq_ignore_ascii_case("auto") {
        return Ok(num_cpus::get());
    }
    match spec.parse::<usize>() {
        Ok(0) => Ok(num_cpus::get()),
        Ok(n) => Ok(n),
        Err(_) => Err(anyhow!("invalid thread count '{spec}' (expected a number or \"auto\")")),
    }
}

pub fn load_problem(path: &Path, args: &NetworkArgs) -> Result<(UcProblem, NetworkOptions)> {
    let config = ProblemConfig::from_path(path)
        .with_context(|| format!("loading problem file {}", path.display()))?;
    let (problem, options) = config
        .into_problem()
        .with_context(|| format!("validating problem file {}", path.display()))?;
    Ok((problem, apply_overrides(options, args)?))
}

pub fn apply_overrides(mut options: NetworkOptions, args: &NetworkArgs) -> Result<NetworkOptions> {
    if let Some(threads) = &args.threads {
        options.workers = parse_threads(threads)?;
    }
    if let Some(backend) = args.backend {
        options.dispatch_backend = backend;
    }
    if let Some(horizon) = args.horizon {
        options.conflict_horizon = horizon;
    }
    if args.no_prune {
        options.prune_infeasible = false;
    }
    if args.lazy {
        options.evaluation = EvaluationMode::Lazy;
    }
    if args.reject_infeasible {
        options.infeasible_policy = InfeasiblePolicy::Reject;
    }
    options.validate()?;
    Ok(options)
}

/// Write `text` to `output`, or stdout when absent.
pub fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("writing output to {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}
