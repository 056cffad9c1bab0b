//! Provisioning run: resolve the variant, select phases, execute them
//!
//! Phases always run in table order; `--only` and `--skip` only decide which
//! of them are considered. Nothing on the host changes in a dry run, and a
//! real run refuses to start as root because every privileged step goes
//! through `sudo`.

use std::num::NonZeroUsize;

use crate::cli::Cli;
use crate::config::Config;
use crate::error::{DeskforgeError, Result};
use crate::exec::{DryRunExecutor, Executor, SystemExecutor};
use crate::phase::{self, PHASES, PhaseContext, RunFilter, selected_phases};
use crate::ui::Reporter;
use crate::variant::{Frontend, VariantResolver};

/// Build parallelism when `--jobs` is not given
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

fn ensure_not_root() -> Result<()> {
    if nix::unistd::Uid::effective().is_root() {
        return Err(DeskforgeError::RunningAsRoot);
    }
    Ok(())
}

/// Run the selected phases
pub fn run(cli: &Cli, config: &Config) -> Result<()> {
    if !cli.dry_run {
        ensure_not_root()?;
    }

    let ui = Reporter::stdout();
    let resolver = VariantResolver::new();
    let variant = resolver.resolve(cli.variant.as_deref(), Frontend::detect(), &config.settings)?;

    let filter = RunFilter::new(&cli.only, &cli.skip);
    let phases = selected_phases(&PHASES, &filter);
    let jobs = cli.jobs.map(NonZeroUsize::get).unwrap_or_else(default_jobs);

    let mut exec: Box<dyn Executor> = if cli.dry_run {
        Box::new(DryRunExecutor::new())
    } else {
        Box::new(SystemExecutor::new())
    };

    ui.info(format!(
        "variant {variant}, {} phase(s) selected, {jobs} build job(s)",
        phases.len()
    ));
    if phases.is_empty() {
        ui.warn("no phase matches --only/--skip; nothing to do");
    }

    let summary = {
        let mut ctx = PhaseContext::new(config, variant, jobs, exec.as_mut(), &ui);
        phase::run(&phases, &mut ctx)?
    };

    if cli.dry_run {
        ui.info(format!("{} action(s) previewed", exec.journal().len()));
    }
    phase::print_summary(&ui, &summary, variant, &config.settings, cli.dry_run);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_jobs_is_positive() {
        assert!(default_jobs() >= 1);
    }
}
