//! Sequential phase runner and the closing summary

use super::{Phase, PhaseContext, PhaseId};
use crate::config::Settings;
use crate::error::Result;
use crate::ui::Reporter;
use crate::variant::Variant;

use super::look::session_tty;

/// What a run did, phase by phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Phases whose body ran to completion
    pub ran: Vec<PhaseId>,
    /// Phases selected but gated off by the variant
    pub gated: Vec<PhaseId>,
}

/// Run `phases` in order
///
/// The first failing phase stops the run; its error is wrapped with the
/// phase name.
pub fn run(phases: &[&Phase], ctx: &mut PhaseContext<'_>) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for phase in phases {
        let name = phase.id.name();
        ctx.ui.heading(format!("{name}: {}", phase.summary));

        if !phase.applies_to(ctx.variant) {
            ctx.ui
                .info(format!("{name}: skipping (variant: {})", ctx.variant));
            summary.gated.push(phase.id);
            continue;
        }

        tracing::debug!(phase = name, "phase started");
        (phase.body)(ctx).map_err(|e| e.in_phase(name))?;
        tracing::debug!(phase = name, "phase finished");
        summary.ran.push(phase.id);
    }

    Ok(summary)
}

fn join_ids(ids: &[PhaseId]) -> String {
    if ids.is_empty() {
        return "none".to_string();
    }
    ids.iter().map(|id| id.name()).collect::<Vec<_>>().join(", ")
}

/// Closing block: what ran, what was skipped, warnings, manual steps left
pub fn print_summary(
    ui: &Reporter,
    summary: &RunSummary,
    variant: Variant,
    settings: &Settings,
    dry_run: bool,
) {
    ui.heading("Summary");
    ui.line(format!("variant:  {variant}"));
    ui.line(format!("ran:      {}", join_ids(&summary.ran)));
    ui.line(format!("skipped:  {}", join_ids(&summary.gated)));
    ui.line(format!("warnings: {}", ui.warnings()));

    if dry_run {
        ui.line("dry run: nothing was changed");
        return;
    }

    ui.line("next steps:");
    ui.line("  1. reboot");
    let mut step = 2;
    for stack in variant.stacks() {
        if let Some(tty) = session_tty(variant, stack) {
            let stack_settings = settings.stack(stack);
            ui.line(format!(
                "  {step}. log in on tty{tty} to start {} ({})",
                stack_settings.label, stack_settings.session_command
            ));
            step += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::DeskforgeError;
    use crate::exec::{Action, CommandSpec, DryRunExecutor, Executor};

    fn record(ctx: &mut PhaseContext<'_>) -> Result<()> {
        ctx.exec
            .execute(Action::Run(CommandSpec::new("true", Vec::<String>::new())))
    }

    fn explode(_: &mut PhaseContext<'_>) -> Result<()> {
        Err(DeskforgeError::CommandFailed {
            command: "sudo pacman -Syu --noconfirm".to_string(),
            status: "exit status: 1".to_string(),
        })
    }

    fn only_b(variant: Variant) -> bool {
        variant.wants(crate::variant::Stack::B)
    }

    fn always(_: Variant) -> bool {
        true
    }

    fn phase(
        id: PhaseId,
        gate: fn(Variant) -> bool,
        body: fn(&mut PhaseContext<'_>) -> Result<()>,
    ) -> Phase {
        Phase {
            id,
            summary: "test",
            gate,
            body,
        }
    }

    #[test]
    fn test_gated_phase_prints_skip_and_runs_nothing() {
        let temp = tempfile::TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        let config = Config::rooted(temp.path(), Settings::default());
        let ui = Reporter::buffered();
        let mut exec = DryRunExecutor::quiet();
        let stack_b = phase(PhaseId::StackB, only_b, record);
        let mut ctx = PhaseContext::new(&config, Variant::A, 1, &mut exec, &ui);

        let summary = run(&[&stack_b], &mut ctx).unwrap();

        assert!(summary.ran.is_empty());
        assert_eq!(summary.gated, vec![PhaseId::StackB]);
        assert!(exec.journal().is_empty());
        assert!(
            ui.lines()
                .contains(&"[info] stackB: skipping (variant: A)".to_string())
        );
    }

    #[test]
    fn test_failure_stops_run_and_names_phase() {
        let temp = tempfile::TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        let config = Config::rooted(temp.path(), Settings::default());
        let ui = Reporter::buffered();
        let mut exec = DryRunExecutor::quiet();
        let first = phase(PhaseId::Core, always, explode);
        let second = phase(PhaseId::Look, always, record);
        let mut ctx = PhaseContext::new(&config, Variant::Both, 1, &mut exec, &ui);

        let err = run(&[&first, &second], &mut ctx).unwrap_err();

        match err {
            DeskforgeError::PhaseFailed { phase, source } => {
                assert_eq!(phase, "core");
                assert!(source.to_string().contains("pacman -Syu"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(exec.journal().is_empty());
    }

    #[test]
    fn test_summary_lists_login_steps_for_both() {
        let ui = Reporter::buffered();
        let summary = RunSummary {
            ran: vec![PhaseId::Core, PhaseId::StackA, PhaseId::StackB],
            gated: Vec::new(),
        };

        print_summary(&ui, &summary, Variant::Both, &Settings::default(), false);

        let lines = ui.lines();
        assert!(lines.contains(&"    ran:      core, stackA, stackB".to_string()));
        assert!(lines.contains(&"    skipped:  none".to_string()));
        assert!(lines.iter().any(|l| l.contains("1. reboot")));
        assert!(lines.iter().any(|l| l.contains("tty1") && l.contains("startx")));
        assert!(lines.iter().any(|l| l.contains("tty2") && l.contains("Hyprland")));
    }

    #[test]
    fn test_dry_run_summary_has_no_manual_steps() {
        let ui = Reporter::buffered();
        print_summary(
            &ui,
            &RunSummary::default(),
            Variant::A,
            &Settings::default(),
            true,
        );
        let lines = ui.lines();
        assert!(lines.iter().any(|l| l.contains("nothing was changed")));
        assert!(!lines.iter().any(|l| l.contains("reboot")));
    }
}
