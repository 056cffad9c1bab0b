//! System tuning: setting lines in system files, sysctl reload, SSD trim

use std::path::PathBuf;

use super::PhaseContext;
use super::steps::enable_service;
use crate::config::{Config, LineEdit};
use crate::error::Result;
use crate::exec::{Action, CommandSpec};
use crate::sync::{LineRule, set_lines};

/// Timer enabling periodic TRIM
const FSTRIM_TIMER: &str = "fstrim.timer";

fn resolve(config: &Config, file: &str) -> PathBuf {
    match file.strip_prefix("~/") {
        Some(relative) => config.paths.in_home(relative),
        None => PathBuf::from(file),
    }
}

/// Edits grouped by target file, in order of first appearance
fn group_by_file<'e>(config: &Config, edits: &'e [LineEdit]) -> Vec<(PathBuf, Vec<&'e LineEdit>)> {
    let mut groups: Vec<(PathBuf, Vec<&LineEdit>)> = Vec::new();
    for edit in edits {
        let path = resolve(config, &edit.file);
        match groups.iter_mut().find(|(existing, _)| *existing == path) {
            Some((_, group)) => group.push(edit),
            None => groups.push((path, vec![edit])),
        }
    }
    groups
}

pub fn run(ctx: &mut PhaseContext<'_>) -> Result<()> {
    let config = ctx.config;

    for (file, edits) in group_by_file(config, &config.settings.tuning) {
        let rules = edits
            .into_iter()
            .map(|edit| LineRule::compile(edit, ctx.jobs))
            .collect::<Result<Vec<_>>>()?;
        let privileged = !file.starts_with(&config.paths.home);
        set_lines(ctx.exec, ctx.ui, &file, &rules, privileged)?;
    }

    ctx.exec.execute(Action::Run(
        CommandSpec::new("sysctl", ["--system"]).privileged(),
    ))?;
    ctx.ui.ok("kernel parameters reloaded");

    enable_service(ctx, FSTRIM_TIMER, false)
}
