//! Post-run verification
//!
//! Observes the host through a [`Probe`] and never changes anything. Missing
//! required pieces (binaries, deployed files and directories, profile
//! blocks, required services) fail the report; optional services and fonts
//! only warn.

mod probe;

use std::path::Path;

use serde::Serialize;

use crate::config::Config;
use crate::phase::{ENV_BLOCK, SESSION_BLOCK, recorded_variant};
use crate::sync::read_block;
use crate::ui::{Reporter, Status};
use crate::variant::Variant;

pub use probe::{Probe, SystemProbe};

/// Outcome of one check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    pub name: String,
    pub level: Level,
    pub detail: String,
}

/// All checks with their tallies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub variant: String,
    pub checks: Vec<Check>,
    pub pass: usize,
    pub warn: usize,
    pub fail: usize,
}

impl Report {
    fn new(variant: Variant) -> Self {
        Self {
            variant: variant.to_string(),
            ..Self::default()
        }
    }

    fn record(&mut self, name: impl Into<String>, level: Level, detail: impl Into<String>) {
        match level {
            Level::Pass => self.pass += 1,
            Level::Warn => self.warn += 1,
            Level::Fail => self.fail += 1,
        }
        self.checks.push(Check {
            name: name.into(),
            level,
            detail: detail.into(),
        });
    }

    /// Required check: fails when `ok` is false
    fn require(&mut self, name: impl Into<String>, ok: bool, missing: &str) {
        if ok {
            self.record(name, Level::Pass, "present");
        } else {
            self.record(name, Level::Fail, missing);
        }
    }

    /// Optional check: warns when `ok` is false
    fn prefer(&mut self, name: impl Into<String>, ok: bool, missing: &str) {
        if ok {
            self.record(name, Level::Pass, "present");
        } else {
            self.record(name, Level::Warn, missing);
        }
    }

    pub fn is_success(&self) -> bool {
        self.fail == 0
    }

    /// Print one status line per check and the tally
    pub fn print(&self, ui: &Reporter) {
        ui.heading(format!("Verification (variant {})", self.variant));
        for check in &self.checks {
            let status = match check.level {
                Level::Pass => Status::Ok,
                Level::Warn => Status::Warn,
                Level::Fail => Status::Fail,
            };
            ui.status(status, format!("{}: {}", check.name, check.detail));
        }
        ui.line(format!(
            "{} passed, {} warnings, {} failed",
            self.pass, self.warn, self.fail
        ));
    }
}

/// Variant to verify: the flag, else the one recorded in the profile, else BOTH
pub fn variant_to_verify(flag: Option<Variant>, config: &Config, probe: &dyn Probe) -> Variant {
    if let Some(variant) = flag {
        return variant;
    }
    probe
        .read_text(&config.paths.profile)
        .and_then(|text| read_block(&text, SESSION_BLOCK))
        .and_then(|block| recorded_variant(&block))
        .unwrap_or(Variant::Both)
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

/// Inspect the host for the state a run with `variant` leaves behind
pub fn verify(config: &Config, variant: Variant, probe: &dyn Probe) -> Report {
    let settings = &config.settings;
    let paths = &config.paths;
    let mut report = Report::new(variant);

    for program in ["git", "make", settings.aur.helper.as_str()] {
        report.require(
            format!("binary {program}"),
            probe.has_program(program),
            "not on PATH",
        );
    }

    report.require(
        format!("directory {}", display(&paths.local_bin)),
        probe.is_dir(&paths.local_bin),
        "missing",
    );
    report.require(
        format!("mirror {}", display(&config.dotfiles_mirror())),
        probe.is_dir(&config.dotfiles_mirror().join(".git")),
        "not cloned",
    );

    let profile = probe.read_text(&paths.profile);
    report.require(
        format!("file {}", display(&paths.profile)),
        profile.is_some(),
        "missing",
    );
    let profile = profile.unwrap_or_default();
    report.require(
        "profile block env",
        read_block(&profile, ENV_BLOCK).is_some(),
        "missing",
    );
    match read_block(&profile, SESSION_BLOCK) {
        None => report.record("profile block session", Level::Fail, "missing"),
        Some(block) => match recorded_variant(&block) {
            Some(recorded) if recorded != variant => report.record(
                "profile block session",
                Level::Warn,
                format!("starts variant {recorded}, expected {variant}"),
            ),
            _ => report.record("profile block session", Level::Pass, "present"),
        },
    }

    for mapping in &settings.dotfiles.files {
        let dest = paths.in_home(&mapping.dest);
        report.require(format!("file {}", display(&dest)), probe.is_file(&dest), "missing");
    }
    for mapping in &settings.dotfiles.trees {
        let dest = paths.in_home(&mapping.dest);
        report.require(
            format!("directory {}", display(&dest)),
            probe.is_dir(&dest),
            "missing",
        );
    }

    for stack in variant.stacks() {
        let stack_settings = settings.stack(stack);
        for program in &stack_settings.binaries {
            report.require(
                format!("binary {program}"),
                probe.has_program(program),
                "not on PATH",
            );
        }
        for mapping in &stack_settings.files {
            let dest = paths.in_home(&mapping.dest);
            report.require(format!("file {}", display(&dest)), probe.is_file(&dest), "missing");
        }
        for mapping in &stack_settings.trees {
            let dest = paths.in_home(&mapping.dest);
            report.require(
                format!("directory {}", display(&dest)),
                probe.is_dir(&dest),
                "missing",
            );
        }
    }

    for unit in &settings.services.required {
        report.require(
            format!("service {unit}"),
            probe.service_enabled(unit),
            "not enabled",
        );
    }
    for unit in &settings.services.optional {
        report.prefer(
            format!("service {unit}"),
            probe.service_enabled(unit),
            "not enabled",
        );
    }
    for family in &settings.fonts {
        report.prefer(
            format!("font {family}"),
            probe.font_installed(family),
            "not installed",
        );
    }

    report
}
