//! Phase registry and selection
//!
//! The provisioning run is a fixed, ordered table of phases. `--only` and
//! `--skip` narrow the table through a [`RunFilter`]; the order never
//! changes. Whether a selected phase applies to the chosen variant is decided
//! later, at run time, by the phase's gate.

mod apps;
mod base;
mod context;
mod engine;
mod look;
mod optimize;
mod stack;
mod steps;

use std::fmt;

use crate::error::Result;
use crate::variant::{Stack, Variant};

pub use base::ENV_BLOCK;
pub use context::PhaseContext;
pub use engine::{print_summary, run};
pub use look::{SESSION_BLOCK, recorded_variant};

#[cfg(test)]
pub use look::session_block;

/// Identifier of a provisioning phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PhaseId {
    Core,
    StackA,
    StackB,
    Look,
    Apps,
    Optimize,
}

impl PhaseId {
    /// Name used on the command line
    pub fn name(self) -> &'static str {
        match self {
            PhaseId::Core => "core",
            PhaseId::StackA => "stackA",
            PhaseId::StackB => "stackB",
            PhaseId::Look => "look",
            PhaseId::Apps => "apps",
            PhaseId::Optimize => "optimize",
        }
    }

    /// Case-insensitive lookup by command-line name
    pub fn from_name(name: &str) -> Option<Self> {
        PHASES
            .iter()
            .map(|phase| phase.id)
            .find(|id| id.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type Gate = fn(Variant) -> bool;
type Body = fn(&mut PhaseContext<'_>) -> Result<()>;

/// One entry of the phase table
pub struct Phase {
    pub id: PhaseId,
    pub summary: &'static str,
    /// Whether the phase applies to a variant
    pub gate: Gate,
    pub body: Body,
}

impl Phase {
    pub fn applies_to(&self, variant: Variant) -> bool {
        (self.gate)(variant)
    }
}

impl fmt::Debug for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Phase").field("id", &self.id).finish()
    }
}

fn every_variant(_: Variant) -> bool {
    true
}

fn wants_stack_a(variant: Variant) -> bool {
    variant.wants(Stack::A)
}

fn wants_stack_b(variant: Variant) -> bool {
    variant.wants(Stack::B)
}

/// All phases in execution order
pub static PHASES: [Phase; 6] = [
    Phase {
        id: PhaseId::Core,
        summary: "system upgrade, base packages, AUR helper, profile environment",
        gate: every_variant,
        body: base::run,
    },
    Phase {
        id: PhaseId::StackA,
        summary: "stack A packages, source builds and configuration",
        gate: wants_stack_a,
        body: stack::run_a,
    },
    Phase {
        id: PhaseId::StackB,
        summary: "stack B packages and configuration",
        gate: wants_stack_b,
        body: stack::run_b,
    },
    Phase {
        id: PhaseId::Look,
        summary: "fonts, themes, dotfiles, scripts, login session",
        gate: every_variant,
        body: look::run,
    },
    Phase {
        id: PhaseId::Apps,
        summary: "applications, optional packages and services",
        gate: every_variant,
        body: apps::run,
    },
    Phase {
        id: PhaseId::Optimize,
        summary: "kernel, package manager and journal tuning",
        gate: every_variant,
        body: optimize::run,
    },
];

/// Phase selection from `--only` and `--skip`
///
/// Names are kept as given (lower-cased); a name that matches no phase
/// matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFilter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

fn normalize_names(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .inspect(|name| {
            if PhaseId::from_name(name).is_none() {
                tracing::debug!(name = %name, "unknown phase name ignored");
            }
        })
        .collect()
}

impl RunFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Self {
        Self {
            include: normalize_names(include),
            exclude: normalize_names(exclude),
        }
    }

    fn names(list: &[String], id: PhaseId) -> bool {
        list.iter().any(|name| id.name().eq_ignore_ascii_case(name))
    }

    /// Whether the filter keeps phase `id`
    ///
    /// A non-empty include list is the only source of truth; the exclude list
    /// applies only without one.
    pub fn keeps(&self, id: PhaseId) -> bool {
        if !self.include.is_empty() {
            Self::names(&self.include, id)
        } else {
            !Self::names(&self.exclude, id)
        }
    }
}

/// Phases kept by `filter`, in table order
pub fn selected_phases<'p>(all: &'p [Phase], filter: &RunFilter) -> Vec<&'p Phase> {
    all.iter().filter(|phase| filter.keeps(phase.id)).collect()
}
