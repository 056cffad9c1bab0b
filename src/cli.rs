//! CLI definitions using clap derive API

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;
use clap::builder::{Styles, styling::AnsiColor};

/// deskforge - idempotent desktop provisioning
///
/// Brings a freshly installed Arch Linux host to a configured desktop in a
/// fixed sequence of re-runnable phases.
#[derive(Parser, Debug)]
#[command(
    name = "deskforge",
    author,
    version,
    color = clap::ColorChoice::Auto,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Idempotent desktop provisioning for Arch Linux",
    long_about = "Idempotent desktop provisioning for Arch Linux.\n\n\
                  deskforge provisions a freshly installed Arch Linux host: system upgrade, \
                  an X11 stack built from source (A), a packaged Wayland stack (B) or both, \
                  dotfiles, applications and system tuning. Every phase is safe to re-run.",
    after_help = "\x1b[1m\x1b[32mPhases:\x1b[0m\n    \
                  core, stackA, stackB, look, apps, optimize\n\n\
                  \x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  deskforge --variant BOTH\n    \
                  deskforge --variant A --dry-run\n    \
                  deskforge --only look,apps\n    \
                  deskforge --skip optimize --jobs 4\n    \
                  deskforge --verify --json"
)]
pub struct Cli {
    /// Desktop stacks to provision: A, B or BOTH (asks when omitted)
    #[arg(long, value_name = "A|B|BOTH")]
    pub variant: Option<String>,

    /// Run only these phases (comma-separated); overrides --skip
    #[arg(long, value_name = "PHASES", value_delimiter = ',')]
    pub only: Vec<String>,

    /// Skip these phases (comma-separated)
    #[arg(long, value_name = "PHASES", value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Parallel jobs for source builds (default: number of CPUs)
    #[arg(long, short = 'j', value_name = "N")]
    pub jobs: Option<NonZeroUsize>,

    /// Print every action instead of performing it
    #[arg(long)]
    pub dry_run: bool,

    /// Check the host against the expected state and exit
    #[arg(long, conflicts_with_all = ["dry_run", "only", "skip"])]
    pub verify: bool,

    /// Print the verification report as JSON
    #[arg(long, requires = "verify")]
    pub json: bool,

    /// Settings file (default: ~/.config/deskforge/config.yaml)
    #[arg(long, value_name = "PATH", env = "DESKFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// List the phases in execution order and exit
    #[arg(long)]
    pub list_phases: bool,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL", value_enum)]
    pub completions: Option<clap_complete::Shell>,

    /// Enable verbose output
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
