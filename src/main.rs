//! deskforge - idempotent desktop provisioning
//!
//! Brings a freshly installed Arch Linux host to a configured graphical
//! desktop in a fixed sequence of phases, any of which can be re-run safely.

use clap::Parser;

mod cli;
mod commands;
mod common;
mod config;
mod error;
mod exec;
mod git;
mod logging;
mod phase;
mod sync;
#[cfg(test)]
mod temp;
mod ui;
mod variant;
mod verify;

use cli::Cli;
use config::Config;
use error::{DeskforgeError, Result};

/// Parse arguments; help and version exit 0, usage errors exit 1
fn parse_args() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    }
}

/// Dispatch; `Ok(false)` means the run finished but must exit non-zero
fn run(cli: Cli) -> Result<bool> {
    if let Some(shell) = cli.completions {
        commands::completions::run(shell)?;
        return Ok(true);
    }

    if cli.list_phases {
        commands::phases::run()?;
        return Ok(true);
    }

    let config = Config::load(cli.config.as_deref())?;

    if cli.verify {
        return commands::verify::run(&cli, &config);
    }

    commands::provision::run(&cli, &config)?;
    Ok(true)
}

fn print_error(err: &DeskforgeError) {
    eprintln!("Error: {err}");
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
    if let Some(help) = miette::Diagnostic::help(err) {
        eprintln!("  help: {help}");
    }
}

fn main() {
    let cli = parse_args();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            print_error(&e);
            std::process::exit(1);
        }
    }
}
