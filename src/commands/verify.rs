//! `--verify`: report on the host without changing it

use crate::cli::Cli;
use crate::config::Config;
use crate::error::Result;
use crate::ui::Reporter;
use crate::variant::Variant;
use crate::verify::{SystemProbe, variant_to_verify, verify};

/// Run all checks; `Ok(false)` when any required check failed
pub fn run(cli: &Cli, config: &Config) -> Result<bool> {
    let flag = cli
        .variant
        .as_deref()
        .map(str::parse::<Variant>)
        .transpose()?;

    let probe = SystemProbe::new();
    let variant = variant_to_verify(flag, config, &probe);
    let report = verify(config, variant, &probe);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print(&Reporter::stdout());
    }

    Ok(report.is_success())
}
