//! Shell completions command

use clap::CommandFactory;
use clap_complete::Shell;

use crate::error::Result;

/// Generate shell completions on stdout
pub fn run(shell: Shell) -> Result<()> {
    let mut cmd = <crate::cli::Cli as CommandFactory>::command();
    clap_complete::generate(shell, &mut cmd, "deskforge", &mut std::io::stdout().lock());
    Ok(())
}
