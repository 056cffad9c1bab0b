//! Building blocks shared by the phase bodies

use std::path::{Path, PathBuf};

use super::PhaseContext;
use crate::config::{FileMapping, TreeMapping};
use crate::error::Result;
use crate::exec::{Action, CommandSpec, MODE_DATA, MODE_EXEC};
use crate::sync::{SyncOutcome, SyncTarget, deploy_file, deploy_tree, sync_mirror};

const PACMAN: &str = "pacman";

fn pacman_install(packages: &[String]) -> CommandSpec {
    let mut args = vec!["-S".to_string(), "--needed".to_string(), "--noconfirm".to_string()];
    args.extend(packages.iter().cloned());
    CommandSpec::new(PACMAN, args).privileged()
}

/// Full system upgrade
pub fn upgrade_system(ctx: &mut PhaseContext<'_>) -> Result<()> {
    ctx.exec.execute(Action::Run(
        CommandSpec::new(PACMAN, ["-Syu", "--noconfirm"]).privileged(),
    ))?;
    ctx.ui.ok("system upgraded");
    Ok(())
}

/// Install repository packages in one transaction; already installed ones are kept
pub fn install_packages(ctx: &mut PhaseContext<'_>, packages: &[String]) -> Result<()> {
    if packages.is_empty() {
        return Ok(());
    }
    ctx.exec.execute(Action::Run(pacman_install(packages)))?;
    ctx.ui.ok(format!("packages: {}", packages.join(" ")));
    Ok(())
}

/// Install AUR packages through the configured helper
pub fn install_aur(ctx: &mut PhaseContext<'_>, packages: &[String]) -> Result<()> {
    if packages.is_empty() {
        return Ok(());
    }
    let helper = &ctx.config.settings.aur.helper;
    let mut args = vec!["-S".to_string(), "--needed".to_string(), "--noconfirm".to_string()];
    args.extend(packages.iter().cloned());
    ctx.exec
        .execute(Action::Run(CommandSpec::new(helper, args)))?;
    ctx.ui.ok(format!("AUR packages: {}", packages.join(" ")));
    Ok(())
}

/// Install packages one by one; a failure is a warning
pub fn install_optional(ctx: &mut PhaseContext<'_>, packages: &[String]) -> Result<()> {
    for package in packages {
        match ctx
            .exec
            .execute(Action::Run(pacman_install(std::slice::from_ref(package))))
        {
            Ok(()) => ctx.ui.ok(format!("optional package {package}")),
            Err(e) => ctx.ui.warn(format!("optional package {package} not installed: {e}")),
        }
    }
    Ok(())
}

/// `systemctl enable <unit>`; fatal only when `required`
pub fn enable_service(ctx: &mut PhaseContext<'_>, unit: &str, required: bool) -> Result<()> {
    let enable = Action::Run(CommandSpec::new("systemctl", ["enable", unit]).privileged());
    match ctx.exec.execute(enable) {
        Ok(()) => {
            ctx.ui.ok(format!("{unit} enabled"));
            Ok(())
        }
        Err(e) if !required => {
            ctx.ui.warn(format!("{unit} not enabled: {e}"));
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Create `dir` unless it already exists
pub fn ensure_dir(ctx: &mut PhaseContext<'_>, dir: &Path) -> Result<()> {
    if ctx.exec.exists(dir) {
        return Ok(());
    }
    ctx.exec.execute(Action::CreateDir {
        path: dir.to_path_buf(),
    })
}

/// `make clean`, `make -j<jobs>`, `sudo make PREFIX=<prefix> install`
///
/// A missing source directory is a warning, not a failure.
pub fn build_component(ctx: &mut PhaseContext<'_>, name: &str, dir: &Path) -> Result<bool> {
    if !ctx.exec.exists(dir) {
        ctx.ui
            .warn(format!("{name}: no source tree at {}, not built", dir.display()));
        return Ok(false);
    }

    let prefix = format!("PREFIX={}", ctx.config.settings.build.prefix);
    let jobs = format!("-j{}", ctx.jobs);
    for command in [
        CommandSpec::new("make", ["clean"]),
        CommandSpec::new("make", [jobs.as_str()]),
        CommandSpec::new("make", [prefix.as_str(), "install"]).privileged(),
    ] {
        ctx.exec.execute(Action::Run(command.in_dir(dir)))?;
    }
    ctx.ui.ok(format!("{name}: built and installed"));
    Ok(true)
}

/// Sync the dotfiles mirror and return its path
pub fn sync_dotfiles(ctx: &mut PhaseContext<'_>) -> Result<PathBuf> {
    let config = ctx.config;
    let dotfiles = &config.settings.dotfiles;
    let target = SyncTarget::new(
        &dotfiles.url,
        config.dotfiles_mirror(),
        dotfiles.branch.as_deref(),
    );
    let outcome = sync_mirror(ctx.exec, ctx.ui, &target)?;
    tracing::debug!(?outcome, "dotfiles synced");
    if outcome == SyncOutcome::Stale {
        ctx.ui.info("deploying dotfiles from the local copy");
    }
    Ok(target.local_path)
}

/// Deploy file mappings from `root` into the home directory
pub fn deploy_files(ctx: &mut PhaseContext<'_>, root: &Path, files: &[FileMapping]) -> Result<()> {
    let config = ctx.config;
    for mapping in files {
        let mode = if mapping.executable { MODE_EXEC } else { MODE_DATA };
        deploy_file(
            ctx.exec,
            ctx.ui,
            &root.join(&mapping.source),
            &config.paths.in_home(&mapping.dest),
            mode,
        )?;
    }
    Ok(())
}

/// Merge tree mappings from `root` into the home directory
pub fn deploy_trees(ctx: &mut PhaseContext<'_>, root: &Path, trees: &[TreeMapping]) -> Result<()> {
    let config = ctx.config;
    for mapping in trees {
        deploy_tree(
            ctx.exec,
            ctx.ui,
            &root.join(&mapping.source),
            &config.paths.in_home(&mapping.dest),
        )?;
    }
    Ok(())
}
