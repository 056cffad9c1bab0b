//! Fonts, themes, dotfiles, personal scripts and the login session

use std::path::Path;

use super::PhaseContext;
use super::steps::{deploy_files, deploy_trees, ensure_dir, install_packages, sync_dotfiles};
use crate::common::fs::visible_files;
use crate::config::Settings;
use crate::error::Result;
use crate::exec::{Action, CommandSpec, MODE_EXEC};
use crate::sync::{deploy_file, upsert_text_block};
use crate::variant::{Stack, Variant};

/// Name of the profile block starting the graphical session
pub const SESSION_BLOCK: &str = "session";

/// Prefix of the session block line recording the variant
pub const VARIANT_TAG: &str = "# variant: ";

/// Login-shell snippet starting the session for `variant`
///
/// The first requested stack starts on tty1; with both stacks, stack B
/// starts on tty2.
pub fn session_block(variant: Variant, settings: &Settings) -> String {
    let mut lines = vec![
        format!("{VARIANT_TAG}{variant}"),
        "if [ -z \"$DISPLAY\" ] && [ -z \"$WAYLAND_DISPLAY\" ]; then".to_string(),
        "    case \"$(tty)\" in".to_string(),
    ];
    for (index, stack) in variant.stacks().into_iter().enumerate() {
        lines.push(format!(
            "        /dev/tty{}) exec {} ;;",
            index + 1,
            settings.stack(stack).session_command
        ));
    }
    lines.push("    esac".to_string());
    lines.push("fi".to_string());
    lines.join("\n")
}

/// Variant recorded in a session block body
pub fn recorded_variant(block: &str) -> Option<Variant> {
    block
        .lines()
        .find_map(|line| line.strip_prefix(VARIANT_TAG))
        .and_then(|value| value.parse().ok())
}

/// Terminal the session of `stack` starts on under `variant`
pub fn session_tty(variant: Variant, stack: Stack) -> Option<usize> {
    variant
        .stacks()
        .into_iter()
        .position(|s| s == stack)
        .map(|index| index + 1)
}

fn deploy_scripts(ctx: &mut PhaseContext<'_>, scripts: &Path) -> Result<()> {
    let local_bin = ctx.config.paths.local_bin.clone();
    if !ctx.exec.exists(scripts) {
        ctx.ui
            .skip(format!("scripts (no directory at {})", scripts.display()));
        return Ok(());
    }
    if !scripts.exists() {
        ctx.ui.info(format!(
            "scripts in {} are listed once the mirror is cloned",
            scripts.display()
        ));
        return Ok(());
    }

    ensure_dir(ctx, &local_bin)?;
    for script in visible_files(scripts) {
        let Ok(relative) = script.strip_prefix(scripts) else {
            continue;
        };
        deploy_file(ctx.exec, ctx.ui, &script, &local_bin.join(relative), MODE_EXEC)?;
    }
    Ok(())
}

pub fn run(ctx: &mut PhaseContext<'_>) -> Result<()> {
    let config = ctx.config;
    let settings = &config.settings;

    let dotfiles = sync_dotfiles(ctx)?;
    install_packages(ctx, &settings.packages.look)?;
    deploy_files(ctx, &dotfiles, &settings.dotfiles.files)?;
    deploy_trees(ctx, &dotfiles, &settings.dotfiles.trees)?;
    if let Some(dir) = &settings.dotfiles.scripts_dir {
        deploy_scripts(ctx, &dotfiles.join(dir))?;
    }

    ctx.exec
        .execute(Action::Run(CommandSpec::new("fc-cache", ["-f"])))?;
    ctx.ui.ok("font cache refreshed");

    let variant = ctx.variant;
    upsert_text_block(
        ctx.exec,
        ctx.ui,
        &config.paths.profile,
        SESSION_BLOCK,
        &session_block(variant, settings),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::exec::{Executor, SystemExecutor};
    use crate::sync::read_block;
    use crate::ui::Reporter;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_both_variant_uses_two_terminals() {
        let block = session_block(Variant::Both, &Settings::default());
        assert_eq!(
            block,
            "# variant: BOTH\n\
             if [ -z \"$DISPLAY\" ] && [ -z \"$WAYLAND_DISPLAY\" ]; then\n    \
             case \"$(tty)\" in\n        \
             /dev/tty1) exec startx ;;\n        \
             /dev/tty2) exec Hyprland ;;\n    \
             esac\n\
             fi"
        );
    }

    #[test]
    fn test_single_variant_uses_first_terminal() {
        let block = session_block(Variant::B, &Settings::default());
        assert!(block.starts_with("# variant: B\n"));
        assert!(block.contains("/dev/tty1) exec Hyprland ;;"));
        assert!(!block.contains("tty2"));
        assert!(!block.contains("startx"));
    }

    #[test]
    fn test_recorded_variant_round_trip() {
        for variant in Variant::ALL {
            let block = session_block(variant, &Settings::default());
            assert_eq!(recorded_variant(&block), Some(variant));
        }
        assert_eq!(recorded_variant("exec startx"), None);
    }

    #[test]
    fn test_session_tty() {
        assert_eq!(session_tty(Variant::Both, Stack::A), Some(1));
        assert_eq!(session_tty(Variant::Both, Stack::B), Some(2));
        assert_eq!(session_tty(Variant::B, Stack::B), Some(1));
        assert_eq!(session_tty(Variant::A, Stack::B), None);
    }

    #[test]
    fn test_switching_variant_replaces_session_block() {
        let temp = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        let config = Config::rooted(temp.path(), Settings::default());
        fs::create_dir_all(&config.paths.home).unwrap();
        fs::write(&config.paths.profile, "umask 022\n").unwrap();
        let ui = Reporter::buffered();
        let mut exec = SystemExecutor::quiet();

        for variant in [Variant::A, Variant::Both] {
            upsert_text_block(
                &mut exec,
                &ui,
                &config.paths.profile,
                SESSION_BLOCK,
                &session_block(variant, &config.settings),
            )
            .unwrap();
        }

        let profile = fs::read_to_string(&config.paths.profile).unwrap();
        assert!(profile.starts_with("umask 022\n"));
        assert_eq!(profile.matches("deskforge:session >>>").count(), 1);
        let block = read_block(&profile, SESSION_BLOCK).unwrap();
        assert_eq!(recorded_variant(&block), Some(Variant::Both));
        assert!(block.contains("/dev/tty1) exec startx ;;"));
        assert!(block.contains("/dev/tty2) exec Hyprland ;;"));
        assert_eq!(exec.journal().len(), 2);
    }

    #[test]
    fn test_scripts_are_installed_executable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new_in(crate::temp::temp_dir_base()).unwrap();
        let config = Config::rooted(temp.path(), Settings::default());
        let scripts = temp.path().join("dotfiles/bin");
        fs::create_dir_all(&scripts).unwrap();
        fs::write(scripts.join("wallpaper"), "#!/bin/sh\n").unwrap();
        fs::write(scripts.join(".README"), "notes").unwrap();
        let ui = Reporter::buffered();
        let mut exec = SystemExecutor::quiet();
        let mut ctx = PhaseContext::new(&config, Variant::A, 1, &mut exec, &ui);

        deploy_scripts(&mut ctx, &scripts).unwrap();

        let installed = config.paths.local_bin.join("wallpaper");
        let mode = fs::metadata(&installed).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, MODE_EXEC);
        assert!(!config.paths.local_bin.join(".README").exists());
    }
}
