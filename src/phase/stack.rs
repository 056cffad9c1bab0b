//! Desktop stack phases
//!
//! Both stacks follow the same shape: packages, AUR packages, source builds,
//! then the stack's share of the dotfiles. Stack A builds its window manager
//! and tools from source; stack B usually has no components at all.

use super::PhaseContext;
use super::steps::{
    build_component, deploy_files, deploy_trees, install_aur, install_packages, sync_dotfiles,
};
use crate::error::Result;
use crate::sync::{SyncTarget, sync_mirror};
use crate::variant::Stack;

fn run_stack(ctx: &mut PhaseContext<'_>, stack: Stack) -> Result<()> {
    let config = ctx.config;
    let settings = config.settings.stack(stack);
    ctx.ui.info(format!("stack {stack}: {}", settings.label));

    install_packages(ctx, &settings.packages)?;
    install_aur(ctx, &settings.aur)?;

    for component in &settings.components {
        let target = SyncTarget::new(
            &component.url,
            config.paths.mirror(&component.name),
            component.branch.as_deref(),
        );
        sync_mirror(ctx.exec, ctx.ui, &target)?;
        build_component(ctx, &component.name, &target.local_path)?;
    }

    if settings.files.is_empty() && settings.trees.is_empty() {
        return Ok(());
    }
    let dotfiles = sync_dotfiles(ctx)?;
    deploy_files(ctx, &dotfiles, &settings.files)?;
    deploy_trees(ctx, &dotfiles, &settings.trees)
}

pub fn run_a(ctx: &mut PhaseContext<'_>) -> Result<()> {
    run_stack(ctx, Stack::A)
}

pub fn run_b(ctx: &mut PhaseContext<'_>) -> Result<()> {
    run_stack(ctx, Stack::B)
}
