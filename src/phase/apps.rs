use super::PhaseContext;
use super::steps::{enable_service, install_aur, install_optional, install_packages};
use crate::error::Result;

/// Applications, then the optional extras whose failure only warns
pub fn run(ctx: &mut PhaseContext<'_>) -> Result<()> {
    let config = ctx.config;
    let settings = &config.settings;

    install_packages(ctx, &settings.packages.apps)?;
    install_aur(ctx, &settings.aur.apps)?;
    install_optional(ctx, &settings.packages.optional)?;
    for unit in &settings.services.optional {
        enable_service(ctx, unit, false)?;
    }
    Ok(())
}
