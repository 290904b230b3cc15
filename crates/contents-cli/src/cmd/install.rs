//! Install command

use std::path::Path;

use anyhow::{Context as _, Result, bail};
use contents_core::ContentInstaller;
use crossterm::style::Stylize;
use tracing::debug;

use crate::Context;

/// Validate, install and apply one archive
pub fn install(ctx: &Context, archive: &Path, allow_untrusted: bool) -> Result<()> {
    let mut registry = ctx.registry()?;
    let installer = ContentInstaller::new(ctx.layout.clone());

    let content = installer
        .validate_archive(archive)
        .with_context(|| format!("Failed to install {}", archive.display()))?;
    debug!(
        "Validated {} in {}",
        content.profile().entry_name(),
        content.scratch_dir().display()
    );

    let untrusted = installer.untrusted_files(content.profile());
    if !untrusted.is_empty() {
        println!(
            "  {} {} overlays paths outside its trust list:",
            "WARNING:".bold().yellow(),
            content.profile().entry_name()
        );
        for file in &untrusted {
            println!("    {}", file.target);
        }
        if !allow_untrusted {
            bail!("Refusing untrusted files; pass --allow-untrusted to install anyway");
        }
    }

    let profile = installer.finish_install(content, &registry.snapshot())?;
    registry.sync();
    debug!("Applying {}", profile.entry_name());

    let written = installer.apply_content(&profile, allow_untrusted)?;
    println!(
        "  {} {} ({} files applied)",
        "installed".green(),
        profile.entry_name().bold(),
        written.len()
    );
    Ok(())
}
