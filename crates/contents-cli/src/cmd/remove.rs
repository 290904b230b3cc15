//! Remove command

use anyhow::{Result, bail};
use crossterm::style::Stylize;
use tracing::debug;

use crate::Context;

/// Remove an installed package by entry name
pub fn remove(ctx: &Context, entry: &str) -> Result<()> {
    let mut registry = ctx.registry()?;
    let Some(profile) = registry.snapshot().get_profile_by_entry_name(entry).cloned() else {
        bail!("No content named '{entry}'");
    };

    debug!("Removing {entry}");
    registry.remove_content(&profile)?;
    println!("  {} {}", "removed".red(), profile.entry_name());
    Ok(())
}
