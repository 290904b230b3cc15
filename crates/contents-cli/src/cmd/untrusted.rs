//! Untrusted command

use anyhow::{Result, bail};
use contents_core::ContentInstaller;

use crate::Context;

/// List the files of a package whose targets are not on its trust list
pub fn untrusted(ctx: &Context, entry: &str) -> Result<()> {
    let registry = ctx.registry()?;
    let snapshot = registry.snapshot();
    let Some(profile) = snapshot.get_profile_by_entry_name(entry) else {
        bail!("No content named '{entry}'");
    };

    let installer = ContentInstaller::new(ctx.layout.clone());
    let files = installer.untrusted_files(profile);
    if files.is_empty() {
        println!("  All files of {} are trusted.", profile.entry_name());
    }
    for file in files {
        println!("  {} -> {}", file.source, file.target);
    }
    Ok(())
}
