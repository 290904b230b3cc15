//! List command

use anyhow::Result;
use contents_schema::ContentType;
use crossterm::style::Stylize;

use crate::Context;

/// List known profiles, optionally of one type
pub fn list(ctx: &Context, content_type: Option<ContentType>) -> Result<()> {
    let registry = ctx.registry()?;
    let snapshot = registry.snapshot();

    let profiles: Vec<_> = snapshot
        .iter()
        .filter(|p| content_type.is_none_or(|t| p.content_type == t))
        .collect();

    if profiles.is_empty() {
        println!();
        println!("  No content installed.");
        println!("  Run 'contents install <archive>' to get started.");
        return Ok(());
    }

    for profile in profiles {
        let origin = if profile.is_remote() {
            "remote".dark_grey()
        } else {
            "installed".green()
        };
        println!(
            "  {:<40} {:<32} {origin}",
            profile.entry_name(),
            profile.desc
        );
    }
    Ok(())
}
