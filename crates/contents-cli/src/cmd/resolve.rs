//! Resolve command

use anyhow::Result;
use contents_core::{IdentifierResolver, Resolution};

use crate::Context;

/// Print what a runtime identifier resolves to
pub fn resolve(ctx: &Context, identifier: &str) -> Result<()> {
    let registry = ctx.registry()?;
    let resolver = IdentifierResolver::new(
        registry.snapshot(),
        ctx.layout.clone(),
        ctx.bundled.iter().cloned(),
    );

    let source = match resolver.resolve(identifier) {
        Resolution::Main => "main".to_string(),
        Resolution::Profile(profile) => format!("profile {}", profile.entry_name()),
        Resolution::Bundled(_) => "bundled".to_string(),
    };
    let runtime = resolver.resolve_runtime(identifier);

    let lw = 12;
    println!("  {:<lw$}{runtime}", "runtime");
    println!("  {:<lw$}{}", "identifier", runtime.identifier());
    println!("  {:<lw$}{source}", "source");
    if let Some(path) = &runtime.path {
        println!("  {:<lw$}{}", "path", path.display());
    }
    if let Some(lib_path) = &runtime.lib_path {
        println!("  {:<lw$}{lib_path}", "lib");
    }
    Ok(())
}
