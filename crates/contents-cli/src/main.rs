//! contents - content package manager CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use contents_cli::cmd;
use contents_cli::{Cli, Commands, Context};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = Context::from_cli(&cli)?;

    // Installer and registry do blocking filesystem work.
    tokio::task::spawn_blocking(move || match cli.command {
        Commands::Install {
            archive,
            allow_untrusted,
        } => cmd::install::install(&ctx, &archive, allow_untrusted),
        Commands::List { content_type } => cmd::list::list(&ctx, content_type),
        Commands::Resolve { identifier } => cmd::resolve::resolve(&ctx, &identifier),
        Commands::Remove { entry } => cmd::remove::remove(&ctx, &entry),
        Commands::Untrusted { entry } => cmd::untrusted::untrusted(&ctx, &entry),
    })
    .await?
}
