//! contents - content package manager
#![allow(clippy::missing_errors_doc)]
//!
//! Installs Wine/Proton runtimes, GPU drivers and translation layers into a
//! sandbox root, and resolves the runtime identifiers containers are
//! configured with.
//!
//! # Directory Layout
//!
//! ```text
//! <files>/
//! ├── imagefs/          # sandbox root, runtimes under opt/
//! ├── contents/<type>/  # installed packages
//! └── tmp/contents/     # extraction scratch
//! ```

pub mod cmd;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use contents_core::{ContentsLayout, Registry};
use contents_schema::ContentType;

/// Command line interface.
#[derive(Debug, Parser)]
#[command(name = "contents")]
#[command(author, version, about = "contents - install and manage Wine/Proton content packages")]
pub struct Cli {
    /// Host files directory (defaults to the platform data directory)
    #[arg(long, global = true, env = "CONTENTS_FILES_DIR")]
    pub files_dir: Option<PathBuf>,

    /// Runtime shipped in the image under imagefs/opt (repeatable)
    #[arg(long, global = true, env = "CONTENTS_BUNDLED", value_delimiter = ',')]
    pub bundled: Vec<String>,

    /// Remote catalog: a JSON array of {remoteUrl, type, verName, verCode}
    #[arg(long, global = true)]
    pub remote: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install a content archive
    Install {
        /// Path to the .tar.xz / .tar.zst / .tar.gz archive
        archive: PathBuf,
        /// Copy files even when their target is not on the type's trust list
        #[arg(long)]
        allow_untrusted: bool,
    },
    /// List installed and remotely available content
    List {
        /// Only show one content type
        #[arg(long = "type")]
        content_type: Option<ContentType>,
    },
    /// Show which runtime an identifier resolves to
    Resolve {
        /// Runtime identifier, e.g. proton-10.0-arm64ec
        identifier: String,
    },
    /// Remove an installed package
    Remove {
        /// Entry name: <type>-<verName>-<verCode>
        entry: String,
    },
    /// List files of an installed package that overlay untrusted paths
    Untrusted {
        /// Entry name: <type>-<verName>-<verCode>
        entry: String,
    },
}

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    /// Where content is installed.
    pub layout: ContentsLayout,
    /// Runtimes shipped in the image.
    pub bundled: Vec<String>,
    /// Remote catalog file, if any.
    pub remote: Option<PathBuf>,
}

impl Context {
    /// Build the context from parsed arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let layout = match &cli.files_dir {
            Some(dir) => ContentsLayout::new(dir),
            None => ContentsLayout::from_env().context(
                "Could not determine files directory. Set CONTENTS_FILES_DIR to override.",
            )?,
        };
        Ok(Self {
            layout,
            bundled: cli.bundled.clone(),
            remote: cli.remote.clone(),
        })
    }

    /// A synced registry, including the remote catalog when configured.
    pub fn registry(&self) -> Result<Registry> {
        let mut registry = Registry::new(self.layout.clone());
        match &self.remote {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read remote catalog {}", path.display()))?;
                registry.set_remote_profiles(&json);
            }
            None => registry.sync(),
        }
        Ok(registry)
    }
}
