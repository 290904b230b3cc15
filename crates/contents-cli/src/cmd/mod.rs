//! Subcommand implementations

pub mod install;
pub mod list;
pub mod remove;
pub mod resolve;
pub mod untrusted;
