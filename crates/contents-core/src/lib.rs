//! Content package management for a sandboxed Wine/Proton runtime.
//!
//! Packages are validated before anything touches the sandbox: every
//! declared target must stay inside `imagefs`, and files overlaying live
//! system paths are checked against per-type trust lists.

pub mod identifier;
pub mod install;
pub mod manifest;
pub mod paths;
pub mod registry;
pub mod template;
pub mod trust;
pub mod version;

// Re-exports
pub use contents_schema;
pub use identifier::{IdentifierResolver, Resolution};
pub use install::{
    ApplyError, ContentInstaller, FinalizeError, InstallFailedReason, InstallFailure,
    ValidatedContent,
};
pub use paths::ContentsLayout;
pub use registry::{Registry, RegistryError, RegistrySnapshot};
