//! Shared types for content packages: content types, profiles, runtime
//! architectures and runtime selections.

pub mod arch;
pub mod content_type;
pub mod profile;
pub mod runtime;

// Re-exports
pub use arch::*;
pub use content_type::*;
pub use profile::*;
pub use runtime::*;

/// File name of the manifest at the root of every content archive.
pub const PROFILE_NAME: &str = "profile.json";
