//! Runtime selections: which Wine/Proton build a container runs with.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::arch::RuntimeArch;
use crate::content_type::ContentType;

/// Runtime family of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeKind {
    /// Upstream or bionic Wine.
    Wine,
    /// Proton.
    Proton,
}

impl RuntimeKind {
    /// Lowercase name used in identifiers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wine => "wine",
            Self::Proton => "proton",
        }
    }

    /// Name shown to users.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Wine => "Wine",
            Self::Proton => "Proton",
        }
    }

    /// Content type packages of this kind are installed as.
    pub fn content_type(&self) -> ContentType {
        match self {
            Self::Wine => ContentType::Wine,
            Self::Proton => ContentType::Proton,
        }
    }
}

impl std::str::FromStr for RuntimeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("wine") {
            Ok(Self::Wine)
        } else if s.eq_ignore_ascii_case("proton") {
            Ok(Self::Proton)
        } else {
            Err(format!("Unknown runtime kind: {s}"))
        }
    }
}

/// A resolved runtime selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeInfo {
    /// Wine or Proton.
    pub kind: RuntimeKind,
    /// Numeric version, e.g. `9.2`.
    pub version: String,
    /// Optional build suffix, e.g. the `2` of `proton-10.0-2-arm64ec`.
    pub subversion: Option<String>,
    /// Guest architecture.
    pub arch: RuntimeArch,
    /// Install directory; `None` for the main runtime shipped in the image.
    pub path: Option<PathBuf>,
    /// Library directory relative to `path`, taken from the package manifest.
    pub lib_path: Option<String>,
}

impl RuntimeInfo {
    /// The runtime bundled with the base image, used whenever a selection
    /// cannot be resolved.
    pub fn main() -> Self {
        Self::new(RuntimeKind::Wine, "9.2", None, RuntimeArch::X86_64)
    }

    /// Create a selection without an install path.
    pub fn new(
        kind: RuntimeKind,
        version: impl Into<String>,
        subversion: Option<String>,
        arch: RuntimeArch,
    ) -> Self {
        Self {
            kind,
            version: version.into(),
            subversion: subversion.filter(|s| !s.is_empty()),
            arch,
            path: None,
            lib_path: None,
        }
    }

    /// Set the install path.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// `<version>[-<subversion>]`.
    pub fn full_version(&self) -> String {
        match &self.subversion {
            Some(sub) => format!("{}-{sub}", self.version),
            None => self.version.clone(),
        }
    }

    /// `<kind>-<full version>-<arch>`, the form stored in container settings.
    pub fn identifier(&self) -> String {
        format!("{}-{}-{}", self.kind.as_str(), self.full_version(), self.arch)
    }

    /// Returns `true` when this is the runtime shipped with the image.
    pub fn is_main(&self) -> bool {
        let main = Self::main();
        self.kind == main.kind
            && self.version == main.version
            && self.subversion == main.subversion
            && self.arch == main.arch
            && self.path == main.path
    }

    /// Returns `true` when `identifier` is absent or names the main runtime.
    pub fn is_main_identifier(identifier: Option<&str>) -> bool {
        identifier.is_none_or(|id| id == Self::main().identifier())
    }
}

impl std::fmt::Display for RuntimeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind.display_name(), self.full_version())?;
        if self.is_main() {
            write!(f, " (Custom)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_identifier() {
        let main = RuntimeInfo::main();
        assert_eq!(main.identifier(), "wine-9.2-x86_64");
        assert!(main.is_main());
        assert_eq!(main.to_string(), "Wine 9.2 (Custom)");
        assert!(RuntimeInfo::is_main_identifier(None));
        assert!(RuntimeInfo::is_main_identifier(Some("wine-9.2-x86_64")));
        assert!(!RuntimeInfo::is_main_identifier(Some("wine-9.2-x86")));
    }

    #[test]
    fn test_subversion_in_identifier() {
        let info = RuntimeInfo::new(
            RuntimeKind::Proton,
            "10.0",
            Some("2".to_string()),
            RuntimeArch::Arm64ec,
        )
        .with_path("/opt/proton-10.0-2-arm64ec");
        assert_eq!(info.identifier(), "proton-10.0-2-arm64ec");
        assert_eq!(info.to_string(), "Proton 10.0-2");
        assert!(!info.is_main());
    }

    #[test]
    fn test_empty_subversion_is_dropped() {
        let info = RuntimeInfo::new(RuntimeKind::Wine, "9.2", Some(String::new()), RuntimeArch::X86);
        assert_eq!(info.subversion, None);
        assert_eq!(info.identifier(), "wine-9.2-x86");
    }
}
