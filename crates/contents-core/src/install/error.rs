//! Installation failure taxonomy

use thiserror::Error;

/// Why an installation attempt failed. Closed set, reported once per attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallFailedReason {
    /// Not enough storage to prepare the scratch area.
    NoSpace,
    /// No codec could unpack the archive.
    BadArchive,
    /// The archive has no `profile.json` at its root.
    NoProfile,
    /// `profile.json` did not parse.
    BadProfile,
    /// A declared source, or a runtime directory, is missing or escapes the archive.
    MissingFiles,
    /// The install directory already exists.
    Exist,
    /// A target escapes the sandbox or reaches into protected areas.
    UntrustedProfile,
    /// Anything else, including I/O failures while finalizing.
    Unknown,
}

impl InstallFailedReason {
    /// Stable upper-case code, e.g. `ERROR_BADTAR`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoSpace => "ERROR_NOSPACE",
            Self::BadArchive => "ERROR_BADTAR",
            Self::NoProfile => "ERROR_NOPROFILE",
            Self::BadProfile => "ERROR_BADPROFILE",
            Self::MissingFiles => "ERROR_MISSINGFILES",
            Self::Exist => "ERROR_EXIST",
            Self::UntrustedProfile => "ERROR_UNTRUSTPROFILE",
            Self::Unknown => "ERROR_UNKNOWN",
        }
    }

    fn message(self) -> &'static str {
        match self {
            Self::NoSpace => "not enough storage space",
            Self::BadArchive => "archive could not be extracted",
            Self::NoProfile => "archive has no profile.json",
            Self::BadProfile => "profile.json is invalid",
            Self::MissingFiles => "declared files are missing",
            Self::Exist => "this version is already installed",
            Self::UntrustedProfile => "profile targets paths outside the sandbox",
            Self::Unknown => "installation failed",
        }
    }
}

impl std::fmt::Display for InstallFailedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// A failed installation attempt.
#[derive(Error, Debug)]
#[error("{reason}{}", .detail.as_ref().map(|d| format!(" ({d})")).unwrap_or_default())]
pub struct InstallFailure {
    /// Classified reason.
    pub reason: InstallFailedReason,
    /// What was being checked, for logs.
    pub detail: Option<String>,
    /// Underlying error, if any.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl InstallFailure {
    /// A failure with no further detail.
    pub fn new(reason: InstallFailedReason) -> Self {
        Self {
            reason,
            detail: None,
            source: None,
        }
    }

    /// Attach a human readable detail.
    pub fn detail(mut self, detail: impl std::fmt::Display) -> Self {
        self.detail = Some(detail.to_string());
        self
    }

    /// Attach the underlying error.
    pub fn caused_by(mut self, err: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(err));
        self
    }
}

impl From<InstallFailedReason> for InstallFailure {
    fn from(reason: InstallFailedReason) -> Self {
        Self::new(reason)
    }
}

/// Errors raised while copying an installed package onto its targets.
#[derive(Error, Debug)]
pub enum ApplyError {
    /// Targets not on the type's trust list.
    #[error("Untrusted targets: {}", .0.join(", "))]
    Untrusted(Vec<String>),

    /// A target resolves outside the sandbox.
    #[error("Target escapes the sandbox: {0}")]
    Escapes(String),

    /// The package has no install directory.
    #[error("Not installed: {0}")]
    NotInstalled(String),

    /// Copying failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code_and_detail() {
        let failure = InstallFailure::new(InstallFailedReason::UntrustedProfile)
            .detail("${system32}/../../../../x");
        let text = failure.to_string();
        assert!(text.starts_with("ERROR_UNTRUSTPROFILE"));
        assert!(text.contains("(${system32}/../../../../x)"));
        assert_eq!(
            InstallFailure::from(InstallFailedReason::BadArchive).to_string(),
            "ERROR_BADTAR: archive could not be extracted"
        );
    }
}
