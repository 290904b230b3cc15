//! Placeholder expansion for manifest target paths.

use std::path::{Path, PathBuf};

/// Placeholder tokens and their location relative to the sandbox root.
const TEMPLATES: &[(&str, &str)] = &[
    ("${libdir}", "usr/lib"),
    ("${system32}", "home/xuser/.wine/drive_c/windows/system32"),
    ("${syswow64}", "home/xuser/.wine/drive_c/windows/syswow64"),
    ("${localbin}", "usr/local/bin"),
    ("${bindir}", "usr/bin"),
    ("${sharedir}", "usr/share"),
];

/// Expands placeholder tokens into absolute paths under one sandbox root.
///
/// Substitution is purely textual: every occurrence of every known token is
/// replaced and anything else, including unknown `${...}` tokens, is kept
/// verbatim.
#[derive(Debug, Clone)]
pub struct PathTemplateResolver {
    sandbox_root: PathBuf,
    replacements: Vec<(&'static str, String)>,
}

impl PathTemplateResolver {
    /// Build the token table for `sandbox_root`.
    pub fn new(sandbox_root: impl Into<PathBuf>) -> Self {
        let sandbox_root = sandbox_root.into();
        let root = sandbox_root.to_string_lossy().into_owned();
        let replacements = TEMPLATES
            .iter()
            .map(|(token, rel)| (*token, format!("{root}/{rel}")))
            .collect();
        Self {
            sandbox_root,
            replacements,
        }
    }

    /// The sandbox root tokens expand under.
    pub fn sandbox_root(&self) -> &Path {
        &self.sandbox_root
    }

    /// Expand every known token in `path`.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let mut real = path.to_string();
        for (token, value) in &self.replacements {
            real = real.replace(token, value);
        }
        PathBuf::from(real)
    }

    /// `${...}` fragments left in `path` after expansion.
    pub fn unresolved_tokens(&self, path: &str) -> Vec<String> {
        let resolved = self.resolve(path);
        let resolved = resolved.to_string_lossy();
        let mut tokens = Vec::new();
        let mut rest = resolved.as_ref();
        while let Some(start) = rest.find("${") {
            match rest[start..].find('}') {
                Some(end) => {
                    tokens.push(rest[start..=start + end].to_string());
                    rest = &rest[start + end + 1..];
                }
                None => break,
            }
        }
        tokens
    }
}
