//! Directory layout of the host files directory.
//!
//! ```text
//! <files>/
//! ├── imagefs/                        # sandbox root
//! │   └── opt/<verName>-<verCode>/    # Wine/Proton installs
//! ├── contents/<type>/<verName>-<verCode>/
//! └── tmp/contents/                   # extraction scratch
//! ```

use std::path::{Component, Path, PathBuf};

use contents_schema::{ContentProfile, ContentType};
use dirs::data_dir;

/// Environment variable overriding the files directory.
pub const FILES_DIR_ENV: &str = "CONTENTS_FILES_DIR";

/// Name of the installer's own management directory.
const CONTENTS_DIR_NAME: &str = "contents";

/// Returns the files directory, or None if no data directory can be resolved.
pub fn try_files_dir() -> Option<PathBuf> {
    if let Ok(val) = std::env::var(FILES_DIR_ENV) {
        return Some(PathBuf::from(val));
    }
    data_dir().map(|d| d.join("contents"))
}

/// Every path the installer reads or writes, derived from one files directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentsLayout {
    files_dir: PathBuf,
}

impl ContentsLayout {
    /// Layout rooted at `files_dir`.
    pub fn new(files_dir: impl Into<PathBuf>) -> Self {
        Self {
            files_dir: files_dir.into(),
        }
    }

    /// Layout rooted at [`try_files_dir`].
    pub fn from_env() -> Option<Self> {
        try_files_dir().map(Self::new)
    }

    /// The host files directory.
    pub fn files_dir(&self) -> &Path {
        &self.files_dir
    }

    /// Sandbox root: `<files>/imagefs`.
    pub fn imagefs_dir(&self) -> PathBuf {
        self.files_dir.join("imagefs")
    }

    /// Management directory: `<files>/contents`.
    pub fn contents_dir(&self) -> PathBuf {
        self.files_dir.join(CONTENTS_DIR_NAME)
    }

    /// Extraction scratch: `<files>/tmp/contents`.
    pub fn tmp_dir(&self) -> PathBuf {
        self.files_dir.join("tmp").join(CONTENTS_DIR_NAME)
    }

    /// Directory a content type installs into.
    ///
    /// Wine/Proton live inside the sandbox at `imagefs/opt` so the runtime can
    /// execute them from within its own root.
    pub fn content_type_dir(&self, content_type: ContentType) -> PathBuf {
        if content_type.is_runtime() {
            self.imagefs_dir().join("opt")
        } else {
            self.contents_dir().join(content_type.dir_name())
        }
    }

    /// `<type dir>/<verName>-<verCode>`.
    pub fn install_dir(&self, profile: &ContentProfile) -> PathBuf {
        self.content_type_dir(profile.content_type)
            .join(profile.install_dir_name())
    }

    /// A file inside an installed package.
    pub fn source_file(&self, profile: &ContentProfile, path: &str) -> PathBuf {
        self.install_dir(profile).join(path)
    }
}

/// Absolute, lexically normalized form of `path`.
///
/// Relative paths are anchored at the current directory, `.` is dropped and
/// `..` pops a component (never above the root). Symlinks are not followed.
///
/// # Errors
///
/// Returns an error if `path` is empty, or relative while the current directory
/// cannot be read.
pub fn normalize(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

/// Returns `true` when `child` normalizes to `parent` or a path below it.
///
/// Paths that cannot be normalized are treated as outside.
pub fn is_sub_path(parent: &Path, child: &Path) -> bool {
    match (normalize(parent), normalize(child)) {
        (Ok(parent), Ok(child)) => child.starts_with(parent),
        _ => false,
    }
}
