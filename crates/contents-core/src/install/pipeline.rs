//! Installation pipeline
//!
//! ```text
//! archive --[extract_archive()]--> scratch dir --[validate]--> ValidatedContent
//!         --[finish_install()]--> installed ContentProfile
//! ```
//!
//! [`ValidatedContent`] can only be produced by validation, so a package can
//! never be finalized without having passed the containment checks.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use contents_schema::{ContentFile, ContentProfile, ContentType, PROFILE_NAME, RuntimeLayout};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::error::{ApplyError, InstallFailedReason, InstallFailure};
use super::extract::{ArchiveExtractor, default_extractors};
use crate::manifest;
use crate::paths::{ContentsLayout, is_sub_path};
use crate::registry::RegistrySnapshot;
use crate::template::PathTemplateResolver;
use crate::trust::TrustCatalog;
use crate::version::next_version_code;

/// Path fragment that would reach the host through Wine's drive mappings.
const DOS_DEVICES: &str = "dosdevices";

/// Mode applied to runtime binaries and box64 executables.
const EXEC_MODE: u32 = 0o755;

/// A package that was extracted and passed every check.
///
/// Holds the parsed manifest and the scratch directory it was extracted to.
#[derive(Debug)]
pub struct ValidatedContent {
    profile: ContentProfile,
    scratch_dir: PathBuf,
}

impl ValidatedContent {
    pub(crate) fn new(profile: ContentProfile, scratch_dir: PathBuf) -> Self {
        Self {
            profile,
            scratch_dir,
        }
    }

    /// The manifest, with its declared version code.
    pub fn profile(&self) -> &ContentProfile {
        &self.profile
    }

    /// Where the package is waiting to be moved into place.
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }
}

/// Finalizing failed. The validated content is handed back for a retry.
#[derive(Error, Debug)]
#[error("{failure}")]
pub struct FinalizeError {
    failure: InstallFailure,
    content: ValidatedContent,
}

impl FinalizeError {
    /// Why finalizing failed.
    pub fn reason(&self) -> InstallFailedReason {
        self.failure.reason
    }

    /// The underlying failure.
    pub fn failure(&self) -> &InstallFailure {
        &self.failure
    }

    /// Take the validated content back.
    pub fn into_content(self) -> ValidatedContent {
        self.content
    }
}

/// Installs content packages into one files directory.
#[derive(Debug)]
pub struct ContentInstaller {
    layout: ContentsLayout,
    template: PathTemplateResolver,
    trust: OnceLock<TrustCatalog>,
    extractors: Vec<Box<dyn ArchiveExtractor>>,
}

impl ContentInstaller {
    /// Installer for `layout` using the default codecs.
    pub fn new(layout: ContentsLayout) -> Self {
        let template = PathTemplateResolver::new(layout.imagefs_dir());
        Self {
            layout,
            template,
            trust: OnceLock::new(),
            extractors: default_extractors(),
        }
    }

    /// Replace the extractors, tried in the given order.
    #[must_use]
    pub fn with_extractors(mut self, extractors: Vec<Box<dyn ArchiveExtractor>>) -> Self {
        self.extractors = extractors;
        self
    }

    /// Directory layout this installer writes into.
    pub fn layout(&self) -> &ContentsLayout {
        &self.layout
    }

    /// Template resolver for the sandbox root.
    pub fn template(&self) -> &PathTemplateResolver {
        &self.template
    }

    /// Trust lists, built on first use.
    pub fn trust(&self) -> &TrustCatalog {
        self.trust.get_or_init(|| TrustCatalog::new(&self.template))
    }

    /// Wipe every earlier attempt and create a uniquely named scratch
    /// directory for this one.
    fn prepare_scratch(&self) -> Result<PathBuf, InstallFailure> {
        let tmp = self.layout.tmp_dir();
        clear_dir(&tmp)
            .and_then(|()| {
                tempfile::Builder::new()
                    .prefix("attempt-")
                    .tempdir_in(&tmp)
            })
            .map(tempfile::TempDir::keep)
            .map_err(|e| scratch_failure(&tmp, e))
    }

    /// Unpack `archive` into a fresh scratch directory.
    ///
    /// Each extractor is tried in order; the scratch directory is cleared
    /// again after every failed attempt. Starting an extraction invalidates
    /// every [`ValidatedContent`] produced before it.
    ///
    /// # Errors
    ///
    /// [`InstallFailedReason::BadArchive`] when no extractor succeeds,
    /// [`InstallFailedReason::NoSpace`] or [`InstallFailedReason::Unknown`] if
    /// the scratch directory cannot be prepared.
    pub fn extract_archive(&self, archive: &Path) -> Result<PathBuf, InstallFailure> {
        let scratch = self.prepare_scratch()?;
        info!("Extracting {}", archive.display());

        for extractor in &self.extractors {
            match extractor.extract(archive, &scratch) {
                Ok(()) => {
                    debug!("Extracted with {}", extractor.name());
                    return Ok(scratch);
                }
                Err(e) => {
                    debug!("{} extractor failed: {e}", extractor.name());
                    clear_dir(&scratch).map_err(|e| scratch_failure(&scratch, e))?;
                }
            }
        }

        if let Err(e) = fs::remove_dir_all(&scratch) {
            debug!("Could not remove {}: {e}", scratch.display());
        }
        Err(InstallFailure::new(InstallFailedReason::BadArchive).detail(archive.display()))
    }

    /// Extract and validate `archive`.
    ///
    /// # Errors
    ///
    /// Any [`InstallFailure`] from extraction or validation.
    pub fn validate_archive(&self, archive: &Path) -> Result<ValidatedContent, InstallFailure> {
        let scratch = self.extract_archive(archive)?;
        self.validate_scratch(scratch)
    }

    /// Extract and validate `archive`, reporting the outcome to `callback`.
    pub fn extract_content_file<F>(&self, archive: &Path, callback: F)
    where
        F: FnOnce(Result<ValidatedContent, InstallFailure>),
    {
        callback(self.validate_archive(archive));
    }

    fn validate_scratch(&self, scratch: PathBuf) -> Result<ValidatedContent, InstallFailure> {
        let manifest_path = scratch.join(PROFILE_NAME);
        if !manifest_path.is_file() {
            return Err(InstallFailure::new(InstallFailedReason::NoProfile));
        }
        let profile = manifest::parse_file(&manifest_path)
            .map_err(|e| InstallFailure::new(InstallFailedReason::BadProfile).caused_by(e))?;
        debug!("Validating {}", profile.entry_name());

        for file in &profile.files {
            let source = scratch.join(&file.source);
            if !source.is_file() || !is_sub_path(&scratch, &source) {
                return Err(InstallFailure::new(InstallFailedReason::MissingFiles)
                    .detail(&file.source));
            }
            let target = self.resolve_target(file);
            if !self.is_contained(&target) {
                return Err(InstallFailure::new(InstallFailedReason::UntrustedProfile)
                    .detail(&file.target));
            }
        }

        if profile.content_type.is_runtime() {
            let Some(runtime) = &profile.runtime else {
                return Err(InstallFailure::new(InstallFailedReason::MissingFiles)
                    .detail("no runtime layout declared"));
            };
            check_runtime_layout(&scratch, runtime)?;
        }

        info!(
            "Validated {} ({} files)",
            profile.entry_name(),
            profile.files.len()
        );
        Ok(ValidatedContent::new(profile, scratch))
    }

    fn resolve_target(&self, file: &ContentFile) -> PathBuf {
        for token in self.template.unresolved_tokens(&file.target) {
            warn!("Unknown placeholder {token} in target {}", file.target);
        }
        self.template.resolve(&file.target)
    }

    /// Inside the sandbox, outside the management directory, and not through
    /// the drive mappings.
    fn is_contained(&self, target: &Path) -> bool {
        is_sub_path(&self.layout.imagefs_dir(), target)
            && !is_sub_path(&self.layout.contents_dir(), target)
            && !target.to_string_lossy().contains(DOS_DEVICES)
    }

    /// Move validated content into its install directory.
    ///
    /// The version code is bumped past any installed profile of the same
    /// name. Runtime binaries are made executable.
    ///
    /// # Errors
    ///
    /// [`InstallFailedReason::Exist`] if the install directory is taken,
    /// [`InstallFailedReason::Unknown`] if the scratch directory was replaced
    /// by a later extraction or the install directory cannot be created. The
    /// content is handed back inside the error either way.
    pub fn finish_install(
        &self,
        content: ValidatedContent,
        snapshot: &RegistrySnapshot,
    ) -> Result<ContentProfile, FinalizeError> {
        if !content.scratch_dir.join(PROFILE_NAME).is_file() {
            return Err(FinalizeError {
                failure: InstallFailure::new(InstallFailedReason::Unknown)
                    .detail("validated content was replaced by a later extraction"),
                content,
            });
        }

        let mut profile = content.profile.clone();
        profile.ver_code = next_version_code(
            &profile.ver_name,
            profile.content_type,
            profile.ver_code,
            snapshot,
        );

        let dest = self.layout.install_dir(&profile);
        if dest.exists() {
            return Err(FinalizeError {
                failure: InstallFailure::new(InstallFailedReason::Exist).detail(dest.display()),
                content,
            });
        }

        // The installed manifest carries the effective code so rescans agree
        // with the directory name.
        if profile.ver_code != content.profile.ver_code {
            let manifest_path = content.scratch_dir.join(PROFILE_NAME);
            if let Err(e) = manifest::write_version_code(&manifest_path, profile.ver_code) {
                return Err(FinalizeError {
                    failure: InstallFailure::new(InstallFailedReason::Unknown).caused_by(e),
                    content,
                });
            }
        }

        let moved = dest
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| fs::rename(&content.scratch_dir, &dest));
        if let Err(e) = moved {
            return Err(FinalizeError {
                failure: InstallFailure::new(InstallFailedReason::Unknown)
                    .detail(dest.display())
                    .caused_by(e),
                content,
            });
        }

        if let Some(runtime) = profile.runtime.as_ref().filter(|_| profile.content_type.is_runtime())
        {
            make_executable(&dest.join(&runtime.bin_path));
        }

        info!("Installed {} to {}", profile.entry_name(), dest.display());
        Ok(profile)
    }

    /// [`Self::finish_install`], reporting the outcome to `callback`.
    pub fn finish_install_with<F>(
        &self,
        content: ValidatedContent,
        snapshot: &RegistrySnapshot,
        callback: F,
    ) where
        F: FnOnce(Result<ContentProfile, FinalizeError>),
    {
        callback(self.finish_install(content, snapshot));
    }

    /// Files of `profile` whose target is not on its type's trust list.
    pub fn untrusted_files<'a>(&self, profile: &'a ContentProfile) -> Vec<&'a ContentFile> {
        self.trust().untrusted_files(&self.template, profile)
    }

    /// Copy an installed package's files to their targets.
    ///
    /// Wine and Proton run from their install directory, so nothing is copied
    /// for them. Returns the paths written.
    ///
    /// # Errors
    ///
    /// [`ApplyError::Untrusted`] if a target is off the trust list and
    /// `allow_untrusted` is false, [`ApplyError::NotInstalled`] if the package
    /// directory is missing, [`ApplyError::Escapes`] if a target leaves the
    /// sandbox, or an I/O error while copying.
    pub fn apply_content(
        &self,
        profile: &ContentProfile,
        allow_untrusted: bool,
    ) -> Result<Vec<PathBuf>, ApplyError> {
        if profile.content_type.is_runtime() {
            return Ok(Vec::new());
        }

        let untrusted = self.untrusted_files(profile);
        if !untrusted.is_empty() {
            let targets: Vec<String> = untrusted.iter().map(|f| f.target.clone()).collect();
            if !allow_untrusted {
                return Err(ApplyError::Untrusted(targets));
            }
            warn!("Applying untrusted files: {}", targets.join(", "));
        }

        let install_dir = self.layout.install_dir(profile);
        if !install_dir.is_dir() {
            return Err(ApplyError::NotInstalled(profile.entry_name()));
        }

        let mut written = Vec::with_capacity(profile.files.len());
        for file in &profile.files {
            let source = self.layout.source_file(profile, &file.source);
            let target = self.resolve_target(file);
            if !self.is_contained(&target) || !is_sub_path(&install_dir, &source) {
                return Err(ApplyError::Escapes(file.target.clone()));
            }

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            if target.symlink_metadata().is_ok() {
                fs::remove_file(&target)?;
            }
            fs::copy(&source, &target)?;
            if profile.content_type == ContentType::Box64 {
                set_mode(&target, EXEC_MODE)?;
            }
            debug!("{} -> {}", file.source, target.display());
            written.push(target);
        }

        info!("Applied {} ({} files)", profile.entry_name(), written.len());
        Ok(written)
    }
}

/// Remove `dir` if present and recreate it empty.
fn clear_dir(dir: &Path) -> io::Result<()> {
    match fs::remove_dir_all(dir) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => fs::create_dir_all(dir),
    }
}

fn scratch_failure(dir: &Path, err: io::Error) -> InstallFailure {
    let reason = if err.kind() == io::ErrorKind::StorageFull {
        InstallFailedReason::NoSpace
    } else {
        InstallFailedReason::Unknown
    };
    InstallFailure::new(reason)
        .detail(dir.display())
        .caused_by(err)
}

fn check_runtime_layout(scratch: &Path, runtime: &RuntimeLayout) -> Result<(), InstallFailure> {
    let checks = [
        (&runtime.bin_path, true),
        (&runtime.lib_path, true),
        (&runtime.prefix_pack, false),
    ];
    for (rel, is_dir) in checks {
        let path = scratch.join(rel);
        let present = if is_dir { path.is_dir() } else { path.is_file() };
        if rel.is_empty() || !present || !is_sub_path(scratch, &path) {
            return Err(InstallFailure::new(InstallFailedReason::MissingFiles).detail(rel));
        }
    }
    Ok(())
}

/// Best effort: the package is already in place when this runs.
fn make_executable(bin_dir: &Path) {
    for entry in walkdir::WalkDir::new(bin_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        if let Err(e) = set_mode(entry.path(), EXEC_MODE) {
            warn!("chmod {}: {e}", entry.path().display());
        }
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
