//! Per-type allow-lists of system paths a package may overlay.
//!
//! Containment (see [`crate::install`]) only proves a target stays inside the
//! sandbox. Whether a type may replace a particular live file is a separate,
//! advisory question answered here.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use contents_schema::{ContentFile, ContentProfile, ContentType};

use crate::paths::normalize;
use crate::template::PathTemplateResolver;

/// Resolved allow-lists for every content type.
#[derive(Debug, Clone)]
pub struct TrustCatalog {
    trusted: HashMap<ContentType, HashSet<PathBuf>>,
}

impl TrustCatalog {
    /// Resolve every type's trust templates through `resolver`.
    pub fn new(resolver: &PathTemplateResolver) -> Self {
        let trusted = ContentType::ALL
            .into_iter()
            .map(|content_type| {
                let paths = content_type
                    .trust_templates()
                    .iter()
                    .filter_map(|template| normalize(&resolver.resolve(template)).ok())
                    .collect();
                (content_type, paths)
            })
            .collect();
        Self { trusted }
    }

    /// Returns `true` when `content_type` may overlay `resolved_path`.
    pub fn is_trusted(&self, content_type: ContentType, resolved_path: &Path) -> bool {
        let Ok(path) = normalize(resolved_path) else {
            return false;
        };
        self.trusted
            .get(&content_type)
            .is_some_and(|paths| paths.contains(&path))
    }

    /// Files of `profile` whose resolved target is not on its type's list.
    pub fn untrusted_files<'a>(
        &self,
        resolver: &PathTemplateResolver,
        profile: &'a ContentProfile,
    ) -> Vec<&'a ContentFile> {
        profile
            .files
            .iter()
            .filter(|file| !self.is_trusted(profile.content_type, &resolver.resolve(&file.target)))
            .collect()
    }

    /// Number of trusted paths for `content_type`.
    pub fn len(&self, content_type: ContentType) -> usize {
        self.trusted.get(&content_type).map_or(0, HashSet::len)
    }
}
