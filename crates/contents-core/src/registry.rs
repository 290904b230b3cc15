//! In-memory index of installed and remotely announced content.
//!
//! The registry is rebuilt as a whole and published as an immutable
//! [`RegistrySnapshot`] behind an `Arc`, so readers holding a snapshot never
//! see a half-finished scan.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use contents_schema::{ContentProfile, ContentType, PROFILE_NAME, RemoteProfile};
use thiserror::Error;
use tracing::{debug, warn};

use crate::manifest;
use crate::paths::ContentsLayout;

/// Errors raised while mutating installed content.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// An I/O error occurred while deleting an install directory.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The profile is not part of the current snapshot.
    #[error("Not installed: {0}")]
    NotInstalled(String),
}

/// One consistent view of every known profile, grouped by type.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    profiles: HashMap<ContentType, Vec<ContentProfile>>,
}

impl RegistrySnapshot {
    /// Build a snapshot from already collected profiles.
    pub fn from_profiles(profiles: impl IntoIterator<Item = ContentProfile>) -> Self {
        let mut map: HashMap<ContentType, Vec<ContentProfile>> = HashMap::new();
        for profile in profiles {
            map.entry(profile.content_type).or_default().push(profile);
        }
        Self { profiles: map }
    }

    /// Profiles of one type in scan order, local entries before remote ones.
    pub fn profiles(&self, content_type: ContentType) -> &[ContentProfile] {
        self.profiles.get(&content_type).map_or(&[], Vec::as_slice)
    }

    /// Every profile, grouped in [`ContentType::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = &ContentProfile> {
        ContentType::ALL
            .into_iter()
            .flat_map(|t| self.profiles(t).iter())
    }

    /// Returns `true` when `profile` is part of this snapshot.
    pub fn contains(&self, profile: &ContentProfile) -> bool {
        self.profiles(profile.content_type).contains(profile)
    }

    /// Look a profile up by its entry name (`<type>-<verName>-<verCode>`).
    ///
    /// The name is split on the last dash to isolate the version code. The
    /// type comes from a `wine-`/`proton-` prefix or, failing that, the first
    /// dash-separated token. Since runtime names already embed their type,
    /// both `<verName>` and `<type>-<verName>` are accepted as the name part,
    /// compared case-insensitively. As a last resort the name part is matched
    /// exactly against the Wine, then Proton, version names.
    pub fn get_profile_by_entry_name(&self, entry_name: &str) -> Option<&ContentProfile> {
        let (name, code) = entry_name.rsplit_once('-')?;
        let Ok(code) = code.parse::<u32>() else {
            debug!("Entry '{entry_name}' has no numeric version code");
            return None;
        };

        if let Some(content_type) = detect_type(name) {
            let found = self.profiles(content_type).iter().find(|p| {
                p.ver_code == code
                    && (name.eq_ignore_ascii_case(&p.ver_name)
                        || name.eq_ignore_ascii_case(&format!("{content_type}-{}", p.ver_name)))
            });
            if found.is_some() {
                return found;
            }
        }

        [ContentType::Wine, ContentType::Proton]
            .into_iter()
            .flat_map(|t| self.profiles(t).iter())
            .find(|p| p.ver_code == code && p.ver_name == name)
    }
}

fn detect_type(name: &str) -> Option<ContentType> {
    let lower = name.to_lowercase();
    if lower.starts_with("proton-") || lower == "proton" {
        Some(ContentType::Proton)
    } else if lower.starts_with("wine-") || lower == "wine" {
        Some(ContentType::Wine)
    } else {
        name.split_once('-')
            .and_then(|(head, _)| ContentType::from_name_ignore_case(head))
    }
}

/// Owner of the registry: rebuilds snapshots from disk and the remote catalog.
#[derive(Debug)]
pub struct Registry {
    layout: ContentsLayout,
    remote: Vec<ContentProfile>,
    snapshot: Arc<RegistrySnapshot>,
}

impl Registry {
    /// An empty registry; call [`Registry::sync`] to populate it.
    pub fn new(layout: ContentsLayout) -> Self {
        Self {
            layout,
            remote: Vec::new(),
            snapshot: Arc::new(RegistrySnapshot::default()),
        }
    }

    /// Directory layout the registry scans.
    pub fn layout(&self) -> &ContentsLayout {
        &self.layout
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Replace the remote catalog with the records in `json` and resync.
    ///
    /// Malformed records are skipped; a document that is not an array leaves
    /// the catalog empty.
    pub fn set_remote_profiles(&mut self, json: &str) {
        self.remote = parse_remote_catalog(json);
        self.sync();
    }

    /// Rebuild the snapshot from disk plus the remote catalog.
    pub fn sync(&mut self) {
        let mut profiles = Vec::new();
        for content_type in ContentType::ALL {
            let mut local = scan_type_dir(&self.layout.content_type_dir(content_type), content_type);
            let remote = self
                .remote
                .iter()
                .filter(|r| r.content_type == content_type)
                .filter(|r| !local.iter().any(|p| p.same_version(r)))
                .cloned()
                .collect::<Vec<_>>();
            local.extend(remote);
            profiles.extend(local);
        }
        let snapshot = RegistrySnapshot::from_profiles(profiles);
        debug!("Registry synced: {} profiles", snapshot.iter().count());
        self.snapshot = Arc::new(snapshot);
    }

    /// Delete an installed profile and resync.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotInstalled`] when the profile is unknown or
    /// only announced remotely, or an I/O error if deletion fails.
    pub fn remove_content(&mut self, profile: &ContentProfile) -> Result<(), RegistryError> {
        if !self.snapshot.contains(profile) || profile.is_remote() {
            return Err(RegistryError::NotInstalled(profile.entry_name()));
        }
        let dir = self.layout.install_dir(profile);
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
        }
        debug!("Removed {}", dir.display());
        self.sync();
        Ok(())
    }
}

fn scan_type_dir(dir: &Path, content_type: ContentType) -> Vec<ContentProfile> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut children: Vec<_> = entries.filter_map(Result::ok).map(|e| e.path()).collect();
    children.sort();

    children
        .into_iter()
        .filter_map(|dir| {
            let profile_path = dir.join(PROFILE_NAME);
            if !profile_path.is_file() {
                return None;
            }
            match manifest::parse_file(&profile_path) {
                Ok(profile) if profile.content_type == content_type => Some(profile),
                Ok(_) => None,
                Err(e) => {
                    warn!("Skipping {}: {e}", profile_path.display());
                    None
                }
            }
        })
        .collect()
}

fn parse_remote_catalog(json: &str) -> Vec<ContentProfile> {
    let records: Vec<serde_json::Value> = match serde_json::from_str(json) {
        Ok(records) => records,
        Err(e) => {
            warn!("Remote catalog is not a JSON array: {e}");
            return Vec::new();
        }
    };
    records
        .into_iter()
        .filter_map(|record| {
            let parsed = serde_json::from_value::<RemoteProfile>(record)
                .map_err(|e| e.to_string())
                .and_then(|r| ContentProfile::try_from(r).map_err(|e| e.to_string()));
            match parsed {
                Ok(profile) => Some(profile),
                Err(e) => {
                    warn!("Skipping remote record: {e}");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(content_type: ContentType, ver_name: &str, ver_code: u32) -> ContentProfile {
        ContentProfile {
            content_type,
            ver_name: ver_name.to_string(),
            ver_code,
            desc: String::new(),
            files: vec![],
            runtime: None,
            remote_url: None,
        }
    }

    #[test]
    fn test_entry_name_round_trip() {
        let profiles = vec![
            profile(ContentType::Wine, "wine-9.2", 1),
            profile(ContentType::Proton, "proton-10-arm64ec", 0),
            profile(ContentType::Dxvk, "2.3.1", 2),
        ];
        let snapshot = RegistrySnapshot::from_profiles(profiles.clone());
        for p in &profiles {
            assert_eq!(snapshot.get_profile_by_entry_name(&p.entry_name()), Some(p));
        }
    }

    #[test]
    fn test_entry_name_without_type_prefix() {
        let snapshot =
            RegistrySnapshot::from_profiles([profile(ContentType::Proton, "proton-10-arm64ec", 0)]);
        let found = snapshot.get_profile_by_entry_name("proton-10-arm64ec-0").unwrap();
        assert_eq!(found.ver_name, "proton-10-arm64ec");
        assert!(snapshot.get_profile_by_entry_name("PROTON-10-arm64ec-0").is_some());
    }

    #[test]
    fn test_entry_name_rejects_bad_codes() {
        let snapshot = RegistrySnapshot::from_profiles([profile(ContentType::Wine, "wine-9.2", 1)]);
        assert!(snapshot.get_profile_by_entry_name("wine-9.2").is_none());
        assert!(snapshot.get_profile_by_entry_name("wine-9.2-x").is_none());
        assert!(snapshot.get_profile_by_entry_name("nodash").is_none());
        assert!(snapshot.get_profile_by_entry_name("").is_none());
    }

    #[test]
    fn test_remote_catalog_skips_bad_records() {
        let json = r#"[
            {"remoteUrl":"u1","type":"dxvk","verName":"2.3","verCode":1},
            {"remoteUrl":"u2","type":"nope","verName":"1","verCode":0},
            {"type":"dxvk","verName":"2.4","verCode":0},
            {"remoteUrl":"u3","type":"box64","verName":"0.3","verCode":"x"}
        ]"#;
        let remote = parse_remote_catalog(json);
        assert_eq!(remote.len(), 1);
        assert_eq!(remote[0].remote_url.as_deref(), Some("u1"));
        assert!(parse_remote_catalog("{}").is_empty());
    }
}
