//! Content profiles: the parsed form of a package manifest.

use serde::{Deserialize, Serialize};

use crate::content_type::{ContentType, UnknownContentType};

/// A single payload file declared by a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFile {
    /// Path relative to the archive root.
    pub source: String,
    /// Destination path, may contain placeholder tokens such as `${system32}`.
    pub target: String,
}

/// Paths a Wine/Proton package declares relative to its own root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeLayout {
    /// Directory holding the runtime's executables.
    pub bin_path: String,
    /// Directory holding the runtime's libraries.
    pub lib_path: String,
    /// Archive used to seed a fresh prefix.
    pub prefix_pack: String,
}

/// Parsed description of one installable package version.
///
/// The identity of a profile is `(content_type, ver_name, ver_code)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentProfile {
    /// Category of the package.
    pub content_type: ContentType,
    /// Version name; always type-prefixed for the runtime family.
    pub ver_name: String,
    /// Version code, unique per `ver_name` once installed.
    pub ver_code: u32,
    /// Human readable description.
    pub desc: String,
    /// Payload files in manifest order.
    pub files: Vec<ContentFile>,
    /// Runtime paths; only ever set for Wine/Proton.
    pub runtime: Option<RuntimeLayout>,
    /// Download location for profiles that are only known from a remote catalog.
    pub remote_url: Option<String>,
}

impl ContentProfile {
    /// Directory name of the installed package: `<verName>-<verCode>`.
    pub fn install_dir_name(&self) -> String {
        format!("{}-{}", self.ver_name, self.ver_code)
    }

    /// Stable external key: `<type>-<verName>-<verCode>`.
    ///
    /// ```
    /// use contents_schema::{ContentProfile, ContentType};
    ///
    /// let profile = ContentProfile {
    ///     content_type: ContentType::Wine,
    ///     ver_name: "wine-9.2".to_string(),
    ///     ver_code: 1,
    ///     desc: String::new(),
    ///     files: vec![],
    ///     runtime: None,
    ///     remote_url: None,
    /// };
    /// assert_eq!(profile.entry_name(), "wine-wine-9.2-1");
    /// ```
    pub fn entry_name(&self) -> String {
        format!("{}-{}-{}", self.content_type, self.ver_name, self.ver_code)
    }

    /// Returns `true` when the profile is a catalog stub that is not installed.
    pub fn is_remote(&self) -> bool {
        self.remote_url.is_some()
    }

    /// Returns `true` when `other` has the same `(ver_name, ver_code)`.
    pub fn same_version(&self, other: &ContentProfile) -> bool {
        self.ver_name == other.ver_name && self.ver_code == other.ver_code
    }
}

/// One record of the remote content catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProfile {
    /// Where the archive can be downloaded from.
    pub remote_url: String,
    /// Content type name as published.
    #[serde(rename = "type")]
    pub content_type: String,
    /// Version name as published.
    pub ver_name: String,
    /// Version code as published.
    pub ver_code: u32,
}

impl TryFrom<RemoteProfile> for ContentProfile {
    type Error = UnknownContentType;

    fn try_from(remote: RemoteProfile) -> Result<Self, Self::Error> {
        Ok(Self {
            content_type: remote.content_type.parse()?,
            ver_name: remote.ver_name,
            ver_code: remote.ver_code,
            desc: String::new(),
            files: Vec::new(),
            runtime: None,
            remote_url: Some(remote.remote_url),
        })
    }
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
    fn test_names() {
        let p = profile(ContentType::Proton, "proton-10", 0);
        assert_eq!(p.install_dir_name(), "proton-10-0");
        assert_eq!(p.entry_name(), "proton-proton-10-0");

        let d = profile(ContentType::Dxvk, "2.3.1", 2);
        assert_eq!(d.entry_name(), "dxvk-2.3.1-2");
    }

    #[test]
    fn test_remote_record_conversion() {
        let json = r#"{"remoteUrl":"https://example.com/dxvk.tzst","type":"dxvk","verName":"2.3","verCode":1}"#;
        let remote: RemoteProfile = serde_json::from_str(json).unwrap();
        let p = ContentProfile::try_from(remote).unwrap();
        assert_eq!(p.content_type, ContentType::Dxvk);
        assert!(p.is_remote());
        assert!(p.same_version(&profile(ContentType::Dxvk, "2.3", 1)));
    }

    #[test]
    fn test_remote_record_unknown_type() {
        let remote = RemoteProfile {
            remote_url: String::new(),
            content_type: "Turnip".to_string(),
            ver_name: "1".to_string(),
            ver_code: 0,
        };
        assert!(ContentProfile::try_from(remote).is_err());
    }
}
