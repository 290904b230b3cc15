//! `profile.json` parsing.
//!
//! A manifest declares the package identity and its payload:
//!
//! ```json
//! {
//!   "type": "proton",
//!   "versionName": "10.0-arm64ec",
//!   "versionCode": 0,
//!   "description": "Proton 10 for ARM64EC",
//!   "files": [],
//!   "proton": { "binPath": "bin", "libPath": "lib", "prefixPack": "prefixPack.txz" }
//! }
//! ```
//!
//! The short keys `verName`, `verCode` and `desc` are accepted as well.
//! Wine and Proton packages may use either a `proton` or a `wine` block; the
//! `proton` block wins when both are present.

use std::path::Path;

use contents_schema::{ContentFile, ContentProfile, ContentType, RuntimeLayout};
use serde::Deserialize;
use thiserror::Error;

/// The manifest could not be turned into a profile.
///
/// Deliberately opaque: the message is for logs only and callers cannot tell a
/// missing field from a wrong type.
#[derive(Error, Debug)]
#[error("Invalid manifest: {0}")]
pub struct ManifestError(String);

#[derive(Deserialize)]
struct RawProfile {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(rename = "versionName", alias = "verName")]
    ver_name: String,
    #[serde(rename = "versionCode", alias = "verCode")]
    ver_code: u32,
    #[serde(rename = "description", alias = "desc")]
    desc: String,
    files: Vec<ContentFile>,
    #[serde(default)]
    proton: Option<serde_json::Value>,
    #[serde(default)]
    wine: Option<serde_json::Value>,
}

/// Parse a manifest document.
///
/// # Errors
///
/// Returns [`ManifestError`] when the document is not valid JSON, a required
/// field is missing or mistyped, the type name is unknown, or a runtime block
/// is present but malformed.
pub fn parse(document: &str) -> Result<ContentProfile, ManifestError> {
    let raw: RawProfile =
        serde_json::from_str(document).map_err(|e| ManifestError(e.to_string()))?;

    let content_type: ContentType = raw
        .type_name
        .parse()
        .map_err(|e: contents_schema::UnknownContentType| ManifestError(e.to_string()))?;

    let runtime = if content_type.is_runtime() {
        match raw.proton.or(raw.wine) {
            Some(block) => Some(
                serde_json::from_value::<RuntimeLayout>(block)
                    .map_err(|e| ManifestError(format!("runtime block: {e}")))?,
            ),
            None => None,
        }
    } else {
        None
    };

    Ok(ContentProfile {
        ver_name: normalize_ver_name(content_type, raw.ver_name),
        content_type,
        ver_code: raw.ver_code,
        desc: raw.desc,
        files: raw.files,
        runtime,
        remote_url: None,
    })
}

/// Read and parse the manifest at `path`.
///
/// # Errors
///
/// Returns [`ManifestError`] if the file cannot be read or does not parse.
pub fn parse_file(path: &Path) -> Result<ContentProfile, ManifestError> {
    let document = std::fs::read_to_string(path)
        .map_err(|e| ManifestError(format!("{}: {e}", path.display())))?;
    parse(&document)
}

/// Rewrite the version code stored in the manifest at `path`.
///
/// The key already in use (`versionCode` or its `verCode` alias) is updated;
/// every other field is kept.
///
/// # Errors
///
/// Returns [`ManifestError`] if the file cannot be read, is not a JSON object,
/// or cannot be written back.
pub fn write_version_code(path: &Path, ver_code: u32) -> Result<(), ManifestError> {
    let document = std::fs::read_to_string(path)
        .map_err(|e| ManifestError(format!("{}: {e}", path.display())))?;
    let mut value: serde_json::Value =
        serde_json::from_str(&document).map_err(|e| ManifestError(e.to_string()))?;
    let Some(object) = value.as_object_mut() else {
        return Err(ManifestError("not a JSON object".to_string()));
    };

    let key = if !object.contains_key("versionCode") && object.contains_key("verCode") {
        "verCode"
    } else {
        "versionCode"
    };
    object.insert(key.to_string(), ver_code.into());

    let document =
        serde_json::to_string_pretty(&value).map_err(|e| ManifestError(e.to_string()))?;
    std::fs::write(path, document).map_err(|e| ManifestError(format!("{}: {e}", path.display())))
}

/// Runtime names always carry their type so identifiers stay unambiguous
/// between Wine and Proton builds of the same version.
fn normalize_ver_name(content_type: ContentType, ver_name: String) -> String {
    if content_type.is_runtime() && !ver_name.to_lowercase().starts_with(content_type.as_str()) {
        format!("{content_type}-{ver_name}")
    } else {
        ver_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DXVK_PROFILE: &str = r#"
{
  "type": "dxvk",
  "versionName": "2.3.1",
  "versionCode": 2,
  "description": "DXVK 2.3.1",
  "files": [
    { "source": "x64/d3d11.dll", "target": "${system32}/d3d11.dll" },
    { "source": "x32/d3d11.dll", "target": "${syswow64}/d3d11.dll" }
  ],
  "wine": "ignored for non-runtime types"
}
"#;

    #[test]
    fn test_parse_translation_layer() {
        let profile = parse(DXVK_PROFILE).unwrap();
        assert_eq!(profile.content_type, ContentType::Dxvk);
        assert_eq!(profile.ver_name, "2.3.1");
        assert_eq!(profile.ver_code, 2);
        assert_eq!(profile.files.len(), 2);
        assert_eq!(profile.files[1].target, "${syswow64}/d3d11.dll");
        assert!(profile.runtime.is_none());
    }

    #[test]
    fn test_write_version_code_keeps_alias_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        std::fs::write(
            &path,
            r#"{"type":"wine","verName":"9.2","verCode":1,"desc":"x","files":[]}"#,
        )
        .unwrap();

        write_version_code(&path, 3).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["verCode"], 3);
        assert!(value.get("versionCode").is_none());

        let profile = parse_file(&path).unwrap();
        assert_eq!(profile.ver_code, 3);
        assert_eq!(profile.ver_name, "wine-9.2");
        assert_eq!(profile.desc, "x");
    }

    #[test]
    fn test_write_version_code_rejects_non_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(write_version_code(&path, 1).is_err());
        assert!(write_version_code(&dir.path().join("missing.json"), 1).is_err());
    }

    #[test]
    fn test_wine_name_is_prefixed() {
        let doc = r#"{"type":"wine","verName":"9.2","verCode":1,"desc":"","files":[]}"#;
        let profile = parse(doc).unwrap();
        assert_eq!(profile.ver_name, "wine-9.2");
        assert_eq!(profile.entry_name(), "wine-wine-9.2-1");
    }

    #[test]
    fn test_prefixed_name_is_not_doubled() {
        let doc = r#"{"type":"wine","verName":"wine-9.2","verCode":1,"desc":"","files":[]}"#;
        assert_eq!(parse(doc).unwrap().ver_name, "wine-9.2");

        let doc = r#"{"type":"proton","verName":"Proton-10","verCode":0,"desc":"","files":[]}"#;
        assert_eq!(parse(doc).unwrap().ver_name, "Proton-10");
    }

    #[test]
    fn test_proton_block_preferred_over_wine() {
        let doc = r#"{
            "type": "wine", "verName": "9.2", "verCode": 0, "desc": "", "files": [],
            "wine":   { "binPath": "wbin", "libPath": "wlib", "prefixPack": "w.txz" },
            "proton": { "binPath": "bin",  "libPath": "lib",  "prefixPack": "p.txz" }
        }"#;
        let runtime = parse(doc).unwrap().runtime.unwrap();
        assert_eq!(runtime.bin_path, "bin");
        assert_eq!(runtime.prefix_pack, "p.txz");
    }

    #[test]
    fn test_wine_block_fallback_and_absence() {
        let doc = r#"{
            "type": "proton", "verName": "10", "verCode": 0, "desc": "", "files": [],
            "wine": { "binPath": "bin", "libPath": "lib", "prefixPack": "prefixPack.txz" }
        }"#;
        let profile = parse(doc).unwrap();
        assert_eq!(profile.ver_name, "proton-10");
        assert_eq!(profile.runtime.unwrap().lib_path, "lib");

        let doc = r#"{"type":"proton","verName":"10","verCode":0,"desc":"","files":[]}"#;
        assert!(parse(doc).unwrap().runtime.is_none());
    }

    #[test]
    fn test_malformed_runtime_block_fails() {
        let doc = r#"{
            "type": "wine", "verName": "9.2", "verCode": 0, "desc": "", "files": [],
            "proton": { "binPath": "bin" }
        }"#;
        assert!(parse(doc).is_err());
    }

    #[test]
    fn test_required_fields() {
        let cases = [
            r#"{"verName":"1","verCode":0,"desc":"","files":[]}"#,
            r#"{"type":"dxvk","verCode":0,"desc":"","files":[]}"#,
            r#"{"type":"dxvk","verName":"1","desc":"","files":[]}"#,
            r#"{"type":"dxvk","verName":"1","verCode":0,"files":[]}"#,
            r#"{"type":"dxvk","verName":"1","verCode":0,"desc":""}"#,
            r#"{"type":"dxvk","verName":"1","verCode":"zero","desc":"","files":[]}"#,
            r#"{"type":"dxvk","verName":"1","verCode":0,"desc":"","files":[{"source":"a"}]}"#,
            r#"{"type":"DXVK","verName":"1","verCode":0,"desc":"","files":[]}"#,
            "not json",
        ];
        for doc in cases {
            assert!(parse(doc).is_err(), "{doc}");
        }
    }
}
