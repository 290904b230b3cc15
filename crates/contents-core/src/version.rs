//! Version-code deduplication for new installs.

use contents_schema::ContentType;
use tracing::warn;

use crate::registry::RegistrySnapshot;

/// Effective version code for a package about to be installed.
///
/// When no profile of `content_type` is named `ver_name`, the declared code is
/// kept. Otherwise the code becomes one past the highest existing code, so a
/// repeated install never lands on an existing directory. The manifest inside
/// the package keeps its declared code.
pub fn next_version_code(
    ver_name: &str,
    content_type: ContentType,
    declared: u32,
    snapshot: &RegistrySnapshot,
) -> u32 {
    let existing_max = snapshot
        .profiles(content_type)
        .iter()
        .filter(|p| p.ver_name == ver_name)
        .map(|p| p.ver_code)
        .max();

    match existing_max {
        Some(max) => {
            let next = max.saturating_add(1);
            if next != declared {
                warn!(
                    "{content_type} {ver_name}: declared code {declared} already taken, installing as {next}"
                );
            }
            next
        }
        None => declared,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contents_schema::ContentProfile;

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
    fn test_unique_name_keeps_declared_code() {
        let snapshot = RegistrySnapshot::default();
        assert_eq!(next_version_code("foo", ContentType::Dxvk, 7, &snapshot), 7);
    }

    #[test]
    fn test_existing_name_increments_past_max() {
        let snapshot = RegistrySnapshot::from_profiles([
            profile(ContentType::Dxvk, "foo", 1),
            profile(ContentType::Dxvk, "foo", 4),
            profile(ContentType::Dxvk, "bar", 9),
        ]);
        assert_eq!(next_version_code("foo", ContentType::Dxvk, 1, &snapshot), 5);
        assert_eq!(next_version_code("bar", ContentType::Dxvk, 1, &snapshot), 10);
        assert_eq!(next_version_code("baz", ContentType::Dxvk, 1, &snapshot), 1);
    }

    #[test]
    fn test_other_types_are_ignored() {
        let snapshot = RegistrySnapshot::from_profiles([profile(ContentType::Wine, "wine-9.2", 3)]);
        assert_eq!(next_version_code("wine-9.2", ContentType::Proton, 0, &snapshot), 0);
    }
}
