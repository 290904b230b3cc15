//! Runtime identifier resolution.
//!
//! Containers store their runtime as a loose identifier such as
//! `proton-10.0-2-arm64ec`. Over time installs have been named in several
//! ways, so an identifier is matched against the registry through an ordered
//! list of lookup strategies before falling back to the runtimes bundled in
//! the image, and finally to the main runtime.

use std::sync::{Arc, LazyLock};

use contents_schema::{ContentProfile, RuntimeArch, RuntimeInfo, RuntimeKind};
use regex::Regex;
use tracing::debug;

use crate::paths::ContentsLayout;
use crate::registry::RegistrySnapshot;

static IDENTIFIER_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(wine|proton|Proton)-([0-9]+(?:\.[0-9]+)*)-?([0-9.]+)?-(x86|x86_64|arm64ec)$")
        .expect("identifier grammar is a valid regex")
});

/// Highest version code tried by the `capitalized` strategy.
const MAX_CAPITALIZED_CODE: u32 = 10;

/// What an identifier resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The runtime shipped with the image.
    Main,
    /// An installed or remotely announced profile.
    Profile(ContentProfile),
    /// A runtime bundled in the image under `opt/`.
    Bundled(RuntimeInfo),
}

struct LookupStrategy {
    name: &'static str,
    find: for<'a> fn(&'a RegistrySnapshot, &str) -> Option<&'a ContentProfile>,
}

static STRATEGIES: &[LookupStrategy] = &[
    LookupStrategy {
        name: "suffix-zero",
        find: suffix_zero,
    },
    LookupStrategy {
        name: "as-is",
        find: as_is,
    },
    LookupStrategy {
        name: "capitalized",
        find: capitalized,
    },
    LookupStrategy {
        name: "dots-to-dashes",
        find: dots_to_dashes,
    },
];

fn suffix_zero<'a>(snapshot: &'a RegistrySnapshot, id: &str) -> Option<&'a ContentProfile> {
    snapshot.get_profile_by_entry_name(&format!("{id}-0"))
}

fn as_is<'a>(snapshot: &'a RegistrySnapshot, id: &str) -> Option<&'a ContentProfile> {
    snapshot.get_profile_by_entry_name(id)
}

fn capitalized<'a>(snapshot: &'a RegistrySnapshot, id: &str) -> Option<&'a ContentProfile> {
    if !(id.starts_with("wine-") || id.starts_with("proton-")) {
        return None;
    }
    let capitalized = format!("{}{}", id[..1].to_uppercase(), &id[1..]);
    (0..=MAX_CAPITALIZED_CODE)
        .find_map(|code| snapshot.get_profile_by_entry_name(&format!("{capitalized}-{code}")))
}

fn dots_to_dashes<'a>(snapshot: &'a RegistrySnapshot, id: &str) -> Option<&'a ContentProfile> {
    if !id.contains('.') {
        return None;
    }
    let dashed = id.replace('.', "-");
    suffix_zero(snapshot, &dashed).or_else(|| as_is(snapshot, &dashed))
}

/// Parse an identifier against the runtime grammar.
///
/// ```
/// use contents_core::identifier::parse_identifier;
///
/// let info = parse_identifier("proton-10.0-2-arm64ec").unwrap();
/// assert_eq!(info.full_version(), "10.0-2");
/// assert!(parse_identifier("dxvk-2.3").is_none());
/// ```
pub fn parse_identifier(identifier: &str) -> Option<RuntimeInfo> {
    let caps = IDENTIFIER_GRAMMAR.captures(identifier)?;
    let kind: RuntimeKind = caps[1].parse().ok()?;
    let arch: RuntimeArch = caps[4].parse().ok()?;
    let subversion = caps.get(3).map(|m| m.as_str().to_string());
    Some(RuntimeInfo::new(kind, &caps[2], subversion, arch))
}

/// Resolves runtime identifiers against one registry snapshot.
#[derive(Debug, Clone)]
pub struct IdentifierResolver {
    snapshot: Arc<RegistrySnapshot>,
    layout: ContentsLayout,
    bundled: Vec<String>,
}

impl IdentifierResolver {
    /// Resolver over `snapshot`, with `bundled` naming the runtimes shipped
    /// under `imagefs/opt`.
    pub fn new<S: Into<String>>(
        snapshot: Arc<RegistrySnapshot>,
        layout: ContentsLayout,
        bundled: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            snapshot,
            layout,
            bundled: bundled.into_iter().map(Into::into).collect(),
        }
    }

    /// Names of the lookup strategies, in the order they are tried.
    pub fn strategy_names() -> impl Iterator<Item = &'static str> {
        STRATEGIES.iter().map(|s| s.name)
    }

    /// First profile any strategy finds for `identifier`.
    pub fn find_profile(&self, identifier: &str) -> Option<&ContentProfile> {
        STRATEGIES.iter().find_map(|strategy| {
            let found = (strategy.find)(&self.snapshot, identifier)?;
            debug!(
                "'{identifier}' matched {} via {}",
                found.entry_name(),
                strategy.name
            );
            Some(found)
        })
    }

    /// Resolve `identifier`. Never fails: anything unknown is [`Resolution::Main`].
    pub fn resolve(&self, identifier: &str) -> Resolution {
        if identifier == RuntimeInfo::main().identifier() {
            return Resolution::Main;
        }
        if let Some(profile) = self.find_profile(identifier) {
            return Resolution::Profile(profile.clone());
        }
        if let Some(info) = parse_identifier(identifier)
            && self.bundled.iter().any(|b| b.contains(identifier))
        {
            let path = self.layout.imagefs_dir().join("opt").join(identifier);
            debug!("'{identifier}' is bundled at {}", path.display());
            return Resolution::Bundled(info.with_path(path));
        }
        debug!("'{identifier}' not found, using main runtime");
        Resolution::Main
    }

    /// The runtime a container configured with `identifier` runs.
    ///
    /// An installed Wine/Proton profile contributes its install directory and
    /// library path; version and arch always come from the identifier itself.
    pub fn resolve_runtime(&self, identifier: &str) -> RuntimeInfo {
        let Some(info) = parse_identifier(identifier) else {
            return RuntimeInfo::main();
        };
        match self.resolve(identifier) {
            Resolution::Main => RuntimeInfo::main(),
            Resolution::Bundled(bundled) => bundled,
            Resolution::Profile(profile) if profile.content_type.is_runtime() => {
                let mut info = info.with_path(self.layout.install_dir(&profile));
                info.lib_path = profile.runtime.map(|r| r.lib_path);
                info
            }
            Resolution::Profile(_) => info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contents_schema::{ContentType, RuntimeLayout};

    fn profile(content_type: ContentType, ver_name: &str, ver_code: u32) -> ContentProfile {
        ContentProfile {
            content_type,
            ver_name: ver_name.to_string(),
            ver_code,
            desc: String::new(),
            files: vec![],
            runtime: Some(RuntimeLayout {
                bin_path: "bin".to_string(),
                lib_path: "lib".to_string(),
                prefix_pack: "prefixPack.txz".to_string(),
            }),
            remote_url: None,
        }
    }

    fn resolver(profiles: Vec<ContentProfile>, bundled: &[&str]) -> IdentifierResolver {
        IdentifierResolver::new(
            Arc::new(RegistrySnapshot::from_profiles(profiles)),
            ContentsLayout::new("/files"),
            bundled.iter().copied(),
        )
    }

    #[test]
    fn test_strategy_order() {
        let names: Vec<_> = IdentifierResolver::strategy_names().collect();
        assert_eq!(names, ["suffix-zero", "as-is", "capitalized", "dots-to-dashes"]);
    }

    #[test]
    fn test_main_short_circuits() {
        let r = resolver(vec![profile(ContentType::Wine, "wine-9.2-x86_64", 0)], &[]);
        assert_eq!(r.resolve("wine-9.2-x86_64"), Resolution::Main);
    }

    #[test]
    fn test_unresolvable_is_main() {
        let r = resolver(vec![], &[]);
        for id in ["", "garbage", "wine-", "-", "proton-10-arm64ec", "dxvk-2.3-1"] {
            assert_eq!(r.resolve(id), Resolution::Main, "{id}");
            assert!(r.resolve_runtime(id).is_main(), "{id}");
        }
    }

    #[test]
    fn test_suffix_zero_before_as_is() {
        let zero = profile(ContentType::Proton, "proton-10-arm64ec", 0);
        let r = resolver(vec![zero.clone()], &[]);
        assert_eq!(r.resolve("proton-10-arm64ec"), Resolution::Profile(zero));
    }

    #[test]
    fn test_entry_name_resolves_to_profile() {
        let p = profile(ContentType::Wine, "wine-9.2", 3);
        let r = resolver(vec![p.clone()], &[]);
        assert_eq!(r.resolve(&p.entry_name()), Resolution::Profile(p));
    }

    #[test]
    fn test_capitalized_names() {
        let p = profile(ContentType::Proton, "Proton-9.0-x86_64", 4);
        let r = resolver(vec![p.clone()], &[]);
        assert_eq!(r.resolve("proton-9.0-x86_64"), Resolution::Profile(p));
    }

    #[test]
    fn test_dots_to_dashes() {
        let p = profile(ContentType::Wine, "wine-10-0-arm64ec", 0);
        let r = resolver(vec![p.clone()], &[]);
        assert_eq!(r.resolve("wine-10.0-arm64ec"), Resolution::Profile(p));
    }

    #[test]
    fn test_bundled_runtime() {
        let r = resolver(vec![], &["proton-9.0-arm64ec", "wine-10.0-x86_64"]);
        let Resolution::Bundled(info) = r.resolve("proton-9.0-arm64ec") else {
            panic!("expected bundled runtime");
        };
        assert_eq!(
            info.path.as_deref(),
            Some(std::path::Path::new("/files/imagefs/opt/proton-9.0-arm64ec"))
        );
        assert_eq!(info.arch, RuntimeArch::Arm64ec);
        // Must match the grammar as well.
        let r = resolver(vec![], &["custom-build"]);
        assert_eq!(r.resolve("custom-build"), Resolution::Main);
    }

    #[test]
    fn test_resolve_runtime_uses_install_dir() {
        let p = profile(ContentType::Proton, "proton-10.0-2-arm64ec", 0);
        let r = resolver(vec![p], &[]);
        let info = r.resolve_runtime("proton-10.0-2-arm64ec");
        assert_eq!(info.kind, RuntimeKind::Proton);
        assert_eq!(info.full_version(), "10.0-2");
        assert_eq!(
            info.path.as_deref(),
            Some(std::path::Path::new(
                "/files/imagefs/opt/proton-10.0-2-arm64ec-0"
            ))
        );
        assert_eq!(info.lib_path.as_deref(), Some("lib"));
        assert_eq!(info.to_string(), "Proton 10.0-2");
    }

    #[test]
    fn test_grammar() {
        assert!(parse_identifier("Proton-9.0-x86_64").is_some());
        assert!(parse_identifier("wine-9.2-x86").is_some());
        assert!(parse_identifier("wine-9.2-arm64").is_none());
        assert!(parse_identifier("WINE-9.2-x86").is_none());
        let info = parse_identifier("wine-9.2-x86_64").unwrap();
        assert!(info.subversion.is_none());
        assert!(info.is_main());
    }
}
