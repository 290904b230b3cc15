//! Closed set of installable content types.
//!
//! Every variant carries its own manifest name (which doubles as the name of
//! its install directory) and the placeholder paths it is allowed to overlay.

use serde::{Deserialize, Serialize};

const TURNIP_TRUST_FILES: &[&str] = &[
    "${libdir}/libvulkan_freedreno.so",
    "${libdir}/libvulkan.so.1",
    "${sharedir}/vulkan/icd.d/freedreno_icd.aarch64.json",
    "${libdir}/libGL.so.1",
    "${libdir}/libglapi.so.0",
];

const VORTEK_TRUST_FILES: &[&str] = &[
    "${libdir}/libvulkan_vortek.so",
    "${libdir}/libvulkan_freedreno.so",
    "${sharedir}/vulkan/icd.d/vortek_icd.aarch64.json",
];

const VIRGL_TRUST_FILES: &[&str] = &["${libdir}/libGL.so.1", "${libdir}/libglapi.so.0"];

const DXVK_TRUST_FILES: &[&str] = &[
    "${system32}/d3d8.dll",
    "${system32}/d3d9.dll",
    "${system32}/d3d10.dll",
    "${system32}/d3d10_1.dll",
    "${system32}/d3d10core.dll",
    "${system32}/d3d11.dll",
    "${system32}/dxgi.dll",
    "${syswow64}/d3d8.dll",
    "${syswow64}/d3d9.dll",
    "${syswow64}/d3d10.dll",
    "${syswow64}/d3d10_1.dll",
    "${syswow64}/d3d10core.dll",
    "${syswow64}/d3d11.dll",
    "${syswow64}/dxgi.dll",
];

const VKD3D_TRUST_FILES: &[&str] = &[
    "${system32}/d3d12core.dll",
    "${system32}/d3d12.dll",
    "${syswow64}/d3d12core.dll",
    "${syswow64}/d3d12.dll",
];

const BOX64_TRUST_FILES: &[&str] = &["${localbin}/box64", "${bindir}/box64"];

const WOWBOX64_TRUST_FILES: &[&str] = &["${system32}/wowbox64.dll"];

const FEXCORE_TRUST_FILES: &[&str] = &[
    "${system32}/libwow64fex.dll",
    "${system32}/libarm64ecfex.dll",
];

/// Category of an installable content package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Wine runtime.
    Wine,
    /// Proton runtime; shares manifest keys with Wine.
    Proton,
    /// Turnip (freedreno) Vulkan driver.
    Turnip,
    /// Vortek Vulkan driver.
    Vortek,
    /// VirGL OpenGL driver.
    Virgl,
    /// DXVK Direct3D 8-11 translation layer.
    Dxvk,
    /// VKD3D Direct3D 12 translation layer.
    Vkd3d,
    /// Box64 x86-64 emulator.
    Box64,
    /// Box64 as a WoW64 DLL.
    Wowbox64,
    /// FEX-Emu core DLLs.
    Fexcore,
}

impl ContentType {
    /// Every content type, in registry order.
    pub const ALL: [ContentType; 10] = [
        Self::Wine,
        Self::Proton,
        Self::Turnip,
        Self::Vortek,
        Self::Virgl,
        Self::Dxvk,
        Self::Vkd3d,
        Self::Box64,
        Self::Wowbox64,
        Self::Fexcore,
    ];

    /// Manifest name of the type, also used as its directory name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wine => "wine",
            Self::Proton => "proton",
            Self::Turnip => "turnip",
            Self::Vortek => "vortek",
            Self::Virgl => "virgl",
            Self::Dxvk => "dxvk",
            Self::Vkd3d => "vkd3d",
            Self::Box64 => "box64",
            Self::Wowbox64 => "wowbox64",
            Self::Fexcore => "fexcore",
        }
    }

    /// Name of the directory this type is installed under.
    pub fn dir_name(&self) -> &'static str {
        self.as_str()
    }

    /// Templated paths this type may overlay. Empty for the runtime family.
    pub fn trust_templates(&self) -> &'static [&'static str] {
        match self {
            Self::Wine | Self::Proton => &[],
            Self::Turnip => TURNIP_TRUST_FILES,
            Self::Vortek => VORTEK_TRUST_FILES,
            Self::Virgl => VIRGL_TRUST_FILES,
            Self::Dxvk => DXVK_TRUST_FILES,
            Self::Vkd3d => VKD3D_TRUST_FILES,
            Self::Box64 => BOX64_TRUST_FILES,
            Self::Wowbox64 => WOWBOX64_TRUST_FILES,
            Self::Fexcore => FEXCORE_TRUST_FILES,
        }
    }

    /// Returns `true` for Wine and Proton.
    pub fn is_runtime(&self) -> bool {
        matches!(self, Self::Wine | Self::Proton)
    }

    /// Case-insensitive lookup, used when matching loosely formatted
    /// identifiers rather than manifests.
    pub fn from_name_ignore_case(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a name is not one of the known content types.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown content type: {0}")]
pub struct UnknownContentType(pub String);

impl std::str::FromStr for ContentType {
    type Err = UnknownContentType;

    /// Exact, case-sensitive match against the manifest names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownContentType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_is_case_sensitive() {
        assert_eq!("dxvk".parse::<ContentType>(), Ok(ContentType::Dxvk));
        assert!("DXVK".parse::<ContentType>().is_err());
        assert_eq!(
            ContentType::from_name_ignore_case("DXVK"),
            Some(ContentType::Dxvk)
        );
    }

    #[test]
    fn test_runtime_family_has_no_trust_list() {
        for t in ContentType::ALL {
            assert_eq!(t.trust_templates().is_empty(), t.is_runtime(), "{t}");
        }
    }

    #[test]
    fn test_serde_names_match_display() {
        for t in ContentType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{t}\""));
        }
    }
}
