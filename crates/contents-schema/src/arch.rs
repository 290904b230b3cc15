//! Runtime architectures.

/// Guest architecture a Wine/Proton build targets.
///
/// The architecture is the trailing component of every runtime identifier
/// (e.g. `proton-10.0-arm64ec`) and decides whether the prefix is 64-bit.
///
/// # Example
///
/// ```
/// use contents_schema::RuntimeArch;
///
/// let arch: RuntimeArch = "arm64ec".parse().unwrap();
/// assert!(arch.is_win64());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeArch {
    /// 32-bit x86 guest.
    X86,
    /// 64-bit x86 guest (default for bundled Wine).
    #[default]
    #[serde(rename = "x86_64")]
    X86_64,
    /// ARM64EC build that runs x86-64 code through an emulator.
    Arm64ec,
}

impl RuntimeArch {
    /// Every architecture that may appear in an identifier.
    pub const ALL: [RuntimeArch; 3] = [Self::X86, Self::X86_64, Self::Arm64ec];

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86 => "x86",
            Self::X86_64 => "x86_64",
            Self::Arm64ec => "arm64ec",
        }
    }

    /// Returns `true` for architectures that produce a 64-bit prefix.
    pub fn is_win64(&self) -> bool {
        matches!(self, Self::X86_64 | Self::Arm64ec)
    }

    /// Returns `true` for ARM64EC builds.
    pub fn is_arm64ec(&self) -> bool {
        matches!(self, Self::Arm64ec)
    }
}

impl std::fmt::Display for RuntimeArch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RuntimeArch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x86" => Ok(Self::X86),
            "x86_64" => Ok(Self::X86_64),
            "arm64ec" => Ok(Self::Arm64ec),
            _ => Err(format!("Unknown architecture: {s}")),
        }
    }
}
