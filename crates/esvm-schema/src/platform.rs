//! Host platform identifiers.
//!
//! Engine builds are published per OS and CPU architecture. The identifiers
//! follow the `<os>-<arch>` convention used by Node (`darwin-x64`,
//! `win32-ia32`, ...), which is also how engine archives are keyed.
//!
//! # Example
//!
//! ```
//! use esvm_schema::{Platform, PlatformFamily};
//!
//! let p: Platform = "linux-x64".parse().unwrap();
//! assert_eq!(p.family(), PlatformFamily::Linux);
//! assert_eq!(p.to_string(), "linux-x64");
//! ```

use thiserror::Error;

/// Errors raised while detecting or parsing a [`Platform`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The string does not name any platform esvm knows about.
    #[error("Unknown platform: {0}")]
    Unknown(String),

    /// The host OS/architecture pair has no platform identifier.
    #[error("Unsupported host: {os}-{arch}")]
    UnsupportedHost {
        /// Value of `std::env::consts::OS`.
        os: &'static str,
        /// Value of `std::env::consts::ARCH`.
        arch: &'static str,
    },
}

/// An operating system and CPU architecture pair.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum Platform {
    /// macOS on Intel.
    #[serde(rename = "darwin-x64")]
    DarwinX64,
    /// macOS on Apple Silicon.
    #[serde(rename = "darwin-arm64")]
    DarwinArm64,
    /// 32-bit x86 Linux.
    #[serde(rename = "linux-ia32")]
    LinuxIa32,
    /// 64-bit x86 Linux.
    #[serde(rename = "linux-x64")]
    LinuxX64,
    /// 64-bit ARM Linux.
    #[serde(rename = "linux-arm64")]
    LinuxArm64,
    /// 32-bit x86 Windows.
    #[serde(rename = "win32-ia32")]
    Win32Ia32,
    /// 64-bit x86 Windows.
    #[serde(rename = "win32-x64")]
    Win32X64,
    /// 64-bit ARM Windows.
    #[serde(rename = "win32-arm64")]
    Win32Arm64,
}

/// The OS family of a [`Platform`]; decides how entry points are wired up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformFamily {
    /// macOS: binaries are symlinked, libraries are `.dylib`.
    Mac,
    /// Linux: launchers are bash scripts, libraries are `.so`.
    Linux,
    /// Windows: launchers are `.cmd` shims, libraries are `.dll`.
    Windows,
}

impl Platform {
    /// Every platform identifier, in display order.
    pub const ALL: [Platform; 8] = [
        Self::DarwinX64,
        Self::DarwinArm64,
        Self::LinuxIa32,
        Self::LinuxX64,
        Self::LinuxArm64,
        Self::Win32Ia32,
        Self::Win32X64,
        Self::Win32Arm64,
    ];

    /// Detect the platform of the running host.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::UnsupportedHost`] when the OS/architecture
    /// pair has no identifier (e.g. FreeBSD, or 32-bit ARM).
    pub fn current() -> Result<Self, PlatformError> {
        Self::from_consts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Map Rust's `OS`/`ARCH` constants to a platform.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::UnsupportedHost`] for unmapped pairs.
    pub fn from_consts(os: &'static str, arch: &'static str) -> Result<Self, PlatformError> {
        match (os, arch) {
            ("macos", "x86_64") => Ok(Self::DarwinX64),
            ("macos", "aarch64") => Ok(Self::DarwinArm64),
            ("linux", "x86") => Ok(Self::LinuxIa32),
            ("linux", "x86_64") => Ok(Self::LinuxX64),
            ("linux", "aarch64") => Ok(Self::LinuxArm64),
            ("windows", "x86") => Ok(Self::Win32Ia32),
            ("windows", "x86_64") => Ok(Self::Win32X64),
            ("windows", "aarch64") => Ok(Self::Win32Arm64),
            _ => Err(PlatformError::UnsupportedHost { os, arch }),
        }
    }

    /// The `<os>-<arch>` identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DarwinX64 => "darwin-x64",
            Self::DarwinArm64 => "darwin-arm64",
            Self::LinuxIa32 => "linux-ia32",
            Self::LinuxX64 => "linux-x64",
            Self::LinuxArm64 => "linux-arm64",
            Self::Win32Ia32 => "win32-ia32",
            Self::Win32X64 => "win32-x64",
            Self::Win32Arm64 => "win32-arm64",
        }
    }

    /// OS family of this platform.
    pub fn family(&self) -> PlatformFamily {
        match self {
            Self::DarwinX64 | Self::DarwinArm64 => PlatformFamily::Mac,
            Self::LinuxIa32 | Self::LinuxX64 | Self::LinuxArm64 => PlatformFamily::Linux,
            Self::Win32Ia32 | Self::Win32X64 | Self::Win32Arm64 => PlatformFamily::Windows,
        }
    }

    /// Returns `true` for the Windows family.
    pub fn is_windows(&self) -> bool {
        self.family() == PlatformFamily::Windows
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == needle)
            .ok_or_else(|| PlatformError::Unknown(s.to_string()))
    }
}
