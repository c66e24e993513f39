//! Platform triples and architecture codes.
//!
//! Triples use gc naming (`linux/amd64`, `darwin/arm64`), not Rust target
//! naming, because that is what `GOOS`/`GOARCH` and the tool directory use.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolchainError};

/// An operating system and architecture pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformTriple {
    /// Operating system, e.g. "linux".
    pub os: String,
    /// Architecture, e.g. "amd64".
    pub arch: String,
}

impl PlatformTriple {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// The triple of the machine running this process.
    pub fn host() -> Self {
        Self::new(
            go_os(std::env::consts::OS),
            go_arch(std::env::consts::ARCH),
        )
    }

    /// The `<os>_<arch>` directory name used under `pkg/` and `pkg/tool/`.
    pub fn dir_name(&self) -> String {
        format!("{}_{}", self.os, self.arch)
    }
}

impl fmt::Display for PlatformTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

/// Translate a Rust `target_os` name into its gc equivalent.
fn go_os(os: &str) -> String {
    match os {
        "macos" => "darwin".into(),
        other => other.into(),
    }
}

/// Translate a Rust `target_arch` name into its gc equivalent.
fn go_arch(arch: &str) -> String {
    match arch {
        "x86_64" => "amd64".into(),
        "x86" => "386".into(),
        "aarch64" => "arm64".into(),
        "powerpc64" if cfg!(target_endian = "little") => "ppc64le".into(),
        "powerpc64" => "ppc64".into(),
        other => other.into(),
    }
}

/// The single-character code prefixing the tool names for `arch`.
///
/// `amd64` maps to `6`, so its compiler is `6g` and its linker `6l`.
pub fn arch_char(arch: &str) -> Result<char> {
    match arch {
        "amd64" | "amd64p32" => Ok('6'),
        "386" => Ok('8'),
        "arm" => Ok('5'),
        "ppc64" | "ppc64le" => Ok('9'),
        _ => Err(ToolchainError::UnsupportedArch {
            arch: arch.to_string(),
        }),
    }
}
