//! Toolchain configuration.
//!
//! A [`ToolchainConfig`] is assembled once per build from, in increasing
//! precedence: the host triple, an [`EnvSnapshot`] of `GOOS`/`GOARCH`/`GOROOT`,
//! and an ordered list of [`ConfigOverride`]s. Later overrides win. The config
//! is consumed by [`ToolchainConfig::resolve`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolchainError};
use crate::platform::PlatformTriple;
use crate::toolchain::GcToolchain;

/// The toolchain-relevant environment variables, captured at one point in time.
///
/// Empty values are treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    pub goos: Option<String>,
    pub goarch: Option<String>,
    pub goroot: Option<PathBuf>,
}

impl EnvSnapshot {
    /// Read the process environment.
    pub fn capture() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a snapshot from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            goos: get("GOOS"),
            goarch: get("GOARCH"),
            goroot: get("GOROOT").map(PathBuf::from),
        }
    }
}

/// A single override applied on top of the environment defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverride {
    /// Set the target operating system.
    Goos(String),
    /// Set the target architecture.
    Goarch(String),
    /// Set the toolchain root directory.
    Goroot(PathBuf),
}

impl ConfigOverride {
    fn apply(self, config: &mut ToolchainConfig) {
        match self {
            ConfigOverride::Goos(os) if !os.is_empty() => config.target.os = os,
            ConfigOverride::Goarch(arch) if !arch.is_empty() => config.target.arch = arch,
            ConfigOverride::Goroot(root) if !root.as_os_str().is_empty() => {
                config.goroot = Some(root)
            }
            _ => {}
        }
    }
}

/// Validated-but-unresolved toolchain configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainConfig {
    host: PlatformTriple,
    /// The platform the build output will run on.
    pub target: PlatformTriple,
    /// Root of the gc installation.
    pub goroot: Option<PathBuf>,
}

impl ToolchainConfig {
    /// Configure from the detected host and the current process environment.
    pub fn from_env(overrides: impl IntoIterator<Item = ConfigOverride>) -> Self {
        Self::new(PlatformTriple::host(), &EnvSnapshot::capture(), overrides)
    }

    /// Configure from an explicit host triple and environment snapshot.
    pub fn new(
        host: PlatformTriple,
        env: &EnvSnapshot,
        overrides: impl IntoIterator<Item = ConfigOverride>,
    ) -> Self {
        let target = PlatformTriple::new(
            env.goos.clone().unwrap_or_else(|| host.os.clone()),
            env.goarch.clone().unwrap_or_else(|| host.arch.clone()),
        );
        let mut config = Self {
            host,
            target,
            goroot: env.goroot.clone(),
        };
        for o in overrides {
            o.apply(&mut config);
        }
        config
    }

    /// The platform running the build.
    pub fn host(&self) -> &PlatformTriple {
        &self.host
    }

    /// Validate the triples and compute the tool paths.
    pub fn resolve(self) -> Result<GcToolchain> {
        GcToolchain::from_config(self)
    }
}

/// On-disk toolchain settings, e.g. `gb-toolchain.toml`:
///
/// ```toml
/// [toolchain]
/// goos = "linux"
/// goarch = "amd64"
/// goroot = "/usr/local/go"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub toolchain: ToolchainSection,
}

/// The `[toolchain]` table of a [`ConfigFile`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainSection {
    #[serde(default)]
    pub goos: Option<String>,
    #[serde(default)]
    pub goarch: Option<String>,
    #[serde(default)]
    pub goroot: Option<PathBuf>,
}

impl ConfigFile {
    /// Load a config file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ToolchainError::ConfigFile {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// The overrides this file contributes, in `goos`, `goarch`, `goroot` order.
    pub fn overrides(&self) -> Vec<ConfigOverride> {
        let t = &self.toolchain;
        let mut out = Vec::new();
        if let Some(os) = &t.goos {
            out.push(ConfigOverride::Goos(os.clone()));
        }
        if let Some(arch) = &t.goarch {
            out.push(ConfigOverride::Goarch(arch.clone()));
        }
        if let Some(root) = &t.goroot {
            out.push(ConfigOverride::Goroot(root.clone()));
        }
        out
    }
}
