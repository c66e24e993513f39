//! The resolved gc toolchain.
//!
//! Layout consumed under the toolchain root:
//! ```text
//! <goroot>/
//!   pkg/
//!     tool/<hostos>_<hostarch>/   6g 6l 6a 6c pack
//!     <os>_<arch>/                per-target include files
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::config::ToolchainConfig;
use crate::error::{Result, ToolchainError};
use crate::platform::{arch_char, PlatformTriple};
use crate::stage::Stage;

/// Absolute paths to the five gc tools for one host/target pair.
///
/// Built once by [`ToolchainConfig::resolve`] and never mutated, so a shared
/// reference can be read from any number of build workers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GcToolchain {
    goroot: PathBuf,
    tooldir: PathBuf,
    gc: PathBuf,
    ld: PathBuf,
    #[serde(rename = "as")]
    asm: PathBuf,
    cc: PathBuf,
    pack: PathBuf,
    host: PlatformTriple,
    target: PlatformTriple,
}

impl GcToolchain {
    pub(crate) fn from_config(config: ToolchainConfig) -> Result<Self> {
        let host = config.host().clone();
        let target = config.target;

        check_native(&host, &target)?;
        let archchar = arch_char(&target.arch)?;

        let goroot = config.goroot.ok_or(ToolchainError::MissingRoot)?;
        let goroot = std::path::absolute(&goroot)?;

        let tooldir = goroot.join("pkg").join("tool").join(host.dir_name());
        let tool = |suffix: char| tooldir.join(format!("{archchar}{suffix}"));
        let toolchain = Self {
            gc: tool('g'),
            ld: tool('l'),
            asm: tool('a'),
            cc: tool('c'),
            pack: tooldir.join("pack"),
            host,
            target,
            goroot,
            tooldir,
        };
        info!(
            triple = %toolchain.target,
            tooldir = %toolchain.tooldir.display(),
            "resolved gc toolchain"
        );
        Ok(toolchain)
    }

    pub fn host(&self) -> &PlatformTriple {
        &self.host
    }

    pub fn target(&self) -> &PlatformTriple {
        &self.target
    }

    /// Root of the gc installation.
    pub fn goroot(&self) -> &Path {
        &self.goroot
    }

    /// Directory holding the tool binaries.
    pub fn tooldir(&self) -> &Path {
        &self.tooldir
    }

    /// The executable that runs `stage`.
    pub fn tool(&self, stage: Stage) -> &Path {
        match stage {
            Stage::Compile => &self.gc,
            Stage::Assemble => &self.asm,
            Stage::Link => &self.ld,
            Stage::NativeCompile => &self.cc,
            Stage::Pack => &self.pack,
        }
    }

    /// Include directory for the target, `<goroot>/pkg/<os>_<arch>`.
    pub fn include_dir(&self) -> PathBuf {
        self.goroot.join("pkg").join(self.target.dir_name())
    }
}

/// Cross compilation is not supported; host and target must match exactly.
fn check_native(host: &PlatformTriple, target: &PlatformTriple) -> Result<()> {
    if host != target {
        return Err(ToolchainError::CrossCompilation {
            host: host.clone(),
            target: target.clone(),
        });
    }
    Ok(())
}
