//! Discovery of the host C compiler used as the external linker.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::trace;

use crate::error::{Result, ToolchainError};
use crate::stage::Stage;

const DEFAULT_CC: &str = "gcc";

/// Resolves the C compiler front end passed to the linker as `-extld`.
pub trait SystemLinker: Send + Sync {
    fn resolve_system_linker(&self) -> Result<PathBuf>;
}

/// The host's C compiler: `$CC` (first word) or `gcc`, looked up on `PATH`.
///
/// Resolved on first use and cached for the life of the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostLinker;

static HOST_CC: OnceLock<std::result::Result<PathBuf, String>> = OnceLock::new();

impl SystemLinker for HostLinker {
    fn resolve_system_linker(&self) -> Result<PathBuf> {
        HOST_CC
            .get_or_init(|| {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                find_cc(std::env::var("CC").ok(), std::env::var_os("PATH"), &cwd)
            })
            .clone()
            .map_err(|name| ToolchainError::LinkerNotFound {
                stage: Stage::Link,
                name,
            })
    }
}

/// Locate the executable C compiler named by `cc` (or the default) in `path`.
///
/// A name containing a path separator is taken as-is.
fn find_cc(
    cc: Option<String>,
    path: Option<OsString>,
    cwd: &Path,
) -> std::result::Result<PathBuf, String> {
    let name = cc
        .as_deref()
        .and_then(|cc| cc.split_whitespace().next())
        .unwrap_or(DEFAULT_CC)
        .to_string();

    if Path::new(&name).components().count() > 1 {
        trace!(cc = %name, "using C compiler path from CC");
        return Ok(PathBuf::from(name));
    }

    match which::which_in(&name, path, cwd) {
        Ok(found) => {
            trace!(cc = %found.display(), "found C compiler");
            Ok(found)
        }
        Err(_) => Err(name),
    }
}
