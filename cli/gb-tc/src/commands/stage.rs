//! Stage subcommands: `gc`, `asm`, `cc`, `ld`, `pack`.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use gb_toolchain::{Context, Package};

/// Read a build unit descriptor from a TOML file.
pub fn load_unit(path: &Path) -> Result<Package> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading unit {}", path.display()))?;
    Package::from_toml(&content).with_context(|| format!("parsing unit {}", path.display()))
}

/// Compile, defaulting the working directory to the unit's source dir.
pub fn gc(
    ctx: &Context,
    unit: &Package,
    include: &[PathBuf],
    import_path: &str,
    srcdir: Option<&Path>,
    output: &Path,
    files: &[PathBuf],
) -> Result<()> {
    let srcdir = srcdir.unwrap_or(&unit.dir);
    ctx.gc(unit, include, import_path, srcdir, output, files)
        .with_context(|| format!("compiling {import_path}"))
}
