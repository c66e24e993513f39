//! Stage execution.
//!
//! [`Context`] owns the resolved toolchain for one build together with the
//! process, filesystem and linker collaborators. It is `Send + Sync` and holds
//! no mutable state, so build workers may share one instance.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{Result, ToolchainError};
use crate::linker::{HostLinker, SystemLinker};
use crate::process::{FileSystem, OsFileSystem, ProcessRunner, SystemRunner};
use crate::stage::{self, StageInvocation};
use crate::toolchain::GcToolchain;
use crate::unit::BuildUnit;

/// The toolchain plus everything needed to run its stages.
#[derive(Clone)]
pub struct Context {
    toolchain: GcToolchain,
    runner: Arc<dyn ProcessRunner>,
    fs: Arc<dyn FileSystem>,
    linker: Arc<dyn SystemLinker>,
}

impl Context {
    /// A context that runs real processes against the real filesystem.
    pub fn new(toolchain: GcToolchain) -> Self {
        Self {
            toolchain,
            runner: Arc::new(SystemRunner),
            fs: Arc::new(OsFileSystem),
            linker: Arc::new(HostLinker),
        }
    }

    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_linker(mut self, linker: Arc<dyn SystemLinker>) -> Self {
        self.linker = linker;
        self
    }

    pub fn toolchain(&self) -> &GcToolchain {
        &self.toolchain
    }

    /// Compile Go `files` into the package archive `outfile`.
    ///
    /// The compiler's standard output is forwarded to this process's stdout.
    pub fn gc(
        &self,
        unit: &dyn BuildUnit,
        searchpaths: &[PathBuf],
        importpath: &str,
        srcdir: &Path,
        outfile: &Path,
        files: &[PathBuf],
    ) -> Result<()> {
        debug!(importpath, srcdir = %srcdir.display(), outfile = %outfile.display(), ?files, "gc");
        let inv = stage::compile(
            &self.toolchain,
            unit,
            searchpaths,
            importpath,
            srcdir,
            outfile,
            files,
        )?;
        self.execute(&inv)
    }

    /// Assemble `sfile` into the object `ofile`.
    pub fn asm(
        &self,
        unit: &dyn BuildUnit,
        srcdir: &Path,
        ofile: &Path,
        sfile: &Path,
    ) -> Result<()> {
        let inv = stage::assemble(&self.toolchain, unit, srcdir, ofile, sfile);
        self.execute(&inv)
    }

    /// Link the archive `afile` into the executable `outfile`.
    pub fn ld(
        &self,
        unit: &dyn BuildUnit,
        searchpaths: &[PathBuf],
        outfile: &Path,
        afile: &Path,
    ) -> Result<()> {
        let extld = self.linker.resolve_system_linker()?;
        let inv = stage::link(&self.toolchain, unit, searchpaths, outfile, afile, &extld);
        self.execute(&inv)
    }

    /// Compile the C file `cfile` into the object `ofile`.
    pub fn cc(&self, unit: &dyn BuildUnit, ofile: &Path, cfile: &Path) -> Result<()> {
        let inv = stage::native_compile(&self.toolchain, unit, ofile, cfile);
        self.execute(&inv)
    }

    /// Append objects to an archive; `afiles[0]` is the archive.
    pub fn pack(&self, afiles: &[PathBuf]) -> Result<()> {
        let inv = stage::pack(&self.toolchain, afiles)?;
        self.execute(&inv)
    }

    /// Ensure the output directory exists, then run the invocation.
    pub fn execute(&self, inv: &StageInvocation) -> Result<()> {
        if let Some(dir) = inv.output_dir() {
            trace!(stage = %inv.stage, dir = %dir.display(), "ensuring output directory");
            self.fs
                .ensure_dir(dir)
                .map_err(|source| ToolchainError::CreateDir {
                    stage: inv.stage,
                    path: dir.to_path_buf(),
                    source,
                })?;
        }

        debug!(
            stage = %inv.stage,
            tool = %inv.program.display(),
            dir = %inv.dir.display(),
            args = ?inv.args,
            "running"
        );
        let result = if inv.stream_stdout {
            // Unlocked: each write takes the stdout lock on its own.
            let mut stdout = std::io::stdout();
            self.runner
                .run_out(&mut stdout, &inv.dir, &[], &inv.program, &inv.args)
        } else {
            self.runner.run(&inv.dir, &[], &inv.program, &inv.args)
        };
        result.map_err(|source| ToolchainError::Invocation {
            stage: inv.stage,
            tool: inv.program.clone(),
            args: inv.args.clone(),
            source,
        })
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("toolchain", &self.toolchain)
            .finish_non_exhaustive()
    }
}
