//! Stage definitions and argument construction.
//!
//! Each builder here is a pure function from its inputs to a
//! [`StageInvocation`]; running it is left to [`Context`](crate::Context).

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Result, ToolchainError};
use crate::toolchain::GcToolchain;
use crate::unit::BuildUnit;

/// One discrete toolchain invocation within a package build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Go source to package archive (`6g`).
    Compile,
    /// Plan 9 assembly to object (`6a`).
    Assemble,
    /// Archive to executable (`6l`).
    Link,
    /// C source to object (`6c`).
    NativeCompile,
    /// Append objects to an archive (`pack`).
    Pack,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Compile,
        Stage::Assemble,
        Stage::Link,
        Stage::NativeCompile,
        Stage::Pack,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Compile => "gc",
            Stage::Assemble => "asm",
            Stage::Link => "ld",
            Stage::NativeCompile => "cc",
            Stage::Pack => "pack",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fully constructed tool command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageInvocation {
    pub stage: Stage,
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Working directory of the tool.
    pub dir: PathBuf,
    /// The file this invocation produces.
    pub output: PathBuf,
    /// Whether the tool's standard output is forwarded to the caller.
    pub stream_stdout: bool,
}

impl StageInvocation {
    /// The directory that must exist before the tool runs, if any.
    pub fn output_dir(&self) -> Option<&Path> {
        self.output.parent().filter(|p| !p.as_os_str().is_empty())
    }
}

impl fmt::Display for StageInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&command_line(&self.dir, &self.program, &self.args))
    }
}

/// Render a tool run as `cd <dir>; <program> <args...>`.
pub fn command_line(dir: &Path, program: &Path, args: &[String]) -> String {
    let mut line = format!("cd {}; {}", dir.display(), program.display());
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

fn arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Compile Go `files` for `importpath` into the archive `outfile`.
///
/// Search paths keep their order; earlier entries shadow later ones.
pub fn compile(
    toolchain: &GcToolchain,
    unit: &dyn BuildUnit,
    searchpaths: &[PathBuf],
    importpath: &str,
    srcdir: &Path,
    outfile: &Path,
    files: &[PathBuf],
) -> Result<StageInvocation> {
    if files.is_empty() {
        return Err(ToolchainError::NoInputs {
            stage: Stage::Compile,
        });
    }

    let mut args = unit.gcflags().to_vec();
    args.extend(["-p".to_string(), importpath.to_string(), "-pack".to_string()]);
    args.extend(["-o".into(), arg(outfile)]);
    for d in searchpaths {
        args.extend(["-I".into(), arg(d)]);
    }
    if unit.complete() {
        args.push("-complete".into());
    }
    args.extend(files.iter().map(|f| arg(f)));

    Ok(StageInvocation {
        stage: Stage::Compile,
        program: toolchain.tool(Stage::Compile).to_path_buf(),
        args,
        dir: srcdir.to_path_buf(),
        output: outfile.to_path_buf(),
        stream_stdout: true,
    })
}

/// Assemble `sfile` into the object `ofile` for the toolchain's target.
///
/// Target data comes from the toolchain, not the unit.
pub fn assemble(
    toolchain: &GcToolchain,
    _unit: &dyn BuildUnit,
    srcdir: &Path,
    ofile: &Path,
    sfile: &Path,
) -> StageInvocation {
    let target = toolchain.target();
    let args = vec![
        "-o".into(),
        arg(ofile),
        "-D".into(),
        format!("GOOS_{}", target.os),
        "-D".into(),
        format!("GOARCH_{}", target.arch),
        "-I".into(),
        arg(&toolchain.include_dir()),
        arg(sfile),
    ];
    StageInvocation {
        stage: Stage::Assemble,
        program: toolchain.tool(Stage::Assemble).to_path_buf(),
        args,
        dir: srcdir.to_path_buf(),
        output: ofile.to_path_buf(),
        stream_stdout: false,
    }
}

/// Link the archive `afile` into the executable `outfile`.
///
/// Runs in the current directory: every input is already absolute.
pub fn link(
    toolchain: &GcToolchain,
    unit: &dyn BuildUnit,
    searchpaths: &[PathBuf],
    outfile: &Path,
    afile: &Path,
    extld: &Path,
) -> StageInvocation {
    let mut args = unit.ldflags().to_vec();
    args.extend(["-o".into(), arg(outfile)]);
    for d in searchpaths {
        args.extend(["-L".into(), arg(d)]);
    }
    args.push(format!("-extld={}", extld.display()));
    args.push(arg(afile));

    StageInvocation {
        stage: Stage::Link,
        program: toolchain.tool(Stage::Link).to_path_buf(),
        args,
        dir: PathBuf::from("."),
        output: outfile.to_path_buf(),
        stream_stdout: false,
    }
}

/// Compile the C file `cfile` into the object `ofile` using the unit's layout.
pub fn native_compile(
    toolchain: &GcToolchain,
    unit: &dyn BuildUnit,
    ofile: &Path,
    cfile: &Path,
) -> StageInvocation {
    let runtime_include = unit
        .goroot()
        .join("pkg")
        .join(format!("{}_{}", unit.goos(), unit.goarch()));
    let args = vec![
        "-F".into(),
        "-V".into(),
        "-w".into(),
        "-trimpath".into(),
        arg(unit.workdir()),
        "-I".into(),
        arg(unit.objdir()),
        "-I".into(),
        arg(&runtime_include),
        "-o".into(),
        arg(ofile),
        "-D".into(),
        format!("GOOS_{}", unit.goos()),
        "-D".into(),
        format!("GOARCH_{}", unit.goarch()),
        arg(cfile),
    ];
    StageInvocation {
        stage: Stage::NativeCompile,
        program: toolchain.tool(Stage::NativeCompile).to_path_buf(),
        args,
        dir: unit.dir().to_path_buf(),
        output: ofile.to_path_buf(),
        stream_stdout: false,
    }
}

/// Append objects to an archive. `afiles[0]` is the archive.
pub fn pack(toolchain: &GcToolchain, afiles: &[PathBuf]) -> Result<StageInvocation> {
    let archive = afiles
        .first()
        .ok_or(ToolchainError::NoInputs { stage: Stage::Pack })?;
    let dir = archive
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut args = vec!["r".to_string()];
    args.extend(afiles.iter().map(|f| arg(f)));

    Ok(StageInvocation {
        stage: Stage::Pack,
        program: toolchain.tool(Stage::Pack).to_path_buf(),
        args,
        dir: dir.to_path_buf(),
        output: archive.clone(),
        stream_stdout: false,
    })
}
